use tokio::task::spawn_blocking;
use teloxide::types::UserId;
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::dashboard::newest_first;
use crate::db::StoreError;
use crate::error::Error;
use crate::new_order::{NewOrder, DELIVERY_FEE};
use crate::order::{validate_update_for, Order, OrderId, Roles};
use crate::product::Product;
use crate::Offset;

/// Wrapper for InnerDb that is Send, Sync, and async
#[derive(Clone)]
pub struct Db {
    db: Arc<RwLock<InnerDb>>,
}

impl Db {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        log::info!("Using in-memory order store");
        Ok(Db::with_catalog(config.products.clone(), config.delivery_fee))
    }

    pub fn with_catalog(products: Vec<Product>, delivery_fee: u64) -> Db {
        let inner = InnerDb { products, delivery_fee, ..InnerDb::default() };
        Db { db: Arc::new(RwLock::new(inner)) }
    }

    pub async fn list_products(&mut self) -> Result<Vec<Product>, StoreError> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Vec<Product>, StoreError> {
            let db = db.read().map_err(StoreError::backend)?;
            Ok(db.products.clone())
        }).await.map_err(StoreError::backend)?
    }

    /// Checks out `new` and returns the stored order
    pub async fn create_order(&mut self, new: NewOrder) -> Result<Order, StoreError> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Order, StoreError> {
            let mut db = db.write().map_err(StoreError::backend)?;
            db.create_order(new)
        }).await.map_err(StoreError::backend)?
    }

    pub async fn get_order(&mut self, oid: OrderId) -> Result<Option<Order>, StoreError> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Option<Order>, StoreError> {
            let db = db.read().map_err(StoreError::backend)?;
            Ok(db.find_order(oid).cloned())
        }).await.map_err(StoreError::backend)?
    }

    /// Every order, newest first
    pub async fn list_all_orders(&mut self) -> Result<Vec<Order>, StoreError> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Vec<Order>, StoreError> {
            let db = db.read().map_err(StoreError::backend)?;
            Ok(db.list_all_orders())
        }).await.map_err(StoreError::backend)?
    }

    /// Orders placed by `uid`, newest first
    pub async fn orders_by_customer(&mut self, uid: UserId) -> Result<Vec<Order>, StoreError> {
        let db = self.db.clone();
        spawn_blocking(move || -> Result<Vec<Order>, StoreError> {
            let db = db.read().map_err(StoreError::backend)?;
            Ok(db.orders_by_customer(uid))
        }).await.map_err(StoreError::backend)?
    }

    /// Moves the order to `requested` if the workflow allows it for `roles`
    /// and returns the updated order
    pub async fn update_status(
        &mut self,
        oid: OrderId,
        requested: &str,
        roles: &Roles,
    ) -> Result<Order, StoreError> {
        let db = self.db.clone();
        let requested = requested.to_string();
        let roles = roles.clone();
        spawn_blocking(move || -> Result<Order, StoreError> {
            let mut db = db.write().map_err(StoreError::backend)?;
            db.update_status(oid, &requested, &roles)
        }).await.map_err(StoreError::backend)?
    }
}

#[derive(Debug)]
struct InnerDb {
    max_id: OrderId,
    products: Vec<Product>,
    delivery_fee: u64,
    orders: Vec<Order>,
}

impl Default for InnerDb {
    fn default() -> Self {
        InnerDb {
            max_id:       OrderId(0),
            products:     Vec::new(),
            delivery_fee: DELIVERY_FEE,
            orders:       Vec::new(),
        }
    }
}

impl InnerDb {
    fn create_order(&mut self, new: NewOrder) -> Result<Order, StoreError> {
        let new_id = OrderId(self.max_id.0 + 1);
        let order = new.into_order(
            new_id, &self.products, self.delivery_fee, Offset::now())?;
        self.max_id = new_id;
        log::info!("Added order {order:?} new id = {}", new_id.0);
        self.orders.push(order.clone());
        Ok(order)
    }

    fn find_order(&self, oid: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == oid)
    }

    fn list_all_orders(&self) -> Vec<Order> {
        log::info!("Listing all orders");
        let mut orders = self.orders.clone();
        newest_first(&mut orders);
        orders
    }

    fn orders_by_customer(&self, uid: UserId) -> Vec<Order> {
        log::info!("Listing orders submitted by user {:?}", uid);
        let mut orders: Vec<Order> = self.orders.iter()
            .filter(|o| o.customer_id == uid)
            .cloned()
            .collect();
        newest_first(&mut orders);
        orders
    }

    fn update_status(
        &mut self,
        oid: OrderId,
        requested: &str,
        roles: &Roles,
    ) -> Result<Order, StoreError> {
        let order = self.orders.iter_mut()
            .find(|o| o.id == oid)
            .ok_or(StoreError::OrderNotFound(oid))?;
        let prev = order.status.clone();
        let status = validate_update_for(order, requested, roles)?;
        order.apply_status(status, Offset::now());
        log::info!("Order {oid} status update: {prev} -> {status} by {roles}");
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_order::{CheckoutError, ItemRequest};
    use crate::order::{Role, Status, UpdateError};

    fn catalog() -> Vec<Product> {
        vec![Product {
            product_id: "prod_001".to_string(),
            name: "Energy drink".to_string(),
            price: 249,
            stock: 20,
            category: None,
        }]
    }

    fn mk_new_order(uid: UserId) -> NewOrder {
        NewOrder {
            customer_id: uid,
            items: vec![ItemRequest { product_id: "prod_001".to_string(), quantity: 2 }],
            delivery_address: "Engineering building, lab 3".to_string(),
            delivery_instructions: Some("Call when you arrive".to_string()),
        }
    }

    fn admin() -> Roles { Roles::from_groups(["admin"]) }
    fn runner() -> Roles { Roles::from_groups(["runner"]) }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let mut db = Db::with_catalog(catalog(), 200);
        let order = db.create_order(mk_new_order(UserId(7))).await.unwrap();
        assert_eq!(OrderId(1), order.id);
        assert_eq!("pending", order.status);
        assert_eq!(698, order.total);

        let fetched = db.get_order(order.id).await.unwrap();
        assert_eq!(Some(order), fetched);
        assert_eq!(None, db.get_order(OrderId(99)).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_checkout_does_not_use_an_id() {
        let mut db = Db::with_catalog(catalog(), 200);
        let mut bad = mk_new_order(UserId(7));
        bad.items[0].product_id = "nope".to_string();
        let res = db.create_order(bad).await;
        assert!(matches!(res, Err(StoreError::Checkout(_))));

        let order = db.create_order(mk_new_order(UserId(7))).await.unwrap();
        assert_eq!(OrderId(1), order.id);
    }

    #[tokio::test]
    async fn test_overflowing_checkout_keeps_store_usable() {
        let mut products = catalog();
        products[0].price = u64::MAX / 2;
        products[0].stock = 10;
        let mut db = Db::with_catalog(products, 200);

        let mut huge = mk_new_order(UserId(7));
        huge.items[0].quantity = 3;
        let res = db.create_order(huge).await;
        assert!(matches!(res, Err(StoreError::Checkout(CheckoutError::TotalTooLarge))));

        let mut fine = mk_new_order(UserId(7));
        fine.items[0].quantity = 1;
        let order = db.create_order(fine).await.unwrap();
        assert_eq!(OrderId(1), order.id);
        assert_eq!(1, db.list_all_orders().await.unwrap().len());
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mut db = Db::with_catalog(catalog(), 200);
        let oid = db.create_order(mk_new_order(UserId(7))).await.unwrap().id;

        let order = db.update_status(oid, "accepted", &admin()).await.unwrap();
        assert!(order.accepted_at.is_some());
        db.update_status(oid, "picking", &runner()).await.unwrap();
        db.update_status(oid, "out_for_delivery", &runner()).await.unwrap();
        let order = db.update_status(oid, "delivered", &runner()).await.unwrap();
        assert_eq!(Ok(Status::Delivered), order.status());
        assert!(order.delivered_at.is_some());
        assert!(!order.is_active());
    }

    #[tokio::test]
    async fn test_store_enforces_roles() {
        let mut db = Db::with_catalog(catalog(), 200);
        let oid = db.create_order(mk_new_order(UserId(7))).await.unwrap().id;

        let res = db.update_status(oid, "accepted", &runner()).await;
        assert!(matches!(res, Err(StoreError::Rejected(UpdateError::Unauthorized { .. }))));

        let customer = Roles::none().with(Role::Customer);
        let res = db.update_status(oid, "accepted", &customer).await;
        assert!(matches!(res, Err(StoreError::Rejected(UpdateError::Unauthorized { .. }))));

        let res = db.update_status(oid, "shipped", &admin()).await;
        assert!(matches!(res, Err(StoreError::Rejected(UpdateError::InvalidStatus(_)))));

        let res = db.update_status(OrderId(42), "accepted", &admin()).await;
        assert!(matches!(res, Err(StoreError::OrderNotFound(OrderId(42)))));
    }

    #[tokio::test]
    async fn test_racing_updates_advance_once() {
        let mut db = Db::with_catalog(catalog(), 200);
        let oid = db.create_order(mk_new_order(UserId(7))).await.unwrap().id;
        db.update_status(oid, "accepted", &admin()).await.unwrap();

        // admin and runner both saw `accepted` and both press the button
        let mut db2 = db.clone();
        let a = db.update_status(oid, "picking", &admin()).await;
        let b = db2.update_status(oid, "picking", &runner()).await;

        assert!(a.is_ok());
        assert!(matches!(b, Err(StoreError::Rejected(UpdateError::IllegalTransition {
            from: Status::Picking, to: Status::Picking }))));
    }

    #[tokio::test]
    async fn test_listing() {
        let mut db = Db::with_catalog(catalog(), 200);
        db.create_order(mk_new_order(UserId(1))).await.unwrap();
        db.create_order(mk_new_order(UserId(2))).await.unwrap();
        db.create_order(mk_new_order(UserId(1))).await.unwrap();

        let all: Vec<OrderId> = db.list_all_orders().await.unwrap()
            .into_iter().map(|o| o.id).collect();
        assert_eq!(vec![OrderId(3), OrderId(2), OrderId(1)], all);

        let mine: Vec<OrderId> = db.orders_by_customer(UserId(1)).await.unwrap()
            .into_iter().map(|o| o.id).collect();
        assert_eq!(vec![OrderId(3), OrderId(1)], mine);

        assert_eq!(1, db.list_products().await.unwrap().len());
    }
}
