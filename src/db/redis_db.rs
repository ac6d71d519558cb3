#![cfg(feature = "redis_db")]

use teloxide::types::UserId;
use redis;
use serde_json;

use crate::config::Config;
use crate::dashboard::newest_first;
use crate::db::StoreError;
use crate::error::Error;
use crate::new_order::{self, NewOrder};
use crate::order::{validate_update_for, Order, OrderId, Roles};
use crate::product::Product;
use crate::Offset;

fn to_err(e: redis::RedisError) -> StoreError {
    StoreError::Backend(format!("Redis error: {e:?}"))
}

/// Sets the order only if its status is still the one we validated against
///
/// KEYS: order key, order status key
/// ARGV: expected status, new status, serialized order
const SET_STATUS_SCRIPT: &str = r"
if redis.call('GET', KEYS[2]) ~= ARGV[1] then
    return 0
end
redis.call('SET', KEYS[2], ARGV[2])
redis.call('SET', KEYS[1], ARGV[3])
return 1
";

/// How many times we re-read an order whose status changed under us
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Structure:
///   num_orders            u64
///   orders                Set<OrderId>
///   order:id              SerializedData
///   order:id:status       String
///   user:id:orders        Set<OrderId>
///   products              SerializedData (Vec<Product>)
#[derive(Clone)]
pub struct Db {
    c: redis::aio::ConnectionManager,
    delivery_fee: u64,
}

impl Db {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        log::info!("Connecting to redis at {}", config.redis_url);
        let client = redis::Client::open(config.redis_url.as_str())?;
        let connection = client.get_tokio_connection_manager().await?;

        let mut db = Db { c: connection, delivery_fee: config.delivery_fee };

        if !config.products.is_empty() {
            log::info!("Loading {} products into the catalog", config.products.len());
            redis::Cmd::set(products_key(), serde_json::to_vec(&config.products)?)
                .query_async::<_, ()>(&mut db.c).await?;
        }

        Ok(db)
    }

    pub async fn list_products(&mut self) -> Result<Vec<Product>, StoreError> {
        log::debug!("list_products");
        let data: Option<Vec<u8>> = redis::Cmd::get(products_key())
            .query_async(&mut self.c).await.map_err(to_err)?;
        match data {
            Some(data) => serde_json::from_slice(&data).map_err(StoreError::backend),
            None => Ok(Vec::new()),
        }
    }

    /// Checks out `new` and returns the stored order
    pub async fn create_order(&mut self, new: NewOrder) -> Result<Order, StoreError> {
        log::debug!("create_order for {}", new.customer_id);
        let products = self.list_products().await?;
        // Fail before taking an id
        new.validate()?;
        new_order::quote(&new.items, &products, self.delivery_fee)?;

        let oid: u64 = redis::Cmd::incr(num_orders_key(), 1)
            .query_async(&mut self.c).await.map_err(to_err)?;
        let oid = OrderId(oid);
        let order = new.into_order(oid, &products, self.delivery_fee, Offset::now())?;
        let data = serde_json::to_vec(&order).map_err(StoreError::backend)?;

        redis::pipe()
            .atomic()
            .set(order_key(oid), data)
            .set(order_status_key(oid), &order.status)
            .sadd(orders_key(), oid.0)
            .sadd(user_orders_key(order.customer_id), oid.0)
            .query_async::<_, ()>(&mut self.c).await.map_err(to_err)?;
        log::info!("Added order {order:?}");
        Ok(order)
    }

    pub async fn get_order(&mut self, oid: OrderId) -> Result<Option<Order>, StoreError> {
        let data: Option<Vec<u8>> = redis::Cmd::get(order_key(oid))
            .query_async(&mut self.c).await.map_err(to_err)?;
        match data {
            Some(data) => serde_json::from_slice(&data)
                .map(Some)
                .map_err(StoreError::backend),
            None => Ok(None),
        }
    }

    /// Every order, newest first
    pub async fn list_all_orders(&mut self) -> Result<Vec<Order>, StoreError> {
        log::info!("Listing all orders");
        let oids: Vec<u64> = redis::Cmd::smembers(orders_key())
            .query_async(&mut self.c).await.map_err(to_err)?;
        self.orders_by_ids(oids).await
    }

    /// Orders placed by `uid`, newest first
    pub async fn orders_by_customer(&mut self, uid: UserId) -> Result<Vec<Order>, StoreError> {
        log::info!("Listing orders submitted by user {:?}", uid);
        let oids: Vec<u64> = redis::Cmd::smembers(user_orders_key(uid))
            .query_async(&mut self.c).await.map_err(to_err)?;
        self.orders_by_ids(oids).await
    }

    async fn orders_by_ids(&mut self, oids: Vec<u64>) -> Result<Vec<Order>, StoreError> {
        // it's an error to query nothing
        if oids.is_empty() {
            return Ok(Vec::new())
        }

        let mut pipe = redis::pipe();
        for oid in oids.iter() {
            pipe.get(order_key(OrderId(*oid)));
        }
        let datas: Vec<Option<Vec<u8>>> =
            pipe.query_async(&mut self.c).await.map_err(to_err)?;

        let mut orders = Vec::with_capacity(datas.len());
        for data in datas.into_iter().flatten() {
            let order: Order = serde_json::from_slice(&data)
                .map_err(StoreError::backend)?;
            orders.push(order);
        }
        newest_first(&mut orders);
        Ok(orders)
    }

    /// Moves the order to `requested` if the workflow allows it for `roles`
    /// and returns the updated order
    ///
    /// The write only happens if the stored status is still the one the
    /// request was validated against. If somebody got there first the
    /// fresh order is validated again, which refuses the stale request.
    pub async fn update_status(
        &mut self,
        oid: OrderId,
        requested: &str,
        roles: &Roles,
    ) -> Result<Order, StoreError> {
        let script = redis::Script::new(SET_STATUS_SCRIPT);

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let order = self.get_order(oid).await?
                .ok_or(StoreError::OrderNotFound(oid))?;
            let status = validate_update_for(&order, requested, roles)?;

            let mut updated = order.clone();
            updated.apply_status(status, Offset::now());
            let data = serde_json::to_vec(&updated).map_err(StoreError::backend)?;

            let mut invocation = script.key(order_key(oid));
            invocation
                .key(order_status_key(oid))
                .arg(&order.status)
                .arg(status.id())
                .arg(data);
            let swapped: i64 = invocation.invoke_async(&mut self.c)
                .await.map_err(to_err)?;

            if swapped == 1 {
                log::info!("Order {oid} status update: {} -> {status} by {roles}",
                           order.status);
                return Ok(updated)
            }
            log::warn!("Order {oid} changed while updating to {requested} \
(attempt {attempt}), checking again");
        }

        Err(StoreError::Backend(format!(
            "order {oid} keeps changing, gave up updating it")))
    }
}

fn num_orders_key() -> &'static str {
    "num_orders"
}

fn orders_key() -> &'static str {
    "orders"
}

fn products_key() -> &'static str {
    "products"
}

fn order_key(oid: OrderId) -> String {
    format!("order:{}", oid.0)
}

fn order_status_key(oid: OrderId) -> String {
    format!("order:{}:status", oid.0)
}

fn user_orders_key(uid: UserId) -> String {
    format!("user:{}:orders", uid.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_order::ItemRequest;
    use crate::order::{Status, UpdateError};

    #[test]
    fn test_keys() {
        assert_eq!("order:12", order_key(OrderId(12)));
        assert_eq!("order:12:status", order_status_key(OrderId(12)));
        assert_eq!("user:77:orders", user_orders_key(UserId(77)));
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        if let Ok(url) = std::env::var("REDIS_URL") {
            config.redis_url = url;
        }
        config.products = vec![Product {
            product_id: "prod_001".to_string(),
            name: "Energy drink".to_string(),
            price: 249,
            stock: 20,
            category: None,
        }];
        config
    }

    fn is_stale_picking(res: &Result<Order, StoreError>) -> bool {
        matches!(res, Err(StoreError::Rejected(UpdateError::IllegalTransition {
            from: Status::Picking, to: Status::Picking })))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    #[ignore = "needs a redis server at REDIS_URL"]
    async fn test_racing_updates_advance_once() {
        let mut db = Db::new(&test_config()).await.unwrap();
        let new = NewOrder {
            customer_id: UserId(7),
            items: vec![ItemRequest { product_id: "prod_001".to_string(), quantity: 1 }],
            delivery_address: "Engineering building, lab 3".to_string(),
            delivery_instructions: None,
        };
        let oid = db.create_order(new).await.unwrap().id;
        let admin = Roles::from_groups(["admin"]);
        let runner = Roles::from_groups(["runner"]);
        db.update_status(oid, "accepted", &admin).await.unwrap();

        // admin and runner both saw `accepted` and press the button together
        let mut a = db.clone();
        let mut b = db.clone();
        let (ra, rb) = tokio::join!(
            a.update_status(oid, "picking", &admin),
            b.update_status(oid, "picking", &runner));
        let (won, lost) = if ra.is_ok() { (ra, rb) } else { (rb, ra) };
        assert_eq!(Ok(Status::Picking), won.unwrap().status());
        assert!(is_stale_picking(&lost), "{lost:?}");

        let late = db.update_status(oid, "picking", &runner).await;
        assert!(is_stale_picking(&late), "{late:?}");

        let stored = db.get_order(oid).await.unwrap().unwrap();
        assert_eq!("picking", stored.status);
        let status: Option<String> = redis::Cmd::get(order_status_key(oid))
            .query_async(&mut db.c).await.unwrap();
        assert_eq!(Some("picking".to_string()), status);
    }
}
