use teloxide::types::UserId;
use serde::{Serialize, Deserialize};

use crate::order::{Order, OrderId, OrderItem, Status};
use crate::product::{self, Product};
use crate::DateTime;

/// Default flat delivery fee, $2.00
pub const DELIVERY_FEE: u64 = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// What the customer sends at checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_id: UserId,
    pub items: Vec<ItemRequest>,
    pub delivery_address: String,
    #[serde(default)]
    pub delivery_instructions: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Order must contain at least one item")]
    NoItems,

    #[error("Quantity of {0} must be at least 1")]
    InvalidQuantity(String),

    #[error("Delivery address is required")]
    EmptyAddress,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Insufficient stock for {name}. Available: {available}")]
    InsufficientStock { name: String, available: u32 },

    #[error("Order total is too large")]
    TotalTooLarge,
}

impl NewOrder {
    /// Checks what can be checked without the catalog
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.items.is_empty() {
            return Err(CheckoutError::NoItems)
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(CheckoutError::InvalidQuantity(item.product_id.clone()))
        }
        if self.delivery_address.trim().is_empty() {
            return Err(CheckoutError::EmptyAddress)
        }
        Ok(())
    }

    /// Looks up every item in the catalog and fills in name and price
    pub fn price(&self, products: &[Product]) -> Result<Vec<OrderItem>, CheckoutError> {
        price_items(&self.items, products)
    }

    /// Turns the request into a fresh `pending` order
    pub fn into_order(
        self,
        id: OrderId,
        products: &[Product],
        delivery_fee: u64,
        now: DateTime,
    ) -> Result<Order, CheckoutError> {
        self.validate()?;
        let Quote { items, subtotal, total } =
            quote(&self.items, products, delivery_fee)?;
        let delivery_instructions = self.delivery_instructions
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Order {
            id,
            customer_id: self.customer_id,
            items,
            subtotal,
            delivery_fee,
            total,
            delivery_address: self.delivery_address.trim().to_string(),
            delivery_instructions,
            status: Status::Pending.id().to_string(),
            created_at: now,
            updated_at: None,
            accepted_at: None,
            delivered_at: None,
        })
    }
}

/// Cart arithmetic: every requested item priced from the catalog
pub fn price_items(
    items: &[ItemRequest],
    products: &[Product],
) -> Result<Vec<OrderItem>, CheckoutError> {
    items.iter()
        .map(|item| {
            if item.quantity == 0 {
                return Err(CheckoutError::InvalidQuantity(item.product_id.clone()))
            }
            let product = product::find(products, &item.product_id)
                .ok_or_else(|| CheckoutError::ProductNotFound(
                        item.product_id.clone()))?;
            if product.stock < item.quantity {
                return Err(CheckoutError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                })
            }
            let priced = OrderItem {
                product_id: product.product_id.clone(),
                name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price,
            };
            priced.checked_total().ok_or(CheckoutError::TotalTooLarge)?;
            Ok(priced)
        })
        .collect()
}

pub fn subtotal(items: &[OrderItem]) -> Result<u64, CheckoutError> {
    items.iter().try_fold(0u64, |acc, i| {
        i.checked_total()
            .and_then(|t| acc.checked_add(t))
            .ok_or(CheckoutError::TotalTooLarge)
    })
}

/// Priced items with the amounts due
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Quote {
    pub items: Vec<OrderItem>,
    pub subtotal: u64,
    pub total: u64,
}

pub fn quote(
    items: &[ItemRequest],
    products: &[Product],
    delivery_fee: u64,
) -> Result<Quote, CheckoutError> {
    let items = price_items(items, products)?;
    let subtotal = subtotal(&items)?;
    let total = subtotal.checked_add(delivery_fee)
        .ok_or(CheckoutError::TotalTooLarge)?;
    Ok(Quote { items, subtotal, total })
}

/// Parses the item list a customer types in
///
/// Entries are separated by commas or newlines, each is a product id
/// optionally followed by a quantity: `prod_001 x2, prod_002 3, prod_004`.
pub fn parse_items(text: &str) -> Result<Vec<ItemRequest>, String> {
    let mut items = Vec::new();
    for entry in text.split(|c: char| c == ',' || c == '\n') {
        let mut words = entry.split_whitespace();
        let product_id = match words.next() {
            Some(id) => id.to_string(),
            None => continue,
        };
        let quantity = match words.next() {
            None => 1,
            Some(q) => {
                let q = q.trim_start_matches(|c: char| c == 'x' || c == 'X');
                q.parse::<u32>()
                    .map_err(|e| format!("bad quantity for {product_id}: {e}"))?
            }
        };
        if words.next().is_some() {
            return Err(format!("I don't understand \"{}\"", entry.trim()))
        }
        items.push(ItemRequest { product_id, quantity });
    }
    if items.is_empty() {
        return Err("no items".to_string())
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Offset;

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                product_id: "prod_001".to_string(),
                name: "Instant noodles".to_string(),
                price: 150,
                stock: 10,
                category: Some("Snacks".to_string()),
            },
            Product {
                product_id: "prod_002".to_string(),
                name: "Cold brew".to_string(),
                price: 399,
                stock: 1,
                category: None,
            },
        ]
    }

    fn mk_new_order(items: Vec<ItemRequest>) -> NewOrder {
        NewOrder {
            customer_id: UserId(5),
            items,
            delivery_address: "  Library, 2nd floor ".to_string(),
            delivery_instructions: Some("   ".to_string()),
        }
    }

    fn item(id: &str, quantity: u32) -> ItemRequest {
        ItemRequest { product_id: id.to_string(), quantity }
    }

    #[test]
    fn test_into_order_totals() {
        let new = mk_new_order(vec![item("prod_001", 2), item("prod_002", 1)]);
        let order = new.into_order(OrderId(3), &catalog(), DELIVERY_FEE, Offset::now())
            .unwrap();

        assert_eq!(OrderId(3), order.id);
        assert_eq!(UserId(5), order.customer_id);
        assert_eq!("pending", order.status);
        assert_eq!(699, order.subtotal);
        assert_eq!(200, order.delivery_fee);
        assert_eq!(899, order.total);
        assert_eq!("Cold brew", order.items[1].name);
        assert_eq!("Library, 2nd floor", order.delivery_address);
        assert_eq!(None, order.delivery_instructions);
    }

    #[test]
    fn test_validation_errors() {
        let new = mk_new_order(vec![]);
        assert_eq!(Err(CheckoutError::NoItems), new.validate());

        let new = mk_new_order(vec![item("prod_001", 0)]);
        assert_eq!(Err(CheckoutError::InvalidQuantity("prod_001".to_string())),
                   new.validate());

        let mut new = mk_new_order(vec![item("prod_001", 1)]);
        new.delivery_address = " \n".to_string();
        assert_eq!(Err(CheckoutError::EmptyAddress), new.validate());
    }

    #[test]
    fn test_catalog_errors() {
        let new = mk_new_order(vec![item("prod_999", 1)]);
        assert_eq!(Err(CheckoutError::ProductNotFound("prod_999".to_string())),
                   new.price(&catalog()));

        let new = mk_new_order(vec![item("prod_002", 2)]);
        assert_eq!(Err(CheckoutError::InsufficientStock {
                       name: "Cold brew".to_string(), available: 1 }),
                   new.price(&catalog()));
    }

    #[test]
    fn test_huge_totals_are_refused() {
        let mut products = catalog();
        products[0].price = u64::MAX / 2;
        let new = mk_new_order(vec![item("prod_001", 3)]);
        assert_eq!(Err(CheckoutError::TotalTooLarge), new.price(&products));

        // each item fits, the sum doesn't
        let new = mk_new_order(vec![item("prod_001", 1), item("prod_001", 2)]);
        let err = new.into_order(OrderId(1), &products, DELIVERY_FEE, Offset::now());
        assert_eq!(Err(CheckoutError::TotalTooLarge), err);

        // the fee tips it over
        products[0].price = u64::MAX;
        let err = quote(&[item("prod_001", 1)], &products, DELIVERY_FEE);
        assert_eq!(Err(CheckoutError::TotalTooLarge), err);
    }

    #[test]
    fn test_parse_items() {
        assert_eq!(Ok(vec![item("prod_001", 2), item("prod_002", 3), item("prod_004", 1)]),
                   parse_items("prod_001 x2, prod_002 3\nprod_004"));
        assert_eq!(Ok(vec![item("prod_001", 1)]), parse_items("prod_001,,"));
        assert!(parse_items("").is_err());
        assert!(parse_items("prod_001 lots").is_err());
        assert!(parse_items("prod_001 2 please").is_err());
    }
}
