use serde::{Serialize, Deserialize};

/// Catalog entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    /// Cents
    pub price: u64,
    /// How many are on the shelf, checked at checkout but never reserved
    pub stock: u32,
    #[serde(default)]
    pub category: Option<String>,
}

pub fn find<'a>(products: &'a [Product], product_id: &str) -> Option<&'a Product> {
    products.iter().find(|p| p.product_id == product_id)
}
