pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod identity;
pub mod markup;
pub mod new_order;
pub mod order;
pub mod product;
pub mod tracker;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use db::Db;
pub use identity::Directory;
pub use order::Order;

pub type Offset = chrono::offset::Utc;
pub type DateTime = chrono::DateTime<Offset>;
