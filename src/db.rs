use crate::new_order::CheckoutError;
use crate::order::{OrderId, UpdateError};

pub mod mem;
#[cfg(feature = "redis_db")]
pub mod redis_db;

// Same async API in both, `mem_db` wins when both features are on
#[cfg(any(feature = "mem_db", not(feature = "redis_db")))]
pub use mem::Db;
#[cfg(all(feature = "redis_db", not(feature = "mem_db")))]
pub use redis_db::Db;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Could not find the specified order
    #[error("Could not find order {0}. It might have been removed")]
    OrderNotFound(OrderId),

    /// The workflow refused the status change
    #[error("{0}")]
    Rejected(#[from] UpdateError),

    #[error("{0}")]
    Checkout(#[from] CheckoutError),

    /// Some other technical error
    #[error("Storage error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Debug>(e: E) -> StoreError {
        StoreError::Backend(format!("{e:?}"))
    }
}
