//! Capability contracts for the durable and cache stores.
//!
//! Both store connections are constructor-supplied dependencies so the
//! services can run against in-memory doubles in tests.

pub mod alert_log;
pub mod state_cache;

pub use alert_log::{AlertLog, WINDOW_CAP};
pub use state_cache::StateCache;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BSON encode error: {0}")]
    Bson(#[from] mongodb::bson::ser::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
