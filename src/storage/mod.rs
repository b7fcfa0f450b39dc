//! Store adapter implementations.

pub mod memory;
pub mod mongodb;
pub mod redis;

pub use memory::{MemoryAlertLog, MemoryStateCache};
pub use mongodb::MongoAlertLog;
pub use redis::RedisStateCache;
