//! alert-store - Monitoring alert persistence tier
//!
//! Consumes alert events from the store exchange and maintains two views of
//! them: a capped, append-only aggregation history in MongoDB and a live
//! current-state cache in Redis. Internal component-reset events trigger a
//! scoped sweep of the cache instead of being stored.

pub mod alert;
pub mod alerters;
pub mod bus;
pub mod config;
pub mod interfaces;
pub mod metrics;
pub mod services;
pub mod storage;
pub mod utils;
