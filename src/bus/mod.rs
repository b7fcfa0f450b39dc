//! Message broker contract and topology.
//!
//! This module contains:
//! - `AlertPublisher` trait: confirmed topic publish (heartbeats)
//! - `InboundDelivery` trait: one queued message with its ack
//! - Exchange/queue/routing-key constants
//! - Implementations: AMQP (RabbitMQ), Mock

use async_trait::async_trait;

pub mod amqp;
pub mod mock;

pub use amqp::{AmqpAlertBus, AmqpConfig};
pub use mock::{MockAlertBus, RecordedDelivery};

/// Exchange alerting components publish store-bound events to.
pub const STORE_EXCHANGE: &str = "store";
/// Exchange liveness heartbeats are published to.
pub const HEALTH_CHECK_EXCHANGE: &str = "health_check";
/// Queue this service consumes alerts from.
pub const ALERT_STORE_QUEUE: &str = "alerts_store_queue";
/// Routing key binding the alert queue to the store exchange.
pub const ALERT_ROUTING_KEY: &str = "alert";
/// Routing key for worker heartbeats on the health-check exchange.
pub const HEARTBEAT_ROUTING_KEY: &str = "heartbeat.worker";

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Errors that can occur during bus operations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    /// The broker took the publish but could not place the message
    /// (nacked or returned unroutable). Non-fatal for heartbeats.
    #[error("Message was not delivered: {0}")]
    NotDelivered(String),

    #[error("Consume failed: {0}")]
    Consume(String),

    #[error("Ack failed: {0}")]
    Ack(String),
}

/// Confirmed publish to a topic exchange.
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish(&self, exchange: &str, routing_key: &str, payload: &[u8]) -> Result<()>;
}

/// One delivery taken off the queue.
///
/// The dispatcher acks every delivery exactly once, whether or not
/// processing succeeded.
#[async_trait]
pub trait InboundDelivery: Send + Sync {
    fn payload(&self) -> &[u8];

    async fn ack(&self) -> Result<()>;
}
