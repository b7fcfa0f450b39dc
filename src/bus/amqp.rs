//! AMQP (RabbitMQ) broker adapter.
//!
//! Declares the store/health-check topology, publishes with publisher
//! confirms, and runs the single-in-flight consume loop.

use std::sync::Arc;

use async_trait::async_trait;
use deadpool_lapin::{Manager, Pool, PoolError};
use futures::StreamExt;
use lapin::{
    message::Delivery,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
        ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
    },
    publisher_confirm::Confirmation,
    types::FieldTable,
    BasicProperties, Channel, ExchangeKind,
};
use tracing::{error, info};

use super::{
    AlertPublisher, BusError, InboundDelivery, Result, ALERT_ROUTING_KEY, ALERT_STORE_QUEUE,
    HEALTH_CHECK_EXCHANGE, STORE_EXCHANGE,
};
use crate::services::AlertDispatcher;

/// Configuration for AMQP connection.
#[derive(Clone, Debug)]
pub struct AmqpConfig {
    /// AMQP connection URL (e.g., amqp://localhost:5672).
    pub url: String,
}

/// AMQP broker adapter using RabbitMQ.
pub struct AmqpAlertBus {
    pool: Pool,
}

impl AmqpAlertBus {
    /// Connect and declare the exchange/queue topology.
    pub async fn new(config: AmqpConfig) -> Result<Self> {
        let manager = Manager::new(config.url.clone(), Default::default());
        let pool = Pool::builder(manager)
            .max_size(4)
            .build()
            .map_err(|e| BusError::Connection(format!("Failed to create pool: {}", e)))?;

        let bus = Self { pool };
        bus.declare_topology().await?;

        info!(url = %config.url, "Connected to AMQP");

        Ok(bus)
    }

    /// Declare the durable store exchange, the alert input queue bound under
    /// the alert routing key, and the health-check exchange for heartbeats.
    async fn declare_topology(&self) -> Result<()> {
        let channel = self.get_channel().await?;

        let durable_topic = ExchangeDeclareOptions {
            durable: true,
            ..Default::default()
        };

        channel
            .exchange_declare(
                STORE_EXCHANGE,
                ExchangeKind::Topic,
                durable_topic,
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Connection(format!("Failed to declare store exchange: {}", e)))?;

        channel
            .exchange_declare(
                HEALTH_CHECK_EXCHANGE,
                ExchangeKind::Topic,
                durable_topic,
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                BusError::Connection(format!("Failed to declare health check exchange: {}", e))
            })?;

        channel
            .queue_declare(
                ALERT_STORE_QUEUE,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Connection(format!("Failed to declare queue: {}", e)))?;

        channel
            .queue_bind(
                ALERT_STORE_QUEUE,
                STORE_EXCHANGE,
                ALERT_ROUTING_KEY,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Connection(format!("Failed to bind queue: {}", e)))?;

        info!(
            queue = ALERT_STORE_QUEUE,
            routing_key = ALERT_ROUTING_KEY,
            "Bound alert queue to store exchange"
        );

        Ok(())
    }

    /// Get a channel from the pool.
    async fn get_channel(&self) -> Result<Channel> {
        let conn = self.pool.get().await.map_err(|e: PoolError| {
            BusError::Connection(format!("Failed to get connection from pool: {}", e))
        })?;

        conn.create_channel()
            .await
            .map_err(|e| BusError::Connection(format!("Failed to create channel: {}", e)))
    }

    /// Consume the alert queue until the connection dies or a fatal
    /// dispatch error surfaces.
    ///
    /// Prefetch is 1 and each delivery is fully handled before the next is
    /// taken; there is no in-flight concurrency within one instance. Errors
    /// returned here terminate the process; reconnection is the
    /// supervisor's job.
    pub async fn run(&self, dispatcher: Arc<AlertDispatcher>) -> Result<()> {
        let channel = self.get_channel().await?;

        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(|e| BusError::Consume(format!("Failed to set prefetch: {}", e)))?;

        let mut consumer = channel
            .basic_consume(
                ALERT_STORE_QUEUE,
                "alert-store",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Consume(format!("Failed to start consumer: {}", e)))?;

        info!(queue = ALERT_STORE_QUEUE, "Consuming alerts");

        while let Some(delivery) = consumer.next().await {
            match delivery {
                Ok(delivery) => {
                    dispatcher.handle(&AmqpDelivery { inner: delivery }).await?;
                }
                Err(e) => {
                    error!(error = %e, "Consumer delivery error");
                    return Err(BusError::Consume(format!("Delivery error: {}", e)));
                }
            }
        }

        Err(BusError::Consume("Consumer stream ended".to_string()))
    }
}

#[async_trait]
impl AlertPublisher for AmqpAlertBus {
    async fn publish(&self, exchange: &str, routing_key: &str, payload: &[u8]) -> Result<()> {
        let channel = self.get_channel().await?;

        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| BusError::Connection(format!("Failed to enable confirms: {}", e)))?;

        let options = BasicPublishOptions {
            mandatory: true,
            ..Default::default()
        };
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(2); // persistent

        let confirm = channel
            .basic_publish(exchange, routing_key, options, payload, properties)
            .await
            .map_err(|e| BusError::Publish(format!("Failed to publish: {}", e)))?
            .await
            .map_err(|e| BusError::Publish(format!("Publish confirmation failed: {}", e)))?;

        match confirm {
            Confirmation::Ack(None) | Confirmation::NotRequested => Ok(()),
            // Returned unroutable or nacked by the broker.
            Confirmation::Ack(Some(_)) | Confirmation::Nack(_) => Err(BusError::NotDelivered(
                format!("{} -> {}", exchange, routing_key),
            )),
        }
    }
}

/// One lapin delivery exposed to the dispatcher.
struct AmqpDelivery {
    inner: Delivery,
}

#[async_trait]
impl InboundDelivery for AmqpDelivery {
    fn payload(&self) -> &[u8] {
        &self.inner.data
    }

    async fn ack(&self) -> Result<()> {
        self.inner
            .ack(BasicAckOptions::default())
            .await
            .map_err(|e| BusError::Ack(format!("Failed to ack delivery: {}", e)))
    }
}

/// Integration tests requiring a running RabbitMQ instance.
///
/// Run with: AMQP_URL=amqp://localhost:5672 cargo test amqp_integration -- --ignored
#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::bus::HEARTBEAT_ROUTING_KEY;

    fn amqp_url() -> String {
        std::env::var("AMQP_URL").unwrap_or_else(|_| "amqp://localhost:5672".to_string())
    }

    #[tokio::test]
    #[ignore = "Requires RabbitMQ"]
    async fn test_topology_declaration_is_idempotent() {
        let bus = AmqpAlertBus::new(AmqpConfig { url: amqp_url() })
            .await
            .expect("Failed to connect");
        // Redeclaring identical durable topology must not error.
        bus.declare_topology().await.expect("Redeclare failed");
    }

    #[tokio::test]
    #[ignore = "Requires RabbitMQ"]
    async fn test_heartbeat_publish_confirmed() {
        let bus = AmqpAlertBus::new(AmqpConfig { url: amqp_url() })
            .await
            .expect("Failed to connect");

        bus.publish(
            HEALTH_CHECK_EXCHANGE,
            HEARTBEAT_ROUTING_KEY,
            br#"{"component_name":"alert-store","is_alive":true,"timestamp":0.0}"#,
        )
        .await
        .expect("Publish should be confirmed");
    }
}
