//! Mock broker implementations for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AlertPublisher, BusError, InboundDelivery, Result};

/// One message captured by the mock publisher.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
}

/// Failure mode for the next mock publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    None,
    NotDelivered,
    Connection,
}

/// Mock publisher capturing heartbeats, with switchable failure modes.
pub struct MockAlertBus {
    published: Mutex<Vec<PublishedMessage>>,
    failure: Mutex<FailureMode>,
}

impl Default for MockAlertBus {
    fn default() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failure: Mutex::new(FailureMode::None),
        }
    }
}

impl MockAlertBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent publishes fail as "not delivered" (non-fatal class).
    pub fn fail_not_delivered(&self) {
        *self.failure.lock().unwrap() = FailureMode::NotDelivered;
    }

    /// Make subsequent publishes fail with a connection error (fatal class).
    pub fn fail_connection(&self) {
        *self.failure.lock().unwrap() = FailureMode::Connection;
    }

    pub fn published_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn take_published(&self) -> Vec<PublishedMessage> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

#[async_trait]
impl AlertPublisher for MockAlertBus {
    async fn publish(&self, exchange: &str, routing_key: &str, payload: &[u8]) -> Result<()> {
        match *self.failure.lock().unwrap() {
            FailureMode::NotDelivered => {
                return Err(BusError::NotDelivered(format!(
                    "{} -> {}",
                    exchange, routing_key
                )))
            }
            FailureMode::Connection => {
                return Err(BusError::Connection("Mock connection failure".to_string()))
            }
            FailureMode::None => {}
        }

        self.published.lock().unwrap().push(PublishedMessage {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}

/// In-memory delivery that records whether and how often it was acked.
pub struct RecordedDelivery {
    body: Vec<u8>,
    acks: AtomicUsize,
    fail_ack: AtomicBool,
}

impl RecordedDelivery {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            acks: AtomicUsize::new(0),
            fail_ack: AtomicBool::new(false),
        }
    }

    pub fn fail_ack(&self) {
        self.fail_ack.store(true, Ordering::SeqCst);
    }

    pub fn ack_count(&self) -> usize {
        self.acks.load(Ordering::SeqCst)
    }

    pub fn acked(&self) -> bool {
        self.ack_count() > 0
    }
}

#[async_trait]
impl InboundDelivery for RecordedDelivery {
    fn payload(&self) -> &[u8] {
        &self.body
    }

    async fn ack(&self) -> Result<()> {
        if self.fail_ack.load(Ordering::SeqCst) {
            return Err(BusError::Ack("Mock ack failure".to_string()));
        }
        self.acks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_bus_captures_publishes() {
        let bus = MockAlertBus::new();
        bus.publish("health_check", "heartbeat.worker", b"{}")
            .await
            .unwrap();

        assert_eq!(bus.published_count(), 1);
        let published = bus.take_published();
        assert_eq!(published[0].routing_key, "heartbeat.worker");
    }

    #[tokio::test]
    async fn test_mock_bus_failure_modes() {
        let bus = MockAlertBus::new();

        bus.fail_not_delivered();
        let err = bus.publish("x", "y", b"{}").await.unwrap_err();
        assert!(matches!(err, BusError::NotDelivered(_)));

        bus.fail_connection();
        let err = bus.publish("x", "y", b"{}").await.unwrap_err();
        assert!(matches!(err, BusError::Connection(_)));
    }

    #[tokio::test]
    async fn test_recorded_delivery_tracks_acks() {
        let delivery = RecordedDelivery::new(b"{}".to_vec());
        assert!(!delivery.acked());
        delivery.ack().await.unwrap();
        delivery.ack().await.unwrap();
        assert_eq!(delivery.ack_count(), 2);
    }
}
