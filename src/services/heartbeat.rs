//! Liveness heartbeat publishing.
//!
//! A heartbeat goes out only after a message was fully processed, so
//! operators detect trouble through heartbeat absence rather than explicit
//! error reporting from this component.

use std::sync::Arc;

use crate::alert::Heartbeat;
use crate::bus::{AlertPublisher, BusError, Result, HEALTH_CHECK_EXCHANGE, HEARTBEAT_ROUTING_KEY};
use crate::utils::unix_now;

pub struct HeartbeatEmitter {
    bus: Arc<dyn AlertPublisher>,
    component_name: String,
}

impl HeartbeatEmitter {
    pub fn new(bus: Arc<dyn AlertPublisher>, component_name: impl Into<String>) -> Self {
        Self {
            bus,
            component_name: component_name.into(),
        }
    }

    /// Publish one liveness heartbeat to the health-check exchange.
    pub async fn emit(&self) -> Result<()> {
        let heartbeat = Heartbeat {
            component_name: self.component_name.clone(),
            is_alive: true,
            timestamp: unix_now(),
        };
        let payload = serde_json::to_vec(&heartbeat)
            .map_err(|e| BusError::Publish(format!("Failed to encode heartbeat: {}", e)))?;

        self.bus
            .publish(HEALTH_CHECK_EXCHANGE, HEARTBEAT_ROUTING_KEY, &payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MockAlertBus;

    #[tokio::test]
    async fn test_emit_publishes_liveness_payload() {
        let bus = Arc::new(MockAlertBus::new());
        let emitter = HeartbeatEmitter::new(bus.clone(), "alert-store");

        emitter.emit().await.unwrap();

        let published = bus.take_published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].exchange, HEALTH_CHECK_EXCHANGE);
        assert_eq!(published[0].routing_key, HEARTBEAT_ROUTING_KEY);

        let heartbeat: Heartbeat = serde_json::from_slice(&published[0].payload).unwrap();
        assert_eq!(heartbeat.component_name, "alert-store");
        assert!(heartbeat.is_alive);
        assert!(heartbeat.timestamp > 0.0);
    }

    #[tokio::test]
    async fn test_emit_propagates_bus_errors() {
        let bus = Arc::new(MockAlertBus::new());
        bus.fail_not_delivered();
        let emitter = HeartbeatEmitter::new(bus, "alert-store");

        let err = emitter.emit().await.unwrap_err();
        assert!(matches!(err, BusError::NotDelivered(_)));
    }
}
