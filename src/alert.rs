//! Wire and persisted data shapes.
//!
//! `AlertEvent` is the inbound queue payload; `AlertRecord` is the entry shape
//! inside an aggregation document; `CacheValue` is the JSON stored per cache
//! field; `Heartbeat` is the outbound liveness payload.

use serde::{Deserialize, Serialize};

/// Alert severity tiers.
///
/// `Internal` marks operational signals (component restarts) that are never
/// stored in history or projected into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
    Error,
    Internal,
}

impl Severity {
    pub fn is_internal(self) -> bool {
        matches!(self, Severity::Internal)
    }
}

/// Configured alert identity: human name plus stable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCode {
    pub name: String,
    pub code: String,
}

/// One alert event as delivered on the store exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Chain scope the alert belongs to; `None` on reset events means all
    /// scopes.
    pub parent_id: Option<String>,
    /// Producing component instance, e.g. a node id or an alerter name for
    /// internal events.
    pub origin_id: String,
    pub alert_code: AlertCode,
    pub severity: Severity,
    pub metric: String,
    pub message: String,
    /// Unix seconds.
    pub timestamp: f64,
    /// Ordered state-identifying arguments for the metric's cache key.
    #[serde(default)]
    pub metric_state_args: Vec<String>,
}

/// Entry pushed into an aggregation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub origin: String,
    pub alert_name: String,
    pub severity: Severity,
    pub message: String,
    pub metric: String,
    pub timestamp: f64,
}

impl AlertRecord {
    pub fn from_event(event: &AlertEvent) -> Self {
        Self {
            origin: event.origin_id.clone(),
            alert_name: event.alert_code.name.clone(),
            severity: event.severity,
            message: event.message.clone(),
            metric: event.metric.clone(),
            timestamp: event.timestamp,
        }
    }
}

/// Value stored under one cache field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheValue {
    pub severity: Severity,
    pub message: String,
    pub metric: String,
    pub timestamp: f64,
    /// Absolute unix time after which the store evicts the field, or `None`
    /// for entries that persist until overwritten or reset.
    pub expiry: Option<f64>,
}

/// Liveness payload published after each successfully processed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    pub component_name: String,
    pub is_alive: bool,
    pub timestamp: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_wire_format() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        let sev: Severity = serde_json::from_str("\"internal\"").unwrap();
        assert!(sev.is_internal());
    }

    #[test]
    fn test_alert_event_decodes_without_state_args() {
        let raw = r#"{
            "parent_id": "chain_1",
            "origin_id": "node_1",
            "alert_code": {"name": "System Is Down", "code": "system_alert_1"},
            "severity": "critical",
            "metric": "system_is_down",
            "message": "node_1 is down",
            "timestamp": 1000.5
        }"#;
        let event: AlertEvent = serde_json::from_str(raw).unwrap();
        assert!(event.metric_state_args.is_empty());
        assert_eq!(event.parent_id.as_deref(), Some("chain_1"));
    }

    #[test]
    fn test_alert_event_rejects_missing_severity() {
        let raw = r#"{
            "parent_id": "chain_1",
            "origin_id": "node_1",
            "alert_code": {"name": "x", "code": "y"},
            "metric": "system_is_down",
            "message": "m",
            "timestamp": 1000
        }"#;
        assert!(serde_json::from_str::<AlertEvent>(raw).is_err());
    }
}
