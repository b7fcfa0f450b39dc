//! Durable history writing.

use std::sync::Arc;

use super::ProcessError;
use crate::alert::{AlertEvent, AlertRecord};
use crate::interfaces::AlertLog;
use crate::utils::retry_write;

/// Appends normal-severity alerts into the capped aggregation history.
pub struct HistoryWriter {
    log: Arc<dyn AlertLog>,
}

impl HistoryWriter {
    pub fn new(log: Arc<dyn AlertLog>) -> Self {
        Self { log }
    }

    /// Record one alert in the history for its chain scope.
    ///
    /// Internal alerts are operational signals, not user-facing history,
    /// and are skipped. The store write is retried on a short bounded
    /// backoff before the error surfaces; the caller drops the alert then.
    pub async fn record(&self, event: &AlertEvent) -> Result<(), ProcessError> {
        if event.severity.is_internal() {
            return Ok(());
        }

        let scope = event.parent_id.as_deref().ok_or_else(|| ProcessError::MissingScope {
            code: event.alert_code.code.clone(),
            metric: event.metric.clone(),
        })?;

        let record = AlertRecord::from_event(event);

        retry_write("History append", || self.log.append(scope, record.clone())).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertCode, Severity};
    use crate::storage::MemoryAlertLog;

    fn event(severity: Severity, ts: f64) -> AlertEvent {
        AlertEvent {
            parent_id: Some("c1".to_string()),
            origin_id: "o1".to_string(),
            alert_code: AlertCode {
                name: "CPU Usage".to_string(),
                code: "system_alert_3".to_string(),
            },
            severity,
            metric: "system_cpu_usage".to_string(),
            message: "cpu at 91%".to_string(),
            timestamp: ts,
            metric_state_args: vec!["o1".to_string()],
        }
    }

    #[tokio::test]
    async fn test_record_appends_one_entry() {
        let log = Arc::new(MemoryAlertLog::new());
        let writer = HistoryWriter::new(log.clone());

        writer.record(&event(Severity::Warning, 1000.0)).await.unwrap();

        let windows = log.windows("c1");
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].n_alerts, 1);
        assert_eq!(windows[0].first, 1000.0);
        assert_eq!(windows[0].last, 1000.0);
        assert_eq!(windows[0].alerts[0].alert_name, "CPU Usage");
    }

    #[tokio::test]
    async fn test_timestamp_bounds_independent_of_arrival_order() {
        let log = Arc::new(MemoryAlertLog::new());
        let writer = HistoryWriter::new(log.clone());

        writer.record(&event(Severity::Warning, 2000.0)).await.unwrap();
        writer.record(&event(Severity::Warning, 1000.0)).await.unwrap();

        let windows = log.windows("c1");
        assert_eq!(windows[0].first, 1000.0);
        assert_eq!(windows[0].last, 2000.0);
    }

    #[tokio::test]
    async fn test_internal_alerts_are_skipped() {
        let log = Arc::new(MemoryAlertLog::new());
        let writer = HistoryWriter::new(log.clone());

        writer.record(&event(Severity::Internal, 1000.0)).await.unwrap();

        assert!(log.windows("c1").is_empty());
    }

    #[tokio::test]
    async fn test_missing_scope_is_malformed() {
        let log = Arc::new(MemoryAlertLog::new());
        let writer = HistoryWriter::new(log);

        let mut bad = event(Severity::Warning, 1000.0);
        bad.parent_id = None;

        let err = writer.record(&bad).await.unwrap_err();
        assert!(matches!(err, ProcessError::MissingScope { .. }));
    }

    #[tokio::test]
    async fn test_store_outage_surfaces_after_retries() {
        let log = Arc::new(MemoryAlertLog::new());
        log.set_fail_writes(true);
        let writer = HistoryWriter::new(log);

        let err = writer.record(&event(Severity::Warning, 1000.0)).await.unwrap_err();
        assert!(matches!(err, ProcessError::Store(_)));
    }
}
