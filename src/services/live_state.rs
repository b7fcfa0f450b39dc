//! Live-state cache projection.

use std::sync::Arc;

use tracing::debug;

use super::ProcessError;
use crate::alert::{AlertEvent, CacheValue};
use crate::interfaces::StateCache;
use crate::metrics::{cache_field, metric_spec, scope_hash, EXPIRY_SECS};
use crate::utils::retry_write;

/// Projects normal-severity alerts into the current-state cache.
pub struct LiveStateWriter {
    cache: Arc<dyn StateCache>,
}

impl LiveStateWriter {
    pub fn new(cache: Arc<dyn StateCache>) -> Self {
        Self { cache }
    }

    /// Overwrite the cache entry for this alert's metric in its chain scope.
    ///
    /// The field is built by the metric's key builder from the event's state
    /// args; an unknown metric or a wrong arg count is a reportable error,
    /// never a silent no-op. Metrics in the expiring set get an absolute
    /// expiry of `timestamp + EXPIRY_SECS` which the store enforces; other
    /// entries persist until overwritten or reset.
    pub async fn project(&self, event: &AlertEvent) -> Result<(), ProcessError> {
        if event.severity.is_internal() {
            return Ok(());
        }

        let parent = event.parent_id.as_deref().ok_or_else(|| ProcessError::MissingScope {
            code: event.alert_code.code.clone(),
            metric: event.metric.clone(),
        })?;

        let field = cache_field(&event.metric, &event.metric_state_args)?;
        // cache_field validated the metric name above.
        let expires = metric_spec(&event.metric).is_some_and(|m| m.expires);
        let expiry = expires.then(|| event.timestamp + EXPIRY_SECS);

        let value = CacheValue {
            severity: event.severity,
            message: event.message.clone(),
            metric: event.metric.clone(),
            timestamp: event.timestamp,
            expiry,
        };
        let serialized = serde_json::to_string(&value).map_err(ProcessError::Malformed)?;

        let hash = scope_hash(parent);
        debug!(hash = %hash, field = %field, "Saving alert in live-state cache");

        retry_write("Live-state write", || {
            self.cache.set_field(&hash, &field, &serialized, expiry)
        })
        .await?;

        Ok(())
    }
}
