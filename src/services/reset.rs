//! Cache invalidation on component restarts.
//!
//! An internal alert carrying the component-reset code from a registered
//! alerter sweeps that alerter's key namespace out of the live-state cache,
//! either for one chain scope or for all of them. History is never touched.

use std::sync::Arc;

use tracing::{debug, info};

use crate::alert::AlertEvent;
use crate::alerters::{AlerterType, COMPONENT_RESET_CODE};
use crate::interfaces::{Result, StateCache};
use crate::metrics::scope_hash;

/// Sweeps one alerter's namespace out of the cache when it restarts.
pub struct ResetCoordinator {
    cache: Arc<dyn StateCache>,
}

impl ResetCoordinator {
    pub fn new(cache: Arc<dyn StateCache>) -> Self {
        Self { cache }
    }

    /// Apply an internal event. Anything that is not a component reset from
    /// a registered alerter is a no-op for this component.
    ///
    /// The sweep is a best-effort multi-step scan, not a transaction: keys
    /// written concurrently between enumeration and deletion may survive.
    /// Re-running against a clean namespace deletes nothing and is not an
    /// error.
    pub async fn apply(&self, event: &AlertEvent) -> Result<()> {
        if event.alert_code.code != COMPONENT_RESET_CODE {
            debug!(code = %event.alert_code.code, "Internal alert is not a component reset");
            return Ok(());
        }
        let Some(alerter) = AlerterType::from_origin(&event.origin_id) else {
            debug!(origin = %event.origin_id, "Component reset from a non-alerter, ignoring");
            return Ok(());
        };

        let spec = alerter.reset_spec();

        // Github resets sweep every scope even when the event names one.
        let scopes = match &event.parent_id {
            Some(parent) if alerter != AlerterType::Github => {
                info!(metrics = spec.label, chain = %parent, "Resetting metrics for one chain");
                vec![scope_hash(parent)]
            }
            _ => {
                info!(metrics = spec.label, "Resetting metrics for all chains");
                self.cache.scope_hashes().await?
            }
        };

        let mut deleted = 0usize;
        for scope in &scopes {
            for field in self.cache.fields(scope).await? {
                if field.contains(spec.namespace)
                    && !spec.ignore.iter().any(|ignored| field.contains(ignored))
                {
                    self.cache.delete_field(scope, &field).await?;
                    deleted += 1;
                }
            }
        }

        debug!(metrics = spec.label, deleted, "Reset sweep finished");
        Ok(())
    }
}
