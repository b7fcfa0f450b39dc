//! Per-delivery sequencing.
//!
//! One message is fully handled before the next is fetched: decode, route to
//! the writers (or the reset coordinator for internal events), acknowledge
//! unconditionally, then heartbeat on success. Local failures drop the alert
//! but never the process; only an unexpected heartbeat error is fatal.

use tracing::{debug, error, warn};

use super::{
    HeartbeatEmitter, HistoryWriter, LiveStateWriter, ProcessError, ResetCoordinator,
};
use crate::alert::AlertEvent;
use crate::bus::{BusError, InboundDelivery, Result};

/// Top-level per-message handler wiring the writers together.
pub struct AlertDispatcher {
    history: HistoryWriter,
    live_state: LiveStateWriter,
    reset: ResetCoordinator,
    heartbeat: HeartbeatEmitter,
}

impl AlertDispatcher {
    pub fn new(
        history: HistoryWriter,
        live_state: LiveStateWriter,
        reset: ResetCoordinator,
        heartbeat: HeartbeatEmitter,
    ) -> Self {
        Self {
            history,
            live_state,
            reset,
            heartbeat,
        }
    }

    /// Handle one delivery end to end.
    ///
    /// The delivery is acknowledged exactly once, whether or not processing
    /// succeeded: the queue gives at-least-once delivery but no processing
    /// redelivery, and a failed write means a dropped alert. The heartbeat
    /// goes out only after clean processing and a successful ack; a
    /// "not delivered" heartbeat is swallowed, anything else aborts the
    /// consume loop.
    pub async fn handle(&self, delivery: &dyn InboundDelivery) -> Result<()> {
        let processed = match self.process(delivery.payload()).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to process alert, dropping");
                false
            }
        };

        let acked = match delivery.ack().await {
            Ok(()) => true,
            Err(e) => {
                // The channel is likely gone and the message will be
                // redelivered; skip the heartbeat rather than report a
                // message as handled that is still on the queue.
                error!(error = %e, "Failed to ack delivery");
                false
            }
        };

        if processed && acked {
            match self.heartbeat.emit().await {
                Ok(()) => debug!("Heartbeat sent"),
                Err(BusError::NotDelivered(detail)) => {
                    warn!(detail = %detail, "Heartbeat was not delivered");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Decode and route one payload: internal events go to the reset
    /// coordinator, everything else is written to history then projected
    /// into the live-state cache.
    async fn process(&self, payload: &[u8]) -> std::result::Result<(), ProcessError> {
        let event: AlertEvent = serde_json::from_slice(payload)?;
        debug!(
            metric = %event.metric,
            origin = %event.origin_id,
            severity = ?event.severity,
            "Processing alert"
        );

        if event.severity.is_internal() {
            self.reset.apply(&event).await?;
        } else {
            self.history.record(&event).await?;
            self.live_state.project(&event).await?;
        }

        Ok(())
    }
}
