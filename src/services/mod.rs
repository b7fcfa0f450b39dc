//! Core message-processing services.

pub mod dispatcher;
pub mod heartbeat;
pub mod history;
pub mod live_state;
pub mod reset;

pub use dispatcher::AlertDispatcher;
pub use heartbeat::HeartbeatEmitter;
pub use history::HistoryWriter;
pub use live_state::LiveStateWriter;
pub use reset::ResetCoordinator;

use crate::interfaces::StoreError;
use crate::metrics::KeyError;

/// Locally-recoverable processing failures.
///
/// Every variant is logged and swallowed by the dispatcher: the message is
/// still acknowledged and the alert is dropped, per the at-least-once
/// delivery contract (no processing redelivery).
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("malformed alert payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("alert {code} for metric {metric} has no parent scope")]
    MissingScope { code: String, metric: String },

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
