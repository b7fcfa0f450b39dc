//! Durable alert history interface.

use async_trait::async_trait;

use super::Result;
use crate::alert::AlertRecord;

/// Maximum records per aggregation document; a full window rolls over to a
/// fresh document for the same scope.
pub const WINDOW_CAP: u32 = 1000;

/// Interface for append-with-aggregation alert persistence.
///
/// Implementations:
/// - `MongoAlertLog`: MongoDB storage
/// - `MemoryAlertLog`: in-memory test double
#[async_trait]
pub trait AlertLog: Send + Sync {
    /// Append one record to the open aggregation document for `scope`.
    ///
    /// Against the document with fewer than `WINDOW_CAP` records: push the
    /// record, fold the timestamp into the running first/last bounds, and
    /// increment the count. If no such document exists (none yet, or the
    /// current one is full) a fresh document is created with the record as
    /// sole entry. The update must be atomic server-side; multiple consumer
    /// instances may append to the same scope concurrently.
    async fn append(&self, scope: &str, record: AlertRecord) -> Result<()>;
}
