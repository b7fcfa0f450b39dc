//! Live-state cache interface.
//!
//! Hash-per-scope key/value operations. The cache offers no pattern delete;
//! the reset sweep enumerates fields and deletes them one by one.

use async_trait::async_trait;

use super::Result;

/// Interface for the current-state cache.
///
/// Implementations:
/// - `RedisStateCache`: Redis hashes with per-field expiry
/// - `MemoryStateCache`: in-memory test double
#[async_trait]
pub trait StateCache: Send + Sync {
    /// Write `value` under `field` in the scope hash, overwriting any
    /// previous value. `expires_at` (unix seconds) asks the store to evict
    /// the field once that time passes; `None` persists until overwritten
    /// or deleted.
    async fn set_field(
        &self,
        hash: &str,
        field: &str,
        value: &str,
        expires_at: Option<f64>,
    ) -> Result<()>;

    /// Read one field, `None` if absent.
    async fn get_field(&self, hash: &str, field: &str) -> Result<Option<String>>;

    /// Enumerate the fields of one scope hash.
    async fn fields(&self, hash: &str) -> Result<Vec<String>>;

    /// Delete one field. Deleting an absent field is not an error.
    async fn delete_field(&self, hash: &str, field: &str) -> Result<()>;

    /// Enumerate every scope hash present in the cache.
    async fn scope_hashes(&self) -> Result<Vec<String>>;
}
