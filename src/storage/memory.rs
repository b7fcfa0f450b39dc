//! In-memory store doubles for tests.
//!
//! Mirror the store contracts closely enough to exercise the writers and
//! the reset coordinator without external services, including the window
//! rollover and a switchable write-failure mode for outage scenarios.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::alert::AlertRecord;
use crate::interfaces::{AlertLog, Result, StateCache, StoreError, WINDOW_CAP};

/// One aggregation window as held by the memory log.
#[derive(Debug, Clone, Default)]
pub struct MemoryWindow {
    pub alerts: Vec<AlertRecord>,
    pub first: f64,
    pub last: f64,
    pub n_alerts: u32,
}

/// In-memory `AlertLog`.
#[derive(Default)]
pub struct MemoryAlertLog {
    scopes: Mutex<HashMap<String, Vec<MemoryWindow>>>,
    fail_writes: AtomicBool,
}

impl MemoryAlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail, simulating a store outage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// All windows recorded for a scope, oldest first.
    pub fn windows(&self, scope: &str) -> Vec<MemoryWindow> {
        self.scopes
            .lock()
            .unwrap()
            .get(scope)
            .cloned()
            .unwrap_or_default()
    }

    pub fn total_records(&self, scope: &str) -> usize {
        self.windows(scope).iter().map(|w| w.alerts.len()).sum()
    }
}

#[async_trait]
impl AlertLog for MemoryAlertLog {
    async fn append(&self, scope: &str, record: AlertRecord) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory log write failure".to_string()));
        }

        let mut scopes = self.scopes.lock().unwrap();
        let windows = scopes.entry(scope.to_string()).or_default();

        match windows.iter_mut().find(|w| w.n_alerts < WINDOW_CAP) {
            Some(window) => {
                window.first = window.first.min(record.timestamp);
                window.last = window.last.max(record.timestamp);
                window.n_alerts += 1;
                window.alerts.push(record);
            }
            None => windows.push(MemoryWindow {
                first: record.timestamp,
                last: record.timestamp,
                n_alerts: 1,
                alerts: vec![record],
            }),
        }

        Ok(())
    }
}

/// In-memory `StateCache`.
///
/// Expiry timestamps are recorded but not enforced; tests read them back
/// through the stored JSON value.
#[derive(Default)]
pub struct MemoryStateCache {
    hashes: Mutex<HashMap<String, HashMap<String, String>>>,
    fail_writes: AtomicBool,
}

impl MemoryStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn field_count(&self, hash: &str) -> usize {
        self.hashes
            .lock()
            .unwrap()
            .get(hash)
            .map(|h| h.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl StateCache for MemoryStateCache {
    async fn set_field(
        &self,
        hash: &str,
        field: &str,
        value: &str,
        _expires_at: Option<f64>,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory cache write failure".to_string()));
        }

        self.hashes
            .lock()
            .unwrap()
            .entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn get_field(&self, hash: &str, field: &str) -> Result<Option<String>> {
        Ok(self
            .hashes
            .lock()
            .unwrap()
            .get(hash)
            .and_then(|h| h.get(field))
            .cloned())
    }

    async fn fields(&self, hash: &str) -> Result<Vec<String>> {
        Ok(self
            .hashes
            .lock()
            .unwrap()
            .get(hash)
            .map(|h| h.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_field(&self, hash: &str, field: &str) -> Result<()> {
        if let Some(fields) = self.hashes.lock().unwrap().get_mut(hash) {
            fields.remove(field);
        }
        Ok(())
    }

    async fn scope_hashes(&self) -> Result<Vec<String>> {
        Ok(self.hashes.lock().unwrap().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Severity;

    fn record(ts: f64) -> AlertRecord {
        AlertRecord {
            origin: "o1".to_string(),
            alert_name: "CPU Usage".to_string(),
            severity: Severity::Warning,
            message: "cpu at 91%".to_string(),
            metric: "system_cpu_usage".to_string(),
            timestamp: ts,
        }
    }

    #[tokio::test]
    async fn test_memory_log_rolls_over_at_cap() {
        let log = MemoryAlertLog::new();
        for i in 0..(WINDOW_CAP + 1) {
            log.append("c1", record(i as f64)).await.unwrap();
        }

        let windows = log.windows("c1");
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].n_alerts, WINDOW_CAP);
        assert_eq!(windows[1].n_alerts, 1);
    }

    #[tokio::test]
    async fn test_memory_log_failure_mode() {
        let log = MemoryAlertLog::new();
        log.set_fail_writes(true);
        assert!(log.append("c1", record(1.0)).await.is_err());
        log.set_fail_writes(false);
        assert!(log.append("c1", record(1.0)).await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryStateCache::new();
        cache
            .set_field("hash_parent_c1", "alert_system3_o1", "{}", None)
            .await
            .unwrap();

        assert_eq!(
            cache
                .get_field("hash_parent_c1", "alert_system3_o1")
                .await
                .unwrap(),
            Some("{}".to_string())
        );
        assert_eq!(cache.scope_hashes().await.unwrap(), vec!["hash_parent_c1"]);

        cache
            .delete_field("hash_parent_c1", "alert_system3_o1")
            .await
            .unwrap();
        assert_eq!(cache.field_count("hash_parent_c1"), 0);
    }
}
