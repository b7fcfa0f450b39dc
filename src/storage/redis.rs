//! Redis implementation of the live-state cache.
//!
//! One hash per chain scope. Field expiry uses HEXPIRE so "currently
//! occurring" entries vanish on their own; everything else stays until
//! overwritten or swept by a reset.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::interfaces::{Result, StateCache};
use crate::metrics::SCOPE_HASH_PREFIX;
use crate::utils::unix_now;

/// Redis implementation of `StateCache`.
pub struct RedisStateCache {
    conn: ConnectionManager,
}

impl RedisStateCache {
    /// Connect with automatic reconnection handling.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl StateCache for RedisStateCache {
    async fn set_field(
        &self,
        hash: &str,
        field: &str,
        value: &str,
        expires_at: Option<f64>,
    ) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hset::<_, _, _, ()>(hash, field, value).await?;

        if let Some(at) = expires_at {
            // HEXPIRE takes a relative TTL; clamp so an already-elapsed
            // expiry still evicts promptly instead of erroring.
            let ttl = (at - unix_now()).ceil().max(1.0) as i64;
            let _: Vec<i64> = redis::cmd("HEXPIRE")
                .arg(hash)
                .arg(ttl)
                .arg("FIELDS")
                .arg(1)
                .arg(field)
                .query_async(&mut conn)
                .await?;
        }

        Ok(())
    }

    async fn get_field(&self, hash: &str, field: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.hget(hash, field).await?)
    }

    async fn fields(&self, hash: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.hkeys(hash).await?)
    }

    async fn delete_field(&self, hash: &str, field: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(hash, field).await?;
        Ok(())
    }

    async fn scope_hashes(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut hashes = Vec::new();
        // The cache offers no pattern delete; enumerate scope hashes with a
        // cursor scan and let the coordinator filter fields.
        let mut iter: redis::AsyncIter<String> =
            conn.scan_match(format!("{SCOPE_HASH_PREFIX}*")).await?;
        while let Some(key) = iter.next_item().await {
            hashes.push(key);
        }
        Ok(hashes)
    }
}

/// Integration tests requiring a running Redis instance.
///
/// Run with: REDIS_URL=redis://localhost:6379 cargo test redis_integration -- --ignored
#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::metrics::scope_hash;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_field_round_trip_and_sweep_enumeration() {
        let cache = RedisStateCache::new(&redis_url()).await.unwrap();
        let hash = scope_hash(&format!("it_{}", std::process::id()));

        cache
            .set_field(&hash, "alert_system3_o1", "{}", None)
            .await
            .unwrap();

        assert_eq!(
            cache.get_field(&hash, "alert_system3_o1").await.unwrap(),
            Some("{}".to_string())
        );
        assert!(cache.scope_hashes().await.unwrap().contains(&hash));

        cache.delete_field(&hash, "alert_system3_o1").await.unwrap();
        assert!(cache.fields(&hash).await.unwrap().is_empty());
    }
}
