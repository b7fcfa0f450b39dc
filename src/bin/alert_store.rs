//! alert-store: alert persistence worker
//!
//! Consumes alert events from the store exchange, records non-internal
//! alerts into the MongoDB aggregation history and the Redis live-state
//! cache, sweeps the cache on component resets, and heartbeats after each
//! processed message. A fatal broker error exits the process; the
//! supervisor restarts it with fresh connections.

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alert_store::bus::{AmqpAlertBus, AmqpConfig};
use alert_store::config::{Config, LOG_ENV_VAR};
use alert_store::metrics::validate_tables;
use alert_store::services::{
    AlertDispatcher, HeartbeatEmitter, HistoryWriter, LiveStateWriter, ResetCoordinator,
};
use alert_store::storage::{MongoAlertLog, RedisStateCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(component = %config.component_name, "Starting alert-store");

    // The metric and reset tables are static; fail fast on an inconsistent
    // build instead of at the first affected alert.
    validate_tables()?;

    let mongo = mongodb::Client::with_uri_str(&config.storage.uri).await?;
    let log = Arc::new(MongoAlertLog::new(&mongo, &config.storage.database));
    info!(database = %config.storage.database, "Connected to MongoDB");

    let cache = Arc::new(RedisStateCache::new(&config.cache.url).await?);
    info!("Connected to Redis");

    let bus = Arc::new(
        AmqpAlertBus::new(AmqpConfig {
            url: config.messaging.url.clone(),
        })
        .await?,
    );

    let dispatcher = Arc::new(AlertDispatcher::new(
        HistoryWriter::new(log),
        LiveStateWriter::new(cache.clone()),
        ResetCoordinator::new(cache),
        HeartbeatEmitter::new(bus.clone(), config.component_name.clone()),
    ));

    let result = bus.run(dispatcher).await;
    if let Err(ref e) = result {
        error!(error = %e, "Consume loop terminated");
    }
    result.map_err(Into::into)
}
