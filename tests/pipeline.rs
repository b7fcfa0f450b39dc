//! End-to-end pipeline scenarios over the in-memory stores and mock broker.

use std::sync::Arc;

use alert_store::alert::{AlertCode, AlertEvent, CacheValue, Severity};
use alert_store::alerters::COMPONENT_RESET_CODE;
use alert_store::bus::{MockAlertBus, RecordedDelivery};
use alert_store::interfaces::StateCache;
use alert_store::services::{
    AlertDispatcher, HeartbeatEmitter, HistoryWriter, LiveStateWriter, ResetCoordinator,
};
use alert_store::storage::{MemoryAlertLog, MemoryStateCache};

struct Pipeline {
    log: Arc<MemoryAlertLog>,
    cache: Arc<MemoryStateCache>,
    bus: Arc<MockAlertBus>,
    dispatcher: AlertDispatcher,
}

fn pipeline() -> Pipeline {
    let log = Arc::new(MemoryAlertLog::new());
    let cache = Arc::new(MemoryStateCache::new());
    let bus = Arc::new(MockAlertBus::new());
    let dispatcher = AlertDispatcher::new(
        HistoryWriter::new(log.clone()),
        LiveStateWriter::new(cache.clone()),
        ResetCoordinator::new(cache.clone()),
        HeartbeatEmitter::new(bus.clone(), "alert-store"),
    );
    Pipeline {
        log,
        cache,
        bus,
        dispatcher,
    }
}

fn cpu_alert(ts: f64) -> AlertEvent {
    AlertEvent {
        parent_id: Some("c1".to_string()),
        origin_id: "o1".to_string(),
        alert_code: AlertCode {
            name: "System CPU Usage Increased".to_string(),
            code: "system_alert_3".to_string(),
        },
        severity: Severity::Warning,
        metric: "system_cpu_usage".to_string(),
        message: "cpu at 91%".to_string(),
        timestamp: ts,
        metric_state_args: vec!["o1".to_string()],
    }
}

fn system_reset() -> AlertEvent {
    AlertEvent {
        parent_id: None,
        origin_id: "SystemAlerter".to_string(),
        alert_code: AlertCode {
            name: "Component Reset".to_string(),
            code: COMPONENT_RESET_CODE.to_string(),
        },
        severity: Severity::Internal,
        metric: "internal".to_string(),
        message: "SystemAlerter restarted".to_string(),
        timestamp: 5000.0,
        metric_state_args: vec![],
    }
}

async fn ingest(pipeline: &Pipeline, event: &AlertEvent) {
    let delivery = RecordedDelivery::new(serde_json::to_vec(event).unwrap());
    pipeline.dispatcher.handle(&delivery).await.unwrap();
    assert_eq!(delivery.ack_count(), 1);
}

#[tokio::test]
async fn test_normal_alert_writes_one_cache_field_and_one_record() {
    let p = pipeline();

    ingest(&p, &cpu_alert(1000.0)).await;

    let windows = p.log.windows("c1");
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].n_alerts, 1);
    assert_eq!(windows[0].first, 1000.0);
    assert_eq!(windows[0].last, 1000.0);

    assert_eq!(p.cache.field_count("hash_parent_c1"), 1);
    let raw = p
        .cache
        .get_field("hash_parent_c1", "alert_system3_o1")
        .await
        .unwrap()
        .expect("cache field");
    let value: CacheValue = serde_json::from_str(&raw).unwrap();
    assert_eq!(value.timestamp, 1000.0);
    assert_eq!(value.expiry, None);

    assert_eq!(p.bus.published_count(), 1);
}

#[tokio::test]
async fn test_reset_clears_cache_but_keeps_history() {
    let p = pipeline();

    ingest(&p, &cpu_alert(1000.0)).await;
    ingest(&p, &cpu_alert(2000.0)).await;
    ingest(&p, &system_reset()).await;

    // Cache field removed, both historical records retained.
    assert_eq!(p.cache.field_count("hash_parent_c1"), 0);
    assert_eq!(p.log.total_records("c1"), 2);
    let windows = p.log.windows("c1");
    assert_eq!(windows[0].first, 1000.0);
    assert_eq!(windows[0].last, 2000.0);

    // All three messages processed cleanly, so three heartbeats.
    assert_eq!(p.bus.published_count(), 3);
}

#[tokio::test]
async fn test_global_reset_twice_matches_running_it_once() {
    let p = pipeline();

    ingest(&p, &cpu_alert(1000.0)).await;
    ingest(&p, &system_reset()).await;
    let after_once = p.cache.field_count("hash_parent_c1");

    ingest(&p, &system_reset()).await;

    assert_eq!(p.cache.field_count("hash_parent_c1"), after_once);
    assert_eq!(after_once, 0);
}

#[tokio::test]
async fn test_out_of_order_timestamps_keep_correct_bounds() {
    let p = pipeline();

    ingest(&p, &cpu_alert(2000.0)).await;
    ingest(&p, &cpu_alert(1000.0)).await;

    let windows = p.log.windows("c1");
    assert_eq!(windows[0].first, 1000.0);
    assert_eq!(windows[0].last, 2000.0);
}

#[tokio::test]
async fn test_malformed_payload_never_escapes_the_loop() {
    let p = pipeline();

    let delivery = RecordedDelivery::new(b"not json".to_vec());
    p.dispatcher.handle(&delivery).await.unwrap();

    assert_eq!(delivery.ack_count(), 1);
    assert_eq!(p.bus.published_count(), 0);
}

#[tokio::test]
async fn test_expiring_metric_bridges_current_condition() {
    let p = pipeline();

    let mut slashed = cpu_alert(1000.0);
    slashed.metric = "cosmos_node_slashed".to_string();
    slashed.metric_state_args = vec!["v1".to_string()];
    ingest(&p, &slashed).await;

    let raw = p
        .cache
        .get_field("hash_parent_c1", "alert_cosmos_node2_v1")
        .await
        .unwrap()
        .expect("cache field");
    let value: CacheValue = serde_json::from_str(&raw).unwrap();
    assert_eq!(value.expiry, Some(1600.0));
}
