//! Metric dispatch table and cache-key construction.
//!
//! Every metric the alerters emit is enumerated here with the alerter type
//! that owns it, its index inside that alerter's cache-key namespace, the
//! number of state-identifying arguments its key takes, and whether its
//! cache entry expires. Key building is a closed dispatch over this table;
//! an unknown metric name is a typed error, never a silent no-op.

use std::collections::HashSet;

use crate::alerters::AlerterType;

/// Cache entries for expiring metrics live this long past the alert time.
pub const EXPIRY_SECS: f64 = 600.0;

/// Redis hash name prefix for per-chain scopes.
pub const SCOPE_HASH_PREFIX: &str = "hash_parent_";

/// Name of the cache hash holding one chain's live state.
pub fn scope_hash(parent_id: &str) -> String {
    format!("{SCOPE_HASH_PREFIX}{parent_id}")
}

/// One row of the metric table.
#[derive(Debug)]
pub struct MetricSpec {
    pub name: &'static str,
    pub alerter: AlerterType,
    /// Position inside the alerter's key namespace; `alert_system3` is the
    /// third system metric.
    pub index: u8,
    /// Number of state args the key takes: 0 for network-global metrics,
    /// 1 for per-entity, 2 for compound identifiers.
    pub arity: usize,
    /// Whether the cache entry auto-expires `EXPIRY_SECS` after the alert.
    pub expires: bool,
}

#[rustfmt::skip]
pub const METRICS: &[MetricSpec] = &[
    MetricSpec { name: "system_is_down",                             alerter: AlerterType::System,            index: 1, arity: 1, expires: false },
    MetricSpec { name: "open_file_descriptors",                      alerter: AlerterType::System,            index: 2, arity: 1, expires: false },
    MetricSpec { name: "system_cpu_usage",                           alerter: AlerterType::System,            index: 3, arity: 1, expires: false },
    MetricSpec { name: "system_ram_usage",                           alerter: AlerterType::System,            index: 4, arity: 1, expires: false },
    MetricSpec { name: "system_storage_usage",                       alerter: AlerterType::System,            index: 5, arity: 1, expires: false },
    MetricSpec { name: "github_release",                             alerter: AlerterType::Github,            index: 1, arity: 1, expires: false },
    MetricSpec { name: "github_cannot_access",                       alerter: AlerterType::Github,            index: 2, arity: 1, expires: false },
    MetricSpec { name: "dockerhub_new_tag",                          alerter: AlerterType::Dockerhub,         index: 1, arity: 1, expires: false },
    MetricSpec { name: "dockerhub_updated_tag",                      alerter: AlerterType::Dockerhub,         index: 2, arity: 1, expires: false },
    MetricSpec { name: "dockerhub_deleted_tag",                      alerter: AlerterType::Dockerhub,         index: 3, arity: 1, expires: false },
    MetricSpec { name: "dockerhub_cannot_access",                    alerter: AlerterType::Dockerhub,         index: 4, arity: 1, expires: false },
    MetricSpec { name: "cl_node_is_down",                            alerter: AlerterType::ChainlinkNode,     index: 1, arity: 1, expires: false },
    MetricSpec { name: "cl_head_tracker_heads_received_total",       alerter: AlerterType::ChainlinkNode,     index: 2, arity: 1, expires: false },
    MetricSpec { name: "cl_balance_amount",                          alerter: AlerterType::ChainlinkNode,     index: 3, arity: 1, expires: false },
    MetricSpec { name: "cl_process_start_time_seconds",              alerter: AlerterType::ChainlinkNode,     index: 4, arity: 1, expires: false },
    MetricSpec { name: "evm_node_is_down",                           alerter: AlerterType::EvmNode,           index: 1, arity: 1, expires: false },
    MetricSpec { name: "evm_block_syncing_block_height_difference",  alerter: AlerterType::EvmNode,           index: 2, arity: 1, expires: false },
    MetricSpec { name: "evm_block_syncing_no_change_in_block_height", alerter: AlerterType::EvmNode,          index: 3, arity: 1, expires: false },
    MetricSpec { name: "cl_contract_price_feed_not_observed",        alerter: AlerterType::ChainlinkContract, index: 1, arity: 2, expires: true },
    MetricSpec { name: "cl_contract_price_feed_deviation",           alerter: AlerterType::ChainlinkContract, index: 2, arity: 2, expires: true },
    MetricSpec { name: "cl_contract_consensus_failure",              alerter: AlerterType::ChainlinkContract, index: 3, arity: 2, expires: false },
    MetricSpec { name: "cosmos_node_is_down",                        alerter: AlerterType::CosmosNode,        index: 1, arity: 1, expires: false },
    MetricSpec { name: "cosmos_node_slashed",                        alerter: AlerterType::CosmosNode,        index: 2, arity: 1, expires: true },
    MetricSpec { name: "cosmos_node_missed_blocks",                  alerter: AlerterType::CosmosNode,        index: 3, arity: 1, expires: false },
    MetricSpec { name: "cosmos_node_is_syncing",                     alerter: AlerterType::CosmosNode,        index: 4, arity: 1, expires: false },
    MetricSpec { name: "cosmos_node_is_jailed",                      alerter: AlerterType::CosmosNode,        index: 5, arity: 1, expires: false },
    MetricSpec { name: "cosmos_network_proposals_submitted",         alerter: AlerterType::CosmosNetwork,     index: 1, arity: 0, expires: false },
    MetricSpec { name: "cosmos_network_concluded_proposals",         alerter: AlerterType::CosmosNetwork,     index: 2, arity: 0, expires: false },
    MetricSpec { name: "substrate_node_is_down",                     alerter: AlerterType::SubstrateNode,     index: 1, arity: 1, expires: false },
    MetricSpec { name: "substrate_node_offline",                     alerter: AlerterType::SubstrateNode,     index: 2, arity: 1, expires: false },
    MetricSpec { name: "substrate_node_slashed",                     alerter: AlerterType::SubstrateNode,     index: 3, arity: 1, expires: true },
    MetricSpec { name: "substrate_node_payout_not_claimed",          alerter: AlerterType::SubstrateNode,     index: 4, arity: 2, expires: false },
    MetricSpec { name: "substrate_network_proposal_submitted",       alerter: AlerterType::SubstrateNetwork,  index: 1, arity: 0, expires: false },
    MetricSpec { name: "substrate_network_grandpa_stalled",          alerter: AlerterType::SubstrateNetwork,  index: 2, arity: 0, expires: false },
];

/// Errors building a cache field for an event.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("metric {metric} takes {expected} state args, got {got}")]
    Arity {
        metric: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Errors found while validating the static tables at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TableError {
    #[error("duplicate metric name: {0}")]
    DuplicateName(&'static str),

    #[error("duplicate key index {index} in namespace {namespace}")]
    DuplicateIndex { namespace: &'static str, index: u8 },

    #[error("alerter namespace {outer} contains namespace {inner}")]
    NamespaceOverlap {
        outer: &'static str,
        inner: &'static str,
    },
}

/// Look up a metric by its wire name.
pub fn metric_spec(name: &str) -> Option<&'static MetricSpec> {
    METRICS.iter().find(|m| m.name == name)
}

/// Build the cache field for `metric` from the event's state args.
///
/// Zero-arg metrics map to the bare namespaced index ("alert_cosmos_network1");
/// each state arg appends an underscore-separated segment.
pub fn cache_field(metric: &str, state_args: &[String]) -> Result<String, KeyError> {
    let spec = metric_spec(metric).ok_or_else(|| KeyError::UnknownMetric(metric.to_string()))?;
    if state_args.len() != spec.arity {
        return Err(KeyError::Arity {
            metric: spec.name,
            expected: spec.arity,
            got: state_args.len(),
        });
    }

    let mut field = format!("{}{}", spec.alerter.reset_spec().namespace, spec.index);
    for arg in state_args {
        field.push('_');
        field.push_str(arg);
    }
    Ok(field)
}

/// Validate the metric and reset tables.
///
/// Run once at startup: key construction and reset sweeps both assume unique
/// metric names, unique per-namespace indices, and mutually non-overlapping
/// alerter namespaces.
pub fn validate_tables() -> Result<(), TableError> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    for metric in METRICS {
        if !names.insert(metric.name) {
            return Err(TableError::DuplicateName(metric.name));
        }
        let namespace = metric.alerter.reset_spec().namespace;
        if !keys.insert((namespace, metric.index)) {
            return Err(TableError::DuplicateIndex {
                namespace,
                index: metric.index,
            });
        }
    }

    for a in AlerterType::ALL {
        for b in AlerterType::ALL {
            if a == b {
                continue;
            }
            let (outer, inner) = (a.reset_spec().namespace, b.reset_spec().namespace);
            if outer.contains(inner) {
                return Err(TableError::NamespaceOverlap { outer, inner });
            }
        }
    }

    Ok(())
}
