//! Registered alerter components and their cache-reset configuration.
//!
//! The set is closed at build time: each alerter type owns a cache-key
//! namespace, and a component-reset event from one of them sweeps exactly
//! that namespace. Namespaces must never overlap so one alerter's reset
//! cannot delete another's keys (checked by `metrics::validate_tables`).

/// `alert_code.code` carried by internal component-restart notifications.
pub const COMPONENT_RESET_CODE: &str = "internal_component_reset";

/// The alerting components whose restarts reset cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlerterType {
    System,
    ChainlinkNode,
    CosmosNode,
    CosmosNetwork,
    Github,
    Dockerhub,
    EvmNode,
    ChainlinkContract,
    SubstrateNode,
    SubstrateNetwork,
}

/// Reset configuration for one alerter type.
#[derive(Debug)]
pub struct ResetSpec {
    /// Metric-category label used in logs.
    pub label: &'static str,
    /// Cache-key namespace prefix owned by this alerter.
    pub namespace: &'static str,
    /// Key substrings exempt from deletion during a reset sweep.
    pub ignore: &'static [&'static str],
}

impl AlerterType {
    pub const ALL: [AlerterType; 10] = [
        AlerterType::System,
        AlerterType::ChainlinkNode,
        AlerterType::CosmosNode,
        AlerterType::CosmosNetwork,
        AlerterType::Github,
        AlerterType::Dockerhub,
        AlerterType::EvmNode,
        AlerterType::ChainlinkContract,
        AlerterType::SubstrateNode,
        AlerterType::SubstrateNetwork,
    ];

    /// Parse the `origin_id` of a reset event. Components outside the
    /// registered set (monitors, the UI, ...) also restart and emit resets;
    /// those are not alerters and map to `None`.
    pub fn from_origin(origin: &str) -> Option<Self> {
        match origin {
            "SystemAlerter" => Some(AlerterType::System),
            "ChainlinkNodeAlerter" => Some(AlerterType::ChainlinkNode),
            "CosmosNodeAlerter" => Some(AlerterType::CosmosNode),
            "CosmosNetworkAlerter" => Some(AlerterType::CosmosNetwork),
            "GithubAlerter" => Some(AlerterType::Github),
            "DockerhubAlerter" => Some(AlerterType::Dockerhub),
            "EVMNodeAlerter" => Some(AlerterType::EvmNode),
            "ChainlinkContractAlerter" => Some(AlerterType::ChainlinkContract),
            "SubstrateNodeAlerter" => Some(AlerterType::SubstrateNode),
            "SubstrateNetworkAlerter" => Some(AlerterType::SubstrateNetwork),
            _ => None,
        }
    }

    pub fn reset_spec(self) -> &'static ResetSpec {
        match self {
            AlerterType::System => &ResetSpec {
                label: "system",
                namespace: "alert_system",
                ignore: &[],
            },
            AlerterType::ChainlinkNode => &ResetSpec {
                label: "chainlink node metrics",
                namespace: "alert_cl_node",
                ignore: &[],
            },
            AlerterType::CosmosNode => &ResetSpec {
                label: "cosmos node metrics",
                namespace: "alert_cosmos_node",
                ignore: &[],
            },
            AlerterType::CosmosNetwork => &ResetSpec {
                label: "cosmos network metrics",
                namespace: "alert_cosmos_network",
                ignore: &[],
            },
            // Release keys survive a Github alerter restart.
            AlerterType::Github => &ResetSpec {
                label: "github",
                namespace: "alert_github",
                ignore: &["alert_github1"],
            },
            AlerterType::Dockerhub => &ResetSpec {
                label: "dockerhub",
                namespace: "alert_dockerhub",
                ignore: &[],
            },
            AlerterType::EvmNode => &ResetSpec {
                label: "evm node metrics",
                namespace: "alert_evm_node",
                ignore: &[],
            },
            AlerterType::ChainlinkContract => &ResetSpec {
                label: "chainlink contract",
                namespace: "alert_cl_contract",
                ignore: &[],
            },
            AlerterType::SubstrateNode => &ResetSpec {
                label: "substrate node metrics",
                namespace: "alert_substrate_node",
                ignore: &[],
            },
            AlerterType::SubstrateNetwork => &ResetSpec {
                label: "substrate network metrics",
                namespace: "alert_substrate_network",
                ignore: &[],
            },
        }
    }
}
