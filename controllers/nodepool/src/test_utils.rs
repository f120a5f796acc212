//! Test utilities for unit testing reconcilers
//!
//! Builders for clusters and node pools that share one cluster identity.

use fleet_client::{
    Cluster, ClusterIdentity, ClusterNetworkSpec, ClusterSpec, MockFleetClient, NetworkPlugin,
    NetworkPluginMode, NodePool, NodePoolMode, NodePoolSpec, NodePoolStatus, Phase,
};

use crate::identity::build_identity;
use crate::poller::PollConfig;
use crate::reconciler::Reconciler;
use std::time::Duration;

pub const VNET: &str =
    "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet-a";

pub fn subnet(name: &str) -> String {
    format!("{}/subnets/{}", VNET, name)
}

pub fn test_cluster_identity() -> ClusterIdentity {
    ClusterIdentity {
        credential_name: "test-credential".to_string(),
        subscription_id: "sub-1".to_string(),
        resource_group_name: "rg".to_string(),
        cluster_name: "aks-test".to_string(),
    }
}

pub fn network(plugin: NetworkPlugin, overlay: bool) -> ClusterNetworkSpec {
    ClusterNetworkSpec {
        network_plugin: plugin,
        network_plugin_mode: overlay.then_some(NetworkPluginMode::Overlay),
        ..Default::default()
    }
}

/// Azure CNI cluster without overlay, so pod subnets are allowed
pub fn test_cluster() -> Cluster {
    Cluster {
        full_name: test_cluster_identity(),
        spec: ClusterSpec {
            location: "westeurope".to_string(),
            kubernetes_version: Some("1.30".to_string()),
            network: network(NetworkPlugin::Azure, false),
            ..Default::default()
        },
        status: None,
    }
}

pub fn pool(name: &str, mode: NodePoolMode) -> NodePool {
    NodePool::new(
        build_identity(&test_cluster_identity(), name),
        NodePoolSpec {
            mode,
            vm_size: "STANDARD_DS2v2".to_string(),
            count: 1,
            ..Default::default()
        },
    )
}

pub fn system_pool(name: &str) -> NodePool {
    pool(name, NodePoolMode::System)
}

pub fn user_pool(name: &str) -> NodePool {
    pool(name, NodePoolMode::User)
}

/// The same pool as the service would report it once provisioned
pub fn ready(mut pool: NodePool) -> NodePool {
    pool.status = Some(NodePoolStatus {
        phase: Phase::Ready,
        ..Default::default()
    });
    pool
}

pub fn mock_client() -> MockFleetClient {
    MockFleetClient::new("http://test-fleet")
}

/// Fast polling so tests finish quickly under a paused clock
pub fn test_poll_config() -> PollConfig {
    PollConfig::new(Duration::from_secs(1), Duration::from_secs(30))
}

pub fn test_reconciler(mock: &MockFleetClient) -> Reconciler {
    Reconciler::new(Box::new(mock.clone()), test_poll_config())
}
