//! Declared cluster and node pools, read from YAML.
//!
//! ```yaml
//! cluster:
//!   credentialName: prod
//!   subscriptionId: 0000-1111
//!   resourceGroupName: platform
//!   clusterName: aks-west
//!   location: westeurope
//!   network:
//!     networkPlugin: azure
//! nodePools:
//!   - name: system
//!     mode: SYSTEM
//!     vmSize: Standard_D4s_v5
//!     count: 3
//! ```

use std::path::Path;

use fleet_client::{Cluster, ClusterIdentity, ClusterSpec, NodePool, NodePoolSpec};
use serde::Deserialize;
use tracing::debug;

use crate::error::ControllerError;
use crate::identity::build_identity;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterManifest {
    #[serde(flatten)]
    pub identity: ClusterIdentity,
    #[serde(flatten)]
    pub spec: ClusterSpec,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodePoolEntry {
    pub name: String,
    #[serde(flatten)]
    pub spec: NodePoolSpec,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolManifest {
    pub cluster: ClusterManifest,
    #[serde(default)]
    pub node_pools: Vec<NodePoolEntry>,
}

impl NodePoolManifest {
    pub fn from_yaml(yaml: &str) -> Result<Self, ControllerError> {
        serde_yaml::from_str(yaml).map_err(|e| ControllerError::Manifest(e.to_string()))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ControllerError> {
        let path = path.as_ref();
        debug!("Loading manifest from {}", path.display());
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ControllerError::Manifest(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml(&yaml)
    }

    /// Declared cluster; status is left for the service to report
    pub fn cluster(&self) -> Cluster {
        Cluster {
            full_name: self.cluster.identity.clone(),
            spec: self.cluster.spec.clone(),
            status: None,
        }
    }

    /// Desired node pools in declaration order
    pub fn desired_node_pools(&self) -> Vec<NodePool> {
        self.node_pools
            .iter()
            .map(|entry| {
                NodePool::new(
                    build_identity(&self.cluster.identity, &entry.name),
                    entry.spec.clone(),
                )
            })
            .collect()
    }
}
