//! Fleet API models
//!
//! These models mirror the fleet-management service's cluster and node-pool
//! resources. Specs are plain data compared structurally; statuses are owned
//! by the service and only ever read by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Addresses a managed cluster at the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterIdentity {
    pub credential_name: String,
    pub subscription_id: String,
    pub resource_group_name: String,
    pub cluster_name: String,
}

impl fmt::Display for ClusterIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_group_name, self.cluster_name)
    }
}

/// Addresses a single node pool: the owning cluster plus the pool name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolIdentity {
    pub credential_name: String,
    pub subscription_id: String,
    pub resource_group_name: String,
    pub cluster_name: String,
    pub name: String,
}

impl NodePoolIdentity {
    /// Identity of the cluster that owns this pool
    pub fn cluster(&self) -> ClusterIdentity {
        ClusterIdentity {
            credential_name: self.credential_name.clone(),
            subscription_id: self.subscription_id.clone(),
            resource_group_name: self.resource_group_name.clone(),
            cluster_name: self.cluster_name.clone(),
        }
    }

    /// Whether this pool belongs to `cluster`
    pub fn belongs_to(&self, cluster: &ClusterIdentity) -> bool {
        self.credential_name == cluster.credential_name
            && self.subscription_id == cluster.subscription_id
            && self.resource_group_name == cluster.resource_group_name
            && self.cluster_name == cluster.cluster_name
    }
}

impl fmt::Display for NodePoolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.resource_group_name, self.cluster_name, self.name
        )
    }
}

/// Lifecycle phase reported by the service for clusters and node pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Pending,
    Creating,
    Ready,
    Error,
    Deleting,
    Resizing,
    Upgrading,
    UpgradeFailed,
    Waiting,
    Updating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Pending => "PENDING",
            Phase::Creating => "CREATING",
            Phase::Ready => "READY",
            Phase::Error => "ERROR",
            Phase::Deleting => "DELETING",
            Phase::Resizing => "RESIZING",
            Phase::Upgrading => "UPGRADING",
            Phase::UpgradeFailed => "UPGRADE_FAILED",
            Phase::Waiting => "WAITING",
            Phase::Updating => "UPDATING",
        };
        f.write_str(s)
    }
}

/// A condition reported alongside a phase, used for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for StatusCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.condition_type, self.reason, self.message)
    }
}

/// Renders a list of conditions as a single diagnostic line
pub fn describe_conditions(conditions: &[StatusCondition]) -> String {
    if conditions.is_empty() {
        return "no conditions reported".to_string();
    }
    conditions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Node pool mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodePoolMode {
    /// Hosts cluster-critical workloads; a cluster needs at least one
    System,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum OsType {
    #[default]
    Linux,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum OsDiskType {
    #[default]
    Managed,
    Ephemeral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ScaleSetPriority {
    #[default]
    Regular,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ScaleSetEvictionPolicy {
    #[default]
    Delete,
    Deallocate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum TaintEffect {
    #[default]
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

/// Node taint (key/value/effect)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Taint {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub effect: TaintEffect,
}

/// Autoscaling and spot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScalingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ScaleSetPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eviction_policy: Option<ScaleSetEvictionPolicy>,
    /// -1 means "pay up to the on-demand price"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_max_price: Option<f64>,
}

/// Where the pool's nodes and pods get their addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPlacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnet_subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_subnet_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeConfig {
    /// Absolute count ("3") or percentage ("33%")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<String>,
}

/// Declared configuration of a node pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSpec {
    #[serde(default)]
    pub mode: NodePoolMode,
    pub vm_size: String,
    #[serde(default)]
    pub os_type: OsType,
    #[serde(default)]
    pub os_disk_type: OsDiskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_disk_size_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pods: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability_zones: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub scaling: ScalingConfig,
    #[serde(default)]
    pub network: NetworkPlacement,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
    #[serde(default)]
    pub upgrade: UpgradeConfig,
}

/// Remote-owned status of a node pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolStatus {
    pub phase: Phase,
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Node pool resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePool {
    pub full_name: NodePoolIdentity,
    pub spec: NodePoolSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodePoolStatus>,
}

impl NodePool {
    /// Build a desired (status-less) node pool
    pub fn new(full_name: NodePoolIdentity, spec: NodePoolSpec) -> Self {
        Self {
            full_name,
            spec,
            status: None,
        }
    }

    /// Pool name, the matching key within one cluster
    pub fn name(&self) -> &str {
        &self.full_name.name
    }

    pub fn is_system(&self) -> bool {
        self.spec.mode == NodePoolMode::System
    }

    /// Reported phase, if the service has reported one
    pub fn phase(&self) -> Option<Phase> {
        self.status.as_ref().map(|s| s.phase)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPlugin {
    #[default]
    Kubenet,
    Azure,
    None,
}

impl fmt::Display for NetworkPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkPlugin::Kubenet => f.write_str("kubenet"),
            NetworkPlugin::Azure => f.write_str("azure"),
            NetworkPlugin::None => f.write_str("none"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkPluginMode {
    Overlay,
}

/// Cluster-wide networking profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetworkSpec {
    #[serde(default)]
    pub network_plugin: NetworkPlugin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_plugin_mode: Option<NetworkPluginMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_cidr: Option<String>,
}

impl ClusterNetworkSpec {
    pub fn is_overlay(&self) -> bool {
        self.network_plugin_mode == Some(NetworkPluginMode::Overlay)
    }
}

/// Declared configuration of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub network: ClusterNetworkSpec,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub phase: Phase,
    #[serde(default)]
    pub conditions: Vec<StatusCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Managed cluster resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub full_name: ClusterIdentity,
    pub spec: ClusterSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ClusterStatus>,
}

/// List wrapper returned by collection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}
