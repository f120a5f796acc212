//! Mock FleetClient for unit testing
//!
//! This module provides a mock implementation of FleetClientTrait that can be used
//! in unit tests without requiring a running fleet-management service.
//!
//! The mock is organized into resource-specific modules:
//! - `node_pools.rs` - node pool operations
//! - `clusters.rs` - cluster operations
//!
//! Besides storing resources in memory, the mock records every call, can be told
//! to fail specific calls, replays scripted phase sequences on `get`, and can keep
//! deleted resources in `DELETING` for a number of polls.

mod clusters;
mod node_pools;

use crate::error::FleetError;
use crate::fleet_trait::FleetClientTrait;
use crate::models::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Operation kinds understood by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    CreateNodePool,
    GetNodePool,
    ListNodePools,
    UpdateNodePool,
    DeleteNodePool,
    CreateCluster,
    GetCluster,
    UpdateCluster,
    DeleteCluster,
}

impl MockOp {
    /// Whether the operation changes remote state
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            MockOp::CreateNodePool
                | MockOp::UpdateNodePool
                | MockOp::DeleteNodePool
                | MockOp::CreateCluster
                | MockOp::UpdateCluster
                | MockOp::DeleteCluster
        )
    }
}

/// A recorded call: the operation plus the pool or cluster name it targeted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub op: MockOp,
    pub target: String,
}

impl MockCall {
    pub fn new(op: MockOp, target: impl Into<String>) -> Self {
        Self {
            op,
            target: target.into(),
        }
    }

    pub fn create_node_pool(name: &str) -> Self {
        Self::new(MockOp::CreateNodePool, name)
    }

    pub fn update_node_pool(name: &str) -> Self {
        Self::new(MockOp::UpdateNodePool, name)
    }

    pub fn delete_node_pool(name: &str) -> Self {
        Self::new(MockOp::DeleteNodePool, name)
    }
}

/// Failure to inject into a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    NotFound,
    AlreadyExists,
    Invalid(String),
    Api(String),
    Authentication,
}

impl MockFailure {
    pub(crate) fn into_error(self, target: &str) -> FleetError {
        match self {
            MockFailure::NotFound => FleetError::NotFound(format!("{} not found", target)),
            MockFailure::AlreadyExists => {
                FleetError::AlreadyExists(format!("{} already exists", target))
            }
            MockFailure::Invalid(msg) => FleetError::Invalid(msg),
            MockFailure::Api(msg) => FleetError::Api(msg),
            MockFailure::Authentication => FleetError::Authentication("token rejected".to_string()),
        }
    }
}

/// One scripted observation returned by a `get`
#[derive(Debug, Clone)]
pub(crate) struct ScriptedPhase {
    pub(crate) phase: Phase,
    pub(crate) message: Option<String>,
}

/// Mock FleetClient for testing
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the store and call log through another.
#[derive(Debug, Clone)]
pub struct MockFleetClient {
    pub(crate) base_url: String,
    // In-memory storage for resources
    pub(crate) node_pools: Arc<Mutex<HashMap<NodePoolIdentity, NodePool>>>,
    pub(crate) clusters: Arc<Mutex<HashMap<ClusterIdentity, Cluster>>>,
    // Behaviour knobs
    pub(crate) failures: Arc<Mutex<HashMap<(MockOp, String), MockFailure>>>,
    pub(crate) scripts: Arc<Mutex<HashMap<String, VecDeque<ScriptedPhase>>>>,
    pub(crate) delete_delays: Arc<Mutex<HashMap<String, u32>>>,
    /// Resources being deleted -> remaining `DELETING` observations
    pub(crate) pending_deletes: Arc<Mutex<HashMap<String, u32>>>,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockFleetClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            node_pools: Arc::new(Mutex::new(HashMap::new())),
            clusters: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            scripts: Arc::new(Mutex::new(HashMap::new())),
            delete_delays: Arc::new(Mutex::new(HashMap::new())),
            pending_deletes: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a node pool to the mock store (for test setup).
    ///
    /// Pools without a status are stored as `READY`.
    pub fn add_node_pool(&self, mut pool: NodePool) {
        if pool.status.is_none() {
            pool.status = Some(NodePoolStatus {
                phase: Phase::Ready,
                created_at: Some(chrono::Utc::now()),
                ..Default::default()
            });
        }
        self.node_pools
            .lock()
            .unwrap()
            .insert(pool.full_name.clone(), pool);
    }

    /// Add a cluster to the mock store (for test setup)
    pub fn add_cluster(&self, mut cluster: Cluster) {
        if cluster.status.is_none() {
            cluster.status = Some(ClusterStatus {
                phase: Phase::Ready,
                ..Default::default()
            });
        }
        self.clusters
            .lock()
            .unwrap()
            .insert(cluster.full_name.clone(), cluster);
    }

    /// Make every `op` call targeting `target` fail until cleared
    pub fn fail_on(&self, op: MockOp, target: &str, failure: MockFailure) {
        self.failures
            .lock()
            .unwrap()
            .insert((op, target.to_string()), failure);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Queue phases returned by successive `get` calls for `target`.
    ///
    /// Once the script runs dry, the last observed phase sticks.
    pub fn script_phases(&self, target: &str, phases: impl IntoIterator<Item = Phase>) {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry(target.to_string()).or_default();
        script.extend(phases.into_iter().map(|phase| ScriptedPhase {
            phase,
            message: None,
        }));
    }

    /// Queue an `ERROR` observation carrying `message` as its condition
    pub fn script_failure(&self, target: &str, message: &str) {
        self.scripts
            .lock()
            .unwrap()
            .entry(target.to_string())
            .or_default()
            .push_back(ScriptedPhase {
                phase: Phase::Error,
                message: Some(message.to_string()),
            });
    }

    /// Keep `target` in `DELETING` for `polls` gets after a delete call
    pub fn delay_delete(&self, target: &str, polls: u32) {
        self.delete_delays
            .lock()
            .unwrap()
            .insert(target.to_string(), polls);
    }

    /// Look up a stored node pool by name
    pub fn node_pool(&self, name: &str) -> Option<NodePool> {
        self.node_pools
            .lock()
            .unwrap()
            .values()
            .find(|p| p.full_name.name == name)
            .cloned()
    }

    /// Names of all stored node pools, sorted
    pub fn node_pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .node_pools
            .lock()
            .unwrap()
            .keys()
            .map(|id| id.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn cluster(&self, id: &ClusterIdentity) -> Option<Cluster> {
        self.clusters.lock().unwrap().get(id).cloned()
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the calls that change remote state, in order
    pub fn mutations(&self) -> Vec<MockCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.op.is_mutation())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Record a call and return the injected failure for it, if any
    pub(crate) fn record(&self, op: MockOp, target: &str) -> Result<(), FleetError> {
        self.calls.lock().unwrap().push(MockCall::new(op, target));
        match self
            .failures
            .lock()
            .unwrap()
            .get(&(op, target.to_string()))
            .cloned()
        {
            Some(failure) => Err(failure.into_error(target)),
            None => Ok(()),
        }
    }

    /// Whether `target` ever had phases scripted
    pub(crate) fn is_scripted(&self, target: &str) -> bool {
        self.scripts.lock().unwrap().contains_key(target)
    }

    /// Next scripted observation for `target`
    pub(crate) fn next_scripted(&self, target: &str) -> Option<ScriptedPhase> {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(target)
            .and_then(VecDeque::pop_front)
    }

    /// Start a delete; returns true when the resource must linger as `DELETING`
    pub(crate) fn begin_delete(&self, target: &str) -> bool {
        let delay = self
            .delete_delays
            .lock()
            .unwrap()
            .get(target)
            .copied()
            .unwrap_or(0);
        if delay == 0 {
            return false;
        }
        self.pending_deletes
            .lock()
            .unwrap()
            .insert(target.to_string(), delay);
        true
    }

    /// Consume one `DELETING` observation.
    ///
    /// `None` means no delete is pending, `Some(true)` the resource is still
    /// going away, `Some(false)` it is gone now.
    pub(crate) fn observe_delete(&self, target: &str) -> Option<bool> {
        let mut pending = self.pending_deletes.lock().unwrap();
        let remaining = pending.get_mut(target)?;
        if *remaining == 0 {
            pending.remove(target);
            return Some(false);
        }
        *remaining -= 1;
        Some(true)
    }
}

pub(crate) fn condition_for(message: &str) -> StatusCondition {
    StatusCondition {
        condition_type: "Ready".to_string(),
        reason: "ProvisioningFailed".to_string(),
        message: message.to_string(),
    }
}

#[async_trait::async_trait]
impl FleetClientTrait for MockFleetClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), FleetError> {
        Ok(())
    }

    // Node pool operations - delegated to node_pools module
    async fn create_node_pool(&self, pool: &NodePool) -> Result<NodePool, FleetError> {
        node_pools::create_node_pool(self, pool).await
    }

    async fn get_node_pool(&self, id: &NodePoolIdentity) -> Result<NodePool, FleetError> {
        node_pools::get_node_pool(self, id).await
    }

    async fn list_node_pools(&self, cluster: &ClusterIdentity) -> Result<Vec<NodePool>, FleetError> {
        node_pools::list_node_pools(self, cluster).await
    }

    async fn update_node_pool(&self, pool: &NodePool) -> Result<NodePool, FleetError> {
        node_pools::update_node_pool(self, pool).await
    }

    async fn delete_node_pool(&self, id: &NodePoolIdentity) -> Result<(), FleetError> {
        node_pools::delete_node_pool(self, id).await
    }

    // Cluster operations - delegated to clusters module
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Cluster, FleetError> {
        clusters::create_cluster(self, cluster).await
    }

    async fn get_cluster(&self, id: &ClusterIdentity) -> Result<Cluster, FleetError> {
        clusters::get_cluster(self, id).await
    }

    async fn update_cluster(&self, cluster: &Cluster) -> Result<Cluster, FleetError> {
        clusters::update_cluster(self, cluster).await
    }

    async fn delete_cluster(&self, id: &ClusterIdentity) -> Result<(), FleetError> {
        clusters::delete_cluster(self, id).await
    }
}
