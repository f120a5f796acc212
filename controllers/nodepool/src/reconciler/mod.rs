//! Node pool reconciliation.
//!
//! This module is organized by flow:
//! - `mod.rs`: steady-state reconciliation (plan, then execute fail-fast)
//! - `bringup`: best-effort provisioning during cluster creation
//! - `cluster`: cluster-level bring-up, update and tear-down

pub mod bringup;
pub mod cluster;

use std::fmt;

use fleet_client::{Cluster, FleetClientTrait, NodePool, NodePoolIdentity};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::classifier::{Operation, changed_fields, classify, immutable_changes};
use crate::error::ControllerError;
use crate::identity::{build_identity, find_match, same_pool};
use crate::poller::{PollConfig, Poller};
use crate::validation::validate_desired;

pub use bringup::ProvisionSummary;

/// One step of a reconciliation plan
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedOperation {
    NoOp(String),
    Create(NodePool),
    Update(NodePool),
    DeleteAndRecreate {
        existing: NodePoolIdentity,
        desired: NodePool,
    },
    Delete(NodePoolIdentity),
}

impl PlannedOperation {
    pub fn operation(&self) -> Operation {
        match self {
            PlannedOperation::NoOp(_) => Operation::NoOp,
            PlannedOperation::Create(_) => Operation::Create,
            PlannedOperation::Update(_) => Operation::Update,
            PlannedOperation::DeleteAndRecreate { .. } => Operation::DeleteAndRecreate,
            PlannedOperation::Delete(_) => Operation::Delete,
        }
    }

    pub fn pool_name(&self) -> &str {
        match self {
            PlannedOperation::NoOp(name) => name,
            PlannedOperation::Create(pool) | PlannedOperation::Update(pool) => pool.name(),
            PlannedOperation::DeleteAndRecreate { desired, .. } => desired.name(),
            PlannedOperation::Delete(id) => &id.name,
        }
    }
}

impl fmt::Display for PlannedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operation(), self.pool_name())
    }
}

/// Operation plan converging `existing` onto `desired`.
///
/// Desired pools come first in declaration order, then deletions of
/// undeclared pools in listing order.
pub fn plan(desired: &[NodePool], existing: &[NodePool]) -> Vec<PlannedOperation> {
    let mut operations: Vec<PlannedOperation> = desired
        .iter()
        .map(|pool| {
            let found = find_match(pool, existing);
            match (classify(pool, found), found) {
                (Operation::Create, _) | (_, None) => PlannedOperation::Create(pool.clone()),
                (Operation::NoOp, Some(_)) => PlannedOperation::NoOp(pool.name().to_string()),
                (Operation::Update, Some(e)) => {
                    debug!("{} changed: {:?}", pool.name(), changed_fields(pool, e));
                    PlannedOperation::Update(pool.clone())
                }
                (Operation::DeleteAndRecreate | Operation::Delete, Some(e)) => {
                    debug!("{} changed immutable fields: {:?}", pool.name(), immutable_changes(pool, e));
                    PlannedOperation::DeleteAndRecreate {
                        existing: e.full_name.clone(),
                        desired: pool.clone(),
                    }
                }
            }
        })
        .collect();

    operations.extend(
        existing
            .iter()
            .filter(|e| !desired.iter().any(|d| same_pool(d, e)))
            .map(|e| PlannedOperation::Delete(e.full_name.clone())),
    );
    operations
}

/// What a reconciliation pass did, by pool name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub recreated: Vec<String>,
    pub deleted: Vec<String>,
    pub unchanged: Vec<String>,
}

impl ReconcileSummary {
    /// Whether the pass found nothing to change
    pub fn is_converged(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.recreated.is_empty()
            && self.deleted.is_empty()
    }
}

impl fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} recreated, {} deleted, {} unchanged",
            self.created.len(),
            self.updated.len(),
            self.recreated.len(),
            self.deleted.len(),
            self.unchanged.len()
        )
    }
}

/// Reconciles node pools of one cluster against the fleet service.
pub struct Reconciler {
    pub(crate) fleet_client: Box<dyn FleetClientTrait>,
    pub(crate) poller: Poller,
}

impl Reconciler {
    pub fn new(fleet_client: Box<dyn FleetClientTrait>, poll_config: PollConfig) -> Self {
        Self {
            fleet_client,
            poller: Poller::new(poll_config),
        }
    }

    /// Every wait started by this reconciler stops once `cancel` fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.poller = Poller::with_cancellation(self.poller.config(), cancel);
        self
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// Converge the cluster's node pools onto `desired`.
    ///
    /// Validation runs before any remote call. The first failing step aborts
    /// the rest of the plan; applied steps stay applied and the next pass
    /// re-diffs from the remote listing.
    pub async fn reconcile(
        &self,
        cluster: &Cluster,
        desired: &[NodePool],
    ) -> Result<ReconcileSummary, ControllerError> {
        let cluster_id = &cluster.full_name;
        info!("Reconciling {} node pools of cluster {}", desired.len(), cluster_id);

        validate_desired(&cluster.spec.network, desired)?;
        let desired = scoped_to(cluster, desired);

        let existing = self
            .fleet_client
            .list_node_pools(cluster_id)
            .await
            .map_err(|e| ControllerError::remote(format!("list node pools of {}", cluster_id), e))?;

        let operations = plan(&desired, &existing);
        let mut summary = ReconcileSummary::default();
        for operation in &operations {
            if let Err(e) = self.apply(operation, &mut summary).await {
                error!("Reconciliation of cluster {} aborted at {}: {}", cluster_id, operation, e);
                return Err(e);
            }
        }

        info!("Reconciled cluster {}: {}", cluster_id, summary);
        Ok(summary)
    }

    async fn apply(
        &self,
        operation: &PlannedOperation,
        summary: &mut ReconcileSummary,
    ) -> Result<(), ControllerError> {
        match operation {
            PlannedOperation::NoOp(name) => {
                debug!("Node pool {} is up to date", name);
                summary.unchanged.push(name.clone());
            }
            PlannedOperation::Create(pool) => {
                self.create_and_wait(pool).await?;
                summary.created.push(pool.name().to_string());
            }
            PlannedOperation::Update(pool) => {
                self.update_and_wait(pool).await?;
                summary.updated.push(pool.name().to_string());
            }
            PlannedOperation::DeleteAndRecreate { existing, desired } => {
                info!("Recreating node pool {} to change immutable fields", existing);
                // A failed delete never reaches the create
                self.delete_and_wait(existing).await?;
                self.create_and_wait(desired).await?;
                summary.recreated.push(desired.name().to_string());
            }
            PlannedOperation::Delete(id) => {
                self.delete_and_wait(id).await?;
                summary.deleted.push(id.name.clone());
            }
        }
        Ok(())
    }

    pub(crate) async fn create_and_wait(&self, pool: &NodePool) -> Result<(), ControllerError> {
        info!("Creating node pool {}", pool.full_name);
        self.fleet_client
            .create_node_pool(pool)
            .await
            .map_err(|e| ControllerError::remote(format!("create node pool {}", pool.full_name), e))?;
        self.poller
            .await_node_pool_ready(self.fleet_client.as_ref(), &pool.full_name)
            .await
    }

    pub(crate) async fn update_and_wait(&self, pool: &NodePool) -> Result<(), ControllerError> {
        info!("Updating node pool {}", pool.full_name);
        self.fleet_client
            .update_node_pool(pool)
            .await
            .map_err(|e| ControllerError::remote(format!("update node pool {}", pool.full_name), e))?;
        self.poller
            .await_node_pool_ready(self.fleet_client.as_ref(), &pool.full_name)
            .await
    }

    /// Delete and wait for the pool to disappear; already gone counts as deleted
    pub(crate) async fn delete_and_wait(&self, id: &NodePoolIdentity) -> Result<(), ControllerError> {
        info!("Deleting node pool {}", id);
        match self.fleet_client.delete_node_pool(id).await {
            Ok(()) => {
                self.poller
                    .await_node_pool_deleted(self.fleet_client.as_ref(), id)
                    .await
            }
            Err(e) if e.is_not_found() => {
                debug!("Node pool {} was already deleted", id);
                Ok(())
            }
            Err(e) => Err(ControllerError::remote(format!("delete node pool {}", id), e)),
        }
    }
}

/// Desired pools addressed inside `cluster`, whatever identity they carried
fn scoped_to(cluster: &Cluster, desired: &[NodePool]) -> Vec<NodePool> {
    desired
        .iter()
        .map(|pool| NodePool {
            full_name: build_identity(&cluster.full_name, pool.name()),
            ..pool.clone()
        })
        .collect()
}

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;
