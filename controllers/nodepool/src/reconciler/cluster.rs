//! Cluster-level flows built on the node pool engine.

use super::{ProvisionSummary, ReconcileSummary, Reconciler};
use crate::error::ControllerError;
use crate::validation::{require_system_pool, validate_desired};
use fleet_client::{Cluster, ClusterIdentity, NodePool};
use tracing::{debug, info};

impl Reconciler {
    /// Create a cluster with its node pools and wait for it to become ready.
    ///
    /// Everything is validated before the first remote call.
    pub async fn bring_up_cluster(
        &self,
        cluster: &Cluster,
        desired: &[NodePool],
    ) -> Result<ProvisionSummary, ControllerError> {
        let id = &cluster.full_name;
        validate_desired(&cluster.spec.network, desired)?;
        require_system_pool(desired)?;

        info!("Creating cluster {} in {}", id, cluster.spec.location);
        self.fleet_client
            .create_cluster(cluster)
            .await
            .map_err(|e| ControllerError::remote(format!("create cluster {}", id), e))?;

        let summary = self.create_node_pools(cluster, desired).await?;

        self.poller
            .await_cluster_ready(self.fleet_client.as_ref(), id)
            .await?;
        info!("Cluster {} is ready", id);
        Ok(summary)
    }

    /// Apply cluster changes in place, then reconcile its node pools
    pub async fn update_cluster(
        &self,
        cluster: &Cluster,
        desired: &[NodePool],
    ) -> Result<ReconcileSummary, ControllerError> {
        let id = &cluster.full_name;
        validate_desired(&cluster.spec.network, desired)?;

        let remote = self
            .fleet_client
            .get_cluster(id)
            .await
            .map_err(|e| ControllerError::remote(format!("get cluster {}", id), e))?;

        if remote.spec == cluster.spec {
            debug!("Cluster {} spec is up to date", id);
        } else {
            info!("Updating cluster {}", id);
            self.fleet_client
                .update_cluster(cluster)
                .await
                .map_err(|e| ControllerError::remote(format!("update cluster {}", id), e))?;
            self.poller
                .await_cluster_ready(self.fleet_client.as_ref(), id)
                .await?;
        }

        self.reconcile(cluster, desired).await
    }

    /// Delete a cluster and wait until the service no longer reports it
    pub async fn tear_down_cluster(&self, id: &ClusterIdentity) -> Result<(), ControllerError> {
        info!("Deleting cluster {}", id);
        match self.fleet_client.delete_cluster(id).await {
            Ok(()) => {
                self.poller
                    .await_cluster_deleted(self.fleet_client.as_ref(), id)
                    .await?;
                info!("Cluster {} deleted", id);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!("Cluster {} was already deleted", id);
                Ok(())
            }
            Err(e) => Err(ControllerError::remote(format!("delete cluster {}", id), e)),
        }
    }
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod cluster_test;
