//! Node pool provisioning during cluster creation.
//!
//! Unlike steady-state reconciliation this is best-effort: every pool is
//! attempted, USER pool failures are tolerated, and the pass only fails when
//! not a single SYSTEM pool could be created.

use super::{Reconciler, scoped_to};
use crate::error::ControllerError;
use crate::validation::{require_system_pool, validate_desired};
use fleet_client::{Cluster, NodePool};
use tracing::{error, info, warn};

/// Outcome of a provisioning pass, by pool name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub created: Vec<String>,
    /// Pools whose creation failed without failing the pass
    pub tolerated_failures: Vec<String>,
}

impl Reconciler {
    /// Create every desired pool of a new cluster without waiting for readiness.
    ///
    /// Cluster readiness is awaited separately by the caller.
    pub async fn provision_all(
        &self,
        cluster: &Cluster,
        desired: &[NodePool],
    ) -> Result<ProvisionSummary, ControllerError> {
        validate_desired(&cluster.spec.network, desired)?;
        require_system_pool(desired)?;
        self.create_node_pools(cluster, desired).await
    }

    /// Provisioning without validation, for callers that already validated
    pub(crate) async fn create_node_pools(
        &self,
        cluster: &Cluster,
        desired: &[NodePool],
    ) -> Result<ProvisionSummary, ControllerError> {
        info!("Provisioning {} node pools for cluster {}", desired.len(), cluster.full_name);

        let mut summary = ProvisionSummary::default();
        let mut system_created = 0usize;
        let mut system_errors = Vec::new();

        for pool in scoped_to(cluster, desired) {
            let result = self
                .fleet_client
                .create_node_pool(&pool)
                .await
                .map_err(|e| ControllerError::remote(format!("create node pool {}", pool.full_name), e));

            match result {
                Ok(_) => {
                    info!("Created node pool {}", pool.full_name);
                    if pool.is_system() {
                        system_created += 1;
                    }
                    summary.created.push(pool.name().to_string());
                }
                Err(e) if pool.is_system() => {
                    warn!("System node pool {} could not be created: {}", pool.full_name, e);
                    summary.tolerated_failures.push(pool.name().to_string());
                    system_errors.push(e);
                }
                Err(e) => {
                    warn!("Ignoring failed user node pool {}: {}", pool.full_name, e);
                    summary.tolerated_failures.push(pool.name().to_string());
                }
            }
        }

        if system_created == 0 {
            error!("No system node pool was created for cluster {}", cluster.full_name);
            return Err(ControllerError::NoSystemPoolCreated(system_errors));
        }

        info!(
            "Provisioned cluster {}: {} created, {} failed",
            cluster.full_name,
            summary.created.len(),
            summary.tolerated_failures.len()
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "bringup_test.rs"]
mod bringup_test;
