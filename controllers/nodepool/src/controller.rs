//! Main controller implementation.
//!
//! `Controller` keeps one cluster's node pools converged by reconciling on a
//! fixed period. Failed passes are retried on a Fibonacci backoff instead of
//! the period; invalid configuration stops the loop since retrying cannot fix
//! it.

use std::time::Duration;

use fleet_client::{Cluster, NodePool};
use tracing::{error, info, warn};

use crate::backoff::FibonacciBackoff;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;

/// Periodic reconciliation of one cluster.
pub struct Controller {
    reconciler: Reconciler,
    cluster: Cluster,
    desired: Vec<NodePool>,
    interval: Duration,
}

impl Controller {
    /// Stops when the reconciler's cancellation token fires
    pub fn new(reconciler: Reconciler, cluster: Cluster, desired: Vec<NodePool>, interval: Duration) -> Self {
        Self {
            reconciler,
            cluster,
            desired,
            interval,
        }
    }

    /// Run until cancelled or until a pass fails with a non-retryable configuration error.
    pub async fn run(&self) -> Result<(), ControllerError> {
        info!(
            "Watching cluster {} ({} node pools, every {:?})",
            self.cluster.full_name,
            self.desired.len(),
            self.interval
        );

        let cancel = self.reconciler.poller().cancellation_token().clone();
        let mut backoff = FibonacciBackoff::default();

        loop {
            let delay = match self.reconciler.reconcile(&self.cluster, &self.desired).await {
                Ok(_) => {
                    backoff.reset();
                    self.interval
                }
                Err(ControllerError::Cancelled { .. }) => break,
                Err(e @ (ControllerError::Configuration(_) | ControllerError::Manifest(_))) => {
                    error!("Stopping watch of cluster {}: {}", self.cluster.full_name, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = backoff.next_backoff();
                    warn!(
                        "Reconciliation of cluster {} failed (retryable: {}), retrying in {:?}: {}",
                        self.cluster.full_name,
                        e.is_retryable(),
                        delay,
                        e
                    );
                    delay
                }
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Stopped watching cluster {}", self.cluster.full_name);
        Ok(())
    }
}
