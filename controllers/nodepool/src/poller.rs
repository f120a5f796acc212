//! Bounded polling for asynchronous remote transitions.
//!
//! A wait sleeps for the poll interval, fetches the resource, and evaluates
//! the observation until it reaches a terminal state, the deadline passes, or
//! the wait is cancelled. The status fetch is the only remote call made here.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use fleet_client::{
    ClusterIdentity, FleetClientTrait, FleetError, NodePoolIdentity, Phase, describe_conditions,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ControllerError;

/// Default spacing between status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default upper bound for a single wait
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Interval and deadline for waits.
///
/// Supplied by the caller at the top of each flow; tests shrink the interval
/// without touching production defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What a wait is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    Ready,
    Deleted,
}

impl fmt::Display for WaitTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTarget::Ready => f.write_str("ready"),
            WaitTarget::Deleted => f.write_str("delete"),
        }
    }
}

/// States of a single wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Waiting,
    Ready,
    FatalError(String),
    NotFound,
    TimedOut,
}

/// One status observation of a remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub phase: Phase,
    /// Remote condition payload, reported when the phase is fatal
    pub detail: String,
}

/// Transition for one tick; `None` means the fetch reported not-found.
pub fn evaluate(target: WaitTarget, observed: Option<&Observation>) -> PollState {
    match (target, observed) {
        (WaitTarget::Ready, None) => PollState::FatalError("entry not found".to_string()),
        (WaitTarget::Ready, Some(obs)) if obs.phase == Phase::Error => {
            PollState::FatalError(format!("phase {}: {}", obs.phase, obs.detail))
        }
        (WaitTarget::Ready, Some(obs)) if obs.phase == Phase::Ready => PollState::Ready,
        (WaitTarget::Ready, Some(_)) => PollState::Waiting,
        (WaitTarget::Deleted, None) => PollState::NotFound,
        (WaitTarget::Deleted, Some(_)) => PollState::Waiting,
    }
}

/// Per-wait state, discarded when the wait ends
#[derive(Debug, Clone)]
pub struct PollJob {
    pub resource: String,
    pub target: WaitTarget,
    pub interval: Duration,
    pub deadline: Instant,
}

/// Runs waits against the fleet service.
#[derive(Debug, Clone)]
pub struct Poller {
    config: PollConfig,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Waits stop as soon as `cancel` fires
    pub fn with_cancellation(config: PollConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// New job whose deadline starts now
    pub fn job(&self, resource: impl Into<String>, target: WaitTarget) -> PollJob {
        PollJob {
            resource: resource.into(),
            target,
            interval: self.config.interval,
            deadline: Instant::now() + self.config.timeout,
        }
    }

    pub async fn await_node_pool_ready(
        &self,
        client: &dyn FleetClientTrait,
        id: &NodePoolIdentity,
    ) -> Result<(), ControllerError> {
        let job = self.job(format!("node pool {}", id), WaitTarget::Ready);
        self.run(job, move || observe_node_pool(client, id)).await
    }

    pub async fn await_node_pool_deleted(
        &self,
        client: &dyn FleetClientTrait,
        id: &NodePoolIdentity,
    ) -> Result<(), ControllerError> {
        let job = self.job(format!("node pool {}", id), WaitTarget::Deleted);
        self.run(job, move || observe_node_pool(client, id)).await
    }

    pub async fn await_cluster_ready(
        &self,
        client: &dyn FleetClientTrait,
        id: &ClusterIdentity,
    ) -> Result<(), ControllerError> {
        let job = self.job(format!("cluster {}", id), WaitTarget::Ready);
        self.run(job, move || observe_cluster(client, id)).await
    }

    pub async fn await_cluster_deleted(
        &self,
        client: &dyn FleetClientTrait,
        id: &ClusterIdentity,
    ) -> Result<(), ControllerError> {
        let job = self.job(format!("cluster {}", id), WaitTarget::Deleted);
        self.run(job, move || observe_cluster(client, id)).await
    }

    /// Drive `job` to a terminal state.
    ///
    /// `fetch` yields `Ok(None)` when the resource does not exist. Any other
    /// fetch failure aborts the wait.
    pub async fn run<F, Fut>(&self, job: PollJob, mut fetch: F) -> Result<(), ControllerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<Observation>, FleetError>>,
    {
        debug!(
            "Waiting for {} on {} (interval {:?})",
            job.target, job.resource, job.interval
        );

        let outcome = loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(cancelled(&job)),
                _ = tokio::time::sleep_until(job.deadline) => break PollState::TimedOut,
                _ = tokio::time::sleep(job.interval) => {}
            }

            let observed = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(cancelled(&job)),
                result = tokio::time::timeout_at(job.deadline, fetch()) => match result {
                    Ok(fetched) => fetched.map_err(|e| {
                        ControllerError::remote(format!("get {}", job.resource), e)
                    })?,
                    Err(_) => break PollState::TimedOut,
                },
            };

            match evaluate(job.target, observed.as_ref()) {
                PollState::Waiting => {
                    debug!(
                        "{} is {}, still waiting for {}",
                        job.resource,
                        observed.map_or_else(|| "absent".to_string(), |o| o.phase.to_string()),
                        job.target
                    );
                }
                terminal => break terminal,
            }
        };

        match outcome {
            PollState::Ready | PollState::NotFound => {
                info!("{} reached {}", job.resource, job.target);
                Ok(())
            }
            PollState::FatalError(detail) => Err(ControllerError::FatalPoll {
                resource: job.resource,
                detail,
            }),
            PollState::TimedOut | PollState::Waiting => {
                warn!("Timed out waiting for {} on {}", job.target, job.resource);
                Err(ControllerError::TimedOut {
                    target: job.target,
                    resource: job.resource,
                })
            }
        }
    }
}

fn cancelled(job: &PollJob) -> ControllerError {
    warn!("Cancelled while waiting for {} on {}", job.target, job.resource);
    ControllerError::Cancelled {
        target: job.target,
        resource: job.resource.clone(),
    }
}

async fn observe_node_pool(
    client: &dyn FleetClientTrait,
    id: &NodePoolIdentity,
) -> Result<Option<Observation>, FleetError> {
    match client.get_node_pool(id).await {
        Ok(pool) => {
            let status = pool.status.unwrap_or_default();
            Ok(Some(Observation {
                phase: status.phase,
                detail: describe_conditions(&status.conditions),
            }))
        }
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

async fn observe_cluster(
    client: &dyn FleetClientTrait,
    id: &ClusterIdentity,
) -> Result<Option<Observation>, FleetError> {
    match client.get_cluster(id).await {
        Ok(cluster) => {
            let status = cluster.status.unwrap_or_default();
            Ok(Some(Observation {
                phase: status.phase,
                detail: describe_conditions(&status.conditions),
            }))
        }
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod poller_test;
