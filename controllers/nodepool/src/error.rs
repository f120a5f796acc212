//! Controller-specific error types.
//!
//! Every failure the engine surfaces maps onto one of these variants; each
//! renders as a single line that is safe to show to the operator.

use fleet_client::FleetError;
use thiserror::Error;

use crate::poller::WaitTarget;

/// Errors that can occur while reconciling node pools.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Rejected before any remote call was made
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A call to the fleet service failed
    #[error("{operation} failed: {source}")]
    RemoteCall {
        operation: String,
        #[source]
        source: FleetError,
    },

    /// A poll observed a state it can never recover from
    #[error("error while waiting for {resource}: {detail}")]
    FatalPoll { resource: String, detail: String },

    /// The poll deadline passed before a terminal state was observed
    #[error("timed out waiting for {target} on {resource}")]
    TimedOut { target: WaitTarget, resource: String },

    /// The wait was cancelled from outside
    #[error("cancelled while waiting for {target} on {resource}")]
    Cancelled { target: WaitTarget, resource: String },

    /// Cluster bring-up could not create a single system node pool
    #[error("no system nodepools were successfully created. [{}]", join_errors(.0))]
    NoSystemPoolCreated(Vec<ControllerError>),

    /// Manifest could not be read or parsed
    #[error("manifest error: {0}")]
    Manifest(String),
}

impl ControllerError {
    /// Wrap a fleet error with the operation that produced it
    pub fn remote(operation: impl Into<String>, source: FleetError) -> Self {
        ControllerError::RemoteCall {
            operation: operation.into(),
            source,
        }
    }

    /// Whether re-running reconciliation later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ControllerError::TimedOut { .. } => true,
            ControllerError::RemoteCall { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

fn join_errors(errors: &[ControllerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
