//! Node pool controller
//!
//! Converges a managed cluster's worker node pools onto a declared set:
//! missing pools are created, mutable changes are applied in place, changes
//! to immutable fields delete and recreate the pool, and undeclared pools are
//! removed. Every remote transition is confirmed by bounded polling.
//!
//! - [`reconciler::Reconciler::reconcile`]: strict, fail-fast convergence
//! - [`reconciler::Reconciler::provision_all`]: best-effort creation during
//!   cluster bring-up, tolerating failures while one system pool succeeds
//! - [`controller::Controller`]: periodic reconciliation with backoff

pub mod backoff;
pub mod classifier;
pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod poller;
pub mod reconciler;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use config::{ControllerConfig, Mode};
pub use controller::Controller;
pub use error::ControllerError;
pub use manifest::NodePoolManifest;
pub use poller::{PollConfig, Poller};
pub use reconciler::{ProvisionSummary, ReconcileSummary, Reconciler};
