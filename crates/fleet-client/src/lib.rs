//! Fleet-management REST API Client
//!
//! A Rust client library for the remote fleet-management control plane that
//! owns managed Kubernetes clusters and their worker node pools.
//!
//! # Example
//!
//! ```no_run
//! use fleet_client::{ClusterIdentity, FleetClient, FleetClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FleetClient::new(
//!     "http://fleet-api:8080".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! let cluster = ClusterIdentity {
//!     credential_name: "prod".to_string(),
//!     subscription_id: "0000-1111".to_string(),
//!     resource_group_name: "platform".to_string(),
//!     cluster_name: "aks-west".to_string(),
//! };
//! for pool in client.list_node_pools(&cluster).await? {
//!     println!("{} {:?}", pool.name(), pool.phase());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Node pools**: create, get, list, update (full overwrite), delete
//! - **Clusters**: create, get, update, delete
//! - **`test-util`**: in-memory [`MockFleetClient`] with call recording,
//!   failure injection and scripted phases

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod fleet_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::FleetClient;
pub use common::HttpClient;
pub use error::FleetError;
pub use models::*;
pub use fleet_trait::FleetClientTrait;
#[cfg(feature = "test-util")]
pub use mock::{MockCall, MockFailure, MockFleetClient, MockOp};
