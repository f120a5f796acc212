//! FleetClient trait for mocking
//!
//! This trait abstracts the FleetClient to enable mocking in unit tests.
//! The concrete FleetClient implements this trait, and tests can use mock implementations.

use crate::error::FleetError;
use crate::models::*;

/// Trait for fleet-management API operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait FleetClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), FleetError>;

    // Node pool operations

    /// Create a node pool. Fails with `AlreadyExists` on identity collision
    /// and `Invalid` when the service rejects the spec.
    async fn create_node_pool(&self, pool: &NodePool) -> Result<NodePool, FleetError>;
    /// Fetch a node pool including its status. Fails with `NotFound`.
    async fn get_node_pool(&self, id: &NodePoolIdentity) -> Result<NodePool, FleetError>;
    async fn list_node_pools(&self, cluster: &ClusterIdentity) -> Result<Vec<NodePool>, FleetError>;
    /// Full overwrite of the pool spec. Fails with `NotFound` or `Invalid`.
    async fn update_node_pool(&self, pool: &NodePool) -> Result<NodePool, FleetError>;
    /// Start deleting a node pool. Fails with `NotFound` if already absent.
    async fn delete_node_pool(&self, id: &NodePoolIdentity) -> Result<(), FleetError>;

    // Cluster operations
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Cluster, FleetError>;
    async fn get_cluster(&self, id: &ClusterIdentity) -> Result<Cluster, FleetError>;
    async fn update_cluster(&self, cluster: &Cluster) -> Result<Cluster, FleetError>;
    async fn delete_cluster(&self, id: &ClusterIdentity) -> Result<(), FleetError>;
}
