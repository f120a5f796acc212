//! Fleet API client
//!
//! Implements the fleet-management REST API for clusters and node pools.
//! Resources are addressed by credential, subscription, resource group and
//! cluster: `/api/v1/credentials/{c}/subscriptions/{s}/resourcegroups/{rg}/clusters/{name}`.

use crate::common::{HttpClient, cluster_path, node_pool_path};
use crate::error::FleetError;
use crate::models::*;
use crate::fleet_trait::FleetClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Fleet API client
#[derive(Debug)]
pub struct FleetClient {
    http: HttpClient,
}

impl FleetClient {
    /// Create a new fleet client
    ///
    /// # Arguments
    /// * `base_url` - Service base URL (e.g., "http://fleet-api:8080")
    /// * `token` - API token for bearer authentication
    pub fn new(base_url: String, token: String) -> Result<Self, FleetError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(FleetError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }
}

#[async_trait::async_trait]
impl FleetClientTrait for FleetClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by making a lightweight authenticated request.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and the service is reachable
    /// * `Err(FleetError)` - Token is invalid or the service is unreachable
    async fn validate_token(&self) -> Result<(), FleetError> {
        debug!("Validating fleet API token and connectivity");
        let _status: serde_json::Value = self.http.get("/api/v1/status", "status endpoint").await?;

        debug!("Token validated successfully");
        Ok(())
    }

    async fn create_node_pool(&self, pool: &NodePool) -> Result<NodePool, FleetError> {
        let path = format!("{}/nodepools", cluster_path(&pool.full_name.cluster()));
        debug!("Creating node pool {}", pool.full_name);
        self.http
            .post(&path, pool, &format!("node pool {}", pool.full_name))
            .await
    }

    async fn get_node_pool(&self, id: &NodePoolIdentity) -> Result<NodePool, FleetError> {
        self.http
            .get(&node_pool_path(id), &format!("node pool {}", id))
            .await
    }

    async fn list_node_pools(&self, cluster: &ClusterIdentity) -> Result<Vec<NodePool>, FleetError> {
        let path = format!("{}/nodepools", cluster_path(cluster));
        let list: ListResponse<NodePool> = self
            .http
            .get(&path, &format!("node pools of cluster {}", cluster))
            .await?;
        Ok(list.items)
    }

    async fn update_node_pool(&self, pool: &NodePool) -> Result<NodePool, FleetError> {
        debug!("Updating node pool {}", pool.full_name);
        self.http
            .put(
                &node_pool_path(&pool.full_name),
                pool,
                &format!("node pool {}", pool.full_name),
            )
            .await
    }

    async fn delete_node_pool(&self, id: &NodePoolIdentity) -> Result<(), FleetError> {
        debug!("Deleting node pool {}", id);
        self.http
            .delete(&node_pool_path(id), &format!("node pool {}", id))
            .await
    }

    async fn create_cluster(&self, cluster: &Cluster) -> Result<Cluster, FleetError> {
        let id = &cluster.full_name;
        let path = format!(
            "/api/v1/credentials/{}/subscriptions/{}/resourcegroups/{}/clusters",
            urlencoding::encode(&id.credential_name),
            urlencoding::encode(&id.subscription_id),
            urlencoding::encode(&id.resource_group_name),
        );
        debug!("Creating cluster {}", id);
        self.http
            .post(&path, cluster, &format!("cluster {}", id))
            .await
    }

    async fn get_cluster(&self, id: &ClusterIdentity) -> Result<Cluster, FleetError> {
        self.http
            .get(&cluster_path(id), &format!("cluster {}", id))
            .await
    }

    async fn update_cluster(&self, cluster: &Cluster) -> Result<Cluster, FleetError> {
        debug!("Updating cluster {}", cluster.full_name);
        self.http
            .put(
                &cluster_path(&cluster.full_name),
                cluster,
                &format!("cluster {}", cluster.full_name),
            )
            .await
    }

    async fn delete_cluster(&self, id: &ClusterIdentity) -> Result<(), FleetError> {
        debug!("Deleting cluster {}", id);
        self.http
            .delete(&cluster_path(id), &format!("cluster {}", id))
            .await
    }
}
