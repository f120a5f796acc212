//! Common utilities for the fleet API client
//!
//! Provides the authenticated HTTP wrapper and the status-code mapping
//! shared by every endpoint.

use crate::error::FleetError;
use crate::models::{ClusterIdentity, NodePoolIdentity};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client wrapper with authentication
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, FleetError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        decode(check_status(response, what).await?).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T, FleetError> {
        let url = self.build_url(path);
        debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        decode(check_status(response, what).await?).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &str,
    ) -> Result<T, FleetError> {
        let url = self.build_url(path);
        debug!("PUT {}", url);

        let response = self
            .authorized(self.client.put(&url))
            .json(body)
            .send()
            .await?;
        decode(check_status(response, what).await?).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, what: &str) -> Result<(), FleetError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.authorized(self.client.delete(&url)).send().await?;
        check_status(response, what).await?;
        Ok(())
    }
}

/// Map a non-success HTTP status onto the error taxonomy
pub async fn check_status(response: Response, what: &str) -> Result<Response, FleetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => FleetError::NotFound(what.to_string()),
        StatusCode::CONFLICT => FleetError::AlreadyExists(format!("{} - {}", what, body)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            FleetError::Invalid(format!("{} - {}", what, body))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FleetError::Authentication(format!("{} - {}", status, body))
        }
        _ => FleetError::Api(format!("{}: {} - {}", what, status, body)),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FleetError> {
    // Keep the body around so decoding failures say what the service sent
    let response_text = response.text().await?;
    serde_json::from_str(&response_text).map_err(|e| {
        FleetError::Api(format!(
            "error decoding response body: {} - Response (first 500 chars): {}",
            e,
            response_text.chars().take(500).collect::<String>()
        ))
    })
}

/// Collection path for a cluster's resources
pub fn cluster_path(id: &ClusterIdentity) -> String {
    format!(
        "/api/v1/credentials/{}/subscriptions/{}/resourcegroups/{}/clusters/{}",
        urlencoding::encode(&id.credential_name),
        urlencoding::encode(&id.subscription_id),
        urlencoding::encode(&id.resource_group_name),
        urlencoding::encode(&id.cluster_name),
    )
}

/// Path of a single node pool
pub fn node_pool_path(id: &NodePoolIdentity) -> String {
    format!(
        "{}/nodepools/{}",
        cluster_path(&id.cluster()),
        urlencoding::encode(&id.name)
    )
}
