//! HTTP Remote Implementation
//!
//! Talks to the remote post API over HTTPS with a bearer token.
//!
//! # Features
//!
//! - Session verification before any delete is attempted
//! - Configurable endpoint and request timeout
//! - Every response or transport error folded into a `RemoteOutcome`
//!
//! # Examples
//!
//! ```no_run
//! use molt_domain::traits::{ClientFactory, DeletionClient};
//! use molt_domain::PostId;
//! use molt_remote::{HttpClientFactory, RemoteConfig};
//!
//! # async fn example() -> Result<(), molt_remote::RemoteError> {
//! let config = RemoteConfig {
//!     access_token: "token".to_string(),
//!     ..RemoteConfig::default()
//! };
//! let client = HttpClientFactory::new(config).connect().await?;
//! let outcome = client.delete(PostId::new(1050118621198921728)).await;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

use crate::api::outcome_for;
use crate::RemoteError;
use molt_domain::traits::{ClientFactory, DeletionClient};
use molt_domain::{PostId, RemoteOutcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default remote API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// Default timeout for a single remote request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the remote API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the API, without trailing slash
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer token for the account whose posts are retired
    #[serde(default)]
    pub access_token: String,

    /// Per-request timeout in seconds; a timeout is a transient failure
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            access_token: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl RemoteConfig {
    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

/// Authenticated client factory for the remote API
///
/// `connect` verifies the credentials once; a failure there aborts the run
/// before any delete is attempted.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    config: RemoteConfig,
}

impl HttpClientFactory {
    /// Create a factory for the given configuration
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    /// Establish and verify an authenticated session
    pub async fn connect(&self) -> Result<HttpDeletionClient, RemoteError> {
        if self.config.access_token.trim().is_empty() {
            return Err(RemoteError::ConnectionFailed(
                "no access token configured".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout())
            .build()
            .map_err(|e| RemoteError::ConnectionFailed(format!("Failed to build HTTP client: {}", e)))?;

        let url = self.config.endpoint("/1.1/account/verify_credentials.json");
        let response = client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| RemoteError::ConnectionFailed(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RemoteError::ConnectionFailed(format!(
                "Credential check rejected (HTTP {}): {}",
                status, error_text
            )));
        }

        tracing::debug!(api_base = %self.config.api_base, "Remote session established");

        Ok(HttpDeletionClient {
            config: self.config.clone(),
            client,
        })
    }
}

impl ClientFactory for HttpClientFactory {
    type Client = HttpDeletionClient;
    type Error = RemoteError;

    async fn connect(&self) -> Result<Self::Client, Self::Error> {
        HttpClientFactory::connect(self).await
    }
}

/// Remote deletion client over HTTP
///
/// Obtained from [`HttpClientFactory::connect`]; cheap to share across workers.
#[derive(Debug, Clone)]
pub struct HttpDeletionClient {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl HttpDeletionClient {
    /// Delete a post and classify the response
    pub async fn delete(&self, id: PostId) -> RemoteOutcome {
        let url = self
            .config
            .endpoint(&format!("/1.1/statuses/destroy/{}.json", id));

        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return RemoteOutcome::TransientFailure(format!("Request timed out: {}", e));
            }
            Err(e) => {
                return RemoteOutcome::TransientFailure(format!("Request failed: {}", e));
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                tracing::debug!(%id, "Delete succeeded but body was unreadable: {}", e);
                String::new()
            }
            Err(e) => return RemoteOutcome::TransientFailure(format!("HTTP {}: {}", status, e)),
        };

        outcome_for(status, &body)
    }
}

impl DeletionClient for HttpDeletionClient {
    async fn delete(&self, id: PostId) -> RemoteOutcome {
        HttpDeletionClient::delete(self, id).await
    }
}
