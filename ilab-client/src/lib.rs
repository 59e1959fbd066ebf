//! iLab pipeline server client
//!
//! A small, typed HTTP client for the Kubeflow Pipelines v2 API exposed by a
//! Data Science Pipelines server. It covers what the verification harness
//! needs: listing pipelines, creating runs and reading run state.
//!
//! # Example
//!
//! ```no_run
//! use ilab_client::PipelineServerClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PipelineServerClient::new("https://ds-pipeline.example.com", "sha256~token");
//!
//!     let pipelines = client.list_pipelines_by_name("ilab-pipeline").await?;
//!     for pipeline in pipelines {
//!         println!("{} {}", pipeline.id, pipeline.display_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipelines;
mod runs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;

/// Path prefix of the pipeline server's v2 API
pub const API_PREFIX: &str = "/apis/v2beta1";

/// HTTP client for the pipeline server API
///
/// Every request is authenticated with the bearer token given at
/// construction. The token is never printed by `Debug`.
#[derive(Clone)]
pub struct PipelineServerClient {
    /// Base URL of the pipeline server (e.g., "https://ds-pipeline-dspa.apps.example.com")
    base_url: String,
    /// Bearer token sent with every request
    token: String,
    /// HTTP client instance
    client: Client,
}

impl fmt::Debug for PipelineServerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineServerClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl PipelineServerClient {
    /// Create a new pipeline server client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the pipeline server
    /// * `token` - Bearer token presented with every request
    ///
    /// # Example
    /// ```
    /// use ilab_client::PipelineServerClient;
    ///
    /// let client = PipelineServerClient::new("http://localhost:8888", "token");
    /// ```
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use ilab_client::PipelineServerClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client =
    ///     PipelineServerClient::with_client("http://localhost:8888", "token", http_client);
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the pipeline server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success statuses become `ClientError::ApiError` carrying the
    /// response body verbatim, so server diagnostics reach the caller intact.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
