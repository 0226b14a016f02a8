//! Imprint Registry Client
//!
//! A type-safe client for the remote build registry service.
//!
//! The registry core only talks to the service through the [`RegistryService`]
//! trait, so tests and alternative transports can stand in for the HTTP
//! implementation provided here.
//!
//! # Example
//!
//! ```no_run
//! use imprint_client::{RegistryClient, RegistryService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RegistryClient::new("http://localhost:8080");
//!
//!     let iteration = client
//!         .create_or_get_iteration("ubuntu-base", "c0ffee")
//!         .await?;
//!
//!     println!("Iteration: {} (existing: {})", iteration.id, iteration.already_existed);
//!     Ok(())
//! }
//! ```

mod builds;
pub mod error;
mod iterations;
pub mod service;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use imprint_core::dto::build::{BuildHandle, BuildStatus};
pub use imprint_core::dto::iteration::IterationHandle;
pub use service::RegistryService;

use async_trait::async_trait;
use imprint_core::Labels;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

/// HTTP client for the registry API
///
/// Endpoints are grouped by resource:
/// - Iterations (create or match by fingerprint)
/// - Builds (create or match, status, labels, completion)
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Base URL of the registry (e.g., "http://localhost:8080")
    base_url: String,
    /// Bearer token attached to every request, if any
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl RegistryClient {
    /// Create a new registry client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the registry API (e.g., "http://localhost:8080")
    ///
    /// # Example
    /// ```
    /// use imprint_client::RegistryClient;
    ///
    /// let client = RegistryClient::new("http://localhost:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new registry client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use imprint_client::RegistryClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = RegistryClient::with_client("http://localhost:8080", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the registry
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a request against `{base_url}/api/{segments...}`
    ///
    /// Each segment is percent-encoded on its own, so slugs and ids holding
    /// `/`, `?` or spaces stay inside their segment.
    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);

        debug!(%method, %url, "Registry request");
        let builder = self.client.request(method, url);

        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
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

    /// Handle an API response that returns no content
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}

#[async_trait]
impl RegistryService for RegistryClient {
    async fn create_or_get_iteration(
        &self,
        bucket_slug: &str,
        run_id: &str,
    ) -> Result<IterationHandle> {
        RegistryClient::create_or_get_iteration(self, bucket_slug, run_id).await
    }

    async fn create_or_get_build(
        &self,
        iteration_id: &str,
        component_type: &str,
        run_uuid: Uuid,
    ) -> Result<BuildHandle> {
        RegistryClient::create_or_get_build(self, iteration_id, component_type, run_uuid).await
    }

    async fn get_build_status(&self, build_id: &str) -> Result<BuildStatus> {
        RegistryClient::get_build_status(self, build_id).await
    }

    async fn update_build_labels(&self, build_id: &str, labels: &Labels) -> Result<()> {
        RegistryClient::update_build_labels(self, build_id, labels).await
    }

    async fn complete_build(&self, build_id: &str) -> Result<()> {
        RegistryClient::complete_build(self, build_id).await
    }
}
