//! Iteration-related API endpoints

use crate::RegistryClient;
use crate::error::Result;
use imprint_core::dto::iteration::{CreateIteration, IterationHandle};
use reqwest::Method;

impl RegistryClient {
    // =============================================================================
    // Iterations
    // =============================================================================

    /// Create the iteration for a build run, or match the existing one
    ///
    /// # Arguments
    /// * `bucket_slug` - Bucket the iteration belongs to
    /// * `run_id` - Fingerprint of the build run
    ///
    /// # Returns
    /// The iteration handle, flagged when the iteration already existed
    pub async fn create_or_get_iteration(
        &self,
        bucket_slug: &str,
        run_id: &str,
    ) -> Result<IterationHandle> {
        let response = self
            .request(Method::POST, &["buckets", bucket_slug, "iterations"])?
            .json(&CreateIteration {
                bucket_slug: bucket_slug.to_string(),
                run_id: run_id.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }
}
