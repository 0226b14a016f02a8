//! Build-related API endpoints

use crate::RegistryClient;
use crate::error::Result;
use imprint_core::Labels;
use imprint_core::dto::build::{BuildHandle, BuildStatus, CreateBuild, UpdateBuildLabels};
use reqwest::Method;
use uuid::Uuid;

impl RegistryClient {
    // =============================================================================
    // Build Lifecycle
    // =============================================================================

    /// Create the build for a component, or match the existing one
    ///
    /// # Arguments
    /// * `iteration_id` - Remote id of the iteration
    /// * `component_type` - Component name
    /// * `run_uuid` - Identifies the process creating the build
    pub async fn create_or_get_build(
        &self,
        iteration_id: &str,
        component_type: &str,
        run_uuid: Uuid,
    ) -> Result<BuildHandle> {
        let response = self
            .request(Method::POST, &["iterations", iteration_id, "builds"])?
            .json(&CreateBuild {
                component_type: component_type.to_string(),
                run_uuid: run_uuid.to_string(),
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get the completion state and labels of a build
    pub async fn get_build_status(&self, build_id: &str) -> Result<BuildStatus> {
        let response = self.request(Method::GET, &["builds", build_id])?.send().await?;

        self.handle_response(response).await
    }

    /// Replace the labels recorded on a build
    pub async fn update_build_labels(&self, build_id: &str, labels: &Labels) -> Result<()> {
        let response = self
            .request(Method::PUT, &["builds", build_id, "labels"])?
            .json(&UpdateBuildLabels {
                labels: labels.clone(),
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }

    /// Mark a build as done
    pub async fn complete_build(&self, build_id: &str) -> Result<()> {
        let response = self
            .request(Method::POST, &["builds", build_id, "complete"])?
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
