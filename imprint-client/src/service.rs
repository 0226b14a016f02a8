//! Registry service abstraction
//!
//! The registry core drives everything through this trait. [`crate::RegistryClient`]
//! implements it over HTTP; tests provide in-memory implementations.

use async_trait::async_trait;
use imprint_core::Labels;
use imprint_core::dto::build::{BuildHandle, BuildStatus};
use imprint_core::dto::iteration::IterationHandle;
use uuid::Uuid;

use crate::error::Result;

/// Remote operations on iterations and builds
///
/// "Already exists" is not an error: create-or-get calls report it through the
/// `already_existed` flag of the returned handle.
#[async_trait]
pub trait RegistryService: Send + Sync {
    /// Creates the iteration for `run_id` in the bucket, or returns the existing one
    async fn create_or_get_iteration(
        &self,
        bucket_slug: &str,
        run_id: &str,
    ) -> Result<IterationHandle>;

    /// Creates the build for a component in an iteration, or returns the existing one
    ///
    /// # Arguments
    /// * `iteration_id` - Remote id of the iteration
    /// * `component_type` - Component name, unique within the iteration
    /// * `run_uuid` - Identifies the process creating the build
    async fn create_or_get_build(
        &self,
        iteration_id: &str,
        component_type: &str,
        run_uuid: Uuid,
    ) -> Result<BuildHandle>;

    /// Fetches completion state and recorded labels of a build
    async fn get_build_status(&self, build_id: &str) -> Result<BuildStatus>;

    /// Replaces the labels recorded on a build
    async fn update_build_labels(&self, build_id: &str, labels: &Labels) -> Result<()>;

    /// Marks a build as done
    async fn complete_build(&self, build_id: &str) -> Result<()>;
}
