//! Bucket
//!
//! The pipeline driver's handle on the registry for one run. A bucket owns the
//! run's [`Iteration`], the pipeline-wide default labels, and the client used
//! to create and reconcile builds upstream.
//!
//! Label precedence:
//! - a new build starts with a copy of the default labels
//! - explicit overrides win over the build's current labels
//! - when reconciling with an existing upstream build, the default labels win
//!   over what the registry recorded, but registry-only keys are kept
//! - a build that is already done upstream keeps no labels locally

use chrono::Utc;
use imprint_client::RegistryService;
use imprint_core::Labels;
use imprint_core::domain::build::BuildRecord;
use imprint_core::labels::merge;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cancel::with_cancel;
use crate::error::{RegistryError, Result};
use crate::iteration::Iteration;

/// Registry state for one pipeline run
///
/// Share it between workers behind an `Arc`. Each worker is expected to own
/// one component; calls for different components run in parallel.
pub struct Bucket {
    /// Stable identifier of the pipeline
    slug: String,
    /// Labels applied to every build unless overridden
    default_labels: Labels,
    iteration: Iteration,
    client: Arc<dyn RegistryService>,
}

impl std::fmt::Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bucket")
            .field("slug", &self.slug)
            .field("default_labels", &self.default_labels)
            .field("iteration", &self.iteration)
            .finish_non_exhaustive()
    }
}

impl Bucket {
    /// Creates a bucket with an empty iteration for the given run fingerprint
    ///
    /// # Arguments
    /// * `slug` - Stable identifier of the pipeline
    /// * `run_id` - Fingerprint of this run, as supplied by the environment
    /// * `client` - Registry service used for all remote calls
    pub fn new(
        slug: impl Into<String>,
        run_id: impl Into<String>,
        client: Arc<dyn RegistryService>,
    ) -> Self {
        Self {
            slug: slug.into(),
            default_labels: Labels::new(),
            iteration: Iteration::new(run_id),
            client,
        }
    }

    /// Sets the pipeline-wide default labels
    pub fn with_default_labels(mut self, labels: Labels) -> Self {
        self.default_labels = labels;
        self
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Changes the slug
    ///
    /// Fails once the iteration exists remotely, since builds are already
    /// recorded under the old slug.
    pub fn set_slug(&mut self, slug: impl Into<String>) -> Result<()> {
        if self.iteration.remote_id().is_some() {
            return Err(RegistryError::SlugLocked(self.slug.clone()));
        }
        self.slug = slug.into();
        Ok(())
    }

    pub fn default_labels(&self) -> &Labels {
        &self.default_labels
    }

    pub fn default_labels_mut(&mut self) -> &mut Labels {
        &mut self.default_labels
    }

    pub fn iteration(&self) -> &Iteration {
        &self.iteration
    }

    /// Snapshot of the build record for a component
    pub fn build(&self, name: &str) -> Option<BuildRecord> {
        self.iteration.load(name)
    }

    /// Snapshot of all build records, sorted by component name
    pub fn builds(&self) -> Vec<BuildRecord> {
        self.iteration.builds()
    }

    /// Registered components that still have to be built
    pub fn pending_components(&self) -> Vec<String> {
        self.iteration
            .builds()
            .into_iter()
            .filter(|record| !record.done)
            .map(|record| record.component_type)
            .collect()
    }

    // =============================================================================
    // Registration
    // =============================================================================

    /// Registers a component that this run is expected to build
    pub fn register_build_for_component(&self, name: &str) {
        self.iteration.register_component(name);
        debug!(component = %name, "Registered component");
    }

    /// Creates the iteration upstream, or matches the existing one
    ///
    /// Safe to call repeatedly and from several workers at once; the registry
    /// is asked only until one call succeeds.
    pub async fn initialize(&self, ctx: &CancellationToken) -> Result<&str> {
        self.iteration
            .remote_id_or_try_init(move || async move {
                let handle = with_cancel(
                    ctx,
                    self.client
                        .create_or_get_iteration(&self.slug, self.iteration.run_id()),
                )
                .await
                .map_err(RegistryError::Iteration)?;

                info!(
                    bucket = %self.slug,
                    iteration = %handle.id,
                    existing = handle.already_existed,
                    "Iteration ready"
                );
                Ok::<_, RegistryError>(handle.id)
            })
            .await
    }

    /// Creates the initial upstream build for a registered component
    ///
    /// The build starts with a copy of the bucket's default labels. A build
    /// that is already done keeps its record and nothing is sent.
    ///
    /// # Errors
    /// * [`RegistryError::Registration`] if the component was never registered
    /// * [`RegistryError::Iteration`] / [`RegistryError::Remote`] if a registry call fails
    pub async fn create_initial_build_for_iteration(
        &self,
        ctx: &CancellationToken,
        name: &str,
    ) -> Result<()> {
        let Some(record) = self.iteration.load(name) else {
            return Err(RegistryError::Registration(name.to_string()));
        };

        if record.done {
            debug!(component = %name, "Build already done");
            return Ok(());
        }

        let iteration_id = self.initialize(ctx).await?;
        let handle = with_cancel(
            ctx,
            self.client
                .create_or_get_build(iteration_id, name, self.iteration.run_uuid()),
        )
        .await
        .map_err(|source| RegistryError::remote(name, source))?;

        info!(component = %name, build = %handle.id, "Created initial build");

        self.iteration
            .store(name, self.new_record(name, handle.id, self.default_labels.clone()));
        Ok(())
    }

    /// Merges explicit labels into a build's current labels
    ///
    /// `overrides` win on conflicting keys. Only local state changes; the
    /// labels reach the registry through [`Bucket::complete_build`]. Builds
    /// that are already done are left untouched.
    ///
    /// # Errors
    /// * [`RegistryError::NotFound`] if the component has no build yet
    pub fn update_labels_for_build(&self, name: &str, overrides: &Labels) -> Result<()> {
        let updated = self.iteration.update(name, |record| {
            if !record.is_registered_remotely() {
                return false;
            }
            if record.done {
                warn!(component = %name, "Ignoring label update for finished build");
            } else {
                record.labels = merge(&record.labels, overrides);
                debug!(component = %name, labels = record.labels.len(), "Updated build labels");
            }
            true
        });

        match updated {
            Some(true) => Ok(()),
            _ => Err(RegistryError::NotFound(name.to_string())),
        }
    }

    /// Reports a build as finished
    ///
    /// Merges `overrides` into the build's labels, pushes them to the
    /// registry, marks the build done upstream and then locally. Completing a
    /// build that is already done is a no-op.
    ///
    /// # Returns
    /// The finished build record
    pub async fn complete_build(
        &self,
        ctx: &CancellationToken,
        name: &str,
        overrides: &Labels,
    ) -> Result<BuildRecord> {
        let record = self
            .iteration
            .load(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if record.done {
            debug!(component = %name, "Build already done");
            return Ok(record);
        }

        let Some(build_id) = record.remote_id.as_deref() else {
            return Err(RegistryError::NotFound(name.to_string()));
        };

        let labels = merge(&record.labels, overrides);
        with_cancel(ctx, self.client.update_build_labels(build_id, &labels))
            .await
            .map_err(|source| RegistryError::remote(name, source))?;
        with_cancel(ctx, self.client.complete_build(build_id))
            .await
            .map_err(|source| RegistryError::remote(name, source))?;

        let finished = BuildRecord {
            labels,
            done: true,
            completed_at: Some(Utc::now()),
            ..record
        };
        self.iteration.store(name, finished.clone());

        info!(component = %name, build = ?finished.remote_id, "Build completed");
        Ok(finished)
    }

    // =============================================================================
    // Reconciliation
    // =============================================================================

    /// Aligns local build records with what the registry already holds
    ///
    /// Used when the run may be a retry of an earlier one. For every
    /// registered component the build is created upstream if missing; an
    /// existing build that is done is recorded as done with no labels, and an
    /// unfinished one gets the default labels merged over its recorded labels.
    ///
    /// Components are processed in name order. On failure, records already
    /// reconciled stay in place; running this again picks up where it left off
    /// and yields the same state.
    pub async fn populate_iteration(&self, ctx: &CancellationToken) -> Result<()> {
        let iteration_id = self.initialize(ctx).await?;

        for name in self.iteration.components() {
            if self.iteration.load(&name).is_some_and(|record| record.done) {
                debug!(component = %name, "Skipping finished build");
                continue;
            }
            self.reconcile_component(ctx, iteration_id, &name).await?;
        }

        Ok(())
    }

    async fn reconcile_component(
        &self,
        ctx: &CancellationToken,
        iteration_id: &str,
        name: &str,
    ) -> Result<()> {
        let handle = with_cancel(
            ctx,
            self.client
                .create_or_get_build(iteration_id, name, self.iteration.run_uuid()),
        )
        .await
        .map_err(|source| RegistryError::remote(name, source))?;

        if !handle.already_existed {
            info!(component = %name, build = %handle.id, "Created initial build");
            self.iteration
                .store(name, self.new_record(name, handle.id, self.default_labels.clone()));
            return Ok(());
        }

        let status = with_cancel(ctx, self.client.get_build_status(&handle.id))
            .await
            .map_err(|source| RegistryError::remote(name, source))?;

        let record = if status.done {
            info!(
                component = %name,
                build = %handle.id,
                updated_at = ?status.updated_at,
                "Build already done upstream"
            );
            BuildRecord {
                done: true,
                ..self.new_record(name, handle.id, Labels::new())
            }
        } else {
            info!(
                component = %name,
                build = %handle.id,
                recorded = status.labels.len(),
                updated_at = ?status.updated_at,
                "Resuming unfinished build"
            );
            let labels = merge(&status.labels, &self.default_labels);
            self.new_record(name, handle.id, labels)
        };

        self.iteration.store(name, record);
        Ok(())
    }

    fn new_record(&self, name: &str, remote_id: String, labels: Labels) -> BuildRecord {
        BuildRecord {
            labels,
            remote_id: Some(remote_id),
            ..BuildRecord::placeholder(name)
        }
    }
}
