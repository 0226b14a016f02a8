//! Build command handlers
//!
//! Handles creating, reconciling and completing builds for the components of
//! a pipeline run.

use anyhow::{Context, Result};
use imprint_registry::{Bucket, CancellationToken};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;

use crate::config::{Config, parse_labels};
use crate::output::print_builds;

/// Reconcile with the registry and print every build
pub async fn populate(bucket: &Bucket, ctx: &CancellationToken, config: &Config) -> Result<()> {
    bucket
        .populate_iteration(ctx)
        .await
        .context("Failed to populate iteration")?;

    let pending = bucket.pending_components();
    info!("{} component(s) left to build", pending.len());

    print_builds(&bucket.builds(), config.json)
}

/// Create the initial build of every component, one task per component
pub async fn create(bucket: Arc<Bucket>, ctx: &CancellationToken, config: &Config) -> Result<()> {
    bucket
        .initialize(ctx)
        .await
        .context("Failed to create iteration")?;

    let mut tasks = JoinSet::new();
    for component in bucket.iteration().components() {
        let bucket = Arc::clone(&bucket);
        let ctx = ctx.clone();
        tasks.spawn(async move {
            bucket
                .create_initial_build_for_iteration(&ctx, &component)
                .await
                .with_context(|| format!("Failed to create build for '{}'", component))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        joined.context("Build task panicked")??;
    }

    print_builds(&bucket.builds(), config.json)
}

/// Report a build as finished with the given labels
pub async fn complete(
    bucket: &Bucket,
    ctx: &CancellationToken,
    config: &Config,
    component: &str,
    build_labels: &[String],
) -> Result<()> {
    let overrides = parse_labels(build_labels)?;

    bucket
        .populate_iteration(ctx)
        .await
        .context("Failed to populate iteration")?;

    let finished = bucket
        .complete_build(ctx, component, &overrides)
        .await
        .with_context(|| format!("Failed to complete build for '{}'", component))?;

    print_builds(&[finished], config.json)
}
