//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod builds;

use anyhow::Result;
use clap::Subcommand;
use imprint_client::RegistryClient;
use imprint_registry::{Bucket, CancellationToken};
use std::sync::Arc;
use tracing::warn;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile local state with the registry and show every build
    Populate {
        /// Component to track (repeatable)
        #[arg(short, long = "component", required = true)]
        components: Vec<String>,
    },
    /// Create the initial build of each component
    Create {
        /// Component to track (repeatable)
        #[arg(short, long = "component", required = true)]
        components: Vec<String>,
    },
    /// Report a component's build as finished
    Complete {
        /// Component whose build finished
        #[arg(short, long)]
        component: String,

        /// Label recorded on the finished build (key=value, repeatable)
        #[arg(long = "build-label", value_name = "KEY=VALUE")]
        build_labels: Vec<String>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler. Ctrl-C cancels any registry
/// call in flight.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let ctx = cancel_on_interrupt();

    match command {
        Commands::Populate { components } => {
            let bucket = open_bucket(config, &components);
            builds::populate(&bucket, &ctx, config).await
        }
        Commands::Create { components } => {
            let bucket = Arc::new(open_bucket(config, &components));
            builds::create(bucket, &ctx, config).await
        }
        Commands::Complete {
            component,
            build_labels,
        } => {
            let bucket = open_bucket(config, std::slice::from_ref(&component));
            builds::complete(&bucket, &ctx, config, &component, &build_labels).await
        }
    }
}

/// Builds a bucket for the configured pipeline and registers the components
fn open_bucket(config: &Config, components: &[String]) -> Bucket {
    let mut client = RegistryClient::new(&config.registry_url);
    if let Some(token) = &config.token {
        client = client.with_token(token);
    }

    let bucket = Bucket::new(&config.bucket_slug, &config.fingerprint, Arc::new(client))
        .with_default_labels(config.default_labels.clone());

    for component in components {
        bucket.register_build_for_component(component);
    }

    bucket
}

/// Returns a token that is cancelled on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let ctx = CancellationToken::new();
    let trigger = ctx.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling registry calls");
            trigger.cancel();
        }
    });

    ctx
}
