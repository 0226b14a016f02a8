//! Imprint CLI
//!
//! Command-line driver for the build registry: registers the components of a
//! pipeline run, creates or reconciles their builds upstream, and reports
//! completed builds.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "imprint")]
#[command(about = "Image build registry CLI", long_about = None)]
struct Cli {
    /// Registry URL
    #[arg(long, env = "IMPRINT_REGISTRY_URL", default_value = "http://localhost:8080")]
    registry_url: String,

    /// Bearer token for the registry
    #[arg(long, env = "IMPRINT_REGISTRY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Bucket slug identifying the pipeline
    #[arg(long, env = "IMPRINT_BUCKET")]
    bucket: String,

    /// Fingerprint of this build run
    #[arg(long, env = "IMPRINT_BUILD_FINGERPRINT")]
    fingerprint: String,

    /// Default label applied to every build (key=value, repeatable)
    #[arg(short, long = "label", value_name = "KEY=VALUE")]
    labels: Vec<String>,

    /// Print build records as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imprint=info,imprint_registry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        registry_url: cli.registry_url,
        token: cli.token,
        bucket_slug: cli.bucket,
        fingerprint: cli.fingerprint,
        default_labels: config::parse_labels(&cli.labels)?,
        json: cli.json,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
