//! Configuration module
//!
//! Handles CLI configuration: registry connection, bucket identity, the run
//! fingerprint and pipeline-wide default labels.

use anyhow::{Context, Result};
use imprint_core::Labels;
use imprint_core::labels::parse_label;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the registry service
    pub registry_url: String,

    /// Bearer token for the registry, if required
    pub token: Option<String>,

    /// Bucket slug, stable across runs of the same pipeline
    pub bucket_slug: String,

    /// Fingerprint identifying this run
    pub fingerprint: String,

    /// Labels applied to every build
    pub default_labels: Labels,

    /// Emit JSON instead of the coloured summary
    pub json: bool,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bucket_slug.trim().is_empty() {
            anyhow::bail!("bucket slug cannot be empty");
        }

        if self.fingerprint.trim().is_empty() {
            anyhow::bail!("build fingerprint cannot be empty");
        }

        if !self.registry_url.starts_with("http://") && !self.registry_url.starts_with("https://")
        {
            anyhow::bail!("registry_url must start with http:// or https://");
        }

        Ok(())
    }
}

/// Parses repeated `key=value` arguments into a label map
///
/// Later occurrences of a key replace earlier ones.
pub fn parse_labels(raw: &[String]) -> Result<Labels> {
    raw.iter()
        .map(|label| parse_label(label).with_context(|| format!("Invalid label '{}'", label)))
        .collect()
}
