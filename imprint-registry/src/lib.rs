//! Imprint Registry
//!
//! Tracks build metadata for one run of a multi-component image pipeline and
//! keeps it in sync with the remote build registry.
//!
//! Architecture:
//! - [`Iteration`]: concurrent map of per-component build records for the run
//! - [`Bucket`]: pipeline-wide handle that owns the iteration, holds default
//!   labels and drives creation and reconciliation against the registry
//! - [`RegistryError`]: failures surfaced to the pipeline driver
//!
//! All remote traffic goes through [`imprint_client::RegistryService`]; every
//! call is raced against the caller's [`CancellationToken`].

mod bucket;
mod cancel;
pub mod error;
mod iteration;

#[cfg(test)]
mod mock;

pub use bucket::Bucket;
pub use error::{RegistryError, Result};
pub use iteration::Iteration;
pub use tokio_util::sync::CancellationToken;
