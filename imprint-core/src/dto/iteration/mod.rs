//! Iteration DTOs for registry communication

use serde::{Deserialize, Serialize};

/// Request to create an iteration, or match an existing one, in a bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIteration {
    pub bucket_slug: String,
    /// Fingerprint of the build run
    pub run_id: String,
}

/// Iteration as returned by the registry after create-or-get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationHandle {
    pub id: String,
    /// True when the registry matched an iteration that was already there
    #[serde(default)]
    pub already_existed: bool,
}
