//! Build DTOs for registry communication

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::labels::Labels;

/// Request to create a build, or match an existing one, in an iteration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBuild {
    pub component_type: String,
    /// Identifies the process that created the build
    pub run_uuid: String,
}

/// Build as returned by the registry after create-or-get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildHandle {
    pub id: String,
    #[serde(default)]
    pub already_existed: bool,
}

/// Current state of a build on the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub done: bool,
    #[serde(default)]
    pub labels: Labels,
    /// Last time the registry changed the build
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request to replace the labels recorded on a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBuildLabels {
    pub labels: Labels,
}
