//! Build domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::labels::Labels;

/// Build metadata for one component of an iteration
///
/// A record starts as a placeholder when the component is registered, gets its
/// labels and remote id once the build exists upstream, and is finalized when
/// the build is reported as done. Records are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    /// Component name (e.g. "amazon-ebs.ubuntu"); fixed at creation
    pub component_type: String,

    /// Effective metadata for the build
    #[serde(default)]
    pub labels: Labels,

    /// Set once the registry reports the build as finished
    #[serde(default)]
    pub done: bool,

    /// Identifier assigned by the registry service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    /// When this process reported the build as complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BuildRecord {
    /// Creates an empty record for a freshly registered component
    pub fn placeholder(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            labels: Labels::new(),
            done: false,
            remote_id: None,
            completed_at: None,
        }
    }

    /// Whether the registry service knows about this build yet
    pub fn is_registered_remotely(&self) -> bool {
        self.remote_id.is_some()
    }
}
