//! Build labels
//!
//! Labels are string key/value pairs attached to a build. The registry merges
//! label sets from three places (bucket defaults, explicit overrides, labels
//! already recorded upstream) and the argument order of [`merge`] decides
//! which side wins.

use std::collections::HashMap;
use thiserror::Error;

/// Label map attached to a build
pub type Labels = HashMap<String, String>;

/// Merges two label sets
///
/// The result holds every key from both maps. When a key is present in both,
/// the value from `overlay` is kept.
///
/// # Example
/// ```
/// use imprint_core::labels::{merge, Labels};
///
/// let base = Labels::from([("version".to_string(), "1.7.0".to_string())]);
/// let overlay = Labels::from([("version".to_string(), "1.7.3".to_string())]);
///
/// assert_eq!(merge(&base, &overlay)["version"], "1.7.3");
/// ```
pub fn merge(base: &Labels, overlay: &Labels) -> Labels {
    let mut merged = base.clone();
    merged.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Error returned when a `key=value` label argument is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelParseError {
    #[error("label '{0}' must be in key=value form")]
    MissingSeparator(String),

    #[error("label '{0}' has an empty key")]
    EmptyKey(String),
}

/// Parses a single `key=value` label
///
/// Only the first `=` separates key from value, so values may contain `=`.
pub fn parse_label(raw: &str) -> Result<(String, String), LabelParseError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| LabelParseError::MissingSeparator(raw.to_string()))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(LabelParseError::EmptyKey(raw.to_string()));
    }

    Ok((key.to_string(), value.to_string()))
}
