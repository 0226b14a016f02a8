//! Imprint Core
//!
//! Core types shared by the Imprint build registry components.
//!
//! This crate contains:
//! - Labels: the label map type and the merge rules applied to it
//! - Domain types: the per-component build record
//! - DTOs: Data transfer objects exchanged with the registry service

pub mod domain;
pub mod dto;
pub mod labels;

pub use labels::{LabelParseError, Labels};
