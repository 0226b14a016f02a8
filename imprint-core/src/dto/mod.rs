//! Data Transfer Objects for registry communication
//!
//! This module contains the request and response bodies exchanged with the
//! registry service. The domain types in [`crate::domain`] are what the
//! registry core keeps locally; these are what travels over the wire.

pub mod build;
pub mod iteration;
