//! Core domain types
//!
//! This module contains the domain structures tracked locally for one build
//! run. They are shared between the registry core (which mutates them) and the
//! CLI (which reports them).

pub mod build;
