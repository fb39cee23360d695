//! Core types for StoreLens.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod vocab;

pub use id::*;
pub use vocab::*;
