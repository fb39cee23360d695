//! StoreLens Core - Shared types library.
//!
//! This crate provides common types used across all StoreLens components:
//! - `api` - Analytics REST API and agent query layer
//! - `cli` - Command-line tools for migrations, seeding and ad hoc queries
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the closed vocabularies
//!   stored on sessions, page views and purchases

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
