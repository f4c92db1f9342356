//! Provides clients for interacting with external APIs.
//!
//! Includes:
//! - `registry`: Client for an npm-compatible package registry.

mod registry;

pub use registry::*;
