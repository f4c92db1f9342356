//! Defines the data structures used throughout the application.
//!
//! This includes the package descriptor read at startup, the session record handed
//! to command handlers, and the structures exchanged with the package registry.

mod package;
mod update;

pub use package::*;
pub use update::*;
