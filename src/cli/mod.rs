//! Handles Command Line Interface (CLI) related functionalities.
//!
//! Includes the dispatcher that owns the argument parser, the handler and action
//! traits subcommands are plugged in through, the rendering toolkit handed to them,
//! and the commands built into the binary.

mod commands;
mod dispatcher;
mod toolkit;

pub use commands::*;
pub use dispatcher::*;
pub use toolkit::*;
