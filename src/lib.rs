//! # uniweb
//!
//! Command-line entry point for managing uniweb sites and modules.
//!
//! The crate itself only bootstraps a session: it resolves its own package
//! descriptor, checks (without blocking) whether a newer version is published,
//! and hands an argument parser to a [`cli::CommandHandler`] that supplies the
//! actual subcommands. Any failure along the way ends the invocation with a single
//! `Fatal error:` line and exit status 1.
//!
//! ## Example
//!
//! ```no_run
//! use uniweb_cli::{cli::BuiltinHandler, config::AppConfig, run_cli, session::PackageJsonProvider};
//!
//! # async fn demo() -> uniweb_cli::error::Result<()> {
//! let config = AppConfig::from_env()?;
//! let provider = PackageJsonProvider::from_path_override(config.package_json.as_deref());
//! let outcome = run_cli(&config, std::env::args().collect(), &provider, &BuiltinHandler).await;
//! std::process::exit(outcome.exit_code().into());
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

use crate::cli::{CommandHandler, Dispatcher, ExitStatus, Toolkit};
use crate::config::{strip_opt_out_flag, AppConfig};
use crate::error::AppError;
use crate::session::{Bootstrapper, MetadataProvider};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status for any fatal error.
pub const FATAL_EXIT_CODE: ExitStatus = 1;

/// How an invocation ended.
#[derive(Debug)]
pub enum Outcome {
    /// A subcommand (or clap itself) finished with this status.
    Success(ExitStatus),
    /// Bootstrap, registration or dispatch failed.
    FatalError(AppError),
}

impl Outcome {
    pub fn exit_code(&self) -> ExitStatus {
        match self {
            Outcome::Success(code) => *code,
            Outcome::FatalError(_) => FATAL_EXIT_CODE,
        }
    }
}

/// Initializes logging to stderr, filtered by `RUST_LOG` (errors only by default).
pub fn setup_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs one invocation: bootstrap, registration, dispatch.
///
/// `args` includes the program name. Errors are returned as
/// [`Outcome::FatalError`]; printing them is left to the caller.
pub async fn run_cli(
    config: &AppConfig,
    args: Vec<String>,
    provider: &dyn MetadataProvider,
    handler: &dyn CommandHandler,
) -> Outcome {
    let (args, opted_out) = strip_opt_out_flag(args);
    let toolkit = Toolkit::new();

    debug!("Phase: initializing");
    let session = match Bootstrapper::new(config, toolkit.clone()).start(provider, !opted_out) {
        Ok(session) => session,
        Err(e) => return Outcome::FatalError(e),
    };

    let mut dispatcher = Dispatcher::initialize(session.info.clone(), toolkit.clone());
    let result = match dispatcher.register_commands(handler) {
        Ok(()) => {
            debug!("Phase: dispatching");
            dispatcher.run(args).await
        },
        Err(e) => Err(e),
    };

    // The command is done; let an in-flight registry query land before exit.
    session
        .pending
        .settle(config.update_check.settle_timeout)
        .await;
    session
        .notices
        .flush(&toolkit, config.update_check.is_global);

    match result {
        Ok(code) => {
            debug!("Phase: finished with status {}", code);
            Outcome::Success(code)
        },
        Err(e) => Outcome::FatalError(e),
    }
}

/// Prints the single user-facing line for a fatal error and returns its exit status.
pub fn report_fatal(err: &AppError) -> ExitStatus {
    debug!("Invocation aborted: {:?}", err);
    eprintln!("Fatal error: {}", err);
    FATAL_EXIT_CODE
}
