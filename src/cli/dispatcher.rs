//! Owns the argument parser, lets a command handler populate it, then parses the
//! argument vector and runs whichever subcommand matched.

use crate::cli::Toolkit;
use crate::error::{AppError, Result};
use crate::models::SessionInfo;
use async_trait::async_trait;
use clap::{ArgMatches, Command};
use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::Arc;
use tracing::{debug, info};

/// Exit status reported by a subcommand.
pub type ExitStatus = u8;

/// What a subcommand sees when it runs.
pub struct ActionContext<'a> {
    /// Matches of the subcommand itself, not of the top-level parser.
    pub matches: &'a ArgMatches,
    pub session: &'a SessionInfo,
    pub toolkit: &'a Toolkit,
}

/// Body of one subcommand.
#[async_trait]
pub trait CommandAction: Send + Sync {
    async fn run(&self, ctx: ActionContext<'_>) -> anyhow::Result<ExitStatus>;
}

/// Populates a parser with subcommands.
///
/// The parser is lent for the duration of the call only. Implementations report
/// problems by returning an error; they must not exit the process.
pub trait CommandHandler {
    fn register_commands(
        &self,
        parser: &mut Parser,
        session: &SessionInfo,
        toolkit: &Toolkit,
    ) -> anyhow::Result<()>;
}

/// A `clap::Command` plus the action bound to each of its subcommands.
pub struct Parser {
    command: Command,
    actions: HashMap<String, Arc<dyn CommandAction>>,
}

impl Parser {
    /// An empty parser named `bin_name`.
    pub fn new(bin_name: &str) -> Self {
        Self {
            command: Command::new(bin_name.to_string()),
            actions: HashMap::new(),
        }
    }

    /// Sets the name, about text and version shown by `--help` / `--version`.
    pub fn identify(&mut self, name: &str, about: &str, version: &str) -> &mut Self {
        self.update(|cmd| {
            cmd.name(name.to_string())
                .about(about.to_string())
                .version(version.to_string())
        })
    }

    /// Registers `subcommand` and the action that runs when it matches.
    ///
    /// Registering the same name twice replaces the earlier definition.
    pub fn subcommand<A>(&mut self, subcommand: Command, action: A) -> &mut Self
    where
        A: CommandAction + 'static,
    {
        let name = subcommand.get_name().to_string();
        if self.actions.contains_key(&name) {
            self.update(|cmd| cmd.mut_subcommand(name.clone(), |_| subcommand.clone()));
        } else {
            self.update(|cmd| cmd.subcommand(subcommand.clone()));
        }
        self.actions.insert(name, Arc::new(action));
        self
    }

    pub fn subcommand_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    fn update(&mut self, f: impl FnOnce(Command) -> Command) -> &mut Self {
        let command = std::mem::take(&mut self.command);
        self.command = f(command);
        self
    }
}

/// Drives one invocation from registration to the matched subcommand.
pub struct Dispatcher {
    parser: Parser,
    session: SessionInfo,
    toolkit: Toolkit,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty parser.
    pub fn initialize(session: SessionInfo, toolkit: Toolkit) -> Self {
        let parser = Parser::new(&session.name);
        Self {
            parser,
            session,
            toolkit,
        }
    }

    pub fn register_commands(&mut self, handler: &dyn CommandHandler) -> Result<()> {
        handler
            .register_commands(&mut self.parser, &self.session, &self.toolkit)
            .map_err(|e| AppError::Registration(Arc::new(e)))?;
        debug!(
            "Registered subcommands: {:?}",
            self.parser.subcommand_names()
        );
        Ok(())
    }

    /// Parses `args` (including the program name) and runs the matched subcommand.
    ///
    /// Help, version and usage errors are printed by clap and reported as exit
    /// statuses, not errors. With no subcommand, the help text is printed.
    pub async fn run<I, T>(mut self, args: I) -> Result<ExitStatus>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.parser.command.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(e) => {
                let _ = e.print();
                return Ok(e.exit_code().clamp(0, 255) as ExitStatus);
            },
        };

        let Some((name, sub_matches)) = matches.subcommand() else {
            self.parser
                .command
                .print_help()
                .map_err(|e| AppError::Dispatch(Arc::new(e.into())))?;
            println!();
            return Ok(0);
        };

        let action = self.parser.actions.get(name).cloned().ok_or_else(|| {
            AppError::Dispatch(Arc::new(anyhow::anyhow!(
                "no action registered for subcommand '{}'",
                name
            )))
        })?;

        info!("Dispatching subcommand '{}'", name);
        let ctx = ActionContext {
            matches: sub_matches,
            session: &self.session,
            toolkit: &self.toolkit,
        };
        action
            .run(ctx)
            .await
            .map_err(|e| AppError::Dispatch(Arc::new(e)))
    }
}
