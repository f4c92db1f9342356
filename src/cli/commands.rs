use crate::cli::{ActionContext, CommandAction, CommandHandler, ExitStatus, Parser, Toolkit};
use crate::models::SessionInfo;
use async_trait::async_trait;
use clap::{Arg, ArgAction, Command};
use tracing::debug;

/// Commands that ship with the binary itself.
///
/// Site and module management comes from an external tool handler; this one only
/// describes the installation.
pub struct BuiltinHandler;

impl CommandHandler for BuiltinHandler {
    fn register_commands(
        &self,
        parser: &mut Parser,
        session: &SessionInfo,
        _toolkit: &Toolkit,
    ) -> anyhow::Result<()> {
        parser
            .identify(&session.name, &session.description, &session.version)
            .subcommand(
                Command::new("info")
                    .about("Show the installed package and its version")
                    .arg(
                        Arg::new("json")
                            .long("json")
                            .action(ArgAction::SetTrue)
                            .help("Print the session record as JSON"),
                    ),
                InfoCommand,
            )
            .subcommand(
                Command::new("peers").about("List the declared peer dependencies"),
                PeersCommand,
            );
        Ok(())
    }
}

/// `uniweb info [--json]`
pub struct InfoCommand;

#[async_trait]
impl CommandAction for InfoCommand {
    async fn run(&self, ctx: ActionContext<'_>) -> anyhow::Result<ExitStatus> {
        if ctx.matches.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(ctx.session)?);
            return Ok(0);
        }

        println!("{}", render_info(ctx.session, ctx.toolkit));
        Ok(0)
    }
}

/// `uniweb peers`
pub struct PeersCommand;

#[async_trait]
impl CommandAction for PeersCommand {
    async fn run(&self, ctx: ActionContext<'_>) -> anyhow::Result<ExitStatus> {
        debug!(
            "Listing {} peer dependencies",
            ctx.session.peer_dependencies.len()
        );
        match render_peers(ctx.session, ctx.toolkit) {
            Some(table) => println!("{}", table),
            None => println!("{}", ctx.toolkit.dim("No peer dependencies declared.")),
        }
        Ok(0)
    }
}

fn render_info(session: &SessionInfo, toolkit: &Toolkit) -> String {
    let peers = if session.peer_dependencies.is_empty() {
        "-".to_string()
    } else {
        session
            .peer_dependencies
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{} {}\n{}",
        toolkit.highlight(&session.name),
        toolkit.dim(&session.description),
        toolkit.table(
            ["Field", "Value"],
            vec![
                vec!["Version".to_string(), session.version.clone()],
                vec!["Package".to_string(), session.package_name.clone()],
                vec!["Peer dependencies".to_string(), peers],
            ],
        )
    )
}

fn render_peers(session: &SessionInfo, toolkit: &Toolkit) -> Option<String> {
    if session.peer_dependencies.is_empty() {
        return None;
    }
    Some(toolkit.table(
        ["Dependency", "Range"],
        session
            .peer_dependencies
            .iter()
            .map(|(name, range)| vec![name.clone(), range.clone()]),
    ))
}
