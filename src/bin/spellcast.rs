// EN: src/bin/spellcast.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use spellcast::{
    CancellationToken,
    cli::{
        Cli,
        handlers::{self, commons::Invocation},
    },
    core::context::new_cancellation_token,
    errors::ActionError,
};

// --- Command Definition and Registry ---

/// Defines a command, its aliases, and its synchronous handler function.
/// Every handler shares one signature so the registry stays a plain table.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(&Invocation, Vec<String>, &CancellationToken) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "describe",
        aliases: &["show"],
        handler: handlers::describe::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &["cast"],
        handler: handlers::run::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// The main entry point of the `spellcast` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    let cancellation_token = new_cancellation_token();
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse(), &cancellation_token) {
        // --- Centralized Error Handling ---
        match e.downcast_ref::<ActionError>() {
            Some(action_err) => {
                eprintln!("\n{}: {}", "Error".red().bold(), action_err.user_message());
                if let Some(spells) = action_err.find_context("available_spells") {
                    eprintln!("{} {}", "Available spells:".dimmed(), spells);
                }
                log::debug!("Error context: {:?}", action_err.merged_context());
            }
            None => eprintln!("\n{}: {:#}", "Error".red().bold(), e),
        }
        std::process::exit(1);
    }
}

/// Routes the parsed arguments to a handler.
fn run_cli(cli: Cli, cancellation_token: &CancellationToken) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);
    let invocation = Invocation {
        grimoire: cli.grimoire,
    };

    let Some(first) = cli.command_or_spell else {
        // Without arguments, show what can be cast.
        return handlers::list::handle(&invocation, Vec::new(), cancellation_token);
    };

    match find_command(&first) {
        Some(command) => (command.handler)(&invocation, cli.args, cancellation_token),
        None => {
            // Not a command, so it's a spell name. This is a shortcut for `run`.
            let mut run_args = vec![first];
            run_args.extend(cli.args);
            handlers::run::handle(&invocation, run_args, cancellation_token)
        }
    }
}
