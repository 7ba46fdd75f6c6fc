// EN: src/cli/mod.rs

use clap::Parser;
use std::path::PathBuf;

pub mod args;
pub mod handlers;

/// spellcast: cast named actions ("spells") from a grimoire.
///
/// Valid formats:
/// - `spellcast run <spell>`       runs a spell
/// - `spellcast list`              lists every spell of the grimoire
/// - `spellcast describe <spell>`  shows what a spell would do
///
/// Shortcut:
/// - `spellcast <spell>` -> expands to `spellcast run <spell>`
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Grimoire file to load instead of `<config_dir>/spellcast/grimoire.toml`.
    #[arg(long, short)]
    pub grimoire: Option<PathBuf>,

    /// A command (`run`, `list`, `describe`) or, as a shortcut for `run`, a spell name.
    pub command_or_spell: Option<String>,

    /// All remaining arguments, passed to the command's handler.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
