// EN: src/cli/handlers/list.rs

use crate::{
    CancellationToken,
    cli::{args::ListArgs, handlers::commons::Invocation},
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use serde_json::json;

/// Prints every spell of the grimoire with its description.
pub fn handle(
    invocation: &Invocation,
    args: Vec<String>,
    _cancellation_token: &CancellationToken,
) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let manager = invocation.manager()?;
    let names = manager.spell_names();

    if list_args.json {
        let entries: Vec<_> = names
            .iter()
            .map(|name| {
                let config = manager.action_config(name).unwrap_or_default();
                json!({
                    "name": name,
                    "type": config.action_type,
                    "admin": config.admin,
                    "description": manager.describe(name).ok(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if names.is_empty() {
        println!("{}", "The grimoire has no spells yet.".yellow());
        return Ok(());
    }

    let width = names.iter().map(String::len).max().unwrap_or(0);
    println!("\n--- {} ---", "Spells".bold());
    for name in &names {
        // A spell with an unknown type still lists; its error explains the problem.
        let line = match manager.describe(name) {
            Ok(description) => description.normal(),
            Err(e) => e.user_message().red(),
        };
        println!("  {:<width$}  {}", name.cyan(), line, width = width);
    }
    Ok(())
}
