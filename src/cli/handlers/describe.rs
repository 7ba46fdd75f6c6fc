// EN: src/cli/handlers/describe.rs

use crate::{
    CancellationToken,
    cli::{args::DescribeArgs, handlers::commons::Invocation},
};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// Shows what a spell would do without running it.
pub fn handle(
    invocation: &Invocation,
    args: Vec<String>,
    _cancellation_token: &CancellationToken,
) -> Result<()> {
    let describe_args = DescribeArgs::try_parse_from(&args)?;
    let manager = invocation.manager()?;

    let description = manager.describe(&describe_args.spell)?;
    println!("{} {}", describe_args.spell.cyan().bold(), description);

    if describe_args.verbose {
        if let Some(config) = manager.action_config(&describe_args.spell) {
            println!("\n{}", toml::to_string_pretty(&config)?.dimmed());
        }
    }
    Ok(())
}
