// EN: src/cli/handlers/run.rs

use crate::{
    CancellationToken,
    cli::{args::RunArgs, handlers::commons::Invocation},
    core::context::ExecutionContext,
    models::ExecutionOutcome,
};
use anyhow::Result;
use clap::Parser;
use colored::*;
use std::sync::Arc;
use std::time::Duration;

/// Main entry point for the 'run' command.
/// The first argument is the spell name; `--timeout` may follow.
pub fn handle(
    invocation: &Invocation,
    args: Vec<String>,
    cancellation_token: &CancellationToken,
) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;

    // 1. Build the manager for the requested grimoire.
    let manager = invocation.manager()?;

    // 2. Observe the CLI's cancellation token, plus the optional deadline.
    let base = ExecutionContext::with_cancellation(Arc::clone(cancellation_token));
    let ctx = match run_args.timeout {
        Some(secs) => base.with_timeout(Duration::from_secs(secs)),
        None => base,
    };

    // 3. Cast. Engine errors propagate untouched so `main` can render them.
    let description = manager.describe(&run_args.spell)?;
    let outcome = manager.execute(&ctx, &run_args.spell)?;

    match outcome {
        ExecutionOutcome::Detached { pid } => println!(
            "{} {} {}",
            "✔".green(),
            description,
            format!("(started, pid {})", pid).dimmed()
        ),
        ExecutionOutcome::Completed { .. } => println!("{} {}", "✔".green(), description),
        ExecutionOutcome::Elevated { tool } => println!(
            "{} {} {}",
            "✔".green(),
            description,
            format!("(elevated via {})", tool).dimmed()
        ),
    }
    Ok(())
}
