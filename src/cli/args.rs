// EN: src/cli/args.rs
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)] // Handlers receive their arguments without the command name.
pub struct RunArgs {
    /// The spell to cast.
    pub spell: String,

    /// Kill a waited-on script after this many seconds (tighter than the spell's own timeout).
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct ListArgs {
    /// Print the spells as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct DescribeArgs {
    /// The spell to describe.
    pub spell: String,

    /// Also print the spell's configuration.
    #[arg(long, short)]
    pub verbose: bool,
}
