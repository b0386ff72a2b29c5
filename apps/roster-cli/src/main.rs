//! roster CLI - Reconcile mailing list membership against a directory
//!
//! This CLI enables operators to:
//! - Preview the directory calls a membership change would issue
//! - Apply a membership document to a snapshot of the directory

use clap::{ArgAction, Parser, Subcommand};

use roster_cli::commands;
use roster_cli::error::CliResult;
use roster_cli::logging::{self, LogLevel};

/// roster - Membership reconciliation
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the directory calls needed to reach the desired state
    Plan(commands::plan::PlanArgs),

    /// Apply the desired state to a copy of the existing directory
    Apply(commands::apply::ApplyArgs),
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(LogLevel::from_occurrences(cli.verbose));

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<i32> {
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Apply(args) => commands::apply::execute(args).await,
    }
}
