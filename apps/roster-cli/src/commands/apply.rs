//! Apply command: run an update against an in-memory directory
//!
//! The directory is seeded from the existing document, so the command shows
//! exactly what a live run would do and what the directory would hold after
//! it.

use std::path::PathBuf;

use clap::Args;
use roster_directory::memory::InMemoryDirectory;
use roster_directory::model::MembershipTree;
use roster_sync::{ReconcileReport, Reconciler};
use serde::Serialize;

use super::InputArgs;
use crate::error::CliResult;
use crate::state::write_tree;

/// Apply the desired document to a copy of the existing directory
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the resulting directory contents to this file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of an apply run.
#[derive(Debug, Serialize)]
pub struct ApplyOutcome {
    pub report: ReconcileReport,
    #[serde(skip)]
    pub snapshot: MembershipTree,
}

/// Seed a directory, run the update, and return the report and final state.
pub async fn run(args: &ApplyArgs) -> CliResult<ApplyOutcome> {
    let input = args.input.load()?;
    let directory = InMemoryDirectory::from_tree(&input.existing)?;
    let reconciler = Reconciler::with_config(directory, input.config);

    let report = reconciler.update(&input.desired, &input.existing).await?;
    let snapshot = reconciler.client().snapshot().await;

    if let Some(output) = &args.output {
        write_tree(output, &snapshot)?;
    }

    Ok(ApplyOutcome { report, snapshot })
}

/// Execute the apply command
pub async fn execute(args: ApplyArgs) -> CliResult<i32> {
    let outcome = run(&args).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if outcome.report.is_noop() {
        println!("No changes required. Directory is up to date.");
    } else {
        println!("{}", outcome.report);
        if let Some(output) = &args.output {
            println!("Snapshot written to {}", output.display());
        }
    }

    Ok(0)
}
