//! Plan command: show the directory calls an update would issue
//!
//! Exit codes follow `diff`-style conventions so the command can gate CI:
//! 0 when the directory is up to date, 1 when changes are pending.

use std::collections::BTreeMap;

use clap::Args;
use roster_directory::operation::{DirectoryOperation, OperationKind};
use roster_sync::{plan_changes, ChangePlan};
use serde::Serialize;

use super::InputArgs;
use crate::error::CliResult;

/// Exit code when no changes are pending
pub const EXIT_NO_CHANGES: i32 = 0;

/// Exit code when changes are pending
pub const EXIT_CHANGES_FOUND: i32 = 1;

/// Show pending directory changes without applying them
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON form of a plan.
#[derive(Debug, Serialize)]
pub struct PlanOutput<'a> {
    pub changes: usize,
    pub counts: BTreeMap<OperationKind, usize>,
    pub operations: &'a [DirectoryOperation],
}

impl<'a> From<&'a ChangePlan> for PlanOutput<'a> {
    fn from(plan: &'a ChangePlan) -> Self {
        Self {
            changes: plan.len(),
            counts: plan.counts(),
            operations: plan.operations(),
        }
    }
}

/// Load the input documents and plan the changes.
pub fn compute(args: &PlanArgs) -> CliResult<ChangePlan> {
    let input = args.input.load()?;
    Ok(plan_changes(&input.desired, &input.existing, &input.config)?)
}

/// Exit code for a plan.
pub fn exit_code(plan: &ChangePlan) -> i32 {
    if plan.is_empty() {
        EXIT_NO_CHANGES
    } else {
        EXIT_CHANGES_FOUND
    }
}

/// Execute the plan command
pub fn execute(args: PlanArgs) -> CliResult<i32> {
    let plan = compute(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&PlanOutput::from(&plan))?);
    } else if plan.is_empty() {
        println!("No changes required. Directory is up to date.");
    } else {
        print!("{plan}");
        println!();
        println!("{} operation(s) planned.", plan.len());
    }

    Ok(exit_code(&plan))
}
