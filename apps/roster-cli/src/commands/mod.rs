//! CLI command implementations

pub mod apply;
pub mod plan;

use std::path::PathBuf;

use clap::Args;
use roster_directory::model::MembershipTree;
use roster_sync::ReconcileConfig;

use crate::error::CliResult;
use crate::state::load_tree;

/// Input documents shared by every command
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Desired membership document (YAML or JSON)
    #[arg(short = 'd', long)]
    pub desired: PathBuf,

    /// Current directory contents (YAML or JSON)
    #[arg(short = 'e', long)]
    pub existing: PathBuf,

    /// Keep branches and lists that are missing from the desired document
    #[arg(long)]
    pub no_prune: bool,
}

/// Loaded and normalized command input.
#[derive(Debug)]
pub struct Input {
    pub desired: MembershipTree,
    pub existing: MembershipTree,
    pub config: ReconcileConfig,
}

impl InputArgs {
    /// Resolve configuration from the environment and command-line flags.
    pub fn config(&self) -> CliResult<ReconcileConfig> {
        let config = ReconcileConfig::from_env()?;
        Ok(if self.no_prune {
            config.with_prune(false)
        } else {
            config
        })
    }

    /// Load both documents.
    pub fn load(&self) -> CliResult<Input> {
        let config = self.config()?;
        Ok(Input {
            desired: load_tree(&self.desired, &config)?,
            existing: load_tree(&self.existing, &config)?,
            config,
        })
    }
}
