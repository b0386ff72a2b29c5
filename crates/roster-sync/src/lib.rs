//! # Roster Sync
//!
//! Reconciliation of desired membership state against a directory.
//!
//! Given the state a directory *should* hold and the state it *does* hold, the
//! [`Reconciler`] issues the minimal set of [`DirectoryClient`] calls that
//! makes the two agree, bracketed by one `begin`/`complete` transaction.
//!
//! ## Crate Organization
//!
//! - [`normalize`] - Loosely shaped documents into a `MembershipTree`
//! - [`validation`] - Name and address checks run before any call
//! - [`diff`] - Symmetric set difference shared by members and addresses
//! - [`plan`] - Ordered `DirectoryOperation` planning
//! - [`reconciler`] - Transactional execution of a plan
//! - [`report`] - Per-run summary
//! - [`config`] - Pruning and case options
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```ignore
//! use roster_directory::prelude::*;
//! use roster_sync::{normalize_tree, ReconcileConfig, Reconciler};
//!
//! let config = ReconcileConfig::from_env()?;
//! let desired = normalize_tree(&desired_document, &config)?;
//! let existing = normalize_tree(&existing_document, &config)?;
//!
//! let reconciler = Reconciler::with_config(directory, config);
//! let report = reconciler.update(&desired, &existing).await?;
//! println!("{report}");
//! ```
//!
//! [`DirectoryClient`]: roster_directory::traits::DirectoryClient

pub mod config;
pub mod diff;
pub mod error;
pub mod normalize;
pub mod plan;
pub mod reconciler;
pub mod report;
pub mod validation;

pub use config::{ConfigError, ReconcileConfig};
pub use error::{ReconcileError, ReconcileResult};
pub use normalize::{normalize_tree, NormalizeError};
pub use plan::{plan_changes, ChangePlan};
pub use reconciler::Reconciler;
pub use report::ReconcileReport;
