//! The reconciler.
//!
//! A run validates both trees, plans the calls, and then issues them inside a
//! single directory transaction:
//!
//! ```text
//! begin → call 1 → call 2 → … → complete
//! ```
//!
//! The first failing call aborts the run. `complete` is not called after a
//! failure, so the directory is left with an open transaction it can roll
//! back or inspect.

use roster_directory::model::MembershipTree;
use roster_directory::traits::DirectoryClient;
use tracing::{debug, field, info, instrument, warn, Span};
use uuid::Uuid;

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::plan::{plan_changes, ChangePlan};
use crate::report::ReconcileReport;

/// Converges a directory on desired membership state.
pub struct Reconciler<C> {
    client: C,
    config: ReconcileConfig,
}

impl<C: DirectoryClient> Reconciler<C> {
    /// Create a reconciler with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, ReconcileConfig::default())
    }

    /// Create a reconciler with a custom configuration.
    pub fn with_config(client: C, config: ReconcileConfig) -> Self {
        Self { client, config }
    }

    /// Get the directory client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Consume the reconciler and return its client.
    pub fn into_client(self) -> C {
        self.client
    }

    /// Plan the calls needed to converge `existing` on `desired` without
    /// touching the directory.
    pub fn plan(
        &self,
        desired: &MembershipTree,
        existing: &MembershipTree,
    ) -> ReconcileResult<ChangePlan> {
        plan_changes(desired, existing, &self.config)
    }

    /// Converge the directory on `desired`, given that it currently holds
    /// `existing`.
    ///
    /// Invalid input is reported before `begin`. On success every call has
    /// been acknowledged and the transaction completed.
    #[instrument(
        skip_all,
        fields(
            run_id = field::Empty,
            desired_branches = desired.len(),
            existing_branches = existing.len()
        )
    )]
    pub async fn update(
        &self,
        desired: &MembershipTree,
        existing: &MembershipTree,
    ) -> ReconcileResult<ReconcileReport> {
        let plan = self.plan(desired, existing)?;
        self.execute(&plan).await
    }

    /// Issue a previously computed plan inside one transaction.
    pub async fn execute(&self, plan: &ChangePlan) -> ReconcileResult<ReconcileReport> {
        let run_id = Uuid::new_v4();
        Span::current().record("run_id", field::display(run_id));

        let planned = plan.len();
        let mut report = ReconcileReport::start(run_id, planned);

        info!(run_id = %run_id, planned, "Starting directory update");

        self.client.begin().await.map_err(|e| {
            warn!(run_id = %run_id, error = %e, "Directory refused to begin transaction");
            ReconcileError::Begin(e)
        })?;

        for operation in plan {
            if let Err(source) = operation.apply(&self.client).await {
                warn!(
                    run_id = %run_id,
                    operation = %operation,
                    applied = report.applied,
                    planned,
                    error = %source,
                    "Directory call failed, transaction left open"
                );
                return Err(ReconcileError::Directory {
                    operation: operation.clone(),
                    applied: report.applied,
                    planned,
                    source,
                });
            }
            debug!(run_id = %run_id, operation = %operation, "Applied directory call");
            report.record(operation);
        }

        self.client
            .complete()
            .await
            .map_err(|source| ReconcileError::Complete {
                applied: report.applied,
                source,
            })?;

        let report = report.finish();
        info!(
            run_id = %run_id,
            applied = report.applied,
            duration_ms = report.duration_ms(),
            "Completed directory update"
        );
        Ok(report)
    }
}
