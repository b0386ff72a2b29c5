//! Reconciliation run reports.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use roster_directory::operation::{DirectoryOperation, OperationKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of a successful reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Run identifier, also attached to the run's log span.
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Calls in the plan.
    pub planned: usize,
    /// Calls issued and acknowledged by the directory.
    pub applied: usize,
    /// Applied calls broken down by kind.
    #[serde(default)]
    pub actions_taken: BTreeMap<OperationKind, usize>,
}

impl ReconcileReport {
    pub(crate) fn start(run_id: Uuid, planned: usize) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            started_at: now,
            completed_at: now,
            planned,
            applied: 0,
            actions_taken: BTreeMap::new(),
        }
    }

    pub(crate) fn record(&mut self, operation: &DirectoryOperation) {
        self.applied += 1;
        *self.actions_taken.entry(operation.kind()).or_insert(0) += 1;
    }

    pub(crate) fn finish(mut self) -> Self {
        self.completed_at = Utc::now();
        self
    }

    /// Get the count for one kind of call.
    #[must_use]
    pub fn action_count(&self, kind: OperationKind) -> usize {
        self.actions_taken.get(&kind).copied().unwrap_or(0)
    }

    /// Whether the run changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.applied == 0
    }

    /// Wall-clock duration of the run in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run {}: applied {} of {} operations",
            self.run_id, self.applied, self.planned
        )?;
        let breakdown: Vec<String> = self
            .actions_taken
            .iter()
            .map(|(kind, count)| format!("{kind}={count}"))
            .collect();
        if !breakdown.is_empty() {
            write!(f, " ({})", breakdown.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_by_kind() {
        let mut report = ReconcileReport::start(Uuid::new_v4(), 3);
        assert!(report.is_noop());

        let member = DirectoryOperation::InsertMember {
            branch: "BranchA".to_string(),
            list: "Seneschal".to_string(),
            email: "a@x.com".to_string(),
        };
        report.record(&member);
        report.record(&member);
        report.record(&DirectoryOperation::DeleteBranch {
            branch: "BranchB".to_string(),
        });
        let report = report.finish();

        assert_eq!(report.applied, 3);
        assert_eq!(report.action_count(OperationKind::InsertMember), 2);
        assert_eq!(report.action_count(OperationKind::DeleteBranch), 1);
        assert_eq!(report.action_count(OperationKind::RemoveMember), 0);
        assert!(report.duration_ms() >= 0);
        assert!(report
            .to_string()
            .ends_with("applied 3 of 3 operations (delete_branch=1, insert_member=2)"));
    }

    #[test]
    fn test_serialized_counts_use_kind_names() {
        let mut report = ReconcileReport::start(Uuid::nil(), 1);
        report.record(&DirectoryOperation::InsertBranch {
            branch: "BranchA".to_string(),
        });

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["actions_taken"]["insert_branch"], 1);
        assert_eq!(value["run_id"], "00000000-0000-0000-0000-000000000000");
    }
}
