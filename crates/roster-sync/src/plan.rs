//! Change planning.
//!
//! The planner walks desired and existing state top-down and emits the
//! ordered list of directory calls that turns one into the other:
//!
//! 1. Each desired branch in ascending name order. A branch missing from the
//!    directory is inserted first and then filled against an empty baseline.
//! 2. Within a branch, each desired list in ascending name order. Lists on
//!    both sides get member adds, member removes, alternate address adds and
//!    alternate address removes, in that order. New lists are inserted and
//!    then filled.
//! 3. Existing lists of the branch that are no longer desired are deleted.
//! 4. Existing branches that are no longer desired are deleted.
//!
//! Deletions are not expanded into member removals; the directory cascades.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use roster_directory::addresses::alternate_addresses;
use roster_directory::model::{Branch, ListEntry, MembershipTree};
use roster_directory::operation::{DirectoryOperation, OperationKind};
use serde::Serialize;
use tracing::debug;

use crate::config::ReconcileConfig;
use crate::diff::sync_sets;
use crate::error::{ReconcileError, ReconcileResult};
use crate::validation::validate_tree;

/// Ordered directory calls needed to converge existing state on desired
/// state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangePlan {
    operations: Vec<DirectoryOperation>,
}

impl ChangePlan {
    /// Whether the two trees already agree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of planned calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Planned calls in issue order.
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryOperation> {
        self.operations.iter()
    }

    /// Planned calls as a slice.
    #[must_use]
    pub fn operations(&self) -> &[DirectoryOperation] {
        &self.operations
    }

    /// Number of planned calls per kind.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<OperationKind, usize> {
        let mut counts = BTreeMap::new();
        for operation in &self.operations {
            *counts.entry(operation.kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of planned calls of one kind.
    #[must_use]
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations.iter().filter(|op| op.kind() == kind).count()
    }
}

impl IntoIterator for ChangePlan {
    type Item = DirectoryOperation;
    type IntoIter = std::vec::IntoIter<DirectoryOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangePlan {
    type Item = &'a DirectoryOperation;
    type IntoIter = std::slice::Iter<'a, DirectoryOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl fmt::Display for ChangePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operations.is_empty() {
            return writeln!(f, "No changes.");
        }
        for operation in &self.operations {
            writeln!(f, "{operation}")?;
        }
        Ok(())
    }
}

/// Validate both trees and plan the calls that converge `existing` on
/// `desired`.
pub fn plan_changes(
    desired: &MembershipTree,
    existing: &MembershipTree,
    config: &ReconcileConfig,
) -> ReconcileResult<ChangePlan> {
    validate_tree(desired, "desired")?;
    validate_tree(existing, "existing")?;

    let mut planner = Planner {
        config,
        operations: Vec::new(),
    };
    planner.trees(desired, existing)?;

    debug!(
        operations = planner.operations.len(),
        "Planned directory changes"
    );
    Ok(ChangePlan {
        operations: planner.operations,
    })
}

struct Planner<'c> {
    config: &'c ReconcileConfig,
    operations: Vec<DirectoryOperation>,
}

impl Planner<'_> {
    fn trees(&mut self, desired: &MembershipTree, existing: &MembershipTree) -> ReconcileResult<()> {
        let empty = Branch::new();

        for (name, branch) in desired.iter() {
            let baseline = match existing.get(name) {
                Some(current) => current,
                None => {
                    self.operations.push(DirectoryOperation::InsertBranch {
                        branch: name.clone(),
                    });
                    &empty
                }
            };
            self.branch(name, branch, baseline)?;
        }

        if self.config.prune_branches {
            for (name, _) in existing.iter().filter(|(name, _)| !desired.contains(name)) {
                self.operations.push(DirectoryOperation::DeleteBranch {
                    branch: name.clone(),
                });
            }
        }

        Ok(())
    }

    fn branch(&mut self, branch: &str, desired: &Branch, existing: &Branch) -> ReconcileResult<()> {
        for (name, entry) in desired.iter() {
            // Kind and properties of a kept list are not patched.
            match existing.get(name) {
                Some(current) => self.members(branch, name, entry, current)?,
                None => self.new_list(branch, name, entry)?,
            }
        }

        if self.config.prune_lists {
            for (name, current) in existing.iter().filter(|(name, _)| !desired.contains(name)) {
                self.operations.push(delete_list(branch, name, current));
            }
        }

        Ok(())
    }

    fn new_list(&mut self, branch: &str, list: &str, entry: &ListEntry) -> ReconcileResult<()> {
        self.operations.push(DirectoryOperation::InsertList {
            branch: branch.to_string(),
            list: list.to_string(),
            kind: entry.kind,
            properties: entry.properties.clone(),
        });
        self.members(branch, list, entry, &ListEntry::new(entry.kind))
    }

    fn members(
        &mut self,
        branch: &str,
        list: &str,
        desired: &ListEntry,
        existing: &ListEntry,
    ) -> ReconcileResult<()> {
        let operations = &mut self.operations;
        let mut added = Vec::new();
        let mut removed = Vec::new();

        sync_sets(
            &desired.members,
            &existing.members,
            |email: &String| added.push(email.clone()),
            |email: &String| removed.push(email.clone()),
        );
        operations.extend(added.into_iter().map(|email| DirectoryOperation::InsertMember {
            branch: branch.to_string(),
            list: list.to_string(),
            email,
        }));
        operations.extend(removed.into_iter().map(|email| DirectoryOperation::RemoveMember {
            branch: branch.to_string(),
            list: list.to_string(),
            email,
        }));

        let desired_addresses = derived_addresses(branch, list, desired)?;
        let existing_addresses = derived_addresses(branch, list, existing)?;
        let mut added = Vec::new();
        let mut removed = Vec::new();

        sync_sets(
            &desired_addresses,
            &existing_addresses,
            |email: &String| added.push(email.clone()),
            |email: &String| removed.push(email.clone()),
        );
        operations.extend(
            added
                .into_iter()
                .map(|email| DirectoryOperation::InsertAlternateAddress {
                    branch: branch.to_string(),
                    list: list.to_string(),
                    email,
                }),
        );
        operations.extend(
            removed
                .into_iter()
                .map(|email| DirectoryOperation::RemoveAlternateAddress {
                    branch: branch.to_string(),
                    list: list.to_string(),
                    email,
                }),
        );

        Ok(())
    }
}

fn derived_addresses(
    branch: &str,
    list: &str,
    entry: &ListEntry,
) -> ReconcileResult<BTreeSet<String>> {
    alternate_addresses(branch, list, &entry.properties).map_err(|e| {
        ReconcileError::invalid_input(format!("{branch}/{list}/properties"), e.to_string())
    })
}

fn delete_list(branch: &str, list: &str, entry: &ListEntry) -> DirectoryOperation {
    DirectoryOperation::DeleteList {
        branch: branch.to_string(),
        list: list.to_string(),
        kind: entry.kind,
        properties: entry.properties.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(desired: &MembershipTree, existing: &MembershipTree) -> ChangePlan {
        plan_changes(desired, existing, &ReconcileConfig::default()).unwrap()
    }

    fn rendered(plan: &ChangePlan) -> Vec<String> {
        plan.iter().map(ToString::to_string).collect()
    }

    fn one_list(branch: &str, list: &str, entry: ListEntry) -> MembershipTree {
        MembershipTree::new().with_branch(branch, Branch::new().with_entry(list, entry))
    }

    #[test]
    fn test_member_diff_on_shared_list() {
        let desired = one_list(
            "BranchA",
            "Seneschal",
            ListEntry::list().with_members(["a@x.com", "b@x.com"]),
        );
        let existing = one_list(
            "BranchA",
            "Seneschal",
            ListEntry::list().with_members(["b@x.com", "c@x.com"]),
        );

        let plan = plan(&desired, &existing);
        assert_eq!(
            rendered(&plan),
            vec![
                "insert_member BranchA/Seneschal a@x.com",
                "remove_member BranchA/Seneschal c@x.com",
            ]
        );
    }

    #[test]
    fn test_new_branch_is_inserted_then_filled() {
        let desired = one_list(
            "BranchA",
            "Herald",
            ListEntry::list()
                .with_members(["h@x.com"])
                .with_property("domain", "x.com"),
        );

        let plan = plan(&desired, &MembershipTree::new());
        assert_eq!(
            rendered(&plan),
            vec![
                "insert_branch BranchA",
                "insert_list BranchA/Herald",
                "insert_member BranchA/Herald h@x.com",
                "insert_alternate_address BranchA/Herald brancha-herald@x.com",
            ]
        );
    }

    #[test]
    fn test_removed_branch_is_deleted_without_member_removals() {
        let existing = one_list(
            "BranchB",
            "Seneschal",
            ListEntry::list().with_members(["a@x.com", "b@x.com"]),
        );

        let plan = plan(&MembershipTree::new(), &existing);
        assert_eq!(rendered(&plan), vec!["delete_branch BranchB"]);
    }

    #[test]
    fn test_removed_list_is_deleted_after_desired_lists() {
        let desired = one_list("BranchA", "Herald", ListEntry::list().with_member("h@x.com"));
        let existing = MembershipTree::new().with_branch(
            "BranchA",
            Branch::new()
                .with_entry("Archery", ListEntry::list().with_member("a@x.com"))
                .with_entry("Herald", ListEntry::list()),
        );

        let plan = plan(&desired, &existing);
        assert_eq!(
            rendered(&plan),
            vec![
                "insert_member BranchA/Herald h@x.com",
                "delete_list BranchA/Archery",
            ]
        );
    }

    #[test]
    fn test_identical_trees_need_nothing() {
        let tree = one_list(
            "BranchA",
            "Seneschal",
            ListEntry::alias()
                .with_members(["a@x.com"])
                .with_property("alternate-addresses", "chief@x.com"),
        );
        let plan = plan(&tree, &tree);
        assert!(plan.is_empty());
        assert_eq!(plan.to_string(), "No changes.\n");
    }

    #[test]
    fn test_property_change_only_touches_alternate_addresses() {
        let desired = one_list(
            "BranchA",
            "Seneschal",
            ListEntry::list()
                .with_property("alternate-addresses", "new@x.com")
                .with_property("display-name", "Seneschal"),
        );
        let existing = one_list(
            "BranchA",
            "Seneschal",
            ListEntry::list().with_property("alternate-addresses", "old@x.com"),
        );

        let plan = plan(&desired, &existing);
        assert_eq!(
            rendered(&plan),
            vec![
                "insert_alternate_address BranchA/Seneschal new@x.com",
                "remove_alternate_address BranchA/Seneschal old@x.com",
            ]
        );
    }

    #[test]
    fn test_kind_change_keeps_group() {
        let desired = one_list("BranchA", "Herald", ListEntry::alias().with_member("h@x.com"));
        let existing = one_list("BranchA", "Herald", ListEntry::list().with_member("g@x.com"));

        let plan = plan(&desired, &existing);
        assert_eq!(
            rendered(&plan),
            vec![
                "insert_member BranchA/Herald h@x.com",
                "remove_member BranchA/Herald g@x.com",
            ]
        );
    }

    #[test]
    fn test_pruning_disabled() {
        let existing = MembershipTree::new()
            .with_branch("BranchA", Branch::new().with_entry("Old", ListEntry::list()))
            .with_branch("BranchB", Branch::new());
        let desired = MembershipTree::new().with_branch("BranchA", Branch::new());

        let config = ReconcileConfig::default().with_prune(false);
        let plan = plan_changes(&desired, &existing, &config).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_counts() {
        let desired = one_list(
            "BranchA",
            "Seneschal",
            ListEntry::list().with_members(["a@x.com", "b@x.com"]),
        );
        let plan = plan(&desired, &MembershipTree::new());

        assert_eq!(plan.len(), 4);
        assert_eq!(plan.count(OperationKind::InsertMember), 2);
        assert_eq!(plan.counts().get(&OperationKind::InsertBranch), Some(&1));
        assert_eq!(plan.counts().get(&OperationKind::DeleteBranch), None);
    }

    #[test]
    fn test_invalid_input_plans_nothing() {
        let desired = one_list("BranchA", "Seneschal", ListEntry::list().with_member("nope"));
        let err = plan_changes(&desired, &MembershipTree::new(), &ReconcileConfig::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }
}
