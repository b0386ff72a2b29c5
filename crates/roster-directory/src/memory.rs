//! In-memory directory.
//!
//! A [`DirectoryClient`] that applies calls to an in-memory structure and
//! enforces the client contract strictly: deletes cascade, inserting something
//! that exists or touching something that doesn't is an error, and mutations
//! outside a transaction are rejected. Useful as a stand-in for a real
//! directory in dry runs and tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::addresses::{alternate_addresses, PropertyError, ALTERNATE_ADDRESSES_KEY, DOMAIN_KEY};
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{Branch, ListEntry, ListKind, MembershipTree, Properties};
use crate::operation::OperationKind;
use crate::traits::DirectoryClient;

#[derive(Debug, Clone)]
struct StoredList {
    kind: ListKind,
    properties: Properties,
    members: BTreeSet<String>,
    alternate_addresses: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct Fault {
    kind: OperationKind,
    target: String,
}

#[derive(Debug, Default)]
struct State {
    in_transaction: bool,
    completed_transactions: usize,
    branches: BTreeMap<String, BTreeMap<String, StoredList>>,
    faults: Vec<Fault>,
}

impl State {
    /// Check transaction state and injected faults before a mutation.
    fn guard(&mut self, kind: OperationKind, target: &str) -> DirectoryResult<()> {
        if !self.in_transaction {
            return Err(DirectoryError::TransactionNotOpen {
                operation: kind.to_string(),
            });
        }

        if let Some(index) = self
            .faults
            .iter()
            .position(|fault| fault.kind == kind && fault.target == target)
        {
            self.faults.remove(index);
            return Err(DirectoryError::operation_failed(format!(
                "injected failure for {kind} {target}"
            )));
        }

        Ok(())
    }

    fn list_mut(&mut self, branch: &str, list: &str) -> DirectoryResult<&mut StoredList> {
        self.branches
            .get_mut(branch)
            .ok_or_else(|| DirectoryError::not_found(branch))?
            .get_mut(list)
            .ok_or_else(|| DirectoryError::not_found(format!("{branch}/{list}")))
    }
}

/// Directory state held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory seeded with the contents of a tree.
    ///
    /// Alternate addresses are derived from each entry's properties.
    pub fn from_tree(tree: &MembershipTree) -> Result<Self, PropertyError> {
        let mut branches = BTreeMap::new();

        for (branch_name, branch) in tree.iter() {
            let mut lists = BTreeMap::new();
            for (list_name, entry) in branch.iter() {
                lists.insert(
                    list_name.clone(),
                    StoredList {
                        kind: entry.kind,
                        properties: entry.properties.clone(),
                        members: entry.members.clone(),
                        alternate_addresses: alternate_addresses(
                            branch_name,
                            list_name,
                            &entry.properties,
                        )?,
                    },
                );
            }
            branches.insert(branch_name.clone(), lists);
        }

        Ok(Self {
            state: Mutex::new(State {
                branches,
                ..State::default()
            }),
        })
    }

    /// Make the next call of `kind` on `target` fail with
    /// [`DirectoryError::OperationFailed`].
    ///
    /// `target` uses the same path form as
    /// [`DirectoryOperation::target`](crate::operation::DirectoryOperation::target).
    pub async fn fail_on(&self, kind: OperationKind, target: impl Into<String>) {
        self.state.lock().await.faults.push(Fault {
            kind,
            target: target.into(),
        });
    }

    /// Whether a transaction is currently open.
    pub async fn in_transaction(&self) -> bool {
        self.state.lock().await.in_transaction
    }

    /// Number of transactions completed so far.
    pub async fn completed_transactions(&self) -> usize {
        self.state.lock().await.completed_transactions
    }

    /// Stored alternate addresses of a list.
    pub async fn stored_alternate_addresses(
        &self,
        branch: &str,
        list: &str,
    ) -> Option<BTreeSet<String>> {
        let state = self.state.lock().await;
        state
            .branches
            .get(branch)
            .and_then(|lists| lists.get(list))
            .map(|stored| stored.alternate_addresses.clone())
    }

    /// Current contents as a tree.
    ///
    /// Stored alternate addresses are written back into the
    /// `alternate-addresses` property (and `domain` is dropped), so deriving
    /// alternate addresses from the snapshot yields exactly the stored set.
    pub async fn snapshot(&self) -> MembershipTree {
        let state = self.state.lock().await;

        state
            .branches
            .iter()
            .map(|(branch_name, lists)| {
                let branch = lists.iter().fold(Branch::new(), |branch, (name, stored)| {
                    let mut properties = stored.properties.clone();
                    properties.remove(DOMAIN_KEY);
                    if stored.alternate_addresses.is_empty() {
                        properties.remove(ALTERNATE_ADDRESSES_KEY);
                    } else {
                        properties.insert(
                            ALTERNATE_ADDRESSES_KEY,
                            Value::Array(
                                stored
                                    .alternate_addresses
                                    .iter()
                                    .cloned()
                                    .map(Value::String)
                                    .collect(),
                            ),
                        );
                    }

                    branch.with_entry(
                        name.clone(),
                        ListEntry {
                            kind: stored.kind,
                            properties,
                            members: stored.members.clone(),
                        },
                    )
                });
                (branch_name.clone(), branch)
            })
            .collect()
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn begin(&self) -> DirectoryResult<()> {
        let mut state = self.state.lock().await;
        state.in_transaction = true;
        debug!("Opened directory transaction");
        Ok(())
    }

    async fn complete(&self) -> DirectoryResult<()> {
        let mut state = self.state.lock().await;
        if !state.in_transaction {
            return Err(DirectoryError::TransactionNotOpen {
                operation: "complete".to_string(),
            });
        }
        state.in_transaction = false;
        state.completed_transactions += 1;
        debug!("Completed directory transaction");
        Ok(())
    }

    async fn insert_branch(&self, branch: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock().await;
        state.guard(OperationKind::InsertBranch, branch)?;

        if state.branches.contains_key(branch) {
            return Err(DirectoryError::already_exists(branch));
        }
        state.branches.insert(branch.to_string(), BTreeMap::new());
        debug!(branch = %branch, "Inserted branch");
        Ok(())
    }

    async fn delete_branch(&self, branch: &str) -> DirectoryResult<()> {
        let mut state = self.state.lock().await;
        state.guard(OperationKind::DeleteBranch, branch)?;

        let lists = state
            .branches
            .remove(branch)
            .ok_or_else(|| DirectoryError::not_found(branch))?;
        debug!(branch = %branch, cascaded_lists = lists.len(), "Deleted branch");
        Ok(())
    }

    async fn insert_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()> {
        let target = format!("{branch}/{list}");
        let mut state = self.state.lock().await;
        state.guard(OperationKind::InsertList, &target)?;

        let lists = state
            .branches
            .get_mut(branch)
            .ok_or_else(|| DirectoryError::not_found(branch))?;
        if lists.contains_key(list) {
            return Err(DirectoryError::already_exists(target));
        }
        lists.insert(
            list.to_string(),
            StoredList {
                kind,
                properties: properties.clone(),
                members: BTreeSet::new(),
                alternate_addresses: BTreeSet::new(),
            },
        );
        debug!(branch = %branch, list = %list, kind = %kind, "Inserted list");
        Ok(())
    }

    async fn delete_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        _properties: &Properties,
    ) -> DirectoryResult<()> {
        let target = format!("{branch}/{list}");
        let mut state = self.state.lock().await;
        state.guard(OperationKind::DeleteList, &target)?;

        let removed = state
            .branches
            .get_mut(branch)
            .ok_or_else(|| DirectoryError::not_found(branch))?
            .remove(list)
            .ok_or_else(|| DirectoryError::not_found(target.clone()))?;
        debug!(
            branch = %branch,
            list = %list,
            kind = %kind,
            cascaded_members = removed.members.len(),
            "Deleted list"
        );
        Ok(())
    }

    async fn insert_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()> {
        let target = format!("{branch}/{list}/{email}");
        let mut state = self.state.lock().await;
        state.guard(OperationKind::InsertMember, &target)?;

        if !state.list_mut(branch, list)?.members.insert(email.to_string()) {
            return Err(DirectoryError::already_exists(target));
        }
        Ok(())
    }

    async fn remove_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()> {
        let target = format!("{branch}/{list}/{email}");
        let mut state = self.state.lock().await;
        state.guard(OperationKind::RemoveMember, &target)?;

        if !state.list_mut(branch, list)?.members.remove(email) {
            return Err(DirectoryError::not_found(target));
        }
        Ok(())
    }

    async fn insert_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()> {
        let target = format!("{branch}/{list}/{email}");
        let mut state = self.state.lock().await;
        state.guard(OperationKind::InsertAlternateAddress, &target)?;

        if !state
            .list_mut(branch, list)?
            .alternate_addresses
            .insert(email.to_string())
        {
            return Err(DirectoryError::already_exists(target));
        }
        Ok(())
    }

    async fn remove_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()> {
        let target = format!("{branch}/{list}/{email}");
        let mut state = self.state.lock().await;
        state.guard(OperationKind::RemoveAlternateAddress, &target)?;

        if !state
            .list_mut(branch, list)?
            .alternate_addresses
            .remove(email)
        {
            return Err(DirectoryError::not_found(target));
        }
        Ok(())
    }
}
