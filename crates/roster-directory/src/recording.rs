//! Recording directory.
//!
//! A [`DirectoryClient`] that keeps a journal of every call it receives and
//! changes nothing. Used for dry runs and for asserting exact call sequences.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::DirectoryResult;
use crate::model::{ListKind, Properties};
use crate::operation::DirectoryOperation;
use crate::traits::DirectoryClient;

/// One call received by a [`RecordingDirectory`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Begin,
    Complete,
    Operation(DirectoryOperation),
}

impl fmt::Display for RecordedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedCall::Begin => write!(f, "begin"),
            RecordedCall::Complete => write!(f, "complete"),
            RecordedCall::Operation(op) => write!(f, "{op}"),
        }
    }
}

/// Journal of directory calls.
#[derive(Debug, Default)]
pub struct RecordingDirectory {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingDirectory {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls received so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Mutating calls received so far, in order.
    pub async fn operations(&self) -> Vec<DirectoryOperation> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Operation(op) => Some(op.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of mutating calls received so far.
    pub async fn mutation_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| matches!(call, RecordedCall::Operation(_)))
            .count()
    }

    /// Forget all recorded calls.
    pub async fn clear(&self) {
        self.calls.lock().await.clear();
    }

    async fn record(&self, call: RecordedCall) -> DirectoryResult<()> {
        self.calls.lock().await.push(call);
        Ok(())
    }

    async fn record_op(&self, op: DirectoryOperation) -> DirectoryResult<()> {
        self.record(RecordedCall::Operation(op)).await
    }
}

#[async_trait]
impl DirectoryClient for RecordingDirectory {
    async fn begin(&self) -> DirectoryResult<()> {
        self.record(RecordedCall::Begin).await
    }

    async fn complete(&self) -> DirectoryResult<()> {
        self.record(RecordedCall::Complete).await
    }

    async fn insert_branch(&self, branch: &str) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::InsertBranch {
            branch: branch.to_string(),
        })
        .await
    }

    async fn delete_branch(&self, branch: &str) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::DeleteBranch {
            branch: branch.to_string(),
        })
        .await
    }

    async fn insert_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::InsertList {
            branch: branch.to_string(),
            list: list.to_string(),
            kind,
            properties: properties.clone(),
        })
        .await
    }

    async fn delete_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::DeleteList {
            branch: branch.to_string(),
            list: list.to_string(),
            kind,
            properties: properties.clone(),
        })
        .await
    }

    async fn insert_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::InsertMember {
            branch: branch.to_string(),
            list: list.to_string(),
            email: email.to_string(),
        })
        .await
    }

    async fn remove_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::RemoveMember {
            branch: branch.to_string(),
            list: list.to_string(),
            email: email.to_string(),
        })
        .await
    }

    async fn insert_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::InsertAlternateAddress {
            branch: branch.to_string(),
            list: list.to_string(),
            email: email.to_string(),
        })
        .await
    }

    async fn remove_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()> {
        self.record_op(DirectoryOperation::RemoveAlternateAddress {
            branch: branch.to_string(),
            list: list.to_string(),
            email: email.to_string(),
        })
        .await
    }
}
