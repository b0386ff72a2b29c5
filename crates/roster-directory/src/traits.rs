//! Directory client trait
//!
//! The interface the reconciler drives. Implementations talk to the real
//! directory service (or an in-memory stand-in) and must fail fast: every
//! call either succeeds or returns an error, never silently does nothing.

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::model::{ListKind, Properties};

/// Mutations against a membership directory, bracketed by a transaction.
///
/// # Contract
///
/// - Mutations are only valid between [`begin`](Self::begin) and
///   [`complete`](Self::complete).
/// - [`delete_branch`](Self::delete_branch) removes every list, member and
///   alternate address of the branch. Callers issue no per-child deletes.
/// - [`delete_list`](Self::delete_list) removes the list's members and
///   alternate addresses.
/// - If a run fails between `begin` and `complete`, `complete` is not called;
///   any rollback is the implementation's concern.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Open a batch of changes.
    async fn begin(&self) -> DirectoryResult<()>;

    /// Close the current batch of changes.
    async fn complete(&self) -> DirectoryResult<()>;

    /// Create a branch.
    async fn insert_branch(&self, branch: &str) -> DirectoryResult<()>;

    /// Delete a branch together with everything it contains.
    async fn delete_branch(&self, branch: &str) -> DirectoryResult<()>;

    /// Create a list or alias with its properties.
    async fn insert_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()>;

    /// Delete a list or alias together with its members and addresses.
    async fn delete_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()>;

    /// Add a member to a list.
    async fn insert_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()>;

    /// Remove a member from a list.
    async fn remove_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()>;

    /// Add an alternate address routing to a list.
    async fn insert_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()>;

    /// Remove an alternate address from a list.
    async fn remove_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()>;
}

#[async_trait]
impl<T: DirectoryClient + ?Sized> DirectoryClient for std::sync::Arc<T> {
    async fn begin(&self) -> DirectoryResult<()> {
        (**self).begin().await
    }

    async fn complete(&self) -> DirectoryResult<()> {
        (**self).complete().await
    }

    async fn insert_branch(&self, branch: &str) -> DirectoryResult<()> {
        (**self).insert_branch(branch).await
    }

    async fn delete_branch(&self, branch: &str) -> DirectoryResult<()> {
        (**self).delete_branch(branch).await
    }

    async fn insert_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()> {
        (**self).insert_list(branch, list, kind, properties).await
    }

    async fn delete_list(
        &self,
        branch: &str,
        list: &str,
        kind: ListKind,
        properties: &Properties,
    ) -> DirectoryResult<()> {
        (**self).delete_list(branch, list, kind, properties).await
    }

    async fn insert_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()> {
        (**self).insert_member(branch, list, email).await
    }

    async fn remove_member(&self, branch: &str, list: &str, email: &str) -> DirectoryResult<()> {
        (**self).remove_member(branch, list, email).await
    }

    async fn insert_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()> {
        (**self).insert_alternate_address(branch, list, email).await
    }

    async fn remove_alternate_address(
        &self,
        branch: &str,
        list: &str,
        email: &str,
    ) -> DirectoryResult<()> {
        (**self).remove_alternate_address(branch, list, email).await
    }
}
