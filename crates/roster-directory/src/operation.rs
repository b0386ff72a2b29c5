//! Directory operation values
//!
//! [`DirectoryOperation`] is the data form of one mutating
//! [`DirectoryClient`] call. Plans, journals and error reports all speak in
//! these values so that a failure can name exactly which call on which entity
//! went wrong.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DirectoryResult;
use crate::model::{ListKind, Properties};
use crate::traits::DirectoryClient;

/// Kind of a mutating directory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    InsertBranch,
    DeleteBranch,
    InsertList,
    DeleteList,
    InsertMember,
    RemoveMember,
    InsertAlternateAddress,
    RemoveAlternateAddress,
}

impl OperationKind {
    /// Get all operation kinds in issue order.
    #[must_use]
    pub fn all() -> &'static [OperationKind] {
        &[
            OperationKind::InsertBranch,
            OperationKind::DeleteBranch,
            OperationKind::InsertList,
            OperationKind::DeleteList,
            OperationKind::InsertMember,
            OperationKind::RemoveMember,
            OperationKind::InsertAlternateAddress,
            OperationKind::RemoveAlternateAddress,
        ]
    }

    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::InsertBranch => "insert_branch",
            OperationKind::DeleteBranch => "delete_branch",
            OperationKind::InsertList => "insert_list",
            OperationKind::DeleteList => "delete_list",
            OperationKind::InsertMember => "insert_member",
            OperationKind::RemoveMember => "remove_member",
            OperationKind::InsertAlternateAddress => "insert_alternate_address",
            OperationKind::RemoveAlternateAddress => "remove_alternate_address",
        }
    }

    /// Whether the call adds something to the directory.
    #[must_use]
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            OperationKind::InsertBranch
                | OperationKind::InsertList
                | OperationKind::InsertMember
                | OperationKind::InsertAlternateAddress
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One mutating call against the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DirectoryOperation {
    InsertBranch {
        branch: String,
    },
    DeleteBranch {
        branch: String,
    },
    InsertList {
        branch: String,
        list: String,
        kind: ListKind,
        #[serde(default, skip_serializing_if = "Properties::is_empty")]
        properties: Properties,
    },
    DeleteList {
        branch: String,
        list: String,
        kind: ListKind,
        #[serde(default, skip_serializing_if = "Properties::is_empty")]
        properties: Properties,
    },
    InsertMember {
        branch: String,
        list: String,
        email: String,
    },
    RemoveMember {
        branch: String,
        list: String,
        email: String,
    },
    InsertAlternateAddress {
        branch: String,
        list: String,
        email: String,
    },
    RemoveAlternateAddress {
        branch: String,
        list: String,
        email: String,
    },
}

impl DirectoryOperation {
    /// Get the kind of this call.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            DirectoryOperation::InsertBranch { .. } => OperationKind::InsertBranch,
            DirectoryOperation::DeleteBranch { .. } => OperationKind::DeleteBranch,
            DirectoryOperation::InsertList { .. } => OperationKind::InsertList,
            DirectoryOperation::DeleteList { .. } => OperationKind::DeleteList,
            DirectoryOperation::InsertMember { .. } => OperationKind::InsertMember,
            DirectoryOperation::RemoveMember { .. } => OperationKind::RemoveMember,
            DirectoryOperation::InsertAlternateAddress { .. } => {
                OperationKind::InsertAlternateAddress
            }
            DirectoryOperation::RemoveAlternateAddress { .. } => {
                OperationKind::RemoveAlternateAddress
            }
        }
    }

    /// Branch the call touches.
    #[must_use]
    pub fn branch(&self) -> &str {
        match self {
            DirectoryOperation::InsertBranch { branch }
            | DirectoryOperation::DeleteBranch { branch }
            | DirectoryOperation::InsertList { branch, .. }
            | DirectoryOperation::DeleteList { branch, .. }
            | DirectoryOperation::InsertMember { branch, .. }
            | DirectoryOperation::RemoveMember { branch, .. }
            | DirectoryOperation::InsertAlternateAddress { branch, .. }
            | DirectoryOperation::RemoveAlternateAddress { branch, .. } => branch,
        }
    }

    /// List the call touches, if below branch level.
    #[must_use]
    pub fn list(&self) -> Option<&str> {
        match self {
            DirectoryOperation::InsertBranch { .. } | DirectoryOperation::DeleteBranch { .. } => {
                None
            }
            DirectoryOperation::InsertList { list, .. }
            | DirectoryOperation::DeleteList { list, .. }
            | DirectoryOperation::InsertMember { list, .. }
            | DirectoryOperation::RemoveMember { list, .. }
            | DirectoryOperation::InsertAlternateAddress { list, .. }
            | DirectoryOperation::RemoveAlternateAddress { list, .. } => Some(list),
        }
    }

    /// Member or alternate address the call touches, if any.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            DirectoryOperation::InsertMember { email, .. }
            | DirectoryOperation::RemoveMember { email, .. }
            | DirectoryOperation::InsertAlternateAddress { email, .. }
            | DirectoryOperation::RemoveAlternateAddress { email, .. } => Some(email),
            _ => None,
        }
    }

    /// Path of the touched entity: `branch`, `branch/list` or
    /// `branch/list/email`.
    #[must_use]
    pub fn target(&self) -> String {
        match (self.list(), self.email()) {
            (None, _) => self.branch().to_string(),
            (Some(list), None) => format!("{}/{}", self.branch(), list),
            (Some(list), Some(email)) => format!("{}/{}/{}", self.branch(), list, email),
        }
    }

    /// Issue this call against a client.
    pub async fn apply(&self, client: &(dyn DirectoryClient + '_)) -> DirectoryResult<()> {
        match self {
            DirectoryOperation::InsertBranch { branch } => client.insert_branch(branch).await,
            DirectoryOperation::DeleteBranch { branch } => client.delete_branch(branch).await,
            DirectoryOperation::InsertList {
                branch,
                list,
                kind,
                properties,
            } => client.insert_list(branch, list, *kind, properties).await,
            DirectoryOperation::DeleteList {
                branch,
                list,
                kind,
                properties,
            } => client.delete_list(branch, list, *kind, properties).await,
            DirectoryOperation::InsertMember {
                branch,
                list,
                email,
            } => client.insert_member(branch, list, email).await,
            DirectoryOperation::RemoveMember {
                branch,
                list,
                email,
            } => client.remove_member(branch, list, email).await,
            DirectoryOperation::InsertAlternateAddress {
                branch,
                list,
                email,
            } => client.insert_alternate_address(branch, list, email).await,
            DirectoryOperation::RemoveAlternateAddress {
                branch,
                list,
                email,
            } => client.remove_alternate_address(branch, list, email).await,
        }
    }
}

impl fmt::Display for DirectoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.list(), self.email()) {
            (Some(list), Some(email)) => {
                write!(f, "{} {}/{} {}", self.kind(), self.branch(), list, email)
            }
            _ => write!(f, "{} {}", self.kind(), self.target()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert_member() -> DirectoryOperation {
        DirectoryOperation::InsertMember {
            branch: "BranchA".to_string(),
            list: "Seneschal".to_string(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_targets() {
        let op = DirectoryOperation::DeleteBranch {
            branch: "BranchB".to_string(),
        };
        assert_eq!(op.target(), "BranchB");
        assert_eq!(op.list(), None);

        let op = DirectoryOperation::InsertList {
            branch: "BranchA".to_string(),
            list: "Herald".to_string(),
            kind: ListKind::Alias,
            properties: Properties::new(),
        };
        assert_eq!(op.target(), "BranchA/Herald");
        assert_eq!(op.email(), None);

        assert_eq!(insert_member().target(), "BranchA/Seneschal/a@x.com");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            insert_member().to_string(),
            "insert_member BranchA/Seneschal a@x.com"
        );
        let op = DirectoryOperation::InsertBranch {
            branch: "BranchA".to_string(),
        };
        assert_eq!(op.to_string(), "insert_branch BranchA");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(insert_member().kind(), OperationKind::InsertMember);
        assert!(OperationKind::InsertMember.is_insert());
        assert!(!OperationKind::DeleteList.is_insert());
        assert_eq!(OperationKind::all().len(), 8);
    }

    #[test]
    fn test_serialized_form() {
        let value = serde_json::to_value(insert_member()).unwrap();
        assert_eq!(
            value,
            json!({
                "op": "insert_member",
                "branch": "BranchA",
                "list": "Seneschal",
                "email": "a@x.com"
            })
        );

        let parsed: DirectoryOperation = serde_json::from_value(json!({
            "op": "insert_list",
            "branch": "BranchA",
            "list": "Herald",
            "kind": "alias"
        }))
        .unwrap();
        assert_eq!(parsed.kind(), OperationKind::InsertList);
    }
}
