//! # Roster Directory
//!
//! Membership model and directory client abstractions for roster.
//!
//! A directory holds *branches*; each branch owns *lists* (archived mailing
//! lists) and *aliases* (pass-through address groups). Every list or alias has
//! opaque properties, a set of member addresses and a set of alternate
//! addresses derived from its properties.
//!
//! ## Crate Organization
//!
//! - [`model`] - `MembershipTree`, `Branch`, `ListEntry`, `Properties`
//! - [`addresses`] - Alternate address derivation
//! - [`traits`] - The [`DirectoryClient`](traits::DirectoryClient) trait
//! - [`operation`] - `DirectoryOperation`, the value form of one call
//! - [`error`] - Error types with transient/permanent classification
//! - [`memory`] - In-memory directory enforcing the client contract
//! - [`recording`] - Call journal for dry runs and tests
//!
//! ## Example
//!
//! ```ignore
//! use roster_directory::prelude::*;
//!
//! let directory = InMemoryDirectory::new();
//! directory.begin().await?;
//! directory.insert_branch("west").await?;
//! directory
//!     .insert_list("west", "seneschal", ListKind::List, &Properties::new())
//!     .await?;
//! directory.insert_member("west", "seneschal", "a@x.com").await?;
//! directory.complete().await?;
//! ```

pub mod addresses;
pub mod error;
pub mod memory;
pub mod model;
pub mod operation;
pub mod recording;
pub mod traits;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::addresses::{alternate_addresses, PropertyError};
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::memory::InMemoryDirectory;
    pub use crate::model::{Branch, ListEntry, ListKind, MembershipTree, Properties};
    pub use crate::operation::{DirectoryOperation, OperationKind};
    pub use crate::recording::{RecordedCall, RecordingDirectory};
    pub use crate::traits::DirectoryClient;
}

// Re-export async_trait for client implementors
pub use async_trait::async_trait;
