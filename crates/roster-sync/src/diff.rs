//! Symmetric set difference.
//!
//! One primitive serves both member and alternate-address reconciliation:
//! items only in `new` are reported to `on_add`, items only in `existing` to
//! `on_remove`, and items in both are left alone. Adds are reported before
//! removes, each in ascending order.

use std::collections::BTreeSet;

/// Walk the symmetric difference of two sets.
pub fn sync_sets<'a, T, A, R>(
    new: &'a BTreeSet<T>,
    existing: &'a BTreeSet<T>,
    mut on_add: A,
    mut on_remove: R,
) where
    T: Ord,
    A: FnMut(&'a T),
    R: FnMut(&'a T),
{
    for item in new.difference(existing) {
        on_add(item);
    }
    for item in existing.difference(new) {
        on_remove(item);
    }
}

/// Collected result of [`sync_sets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<'a, T> {
    /// Items in `new` but not in `existing`.
    pub added: Vec<&'a T>,
    /// Items in `existing` but not in `new`.
    pub removed: Vec<&'a T>,
}

impl<'a, T: Ord> SetDiff<'a, T> {
    /// Compute the difference between two sets.
    #[must_use]
    pub fn between(new: &'a BTreeSet<T>, existing: &'a BTreeSet<T>) -> Self {
        let mut added = Vec::new();
        let mut removed = Vec::new();
        sync_sets(new, existing, |item| added.push(item), |item| removed.push(item));
        Self { added, removed }
    }

    /// Whether the two sets were equal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
