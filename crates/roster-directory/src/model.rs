//! Membership model
//!
//! Canonical in-memory form of a membership structure: branches own lists and
//! aliases, each of which has opaque properties and a set of member addresses.
//!
//! All collections are ordered (`BTreeMap`/`BTreeSet`) so that anything walking
//! the tree visits nodes in the same order on every run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Which sub-collection of a branch an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Mailing list that keeps an archive of delivered mail.
    #[default]
    List,
    /// Pass-through address group without an archive.
    Alias,
}

impl ListKind {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::List => "list",
            ListKind::Alias => "alias",
        }
    }

    /// Name of the branch sub-collection holding entries of this kind.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            ListKind::List => "lists",
            ListKind::Alias => "aliases",
        }
    }

    /// Whether delivered mail is archived.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        matches!(self, ListKind::List)
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque configuration of a list or alias (display name, domain, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Value>);

impl Properties {
    /// Create an empty property bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property using builder pattern.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a property value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a property as a string slice.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Check if a property exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a property.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Properties {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A mailing list or alias within a branch.
///
/// Alternate addresses are not stored here; they are derived from the branch
/// name, list name and properties by [`crate::addresses::alternate_addresses`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListEntry {
    /// List or alias. Serialized through the branch sub-collection instead.
    #[serde(skip)]
    pub kind: ListKind,
    /// Opaque configuration passed to the directory on insert.
    #[serde(skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    /// Member email addresses.
    pub members: BTreeSet<String>,
}

impl ListEntry {
    /// Create an empty entry of the given kind.
    #[must_use]
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            properties: Properties::new(),
            members: BTreeSet::new(),
        }
    }

    /// Create an empty archived list.
    #[must_use]
    pub fn list() -> Self {
        Self::new(ListKind::List)
    }

    /// Create an empty pass-through alias.
    #[must_use]
    pub fn alias() -> Self {
        Self::new(ListKind::Alias)
    }

    /// Add a member using builder pattern.
    #[must_use]
    pub fn with_member(mut self, email: impl Into<String>) -> Self {
        self.members.insert(email.into());
        self
    }

    /// Add several members using builder pattern.
    #[must_use]
    pub fn with_members<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members.extend(emails.into_iter().map(Into::into));
        self
    }

    /// Set a property using builder pattern.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Replace the property bag using builder pattern.
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// A branch: one namespace of lists and aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branch {
    entries: BTreeMap<String, ListEntry>,
}

impl Branch {
    /// Create an empty branch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry using builder pattern.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, entry: ListEntry) -> Self {
        self.insert(name, entry);
        self
    }

    /// Add or replace an entry, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, entry: ListEntry) -> Option<ListEntry> {
        self.entries.insert(name.into(), entry)
    }

    /// Get an entry by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ListEntry> {
        self.entries.get(name)
    }

    /// Check if an entry exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterate over all entries (lists and aliases) in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ListEntry)> {
        self.entries.iter()
    }

    /// Iterate over entries of one kind in name order.
    pub fn entries_of(&self, kind: ListKind) -> impl Iterator<Item = (&String, &ListEntry)> {
        self.entries.iter().filter(move |(_, entry)| entry.kind == kind)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the branch has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let lists: BTreeMap<&String, &ListEntry> = self.entries_of(ListKind::List).collect();
        let aliases: BTreeMap<&String, &ListEntry> = self.entries_of(ListKind::Alias).collect();

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(ListKind::List.collection(), &lists)?;
        if !aliases.is_empty() {
            map.serialize_entry(ListKind::Alias.collection(), &aliases)?;
        }
        map.end()
    }
}

/// Full membership structure keyed by branch name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MembershipTree {
    branches: BTreeMap<String, Branch>,
}

impl MembershipTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch using builder pattern.
    #[must_use]
    pub fn with_branch(mut self, name: impl Into<String>, branch: Branch) -> Self {
        self.insert(name, branch);
        self
    }

    /// Add or replace a branch, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, branch: Branch) -> Option<Branch> {
        self.branches.insert(name.into(), branch)
    }

    /// Get a branch by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Branch> {
        self.branches.get(name)
    }

    /// Check if a branch exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Iterate over branches in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Branch)> {
        self.branches.iter()
    }

    /// Number of branches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Check if the tree has no branches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl FromIterator<(String, Branch)> for MembershipTree {
    fn from_iter<T: IntoIterator<Item = (String, Branch)>>(iter: T) -> Self {
        Self {
            branches: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_kind_collections() {
        assert_eq!(ListKind::List.collection(), "lists");
        assert_eq!(ListKind::Alias.collection(), "aliases");
        assert!(ListKind::List.is_archived());
        assert!(!ListKind::Alias.is_archived());
        assert_eq!(ListKind::Alias.to_string(), "alias");
    }

    #[test]
    fn test_members_deduplicate() {
        let entry = ListEntry::list().with_members(["a@x.com", "b@x.com", "a@x.com"]);
        assert_eq!(entry.members.len(), 2);
    }

    #[test]
    fn test_branch_partitions_by_kind() {
        let branch = Branch::new()
            .with_entry("seneschal", ListEntry::list().with_member("a@x.com"))
            .with_entry("webminister", ListEntry::alias().with_member("b@x.com"));

        let lists: Vec<&String> = branch.entries_of(ListKind::List).map(|(n, _)| n).collect();
        let aliases: Vec<&String> = branch.entries_of(ListKind::Alias).map(|(n, _)| n).collect();

        assert_eq!(lists, vec!["seneschal"]);
        assert_eq!(aliases, vec!["webminister"]);
        assert_eq!(branch.len(), 2);
    }

    #[test]
    fn test_tree_serializes_in_canonical_shape() {
        let tree = MembershipTree::new().with_branch(
            "west",
            Branch::new()
                .with_entry(
                    "seneschal",
                    ListEntry::list()
                        .with_member("a@x.com")
                        .with_property("domain", "westkingdom.org"),
                )
                .with_entry("herald", ListEntry::alias().with_member("b@x.com")),
        );

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            value,
            json!({
                "west": {
                    "lists": {
                        "seneschal": {
                            "properties": {"domain": "westkingdom.org"},
                            "members": ["a@x.com"]
                        }
                    },
                    "aliases": {
                        "herald": {"members": ["b@x.com"]}
                    }
                }
            })
        );
    }

    #[test]
    fn test_empty_branch_still_has_lists_key() {
        let tree = MembershipTree::new().with_branch("east", Branch::new());
        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value, json!({"east": {"lists": {}}}));
    }
}
