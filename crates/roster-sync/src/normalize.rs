//! Normalization of membership documents.
//!
//! Membership documents are loosely shaped. A branch maps to an object with
//! optional `lists` and `aliases` collections, and each group in those
//! collections can be written three ways:
//!
//! ```yaml
//! west:
//!   lists:
//!     seneschal: steward@example.com            # one member
//!     herald: [a@example.com, b@example.com]    # member list
//!     chronicler:                               # full form
//!       members: [c@example.com]
//!       properties:
//!         domain: westkingdom.org
//!       display-name: Chronicler                # extra keys become properties
//!   aliases:
//!     webminister: web@example.com
//! ```
//!
//! [`normalize_tree`] turns such a document into a canonical
//! [`MembershipTree`]. A missing `lists` or `aliases` key means an empty
//! collection; a full-form group without a `members` key is rejected.

use std::collections::BTreeSet;

use roster_directory::model::{Branch, ListEntry, ListKind, MembershipTree, Properties};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::config::ReconcileConfig;

/// A membership document does not have an accepted shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid membership document at {path}: {message}")]
pub struct NormalizeError {
    /// Location inside the document, `/`-separated.
    pub path: String,
    /// What is wrong there.
    pub message: String,
}

impl NormalizeError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

const MEMBERS_KEY: &str = "members";
const PROPERTIES_KEY: &str = "properties";

/// Normalize a raw membership document.
pub fn normalize_tree(
    document: &Value,
    config: &ReconcileConfig,
) -> Result<MembershipTree, NormalizeError> {
    let branches = match document {
        Value::Null => return Ok(MembershipTree::new()),
        Value::Object(branches) => branches,
        other => {
            return Err(NormalizeError::new(
                "/",
                format!("expected a map of branches, found {}", type_name(other)),
            ))
        }
    };

    let mut tree = MembershipTree::new();
    for (name, value) in branches {
        tree.insert(name.clone(), normalize_branch(name, value, config)?);
    }

    debug!(branches = tree.len(), "Normalized membership document");
    Ok(tree)
}

fn normalize_branch(
    name: &str,
    value: &Value,
    config: &ReconcileConfig,
) -> Result<Branch, NormalizeError> {
    let sections = match value {
        Value::Null => return Ok(Branch::new()),
        Value::Object(sections) => sections,
        other => {
            return Err(NormalizeError::new(
                name,
                format!("expected lists/aliases map, found {}", type_name(other)),
            ))
        }
    };

    if let Some(unknown) = sections
        .keys()
        .find(|key| *key != ListKind::List.collection() && *key != ListKind::Alias.collection())
    {
        return Err(NormalizeError::new(
            format!("{name}/{unknown}"),
            "unknown branch section, expected 'lists' or 'aliases'",
        ));
    }

    let mut branch = Branch::new();
    for kind in [ListKind::List, ListKind::Alias] {
        let section_path = format!("{name}/{}", kind.collection());
        let groups = match sections.get(kind.collection()) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(groups)) => groups,
            Some(other) => {
                return Err(NormalizeError::new(
                    section_path,
                    format!("expected a map of groups, found {}", type_name(other)),
                ))
            }
        };

        for (group_name, group) in groups {
            let group_path = format!("{section_path}/{group_name}");
            if branch.contains(group_name) {
                return Err(NormalizeError::new(
                    group_path,
                    "name is used by both a list and an alias",
                ));
            }
            branch.insert(
                group_name.clone(),
                normalize_group(group, kind, &group_path, config)?,
            );
        }
    }

    Ok(branch)
}

fn normalize_group(
    value: &Value,
    kind: ListKind,
    path: &str,
    config: &ReconcileConfig,
) -> Result<ListEntry, NormalizeError> {
    match value {
        Value::String(_) | Value::Array(_) => Ok(ListEntry {
            kind,
            properties: Properties::new(),
            members: normalize_members(value, path, config)?,
        }),
        Value::Object(fields) => {
            let members = fields.get(MEMBERS_KEY).ok_or_else(|| {
                NormalizeError::new(path, "group is missing the 'members' key")
            })?;
            let members_path = format!("{path}/{MEMBERS_KEY}");

            Ok(ListEntry {
                kind,
                properties: normalize_properties(fields, path)?,
                members: normalize_members(members, &members_path, config)?,
            })
        }
        other => Err(NormalizeError::new(
            path,
            format!(
                "expected an address, a list of addresses or a map with members, found {}",
                type_name(other)
            ),
        )),
    }
}

fn normalize_members(
    value: &Value,
    path: &str,
    config: &ReconcileConfig,
) -> Result<BTreeSet<String>, NormalizeError> {
    match value {
        Value::Null => Err(NormalizeError::new(
            path,
            "members must be an address or a list of addresses, found nothing",
        )),
        Value::String(address) => {
            Ok(BTreeSet::from([normalize_address(address, path, config)?]))
        }
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let item_path = format!("{path}/{index}");
                item.as_str()
                    .ok_or_else(|| {
                        NormalizeError::new(
                            &item_path,
                            format!("expected an address, found {}", type_name(item)),
                        )
                    })
                    .and_then(|address| normalize_address(address, &item_path, config))
            })
            .collect(),
        other => Err(NormalizeError::new(
            path,
            format!(
                "expected an address or a list of addresses, found {}",
                type_name(other)
            ),
        )),
    }
}

/// Collect `properties` plus any extra group keys. Explicit `properties`
/// entries win over extra keys of the same name.
fn normalize_properties(fields: &Map<String, Value>, path: &str) -> Result<Properties, NormalizeError> {
    let mut properties = Properties::new();

    for (key, value) in fields {
        if key != MEMBERS_KEY && key != PROPERTIES_KEY {
            properties.insert(key.clone(), value.clone());
        }
    }

    match fields.get(PROPERTIES_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Object(explicit)) => {
            for (key, value) in explicit {
                properties.insert(key.clone(), value.clone());
            }
        }
        Some(other) => {
            return Err(NormalizeError::new(
                format!("{path}/{PROPERTIES_KEY}"),
                format!("expected a map, found {}", type_name(other)),
            ))
        }
    }

    Ok(properties)
}

fn normalize_address(
    address: &str,
    path: &str,
    config: &ReconcileConfig,
) -> Result<String, NormalizeError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(NormalizeError::new(path, "empty address"));
    }
    Ok(if config.ignore_case {
        address.to_lowercase()
    } else {
        address.to_string()
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
