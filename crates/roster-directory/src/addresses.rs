//! Alternate address derivation.
//!
//! A list's alternate addresses are a pure function of the branch name, the
//! list name and the list properties:
//!
//! - `alternate-addresses`: explicit addresses (a string or a list of strings)
//! - `domain`: adds the conventional `{branch}-{list}@{domain}` address
//!
//! Addresses are trimmed and always lowercased, whatever the member case
//! setting. The stored directory state is never consulted; both sides of a
//! comparison are derived the same way.

use std::collections::BTreeSet;

use serde_json::Value;
use thiserror::Error;

use crate::model::Properties;

/// Property holding explicit alternate addresses.
pub const ALTERNATE_ADDRESSES_KEY: &str = "alternate-addresses";

/// Property holding the mail domain used for the conventional address.
pub const DOMAIN_KEY: &str = "domain";

/// A property that alternate addresses are derived from has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("property '{key}' must be {expected}")]
pub struct PropertyError {
    /// Offending property key.
    pub key: &'static str,
    /// Description of the accepted shape.
    pub expected: &'static str,
}

/// Derive the alternate address set of a list.
pub fn alternate_addresses(
    branch: &str,
    list: &str,
    properties: &Properties,
) -> Result<BTreeSet<String>, PropertyError> {
    let mut addresses = BTreeSet::new();

    match properties.get(ALTERNATE_ADDRESSES_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::String(address)) => push_address(&mut addresses, address),
        Some(Value::Array(values)) => {
            for value in values {
                let address = value.as_str().ok_or(PropertyError {
                    key: ALTERNATE_ADDRESSES_KEY,
                    expected: "a string or a list of strings",
                })?;
                push_address(&mut addresses, address);
            }
        }
        Some(_) => {
            return Err(PropertyError {
                key: ALTERNATE_ADDRESSES_KEY,
                expected: "a string or a list of strings",
            })
        }
    }

    match properties.get(DOMAIN_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::String(domain)) if domain.trim().is_empty() => {}
        Some(Value::String(domain)) => {
            addresses.insert(conventional_address(branch, list, domain));
        }
        Some(_) => {
            return Err(PropertyError {
                key: DOMAIN_KEY,
                expected: "a string",
            })
        }
    }

    Ok(addresses)
}

/// The branch-qualified address of a list: `{branch}-{list}@{domain}`.
///
/// Runs of whitespace inside a branch or list name become a single `-`.
#[must_use]
pub fn conventional_address(branch: &str, list: &str, domain: &str) -> String {
    format!(
        "{}-{}@{}",
        local_part(branch),
        local_part(list),
        domain.trim()
    )
    .to_lowercase()
}

fn local_part(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("-")
}

fn push_address(addresses: &mut BTreeSet<String>, address: &str) {
    let address = address.trim();
    if !address.is_empty() {
        addresses.insert(address.to_lowercase());
    }
}
