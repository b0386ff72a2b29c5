//! Input validation.
//!
//! Both trees are checked in full before the reconciler issues its first
//! directory call, so malformed input never results in a half-applied run.

use roster_directory::addresses::alternate_addresses;
use roster_directory::model::MembershipTree;

use crate::error::{ReconcileError, ReconcileResult};

/// Validate every branch, list, member and derived alternate address.
///
/// `label` prefixes error paths (e.g. `desired:BranchA/Seneschal`).
pub fn validate_tree(tree: &MembershipTree, label: &str) -> ReconcileResult<()> {
    for (branch_name, branch) in tree.iter() {
        let branch_path = format!("{label}:{branch_name}");
        validate_name(branch_name)
            .map_err(|message| ReconcileError::invalid_input(&branch_path, message))?;

        for (list_name, entry) in branch.iter() {
            let list_path = format!("{branch_path}/{list_name}");
            validate_name(list_name)
                .map_err(|message| ReconcileError::invalid_input(&list_path, message))?;

            for member in &entry.members {
                validate_address(member).map_err(|message| {
                    ReconcileError::invalid_input(format!("{list_path}/members"), message)
                })?;
            }

            let addresses = alternate_addresses(branch_name, list_name, &entry.properties)
                .map_err(|e| {
                    ReconcileError::invalid_input(format!("{list_path}/properties"), e.to_string())
                })?;
            for address in &addresses {
                validate_address(address).map_err(|message| {
                    ReconcileError::invalid_input(
                        format!("{list_path}/alternate-addresses"),
                        message,
                    )
                })?;
            }
        }
    }

    Ok(())
}

/// Check a branch or list name.
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.trim() != name {
        return Err(format!("name '{name}' has surrounding whitespace"));
    }
    if name.contains('/') {
        return Err(format!("name '{name}' must not contain '/'"));
    }
    Ok(())
}

/// Check that an address has the form `local@domain`.
pub fn validate_address(address: &str) -> Result<(), String> {
    if address.chars().any(char::is_whitespace) {
        return Err(format!("address '{address}' contains whitespace"));
    }

    let mut parts = address.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(format!("address '{address}' is not of the form local@domain")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_directory::model::{Branch, ListEntry};
    use serde_json::json;

    #[test]
    fn test_addresses() {
        assert!(validate_address("a@x.com").is_ok());
        assert!(validate_address("first.last+tag@sub.x.org").is_ok());
        assert!(validate_address("a").is_err());
        assert!(validate_address("@x.com").is_err());
        assert!(validate_address("a@").is_err());
        assert!(validate_address("a@b@c").is_err());
        assert!(validate_address("a b@x.com").is_err());
    }

    #[test]
    fn test_names() {
        assert!(validate_name("Seneschal").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(" Seneschal").is_err());
        assert!(validate_name("a/b").is_err());
    }

    #[test]
    fn test_valid_tree() {
        let tree = MembershipTree::new().with_branch(
            "BranchA",
            Branch::new().with_entry(
                "Seneschal",
                ListEntry::list()
                    .with_members(["a@x.com", "b@x.com"])
                    .with_property("domain", "x.com"),
            ),
        );
        assert!(validate_tree(&tree, "desired").is_ok());
    }

    #[test]
    fn test_bad_member_reports_path() {
        let tree = MembershipTree::new().with_branch(
            "BranchA",
            Branch::new().with_entry("Seneschal", ListEntry::list().with_member("not-an-address")),
        );

        let err = validate_tree(&tree, "desired").unwrap_err();
        match err {
            ReconcileError::InvalidInput { path, message } => {
                assert_eq!(path, "desired:BranchA/Seneschal/members");
                assert!(message.contains("not-an-address"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_alternate_address_property() {
        let tree = MembershipTree::new().with_branch(
            "BranchA",
            Branch::new().with_entry(
                "Seneschal",
                ListEntry::list().with_property("alternate-addresses", json!(42)),
            ),
        );

        let err = validate_tree(&tree, "existing").unwrap_err();
        assert!(err.to_string().contains("existing:BranchA/Seneschal/properties"));
    }

    #[test]
    fn test_bad_derived_alternate_address() {
        let tree = MembershipTree::new().with_branch(
            "BranchA",
            Branch::new().with_entry(
                "Seneschal",
                ListEntry::list().with_property("alternate-addresses", "nobody"),
            ),
        );

        let err = validate_tree(&tree, "desired").unwrap_err();
        assert!(err
            .to_string()
            .contains("desired:BranchA/Seneschal/alternate-addresses"));
    }
}
