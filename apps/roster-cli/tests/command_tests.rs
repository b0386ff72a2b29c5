//! Integration tests for the plan and apply commands
//!
//! These tests verify:
//! - Planning from YAML and JSON documents
//! - Exit codes for pending and empty plans
//! - Applying against a seeded directory and writing the snapshot
//! - `--no-prune`
//! - Error handling (missing file, invalid YAML, malformed document)

use std::fs;
use std::path::PathBuf;

use roster_cli::commands::apply::{self, ApplyArgs};
use roster_cli::commands::plan::{self, PlanArgs, EXIT_CHANGES_FOUND, EXIT_NO_CHANGES};
use roster_cli::commands::InputArgs;
use roster_cli::error::CliError;
use roster_cli::state::load_tree;
use roster_directory::operation::OperationKind;
use roster_sync::ReconcileConfig;
use tempfile::TempDir;

// ============================================================================
// Test Fixtures
// ============================================================================

const EXISTING: &str = r"
BranchA:
  lists:
    Seneschal:
      members: [b@x.com, c@x.com]
BranchB:
  lists:
    Herald: h@x.com
";

const DESIRED: &str = r"
BranchA:
  lists:
    Seneschal:
      members: [a@x.com, b@x.com]
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    fs::write(&file_path, content).expect("Failed to write test document");
    file_path
}

fn input(desired: PathBuf, existing: PathBuf) -> InputArgs {
    InputArgs {
        desired,
        existing,
        no_prune: false,
    }
}

// ============================================================================
// Plan
// ============================================================================

#[test]
fn test_plan_lists_pending_changes() {
    let dir = TempDir::new().unwrap();
    let args = PlanArgs {
        input: input(
            write_file(&dir, "desired.yaml", DESIRED),
            write_file(&dir, "existing.yaml", EXISTING),
        ),
        json: false,
    };

    let result = plan::compute(&args).unwrap();
    let rendered: Vec<String> = result.iter().map(ToString::to_string).collect();

    assert_eq!(
        rendered,
        vec![
            "insert_member BranchA/Seneschal a@x.com",
            "remove_member BranchA/Seneschal c@x.com",
            "delete_branch BranchB",
        ]
    );
    assert_eq!(plan::exit_code(&result), EXIT_CHANGES_FOUND);
}

#[test]
fn test_plan_of_identical_documents_is_empty() {
    let dir = TempDir::new().unwrap();
    let args = PlanArgs {
        input: input(
            write_file(&dir, "desired.yaml", EXISTING),
            write_file(&dir, "existing.yml", EXISTING),
        ),
        json: true,
    };

    let result = plan::compute(&args).unwrap();
    assert!(result.is_empty());
    assert_eq!(plan::exit_code(&result), EXIT_NO_CHANGES);
}

#[test]
fn test_plan_accepts_json_documents() {
    let dir = TempDir::new().unwrap();
    let desired = write_file(
        &dir,
        "desired.json",
        r#"{"BranchA": {"aliases": {"Webminister": ["Web@X.com"]}}}"#,
    );
    let existing = write_file(&dir, "existing.json", "{}");

    let result = plan::compute(&PlanArgs {
        input: input(desired, existing),
        json: false,
    })
    .unwrap();

    assert_eq!(result.count(OperationKind::InsertBranch), 1);
    assert_eq!(result.count(OperationKind::InsertList), 1);
    assert_eq!(
        result.operations().last().and_then(|op| op.email()),
        Some("web@x.com")
    );
}

#[test]
fn test_plan_without_pruning() {
    let dir = TempDir::new().unwrap();
    let mut args = input(
        write_file(&dir, "desired.yaml", DESIRED),
        write_file(&dir, "existing.yaml", EXISTING),
    );
    args.no_prune = true;

    let result = plan::compute(&PlanArgs {
        input: args,
        json: false,
    })
    .unwrap();

    assert_eq!(result.count(OperationKind::DeleteBranch), 0);
    assert_eq!(result.len(), 2);
}

// ============================================================================
// Apply
// ============================================================================

#[tokio::test]
async fn test_apply_writes_converged_snapshot() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("after.yaml");
    let args = ApplyArgs {
        input: input(
            write_file(&dir, "desired.yaml", DESIRED),
            write_file(&dir, "existing.yaml", EXISTING),
        ),
        output: Some(output.clone()),
        json: false,
    };

    let outcome = apply::run(&args).await.unwrap();

    assert_eq!(outcome.report.applied, 3);
    assert_eq!(outcome.report.action_count(OperationKind::DeleteBranch), 1);

    let written = load_tree(&output, &ReconcileConfig::default()).unwrap();
    assert_eq!(written, outcome.snapshot);
    assert!(!written.contains("BranchB"));
    let members: Vec<&String> = written
        .get("BranchA")
        .and_then(|branch| branch.get("Seneschal"))
        .map(|entry| entry.members.iter().collect())
        .unwrap();
    assert_eq!(members, vec!["a@x.com", "b@x.com"]);
}

#[tokio::test]
async fn test_apply_snapshot_is_a_fixed_point() {
    let dir = TempDir::new().unwrap();
    let desired = write_file(
        &dir,
        "desired.yaml",
        r"
west:
  lists:
    seneschal:
      members: [a@x.com]
      domain: westkingdom.org
",
    );
    let output = dir.path().join("after.yaml");

    apply::run(&ApplyArgs {
        input: input(desired.clone(), write_file(&dir, "existing.yaml", "{}")),
        output: Some(output.clone()),
        json: false,
    })
    .await
    .unwrap();

    let second = apply::run(&ApplyArgs {
        input: input(desired, output),
        output: None,
        json: true,
    })
    .await
    .unwrap();

    assert!(second.report.is_noop());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let args = PlanArgs {
        input: input(
            dir.path().join("nope.yaml"),
            write_file(&dir, "existing.yaml", EXISTING),
        ),
        json: false,
    };

    let err = plan::compute(&args).unwrap_err();
    assert!(matches!(err, CliError::FileNotFound(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_invalid_yaml_reports_location() {
    let dir = TempDir::new().unwrap();
    let args = PlanArgs {
        input: input(
            write_file(&dir, "desired.yaml", "BranchA:\n  lists: [unclosed\n"),
            write_file(&dir, "existing.yaml", EXISTING),
        ),
        json: false,
    };

    match plan::compute(&args).unwrap_err() {
        CliError::Parse(message) => {
            assert!(message.contains("Invalid YAML"), "{message}");
            assert!(message.contains("line"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_document_names_file_and_path() {
    let dir = TempDir::new().unwrap();
    let desired = write_file(
        &dir,
        "desired.yaml",
        "BranchA:\n  lists:\n    Seneschal:\n      properties: {}\n",
    );
    let args = PlanArgs {
        input: input(desired, write_file(&dir, "existing.yaml", EXISTING)),
        json: false,
    };

    let err = plan::compute(&args).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("desired.yaml"), "{message}");
    assert!(message.contains("BranchA/lists/Seneschal"), "{message}");
}

#[test]
fn test_invalid_address_is_rejected_before_planning() {
    let dir = TempDir::new().unwrap();
    let args = PlanArgs {
        input: input(
            write_file(&dir, "desired.yaml", "BranchA:\n  lists:\n    Seneschal: nobody\n"),
            write_file(&dir, "existing.yaml", EXISTING),
        ),
        json: false,
    };

    match plan::compute(&args).unwrap_err() {
        CliError::Reconcile(e) => assert_eq!(e.error_code(), "INVALID_INPUT"),
        other => panic!("unexpected error: {other}"),
    }
}
