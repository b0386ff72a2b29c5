//! Reading and writing membership documents

use std::fs;
use std::path::Path;

use roster_directory::model::MembershipTree;
use roster_sync::{normalize_tree, ReconcileConfig};
use serde_json::Value;

use crate::error::{CliError, CliResult};

/// On-disk document format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

/// Read a document file into a raw value.
pub fn load_document(path: &Path) -> CliResult<Value> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("Failed to read file {}: {}", path.display(), e)))?;

    match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::from_str(&content).map_err(|e| {
            CliError::Parse(format!(
                "Invalid JSON in {} at line {}, column {}: {e}",
                path.display(),
                e.line(),
                e.column()
            ))
        }),
        DocumentFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| {
            let location = if let Some(loc) = e.location() {
                format!(" at line {}, column {}", loc.line(), loc.column())
            } else {
                String::new()
            };
            CliError::Parse(format!("Invalid YAML in {}{location}: {e}", path.display()))
        }),
    }
}

/// Read and normalize a membership document.
pub fn load_tree(path: &Path, config: &ReconcileConfig) -> CliResult<MembershipTree> {
    let document = load_document(path)?;
    let tree = normalize_tree(&document, config).map_err(|source| CliError::Document {
        file: path.display().to_string(),
        source,
    })?;

    tracing::debug!(
        file = %path.display(),
        branches = tree.len(),
        "Loaded membership document"
    );
    Ok(tree)
}

/// Render a tree in the given format.
pub fn render_tree(tree: &MembershipTree, format: DocumentFormat) -> CliResult<String> {
    Ok(match format {
        DocumentFormat::Json => serde_json::to_string_pretty(tree)?,
        DocumentFormat::Yaml => serde_yaml::to_string(tree)?,
    })
}

/// Write a tree to a file, in the format its extension implies.
pub fn write_tree(path: &Path, tree: &MembershipTree) -> CliResult<()> {
    let content = render_tree(tree, DocumentFormat::from_path(path))?;
    fs::write(path, content)
        .map_err(|e| CliError::Io(format!("Failed to write file {}: {}", path.display(), e)))?;

    tracing::info!(file = %path.display(), "Wrote directory snapshot");
    Ok(())
}
