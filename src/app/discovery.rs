use crate::utils::error::{AuditError, Result};
use std::path::{Path, PathBuf};

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Expand inputs into the list of documents to audit.
///
/// Files are taken as given. Directories contribute their direct `.pdf`
/// children, sorted by name.
pub fn discover_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = PathBuf::from(input);

        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(&path)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && is_pdf(p))
                .collect();
            found.sort();
            tracing::debug!("Found {} PDFs in {}", found.len(), path.display());
            files.extend(found);
        } else if path.is_file() {
            files.push(path);
        } else {
            return Err(AuditError::InvalidConfigValueError {
                field: "audit.inputs".to_string(),
                value: input.clone(),
                reason: "Path does not exist".to_string(),
            });
        }
    }

    if files.is_empty() {
        return Err(AuditError::NoInputFiles {
            inputs: inputs.join(", "),
        });
    }

    Ok(files)
}
