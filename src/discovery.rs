use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AuditError;

fn has_supported_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}

/// Resolves `path` into the input files to audit.
///
/// A supported file yields itself; a directory yields its direct children
/// with a supported extension, sorted by path. Anything else yields nothing.
pub fn supported_files(path: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, AuditError> {
    if path.is_file() {
        return Ok(if has_supported_extension(path, extensions) {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    if !path.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let candidate = entry?.path();
        if candidate.is_file() && has_supported_extension(&candidate, extensions) {
            files.push(candidate);
        }
    }
    files.sort();
    Ok(files)
}
