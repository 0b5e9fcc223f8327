//! Parallel file processing using Rayon

use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::host::{FileKind, Migrator};
use crate::replace::write_if_changed;
use crate::report::FileReport;

/// Migrate one file; failures become a failed report, never an error
pub fn migrate_file(migrator: &Migrator, path: &Path, write: bool) -> FileReport {
    let path_str = path.display().to_string();

    let original = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => return FileReport::failed(path_str, format!("Failed to read file: {}", e)),
    };

    let rewrite = match migrator.migrate_source(path, &original) {
        Ok(rewrite) => rewrite,
        Err(e) => {
            warn!(path = %path_str, "{}", e);
            return FileReport::failed(path_str, e.to_string());
        }
    };

    let written = if write {
        match write_if_changed(path, &original, &rewrite.text) {
            Ok(written) => written,
            Err(e) => return FileReport::failed(path_str, e.to_string()),
        }
    } else {
        false
    };

    debug!(path = %path_str, written, "processed");
    FileReport::from_rewrite(path_str, &original, rewrite, written)
}

/// Process multiple files in parallel, one report per file in input order
pub fn process_files_parallel<P: AsRef<Path> + Sync>(
    files: &[P],
    migrator: &Migrator,
    write: bool,
) -> Vec<FileReport> {
    files
        .par_iter()
        .map(|path| migrate_file(migrator, path.as_ref(), write))
        .collect()
}

/// Expand glob patterns to file paths
pub fn expand_globs(patterns: &[String]) -> Vec<String> {
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') {
            match glob::glob(pattern) {
                Ok(paths) => {
                    for entry in paths.flatten() {
                        if entry.is_file() {
                            if let Some(path) = entry.to_str() {
                                files.push(path.to_string());
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!("Invalid glob pattern '{}': {}", pattern, e);
                }
            }
        } else {
            // Not a glob, use as-is
            files.push(pattern.clone());
        }
    }

    files
}

/// Filter files by supported host kinds
pub fn filter_supported_files(files: Vec<String>) -> Vec<String> {
    files
        .into_iter()
        .filter(|f| FileKind::detect(f).is_some())
        .collect()
}
