use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::RouteError;

/// Source files under `root` with one of `extensions`, in traversal order.
///
/// Entries are sorted by file name within each directory so the order, and
/// with it route registration order, is the same on every run. Hidden files
/// and directories below `root` are skipped: they cannot name a module.
pub fn scan_sources(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, RouteError> {
    if !root.is_dir() {
        return Err(RouteError::Scan {
            root: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut sources = Vec::new();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if has_extension(path, extensions) {
            sources.push(path.to_path_buf());
        }
    }
    Ok(sources)
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x == e))
}

/// Module path of a source file relative to the scan root.
///
/// `a/b.rs` is `a::b`, `a/mod.rs` is `a`, and a crate root (`lib.rs`,
/// `main.rs`) or top-level `mod.rs` contributes nothing.
pub fn module_path(root: &Path, file: &Path) -> Vec<String> {
    let Ok(relative) = file.strip_prefix(root) else {
        return Vec::new();
    };

    let mut parts: Vec<String> = relative
        .parent()
        .map(|dir| {
            dir.components()
                .map(|c| c.as_os_str().to_string_lossy().replace('-', "_"))
                .collect()
        })
        .unwrap_or_default();

    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().replace('-', "_"))
        .unwrap_or_default();
    let is_crate_root = parts.is_empty() && (stem == "lib" || stem == "main");
    if stem != "mod" && !is_crate_root && !stem.is_empty() {
        parts.push(stem);
    }
    parts
}
