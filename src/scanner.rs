use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Resolves the input argument into an ordered list of candidate files:
/// an existing directory is walked recursively, anything else is treated
/// as a glob pattern.
pub fn discover(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_dir() {
        scan_directory(path)
    } else {
        expand_glob(input)
    }
}

/// Recursively collects Go source files under `dir`, excluding generated
/// companion files, tests, and vendored code.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if !file_name.ends_with(".go") {
            continue;
        }
        if file_name.ends_with("_enum.go") || file_name.ends_with("_test.go") {
            continue;
        }
        if path
            .components()
            .any(|c| c.as_os_str() == "vendor" || c.as_os_str() == "testdata")
        {
            continue;
        }

        files.push(path.to_path_buf());
    }

    // Walk order is platform dependent; sort for deterministic output order.
    files.sort();
    Ok(files)
}

/// Expands a glob pattern into matching file paths, in sorted order.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| Error::Discovery {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })?;

    Ok(paths
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .collect())
}
