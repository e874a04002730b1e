// ABOUTME: Compose manifest discovery under configured root directories.
// ABOUTME: Bounded-depth walk that skips hidden and dependency-cache directories.

use crate::diagnostics::{Diagnostics, Warning};
use std::path::PathBuf;
use walkdir::{DirEntry, WalkDir};

/// File names recognised as compose manifests.
pub const MANIFEST_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Default number of directory levels below each root to descend.
pub const DEFAULT_SCAN_DEPTH: usize = 6;

fn should_skip_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "node_modules"
}

fn is_manifest(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| MANIFEST_NAMES.contains(&name))
}

/// Find compose manifests under each root, descending at most `max_depth`
/// directory levels.
///
/// Unreadable directories are recorded in `diagnostics` and skipped. Entries
/// are visited in file-name order so repeated scans return the same order.
pub fn find_manifests(
    roots: &[PathBuf],
    max_depth: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in roots {
        let walker = WalkDir::new(root)
            .max_depth(max_depth + 1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !should_skip_dir(entry));

        for entry in walker {
            match entry {
                Ok(entry) if is_manifest(&entry) => found.push(absolute(entry.into_path())),
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().unwrap_or(root.as_path());
                    diagnostics.warn(Warning::unreadable_directory(path, e.to_string()));
                }
            }
        }
    }
    found
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn skips_hidden_and_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join("web")).unwrap();
        fs::write(root.join(".git/compose.yml"), "services: {}").unwrap();
        fs::write(root.join("node_modules/pkg/compose.yml"), "services: {}").unwrap();
        fs::write(root.join("web/compose.yaml"), "services: {}").unwrap();
        fs::write(root.join("web/notes.yml"), "services: {}").unwrap();

        let mut diag = Diagnostics::default();
        let found = find_manifests(&[root.to_path_buf()], DEFAULT_SCAN_DEPTH, &mut diag);

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("web/compose.yaml"));
        assert!(!diag.has_warnings());
    }

    #[test]
    fn depth_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("a/b/c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("docker-compose.yml"), "services: {}").unwrap();

        let mut diag = Diagnostics::default();
        assert!(find_manifests(&[dir.path().to_path_buf()], 2, &mut diag).is_empty());
        assert_eq!(
            find_manifests(&[dir.path().to_path_buf()], 3, &mut diag).len(),
            1
        );
    }

    #[test]
    fn missing_root_is_a_warning_not_an_error() {
        let mut diag = Diagnostics::default();
        let found = find_manifests(
            &[PathBuf::from("/nonexistent/dockscout-root")],
            DEFAULT_SCAN_DEPTH,
            &mut diag,
        );
        assert!(found.is_empty());
        assert_eq!(diag.warnings().len(), 1);
    }
}
