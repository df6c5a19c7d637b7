// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// This is intentionally robust:
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
/// - Only if both attempts fail do we give up.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    // macOS reports /private/var/... for /var/..., so compare canonical forms.
    // A removed file cannot be canonicalized; fall back to its parent.
    let root_canon = root.canonicalize().ok()?;
    if let Ok(path_canon) = path.canonicalize() {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    let parent_canon = path.parent()?.canonicalize().ok()?;
    let rel_parent = parent_canon.strip_prefix(&root_canon).ok()?;
    let joined = rel_parent.join(path.file_name()?);
    Some(joined.to_string_lossy().replace('\\', "/"))
}

/// Any segment of a vault-relative path starts with a dot.
pub fn is_hidden(rel: &str) -> bool {
    rel.split('/').any(|seg| seg.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        assert_eq!(
            relative_str(Path::new("/vault"), Path::new("/vault/Art/a.psd")).as_deref(),
            Some("Art/a.psd")
        );
    }

    #[test]
    fn removed_file_under_canonical_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("sub")).unwrap();
        let gone = dir.path().join("sub").join("gone.psd");
        assert_eq!(relative_str(&root, &gone).as_deref(), Some("sub/gone.psd"));
    }

    #[test]
    fn hidden_segments() {
        assert!(is_hidden(".obsidian/app.json"));
        assert!(is_hidden("Art/.cache/a.png"));
        assert!(!is_hidden("Art/a.b.png"));
    }
}
