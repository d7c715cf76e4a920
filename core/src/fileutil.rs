//! File Utility Functions

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Returns the absolute path after resolving the given path. The path must
/// exist.
///
/// * `path` - The path.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .map_err(|err| Error::path_unavailable(path, format!("invalid path. {err}.")))
}

/// Returns true if the path has the given extension, ignoring case.
///
/// * `path` - The path.
/// * `ext`  - Extension without the leading dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_resolves_existing() {
        let dir = tempfile::tempdir().unwrap();
        let p = absolute_path(dir.path()).unwrap();
        assert!(p.is_absolute());
        assert!(absolute_path(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn extension_check() {
        assert!(has_extension(Path::new("a/Cola.PNG"), "png"));
        assert!(!has_extension(Path::new("a/Cola"), "png"));
    }
}
