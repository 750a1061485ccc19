//! Small filesystem helpers shared across the engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Insert a prefix segment before a path's extension.
///
/// `add_ext_prefix("foo/bar/baz.js", "orig")` → `foo/bar/baz.orig.js`.
/// A path without an extension just gets the segment appended.
pub(crate) fn add_ext_prefix(path: &Path, prefix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{prefix}.{ext}"),
        None => format!("{stem}.{prefix}"),
    };
    path.with_file_name(name)
}

/// Copy `from` over `to`, replacing `to` if it already exists.
pub(crate) fn overwrite_copy(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_prefix_inserted_before_extension() {
        assert_eq!(
            add_ext_prefix(Path::new("foo/bar/baz.js"), "orig"),
            PathBuf::from("foo/bar/baz.orig.js")
        );
    }

    #[test]
    fn ext_prefix_without_extension_appends() {
        assert_eq!(
            add_ext_prefix(Path::new("foo/bar"), "unmin"),
            PathBuf::from("foo/bar.unmin")
        );
    }

    #[test]
    fn ext_prefix_keeps_tilde_names_intact() {
        // Steam bundles use `~` in file names, e.g. libraryroot~sp.js
        assert_eq!(
            add_ext_prefix(Path::new("steamui/libraryroot~sp.js"), "unmin"),
            PathBuf::from("steamui/libraryroot~sp.unmin.js")
        );
    }

    #[test]
    fn overwrite_copy_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.js");
        let to = dir.path().join("b.js");
        fs::write(&from, "new contents").unwrap();
        fs::write(&to, "old contents").unwrap();

        overwrite_copy(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "new contents");
    }
}
