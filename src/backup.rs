//! Backup/restore guardian.
//!
//! Steam rewrites its own resources during updates, and this engine rewrites
//! them at every launch, so the rules are strict: a backup is taken from a
//! known-pristine file before any mutation, a previously patched file is
//! restored from its backup before re-patching, and cleanup puts every
//! original back. The first-line marker is the only signal for "not
//! pristine" — it says nothing about whether the patch is current.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::PATCH_MARKER;
use crate::error::PatchError;
use crate::fsutil;

/// Backup path for a script: `foo.js` → `foo.orig.js`.
pub(crate) fn backup_path(script: &Path) -> PathBuf {
    fsutil::add_ext_prefix(script, "orig")
}

/// Check whether a script's first line carries the patch marker.
pub(crate) fn is_marked(script: &Path) -> Result<bool, PatchError> {
    let file = fs::File::open(script)?;
    let mut first_line = String::new();
    BufReader::new(file).read_line(&mut first_line)?;
    Ok(first_line.contains(PATCH_MARKER))
}

/// Make sure the live script is pristine before the pipeline touches it.
///
/// If the first line carries the marker, a previous (possibly stale) patch
/// is still on disk and the backup is copied back over it. An unmarked file
/// is left alone — it is already pristine and may not have a backup yet.
pub(crate) fn ensure_pristine(script: &Path) -> Result<(), PatchError> {
    if is_marked(script)? {
        info!("{} is already patched, restoring original", script.display());
        fsutil::overwrite_copy(&backup_path(script), script)?;
    }
    Ok(())
}

/// Snapshot the (pristine, by precondition) script to its backup path,
/// replacing any stale backup. Must run before any mutation.
pub(crate) fn snapshot(script: &Path) -> Result<(), PatchError> {
    let backup = backup_path(script);
    info!("Copying original {} to {}", script.display(), backup.display());
    fsutil::overwrite_copy(script, &backup)?;
    Ok(())
}

/// Restore every backed-up script under `dir` over its live path and
/// consume the backup, so a backup on disk always means "mutated since the
/// last full restore".
///
/// Scans for `*.orig.js` rather than consulting session state, so cleanup
/// also works after a crash or across process restarts. Per-file copy
/// failures are logged and skipped, and a backup that failed to copy stays
/// in place; returns how many files were restored.
pub(crate) fn restore_all(dir: &Path) -> Result<usize, PatchError> {
    let mut restored = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let Some(stem) = name.strip_suffix(".orig.js") else {
            continue;
        };
        if entry.path().is_dir() {
            continue;
        }

        let live = dir.join(format!("{stem}.js"));
        info!("Restoring original {}", live.display());
        match fsutil::overwrite_copy(&entry.path(), &live) {
            Ok(()) => {
                if let Err(e) = fs::remove_file(entry.path()) {
                    warn!("Failed to remove backup {}: {e}", entry.path().display());
                }
                restored += 1;
            }
            Err(e) => warn!("Failed to restore {}: {e}", live.display()),
        }
    }

    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn marker_probe_checks_first_line_only() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sp.js");

        write(&script, "// patched by crankshaft v0.1.0\nvar a = 1;");
        assert!(is_marked(&script).unwrap());

        write(&script, "var a = 1;\n// patched by crankshaft v0.1.0");
        assert!(!is_marked(&script).unwrap());
    }

    #[test]
    fn ensure_pristine_restores_marked_file_from_backup() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sp.js");
        write(&script, "// patched by crankshaft\npatched body");
        write(&backup_path(&script), "pristine body");

        ensure_pristine(&script).unwrap();
        assert_eq!(fs::read_to_string(&script).unwrap(), "pristine body");
    }

    #[test]
    fn ensure_pristine_leaves_unmarked_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sp.js");
        write(&script, "pristine body");

        // No backup exists; must not error, must not touch the file.
        ensure_pristine(&script).unwrap();
        assert_eq!(fs::read_to_string(&script).unwrap(), "pristine body");
    }

    #[test]
    fn ensure_pristine_fails_when_marked_but_backup_missing() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sp.js");
        write(&script, "// patched by crankshaft\nbody");

        assert!(ensure_pristine(&script).is_err());
    }

    #[test]
    fn snapshot_overwrites_stale_backup() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("sp.js");
        write(&script, "current pristine");
        write(&backup_path(&script), "stale backup");

        snapshot(&script).unwrap();
        assert_eq!(
            fs::read_to_string(backup_path(&script)).unwrap(),
            "current pristine"
        );
    }

    #[test]
    fn restore_all_copies_backups_and_skips_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("sp.js"), "patched");
        write(&dir.path().join("sp.orig.js"), "pristine sp");
        write(&dir.path().join("libraryroot~sp.js"), "patched lib");
        write(&dir.path().join("libraryroot~sp.orig.js"), "pristine lib");
        write(&dir.path().join("other.js"), "untouched");

        let restored = restore_all(dir.path()).unwrap();
        assert_eq!(restored, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("sp.js")).unwrap(),
            "pristine sp"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("libraryroot~sp.js")).unwrap(),
            "pristine lib"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("other.js")).unwrap(),
            "untouched"
        );

        // Restore consumes the backups.
        assert!(!dir.path().join("sp.orig.js").exists());
        assert!(!dir.path().join("libraryroot~sp.orig.js").exists());
    }
}
