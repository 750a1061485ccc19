//! Patch orchestration.
//!
//! Drives the per-target pipeline over the fixed catalog of known Steam UI
//! bundles. Steam overwrites modified resources at startup, so this runs on
//! every crankshaft launch; cleanup must run before Steam next starts on its
//! own or it goes through a long self-repair.
//!
//! Per target: ensure pristine → snapshot → cache lookup → (on miss)
//! unminify, run the file's patch steps, stamp the marker, write back,
//! populate the cache. Targets fail independently; only the load-bearing
//! library-root target failing fails the run as a whole.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::backup;
use crate::cache;
use crate::client::{ClientControl, LIBRARY_VIEW};
use crate::config::PatchConfig;
use crate::error::PatchError;
use crate::hooks;
use crate::library_root;
use crate::line_buffer::LineBuffer;
use crate::menu_shell;
use crate::unmin::Unminify;

/// Content signature identifying the library-root bundle; its file name
/// changes between Steam builds.
const LIBRARY_ROOT_SIGNATURE: &str = "GetWhatsNewEvents";

/// Fixed file name of the menu shell bundle.
const MENU_SHELL_FILE: &str = "sp.js";

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// The library view bundle. Load-bearing: the boot hook that injects the
    /// plugin runtime lives here, so its failure fails the whole run.
    LibraryRoot,
    /// The menu shell bundle (`sp.js`).
    MenuShell,
}

/// One resource file to transform, fixed for the run.
#[derive(Debug, Clone)]
pub struct PatchTarget {
    pub kind: TargetKind,
    pub script_path: PathBuf,
}

/// Per-target results of one orchestration pass.
#[derive(Debug)]
pub struct PatchSummary {
    pub results: Vec<(PatchTarget, Result<(), PatchError>)>,
}

impl PatchSummary {
    /// The error that fails the whole run, if any: the load-bearing
    /// library-root target not patching. Other targets fail independently.
    pub fn overall_failure(&self) -> Option<&PatchError> {
        self.results
            .iter()
            .find_map(|(target, result)| match (target.kind, result) {
                (TargetKind::LibraryRoot, Err(e)) => Some(e),
                _ => None,
            })
    }

    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|(_, result)| result.is_ok())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Find the library-root bundle by content signature, skipping directories,
/// non-JS files, backups, and unminified intermediates.
fn locate_library_root(steamui_dir: &Path) -> Result<PathBuf, PatchError> {
    for entry in fs::read_dir(steamui_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir()
            || !name.ends_with(".js")
            || name.ends_with(".orig.js")
            || name.ends_with(".unmin.js")
        {
            continue;
        }

        let contents = fs::read(&path)?;
        if String::from_utf8_lossy(&contents).contains(LIBRARY_ROOT_SIGNATURE) {
            return Ok(path);
        }
    }

    Err(PatchError::anchor("library-root bundle signature"))
}

fn build_catalog(config: &PatchConfig) -> Result<Vec<PatchTarget>, PatchError> {
    Ok(vec![
        PatchTarget {
            kind: TargetKind::LibraryRoot,
            script_path: locate_library_root(&config.steamui_dir)?,
        },
        PatchTarget {
            kind: TargetKind::MenuShell,
            script_path: config.steamui_dir.join(MENU_SHELL_FILE),
        },
    ])
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Patch every target in the catalog and ask the debugger collaborator to
/// reload the library view.
///
/// Returns `Err` only when the catalog itself cannot be built (unreadable
/// Steam UI directory, library-root signature missing). Per-target failures
/// land in the summary; check [`PatchSummary::overall_failure`].
pub fn patch_all(
    config: &PatchConfig,
    unminifier: &dyn Unminify,
    client: &dyn ClientControl,
) -> Result<PatchSummary, PatchError> {
    let catalog = build_catalog(config)?;

    let mut results = Vec::with_capacity(catalog.len());
    for target in catalog {
        let result = patch_target(&target, config, unminifier);
        if let Err(e) = &result {
            error!("Failed to patch {}: {e}", target.script_path.display());
        }
        results.push((target, result));
    }

    // Patched bytes are already on disk at this point; a reload failure is
    // logged, not propagated.
    if let Err(e) = client.reload_view(LIBRARY_VIEW) {
        warn!("Failed to reload client view: {e}");
    }

    Ok(PatchSummary { results })
}

fn patch_target(
    target: &PatchTarget,
    config: &PatchConfig,
    unminifier: &dyn Unminify,
) -> Result<(), PatchError> {
    let script = &target.script_path;
    info!("Patching {}...", script.display());

    backup::ensure_pristine(script)?;
    backup::snapshot(script)?;

    let mut pristine_digest = None;
    if !config.no_cache {
        let lookup = cache::try_use_cached(
            script,
            &config.cache_dir,
            &config.version_tag,
            &config.auth_token,
        )?;
        if lookup.hit {
            return Ok(());
        }
        pristine_digest = Some(lookup.digest);
    }

    let unmin_path = unminifier.unminify(script)?;
    let mut buf = LineBuffer::load(&unmin_path)?;

    match target.kind {
        TargetKind::LibraryRoot => library_root::apply(&mut buf, config)?,
        TargetKind::MenuShell => menu_shell::apply(&mut buf, config)?,
    }

    hooks::stamp_marker(&mut buf, &config.version_tag, &config.auth_token);

    info!("Writing patched file to {}", script.display());
    buf.write_to(script)?;

    if let Some(digest) = pristine_digest
        && let Err(e) = cache::store(&buf, script, &config.cache_dir, &config.version_tag, &digest)
    {
        warn!("Failed to cache patched script: {e}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Restore every patched script under the Steam UI directory.
///
/// Runs on shutdown and on the explicit cleanup command, so it is strictly
/// best-effort: failures are logged and never propagated.
pub fn cleanup(steamui_dir: &Path) {
    info!("Restoring patched Steam files");
    match backup::restore_all(steamui_dir) {
        Ok(count) => info!("Restored {count} original files"),
        Err(e) => warn!("Cleanup failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn locate_finds_bundle_by_signature() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("sp.js"), "menu shell");
        write(
            &dir.path().join("libraryroot~sp.js"),
            "var GetWhatsNewEvents = 1;",
        );

        let found = locate_library_root(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("libraryroot~sp.js"));
    }

    #[test]
    fn locate_skips_backups_and_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("libraryroot~sp.orig.js"),
            "var GetWhatsNewEvents = 1;",
        );
        write(
            &dir.path().join("libraryroot~sp.unmin.js"),
            "var GetWhatsNewEvents = 1;",
        );

        let err = locate_library_root(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            PatchError::AnchorNotFound { anchor: "library-root bundle signature" }
        ));
    }

    #[test]
    fn overall_failure_tracks_only_the_load_bearing_target() {
        let library = PatchTarget {
            kind: TargetKind::LibraryRoot,
            script_path: PathBuf::from("libraryroot~sp.js"),
        };
        let menu = PatchTarget {
            kind: TargetKind::MenuShell,
            script_path: PathBuf::from("sp.js"),
        };

        let summary = PatchSummary {
            results: vec![
                (library.clone(), Ok(())),
                (menu.clone(), Err(PatchError::anchor("route prop table"))),
            ],
        };
        assert!(summary.overall_failure().is_none());
        assert!(!summary.all_ok());

        let summary = PatchSummary {
            results: vec![
                (library, Err(PatchError::anchor("app properties title"))),
                (menu, Ok(())),
            ],
        };
        assert!(summary.overall_failure().is_some());
    }
}
