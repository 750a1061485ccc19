//! Content-fingerprint cache for patched scripts.
//!
//! The anchor-search-and-splice pipeline is the expensive, fragile step, so
//! its output is cached keyed by (script base name, engine version, digest of
//! the pristine bytes). A given Steam build then pays the cost once across
//! any number of launches, and a cache miss exactly tracks "the shipped file
//! actually changed". The per-run auth token embedded in the patched output
//! must never be reused, so a hit rewrites the token literal before the
//! cached bytes go live.
//!
//! Cache artifact I/O failures are logged and degrade to a miss — only
//! touching the pristine input or the live script can fail a target here.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::PatchError;
use crate::line_buffer::LineBuffer;

lazy_static::lazy_static! {
    /// The embedded per-run authorization token literal, as stamped by the
    /// orchestrator. Rewritten on every cache hit.
    static ref AUTH_TOKEN_RE: regex::Regex =
        regex::Regex::new(r"window\.csAuthToken = '[^']*';").unwrap();
}

/// Result of a cache lookup for one script.
pub(crate) struct CacheLookup {
    /// Whether the live script was rewritten from a cached artifact.
    pub hit: bool,
    /// Hex digest of the pristine script bytes, for populating the cache
    /// after a fresh patch.
    pub digest: String,
}

/// Hex-encoded sha256 of `bytes`.
pub(crate) fn digest_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Cache artifact path: `<cacheDir>/patched/<basename>.<version>.<digest>`.
fn cached_path(script: &Path, cache_dir: &Path, version: &str, digest: &str) -> PathBuf {
    let base = script
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    cache_dir
        .join("patched")
        .join(format!("{base}.{version}.{digest}"))
}

/// Rewrite the embedded auth token literal to the current run's token.
pub(crate) fn resubstitute_token(contents: &str, auth_token: &str) -> String {
    let replacement = format!("window.csAuthToken = '{auth_token}';");
    AUTH_TOKEN_RE
        .replace_all(contents, regex::NoExpand(&replacement))
        .into_owned()
}

/// Look up a cached patched artifact for the pristine script at `script`.
///
/// On a hit, the cached bytes get the current auth token substituted in and
/// are written over the live script. On a miss the computed pristine digest
/// is returned so the caller can populate the cache after patching.
pub(crate) fn try_use_cached(
    script: &Path,
    cache_dir: &Path,
    version: &str,
    auth_token: &str,
) -> Result<CacheLookup, PatchError> {
    let pristine = fs::read(script)?;
    let digest = digest_hex(&pristine);

    let cached = cached_path(script, cache_dir, version, &digest);
    let contents = match fs::read_to_string(&cached) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(CacheLookup { hit: false, digest });
        }
        Err(e) => {
            warn!("Failed to read cache artifact {}: {e}", cached.display());
            return Ok(CacheLookup { hit: false, digest });
        }
    };

    info!("Using cached patched script for {}", script.display());

    let contents = resubstitute_token(&contents, auth_token);
    fs::write(script, contents)?;

    Ok(CacheLookup { hit: true, digest })
}

/// Write freshly patched contents to the cache, keyed by the pristine digest
/// captured before unminification.
pub(crate) fn store(
    patched: &LineBuffer,
    script: &Path,
    cache_dir: &Path,
    version: &str,
    digest: &str,
) -> Result<(), PatchError> {
    let cached = cached_path(script, cache_dir, version, digest);
    info!("Writing patched script to cache at {}", cached.display());

    let parent = cached.parent().unwrap_or(cache_dir);
    fs::create_dir_all(parent).map_err(PatchError::CacheIo)?;
    fs::write(&cached, patched.contents()).map_err(PatchError::CacheIo)?;
    Ok(())
}
