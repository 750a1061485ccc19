//! External unminifier subprocess wrapper.
//!
//! The shipped bundles are minified onto a handful of enormous lines, and
//! the patch steps need line-oriented structure, so every cache miss shells
//! out to js-beautify first. `foo.js` unminifies to `foo.unmin.js`.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::error::PatchError;
use crate::fsutil;

/// Environment variable overriding the js-beautify binary location.
const JS_BEAUTIFY_ENV: &str = "CRANKSHAFT_JS_BEAUTIFY";
const JS_BEAUTIFY_BIN: &str = "js-beautify";

/// Produces a line-oriented rendition of a minified script.
pub trait Unminify {
    /// Unminify `script` and return the path of the unminified output.
    fn unminify(&self, script: &Path) -> Result<PathBuf, PatchError>;
}

/// js-beautify invoked as `js-beautify <input> -o <output>`.
pub struct JsBeautify {
    bin: PathBuf,
}

impl JsBeautify {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// Resolve the binary: env override first, then a copy shipped next to
    /// the crankshaft executable (release bundles carry one), then PATH.
    pub fn resolve() -> Self {
        if let Ok(bin) = env::var(JS_BEAUTIFY_ENV) {
            return Self::new(bin);
        }
        if let Ok(exe) = env::current_exe()
            && let Some(dir) = exe.parent()
        {
            let sibling = dir.join(JS_BEAUTIFY_BIN);
            if sibling.exists() {
                return Self::new(sibling);
            }
        }
        Self::new(JS_BEAUTIFY_BIN)
    }
}

impl Unminify for JsBeautify {
    fn unminify(&self, script: &Path) -> Result<PathBuf, PatchError> {
        let out = fsutil::add_ext_prefix(script, "unmin");
        info!("Unminifying {}...", script.display());

        let status = Command::new(&self.bin)
            .arg(script)
            .arg("-o")
            .arg(&out)
            .status()
            .map_err(|e| PatchError::ExternalTool {
                tool: self.bin.display().to_string(),
                detail: format!("failed to spawn: {e}"),
            })?;

        if !status.success() {
            return Err(PatchError::ExternalTool {
                tool: self.bin.display().to_string(),
                detail: format!("exited with {status}"),
            });
        }

        Ok(out)
    }
}
