//! Error taxonomy for the patch engine.
//!
//! Every error is scoped to a single patch target: the orchestrator records
//! the failure, keeps going with the remaining targets, and only escalates
//! when the load-bearing library-root target is the one that failed.

use std::fmt;
use std::io;

/// Error from patching a single target script.
#[derive(Debug)]
pub enum PatchError {
    /// A required structural landmark was not found within its scan window.
    /// Usually means a Steam update rearranged the script; not retryable
    /// without an engine update.
    AnchorNotFound { anchor: &'static str },
    /// An external tool could not be spawned or exited non-zero.
    ExternalTool { tool: String, detail: String },
    /// Reading or writing a cache artifact failed. Callers fall back to a
    /// full re-patch, so this never fails a target on its own.
    CacheIo(io::Error),
    /// Filesystem I/O on the target script or its backup failed.
    Io(io::Error),
}

impl PatchError {
    pub(crate) fn anchor(anchor: &'static str) -> Self {
        Self::AnchorNotFound { anchor }
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnchorNotFound { anchor } => {
                write!(f, "anchor not found: {anchor}")
            }
            Self::ExternalTool { tool, detail } => {
                write!(f, "{tool} failed: {detail}")
            }
            Self::CacheIo(e) => write!(f, "cache I/O error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for PatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CacheIo(e) | Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PatchError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_error_names_the_anchor() {
        let err = PatchError::anchor("main tabs settings label");
        assert_eq!(
            err.to_string(),
            "anchor not found: main tabs settings label"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: PatchError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, PatchError::Io(_)));
    }
}
