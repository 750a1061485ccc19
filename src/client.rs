//! Remote-debugging collaborator interface.
//!
//! The engine needs exactly two operations from whoever owns the CDP
//! session: reload a view after patched bytes land, and evaluate a UI-mode
//! flag during startup discovery. The transport itself lives outside this
//! crate.

/// Selector for the library view target.
pub const LIBRARY_VIEW: &str = "SP";

pub trait ClientControl {
    /// Reload the given view so freshly written resources take effect.
    fn reload_view(&self, view: &str) -> Result<(), String>;

    /// Evaluate an expression in the given view and return its string value.
    /// Nothing in this crate calls it; it is part of the contract so the
    /// out-of-process front door can read the UI-mode flag at startup
    /// through the same collaborator it hands to [`crate::patch_all`].
    fn read_flag(&self, view: &str, expression: &str) -> Result<String, String>;
}

/// Collaborator for runs without a debugger connection (development,
/// patch-only invocations). Reloads become no-ops; flag reads fail.
pub struct NoopClient;

impl ClientControl for NoopClient {
    fn reload_view(&self, view: &str) -> Result<(), String> {
        tracing::debug!("No debugger connection, skipping reload of {view}");
        Ok(())
    }

    fn read_flag(&self, _view: &str, _expression: &str) -> Result<String, String> {
        Err("no debugger connection".to_owned())
    }
}
