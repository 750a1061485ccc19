//! Crankshaft patch engine.
//!
//! Rewrites the Steam client's shipped, minified UI scripts on disk to give
//! plugins stable hook points (menu items, quick-access tabs, property
//! pages, button interception), then asks the remote-debugging session to
//! reload the affected views. Steam exposes no extension API, so the engine
//! works line-oriented over hostile input: find a structurally stable
//! landmark, scan a bounded window around it, splice generated code, and
//! keep the whole thing idempotent, cached, and reversible.
//!
//! Per target file the pipeline is: restore pristine from backup if the
//! marker is present → snapshot to backup → cache lookup keyed by the
//! pristine digest → on miss, unminify, run the file's patch steps, stamp
//! the marker, write back, and populate the cache.

pub(crate) mod anchor;
pub(crate) mod backup;
pub(crate) mod cache;
pub mod client;
pub mod config;
pub mod error;
pub(crate) mod fsutil;
pub(crate) mod hooks;
pub(crate) mod library_root;
pub(crate) mod line_buffer;
pub(crate) mod menu_shell;
pub mod patcher;
pub mod unmin;

pub use client::{ClientControl, NoopClient};
pub use config::{PatchConfig, ScanWindows};
pub use error::PatchError;
pub use patcher::{PatchSummary, PatchTarget, TargetKind, cleanup, patch_all};
pub use unmin::{JsBeautify, Unminify};

/// Literal stamped into the first line of every script this engine touches.
/// Other tooling relies on it to detect patched state; it only ever means
/// "not pristine", never "this patch is current".
pub const PATCH_MARKER: &str = "patched by crankshaft";
