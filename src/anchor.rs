//! Bounded structural search over a line buffer.
//!
//! Minified Steam scripts keep no stable identifiers between releases, so
//! patch steps never address code by name. They navigate by landmarks: find
//! a line judged structurally stable (a localization key, a known method
//! signature), then scan a bounded window around it for the thing that
//! actually varies. Bounding every scan keeps incidental matches elsewhere
//! in a multi-thousand-line file from being picked up, and makes each miss
//! attributable to one named anchor.
//!
//! Each patch step reads as a short sequence of these combinators; the scan
//! window sizes come from [`crate::config::ScanWindows`].

use regex::Regex;

use crate::error::PatchError;
use crate::line_buffer::LineBuffer;

/// A located landmark: the line it sits on and, when the pattern captured a
/// substring (a minified alias, a parameter name), what it captured.
#[derive(Debug)]
pub(crate) struct Anchor {
    pub line: usize,
    pub capture: Option<String>,
}

fn hit(line: usize, re: &Regex, text: &str) -> Anchor {
    let capture = re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned());
    Anchor { line, capture }
}

/// Find the first line in the whole buffer matching `re`.
///
/// Unbounded by design: use only for landmarks unique enough to trust
/// anywhere in the file.
pub(crate) fn find_line_matching(
    buf: &LineBuffer,
    re: &Regex,
    anchor: &'static str,
) -> Result<Anchor, PatchError> {
    buf.lines()
        .iter()
        .position(|line| re.is_match(line))
        .map(|idx| hit(idx, re, buf.line(idx)))
        .ok_or(PatchError::anchor(anchor))
}

/// Find the first line in the whole buffer containing `needle` literally.
pub(crate) fn find_line_containing(
    buf: &LineBuffer,
    needle: &str,
    anchor: &'static str,
) -> Result<usize, PatchError> {
    buf.lines()
        .iter()
        .position(|line| line.contains(needle))
        .ok_or(PatchError::anchor(anchor))
}

/// Scan from `from` downward (inclusive) for a line matching `re`, visiting
/// at most `window + 1` lines and never going above line 0.
pub(crate) fn scan_backward_for(
    buf: &LineBuffer,
    from: usize,
    window: usize,
    re: &Regex,
    anchor: &'static str,
) -> Result<Anchor, PatchError> {
    if buf.is_empty() {
        return Err(PatchError::anchor(anchor));
    }
    let from = from.min(buf.len() - 1);
    let floor = from.saturating_sub(window);
    for idx in (floor..=from).rev() {
        if re.is_match(buf.line(idx)) {
            return Ok(hit(idx, re, buf.line(idx)));
        }
    }
    Err(PatchError::anchor(anchor))
}

/// Scan from `from` downward for the first line whose trimmed text starts
/// with `prefix`.
pub(crate) fn scan_backward_for_prefix(
    buf: &LineBuffer,
    from: usize,
    window: usize,
    prefix: &str,
    anchor: &'static str,
) -> Result<usize, PatchError> {
    if buf.is_empty() {
        return Err(PatchError::anchor(anchor));
    }
    let from = from.min(buf.len() - 1);
    let floor = from.saturating_sub(window);
    (floor..=from)
        .rev()
        .find(|&idx| buf.line(idx).trim_start().starts_with(prefix))
        .ok_or(PatchError::anchor(anchor))
}

/// Scan from `from` upward (inclusive) for a line matching `re`, visiting at
/// most `window + 1` lines and stopping at the end of the buffer.
pub(crate) fn scan_forward_for(
    buf: &LineBuffer,
    from: usize,
    window: usize,
    re: &Regex,
    anchor: &'static str,
) -> Result<Anchor, PatchError> {
    if from >= buf.len() {
        return Err(PatchError::anchor(anchor));
    }
    let ceil = from.saturating_add(window).min(buf.len() - 1);
    for idx in from..=ceil {
        if re.is_match(buf.line(idx)) {
            return Ok(hit(idx, re, buf.line(idx)));
        }
    }
    Err(PatchError::anchor(anchor))
}

/// Scan forward for the first line containing `needle` literally.
pub(crate) fn scan_forward_containing(
    buf: &LineBuffer,
    from: usize,
    window: usize,
    needle: &str,
    anchor: &'static str,
) -> Result<usize, PatchError> {
    if from >= buf.len() {
        return Err(PatchError::anchor(anchor));
    }
    let ceil = from.saturating_add(window).min(buf.len() - 1);
    (from..=ceil)
        .find(|&idx| buf.line(idx).contains(needle))
        .ok_or(PatchError::anchor(anchor))
}

/// Scan forward for the first line whose trimmed text starts with `prefix`.
///
/// Used where exact content varies but structural punctuation does not,
/// e.g. the `}].filter` terminator of an array literal.
pub(crate) fn scan_forward_for_prefix(
    buf: &LineBuffer,
    from: usize,
    window: usize,
    prefix: &str,
    anchor: &'static str,
) -> Result<usize, PatchError> {
    if from >= buf.len() {
        return Err(PatchError::anchor(anchor));
    }
    let ceil = from.saturating_add(window).min(buf.len() - 1);
    (from..=ceil)
        .find(|&idx| buf.line(idx).trim_start().starts_with(prefix))
        .ok_or(PatchError::anchor(anchor))
}
