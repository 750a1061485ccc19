//! Line-oriented buffer for one script file.
//!
//! The unminified Steam scripts run to tens of thousands of lines; every
//! patch step searches and splices this in-memory line array and the result
//! is written back to disk exactly once at the end of a successful pipeline
//! run. A "line" may itself contain embedded newlines (generated snippets are
//! inserted as a single element), which joins back out correctly.

use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone)]
pub(crate) struct LineBuffer {
    lines: Vec<String>,
}

impl LineBuffer {
    /// Read a file into a line array.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self {
            lines: contents.lines().map(str::to_owned).collect(),
        })
    }

    #[cfg(test)]
    pub fn from_lines(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| (*l).to_owned()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, idx: usize) -> &str {
        &self.lines[idx]
    }

    /// Insert a new line at `idx`, shifting everything below it down.
    pub fn insert(&mut self, idx: usize, line: String) {
        self.lines.insert(idx, line);
    }

    /// Append text to the end of an existing line.
    pub fn append_to_line(&mut self, idx: usize, text: &str) {
        self.lines[idx].push_str(text);
    }

    /// Prepend text to the start of an existing line.
    pub fn prepend_to_line(&mut self, idx: usize, text: &str) {
        self.lines[idx].insert_str(0, text);
    }

    /// Replace an existing line wholesale.
    pub fn set_line(&mut self, idx: usize, line: String) {
        self.lines[idx] = line;
    }

    /// The full buffer joined back into file contents.
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }

    /// Serialize the buffer over `path`, truncating whatever is there.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.contents())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_splits_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.js");
        fs::write(&path, "one\ntwo\nthree").unwrap();

        let buf = LineBuffer::load(&path).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.line(1), "two");
    }

    #[test]
    fn insert_shifts_following_lines() {
        let mut buf = LineBuffer::from_lines(&["a", "c"]);
        buf.insert(1, "b".into());
        assert_eq!(buf.lines(), &["a", "b", "c"]);
    }

    #[test]
    fn append_and_prepend_edit_in_place() {
        let mut buf = LineBuffer::from_lines(&["mid"]);
        buf.append_to_line(0, " end");
        buf.prepend_to_line(0, "start ");
        assert_eq!(buf.line(0), "start mid end");
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.js");
        fs::write(&path, "a\nb\nc").unwrap();

        let buf = LineBuffer::load(&path).unwrap();
        buf.write_to(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc");
    }

    #[test]
    fn multi_line_element_joins_out_flat() {
        let mut buf = LineBuffer::from_lines(&["a", "b"]);
        buf.insert(0, "x\ny".into());
        assert_eq!(buf.contents(), "x\ny\na\nb");
    }
}
