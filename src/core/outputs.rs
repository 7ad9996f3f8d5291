//! Step outputs (`$GITHUB_OUTPUT`)
//!
//! Outputs are collected in the order they are set and written out once, by
//! [`ActionOutputs::flush`], which consumes the collector.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// Append-only collector of `KEY=value` outputs
#[derive(Debug, Default)]
pub struct ActionOutputs {
    destination: Option<PathBuf>,
    lines: Vec<String>,
}

impl ActionOutputs {
    /// Outputs are discarded on flush when `destination` is `None`
    pub fn new(destination: Option<PathBuf>) -> Self {
        Self {
            destination,
            lines: Vec::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl AsRef<str>) {
        tracing::debug!(name, value = value.as_ref(), "set output");
        self.lines.push(format!("{}={}", name, value.as_ref()));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Appends every recorded line to the destination in a single write
    pub fn flush(self) -> io::Result<()> {
        let Some(destination) = self.destination else {
            return Ok(());
        };
        if self.lines.is_empty() {
            return Ok(());
        }

        let mut content = self.lines.join(LINE_ENDING);
        content.push_str(LINE_ENDING);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&destination)?;
        file.write_all(content.as_bytes())
    }
}
