// 📝 Progress log - one timestamped line per pipeline milestone
//
// The file is opened in append mode for every entry and closed again,
// so a crash leaves every completed milestone on disk.

use crate::error::{EtlError, Result};
use chrono::Local;
use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp layout of a log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Separator between timestamp and message
pub const SEPARATOR: &str = " : ";

/// Sink for pipeline milestones, passed to every stage
pub trait ProgressLog {
    fn log(&self, message: &str) -> Result<()>;
}

/// Format one log line (without trailing newline)
pub fn format_entry(timestamp: &str, message: &str) -> String {
    format!("{}{}{}", timestamp, SEPARATOR, message)
}

// ============================================================================
// FILE LOG
// ============================================================================

/// Append-only log file, never truncated
#[derive(Debug, Clone)]
pub struct FileProgressLog {
    path: PathBuf,
}

impl FileProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileProgressLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressLog for FileProgressLog {
    fn log(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let line = format_entry(&timestamp, message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| EtlError::Log {
                path: self.path.display().to_string(),
                source,
            })?;

        writeln!(file, "{}", line).map_err(|source| EtlError::Log {
            path: self.path.display().to_string(),
            source,
        })
    }
}

// ============================================================================
// IN-MEMORY LOG
// ============================================================================

/// Keeps messages in memory (no timestamps); handy for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryProgressLog {
    messages: RefCell<Vec<String>>,
}

impl MemoryProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl ProgressLog for MemoryProgressLog {
    fn log(&self, message: &str) -> Result<()> {
        self.messages.borrow_mut().push(message.to_string());
        Ok(())
    }
}
