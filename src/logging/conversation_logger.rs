// Conversation logger: one JSON line per successful exchange

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single logged exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique ID for this entry
    pub id: String,

    /// When this exchange completed
    pub timestamp: DateTime<Utc>,

    /// User's message
    pub query: String,

    /// Assistant's reply
    pub response: String,

    /// Which model produced the reply (e.g., "gemini/gemini-1.5-flash")
    pub model: String,
}

impl LogEntry {
    pub fn new(query: String, response: String, model: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            query,
            response,
            model,
        }
    }
}

/// Conversation logger that writes to JSONL
pub struct ConversationLogger {
    log_path: PathBuf,
    buffer: Vec<LogEntry>,
    flush_threshold: usize,
}

impl ConversationLogger {
    /// Create a new logger; entries are written on every call
    pub fn new(log_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create logging directory")?;
            }
        }

        Ok(Self {
            log_path,
            buffer: Vec::new(),
            flush_threshold: 1,
        })
    }

    /// Buffer up to `threshold` entries before writing
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold.max(1);
        self
    }

    /// Log one exchange, returning its entry id
    pub fn log_exchange(&mut self, query: &str, response: &str, model: &str) -> Result<String> {
        let entry = LogEntry::new(query.to_string(), response.to_string(), model.to_string());

        let id = entry.id.clone();
        self.buffer.push(entry);

        // Auto-flush if threshold reached
        if self.buffer.len() >= self.flush_threshold {
            self.flush()?;
        }

        Ok(id)
    }

    /// Flush buffered entries to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        debug!("Flushing {} log entries to disk", self.buffer.len());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .context("Failed to open log file")?;

        for entry in &self.buffer {
            let json = serde_json::to_string(entry).context("Failed to serialize log entry")?;
            writeln!(file, "{}", json).context("Failed to write log entry")?;
        }

        self.buffer.clear();
        Ok(())
    }

    /// Entries buffered but not yet written
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

/// Read every entry from a JSONL log, skipping blank lines
pub fn read_log(path: &Path) -> Result<Vec<LogEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read log file {}", path.display()))?;

    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Failed to parse log entry on line {}", i + 1))
        })
        .collect()
}

impl Drop for ConversationLogger {
    fn drop(&mut self) {
        // Flush on drop
        if !self.buffer.is_empty() {
            if let Err(e) = self.flush() {
                tracing::error!("Failed to flush conversation log on drop: {}", e);
            }
        }
    }
}
