//! Persistent processing log (`_processing-log.json`).
//!
//! One entry per URL, upserted on every outcome. The file is rewritten
//! atomically so a crash mid-write never leaves a truncated log behind.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use linkshelf_shared::{LinkshelfError, LogEntry, LogStatus, LogSummary, Result, normalize_url};

use crate::write_atomic;

/// On-disk shape of the log file.
#[derive(Debug, Serialize, Deserialize)]
struct LogFile {
    last_updated: DateTime<Utc>,
    total_processed: usize,
    successful: usize,
    failed: usize,
    resources: Vec<LogEntry>,
}

/// In-memory processing log keyed by normalized URL.
#[derive(Debug, Default)]
pub struct ProcessingLog {
    entries: Vec<LogEntry>,
    index: HashMap<String, usize>,
}

impl ProcessingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a log file.
    ///
    /// A missing file gives an empty log. So does a corrupt one, after a
    /// warning; the next persist replaces it.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no processing log yet");
                return Ok(Self::new());
            }
            Err(e) => return Err(LinkshelfError::io(path, e)),
        };

        let file: LogFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "processing log is corrupt, starting fresh");
                return Ok(Self::new());
            }
        };

        let mut log = Self::new();
        for entry in file.resources {
            log.record(entry);
        }
        debug!(entries = log.len(), "processing log loaded");
        Ok(log)
    }

    /// Write the log atomically, creating the parent directory if needed.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LinkshelfError::Storage(format!("{}: {e}", parent.display())))?;
        }

        let summary = self.summary();
        let file = LogFile {
            last_updated: Utc::now(),
            total_processed: summary.total,
            successful: summary.successful,
            failed: summary.failed,
            resources: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LinkshelfError::Storage(format!("failed to serialize log: {e}")))?;

        write_atomic(path, json.as_bytes())?;
        info!(path = %path.display(), entries = summary.total, "processing log saved");
        Ok(())
    }

    /// Insert or replace the entry for `entry.url`.
    ///
    /// A replaced entry keeps its original position.
    pub fn record(&mut self, entry: LogEntry) {
        let key = normalize_url(&entry.url);
        match self.index.get(&key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&LogEntry> {
        self.index
            .get(&normalize_url(url))
            .map(|&i| &self.entries[i])
    }

    /// Whether `url` was completed in an earlier run.
    pub fn is_completed(&self, url: &str) -> bool {
        self.get(url)
            .is_some_and(|e| e.status == LogStatus::Completed)
    }

    /// URLs whose latest outcome is `completed`.
    pub fn completed_urls(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.status == LogStatus::Completed)
            .map(|e| e.url.as_str())
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> LogSummary {
        let successful = self
            .entries
            .iter()
            .filter(|e| e.status == LogStatus::Completed)
            .count();
        LogSummary {
            total: self.entries.len(),
            successful,
            failed: self.entries.len() - successful,
        }
    }
}
