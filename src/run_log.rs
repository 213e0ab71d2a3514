// Run history logging
//
// Appends one JSON line per finished search to a history file. Failures are
// logged and swallowed; they never affect the search results.

use log::error;
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use crate::evaluator::SearchOutcome;

/// Represents a single run history entry
#[derive(Debug, Serialize)]
pub struct RunLogEntry {
    pub timestamp: String,
    pub mode: String,
    pub prefix: String,
    pub opponents: usize,
    pub generated: u64,
    pub selected: usize,
    pub best_score: Option<i64>,
    pub cancelled: bool,
    pub elapsed_ms: u128,
}

impl RunLogEntry {
    pub fn from_outcome(outcome: &SearchOutcome, prefix: &str, opponents: usize) -> Self {
        RunLogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            mode: outcome.mode.to_string(),
            prefix: prefix.to_string(),
            opponents,
            generated: outcome.generated,
            selected: outcome.results.len(),
            best_score: outcome.best_score(),
            cancelled: outcome.cancelled,
            elapsed_ms: outcome.elapsed.as_millis(),
        }
    }
}

/// Shared run logger state
#[derive(Clone)]
pub struct RunLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl RunLogger {
    /// Creates a new run logger
    /// If enabled is true, opens the history file for appending
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return RunLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Run history enabled: {}", log_file_path);
                RunLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to open run history file '{}': {}", log_file_path, e);
                RunLogger::disabled()
            }
        }
    }

    /// Creates a disabled run logger (no-op)
    pub fn disabled() -> Self {
        RunLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends one entry
    pub fn log_run(&self, entry: &RunLogEntry) {
        if !self.enabled {
            return;
        }

        let mut file_guard = self.file.lock();
        let Some(file) = file_guard.as_mut() else {
            return;
        };

        match serde_json::to_string(entry) {
            Ok(json_line) => {
                let line_with_newline = format!("{}\n", json_line);
                if let Err(e) = file.write_all(line_with_newline.as_bytes()) {
                    error!("Failed to write run history entry: {}", e);
                } else if let Err(e) = file.flush() {
                    error!("Failed to flush run history: {}", e);
                }
            }
            Err(e) => {
                error!("Failed to serialize run history entry: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::SearchMode;
    use crate::game::Verdict;
    use std::time::Duration;

    fn outcome() -> SearchOutcome {
        SearchOutcome {
            mode: SearchMode::Exact(Verdict::Win),
            results: Vec::new(),
            generated: 42,
            processed: 42,
            cancelled: false,
            elapsed: Duration::from_millis(7),
        }
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let logger = RunLogger::disabled();
        assert!(!logger.is_enabled());
        logger.log_run(&RunLogEntry::from_outcome(&outcome(), "", 1));
    }

    #[test]
    fn test_entries_are_json_lines() {
        let path = std::env::temp_dir()
            .join(format!("engine_finder_runs_{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let logger = RunLogger::new(true, path.to_str().unwrap());
        logger.log_run(&RunLogEntry::from_outcome(&outcome(), "51", 3));
        logger.log_run(&RunLogEntry::from_outcome(&outcome(), "51", 3));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["generated"], 42);
        assert_eq!(value["prefix"], "51");
        assert_eq!(value["mode"], "exact (Win)");
        let _ = std::fs::remove_file(&path);
    }
}
