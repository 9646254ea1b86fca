//! Diagnostic journal
//!
//! A bounded, newest-first list of log entries shown next to the game and
//! kept across reloads. Error entries are also appended to a separate,
//! unbounded error report that can be exported as Markdown. A heartbeat
//! written every second lets the next start detect a session that ended
//! without a clean shutdown (tab killed, browser crash).
//!
//! Every entry is forwarded to the `log` facade as well.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, StorageError};
use crate::sim::GameEvent;
pub use crate::sim::Level;

pub const LOGS_KEY: &str = "game_logs";
pub const ERROR_LOGS_KEY: &str = "game_error_logs";
pub const HEARTBEAT_KEY: &str = "game_heartbeat";

/// How often the heartbeat is written (ms)
pub const HEARTBEAT_INTERVAL_MS: f64 = 1000.0;
/// A heartbeat older than this at startup means the last session died (ms)
pub const HEARTBEAT_STALE_MS: f64 = 5000.0;

impl From<Level> for log::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => log::Level::Info,
            Level::Warning => log::Level::Warn,
            Level::Error => log::Level::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Time of day, "HH:MM:SS" (UTC)
    pub timestamp: String,
    pub message: String,
    pub level: Level,
}

/// A persisted error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub timestamp: String,
    pub message: String,
    pub level: Level,
    /// RFC 3339 date and time
    pub date: String,
}

fn to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms as i64)
}

fn format_time(ms: f64) -> String {
    to_datetime(ms)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn format_date(ms: f64) -> String {
    to_datetime(ms).map(|t| t.to_rfc3339()).unwrap_or_default()
}

/// The journal, backed by a key-value store
#[derive(Debug)]
pub struct GameLog<S: KeyValueStore> {
    store: S,
    capacity: usize,
    /// Newest first
    entries: VecDeque<LogEntry>,
    last_heartbeat_ms: Option<f64>,
}

impl<S: KeyValueStore> GameLog<S> {
    /// Empty journal
    pub fn new(store: S, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            entries: VecDeque::new(),
            last_heartbeat_ms: None,
        }
    }

    /// Journal restored from the entries saved by a previous session
    pub fn load(store: S, capacity: usize) -> Self {
        let mut journal = Self::new(store, capacity);
        if let Some(json) = journal.store.get(LOGS_KEY) {
            match serde_json::from_str::<Vec<LogEntry>>(&json) {
                Ok(entries) => {
                    journal.entries = entries.into_iter().take(journal.capacity).collect();
                }
                Err(e) => {
                    log::error!("Failed to load saved log entries: {}", e);
                    journal.store.remove(LOGS_KEY);
                }
            }
        }
        journal
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn info(&mut self, message: impl Into<String>, now_ms: f64) {
        self.record(Level::Info, message, now_ms);
    }

    pub fn warning(&mut self, message: impl Into<String>, now_ms: f64) {
        self.record(Level::Warning, message, now_ms);
    }

    pub fn error(&mut self, message: impl Into<String>, now_ms: f64) {
        self.record(Level::Error, message, now_ms);
    }

    pub fn record_event(&mut self, event: &GameEvent, now_ms: f64) {
        self.record(event.level(), event.to_string(), now_ms);
    }

    pub fn record(&mut self, level: Level, message: impl Into<String>, now_ms: f64) {
        let entry = LogEntry {
            timestamp: format_time(now_ms),
            message: message.into(),
            level,
        };
        log::log!(log::Level::from(level), "{}", entry.message);

        if level == Level::Error {
            self.append_error_report(&entry, now_ms);
        }

        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    fn append_error_report(&self, entry: &LogEntry, now_ms: f64) {
        let mut reports = self.error_reports();
        reports.push(ErrorReport {
            timestamp: entry.timestamp.clone(),
            message: entry.message.clone(),
            level: entry.level,
            date: format_date(now_ms),
        });
        let result = serde_json::to_string(&reports)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.store
                    .set(ERROR_LOGS_KEY, &json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            log::warn!("Could not persist error report: {}", e);
        }
    }

    /// All persisted error reports, oldest first
    pub fn error_reports(&self) -> Vec<ErrorReport> {
        self.store
            .get(ERROR_LOGS_KEY)
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    /// Persist the current entries (call before unload)
    pub fn save(&self) -> Result<(), StorageError> {
        let entries: Vec<&LogEntry> = self.entries.iter().collect();
        let json = serde_json::to_string(&entries).map_err(|e| StorageError {
            key: LOGS_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(LOGS_KEY, &json)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.store.remove(LOGS_KEY);
    }

    /// Record an error if the previous session stopped beating without
    /// shutting down; returns whether it did
    pub fn check_forced_close(&mut self, now_ms: f64) -> bool {
        let last_beat = self
            .store
            .get(HEARTBEAT_KEY)
            .and_then(|s| s.trim().parse::<f64>().ok());
        match last_beat {
            Some(beat) if now_ms - beat > HEARTBEAT_STALE_MS => {
                self.error("The previous game session did not end cleanly.", now_ms);
                true
            }
            _ => false,
        }
    }

    /// Write the heartbeat if a beat is due
    pub fn heartbeat(&mut self, now_ms: f64) {
        let due = self
            .last_heartbeat_ms
            .is_none_or(|last| now_ms - last >= HEARTBEAT_INTERVAL_MS);
        if !due {
            return;
        }
        self.last_heartbeat_ms = Some(now_ms);
        if let Err(e) = self.store.set(HEARTBEAT_KEY, &format!("{}", now_ms as i64)) {
            log::warn!("Heartbeat write failed: {}", e);
        }
    }

    /// Save the entries and stop the heartbeat so the next start does not
    /// report a forced close
    pub fn end_session(&mut self) -> Result<(), StorageError> {
        self.store.remove(HEARTBEAT_KEY);
        self.last_heartbeat_ms = None;
        self.save()
    }
}

/// Render error reports as a Markdown document; `None` when there are none
pub fn error_report_markdown(reports: &[ErrorReport]) -> Option<String> {
    if reports.is_empty() {
        return None;
    }

    let mut md = String::from("# Suika Merge Error Log\n\n## Errors\n\n");
    for report in reports {
        let when = DateTime::parse_from_rfc3339(&report.date)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|_| report.date.clone());
        md.push_str(&format!("### {}\n", when));
        md.push_str(&format!("- Level: {}\n", report.level.as_str()));
        md.push_str(&format!("- Message: {}\n\n", report.message));
    }
    Some(md)
}

/// Download file name for an error report exported at `now_ms`
pub fn error_report_filename(now_ms: f64) -> String {
    let day = to_datetime(now_ms)
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("suika-merge-error-log-{}.md", day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::sim::PauseReason;

    /// 2024-03-05T00:00:00Z
    const DAY: f64 = 1_709_596_800_000.0;

    #[test]
    fn test_entries_newest_first_and_bounded() {
        let mut journal = GameLog::new(MemoryStore::new(), 50);
        for i in 0..60 {
            journal.info(format!("entry {i}"), DAY + i as f64 * 1000.0);
        }
        assert_eq!(journal.len(), 50);
        let newest = journal.entries().next().unwrap();
        assert_eq!(newest.message, "entry 59");
        assert_eq!(newest.timestamp, "00:00:59");
        assert_eq!(journal.entries().last().unwrap().message, "entry 10");
    }

    #[test]
    fn test_only_errors_reach_error_report() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        journal.info("dropped", DAY);
        journal.warning("game over", DAY);
        journal.error("save failed", DAY + 3_661_000.0);

        let reports = journal.error_reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "save failed");
        assert_eq!(reports[0].timestamp, "01:01:01");
        assert!(reports[0].date.starts_with("2024-03-05T01:01:01"));
        assert!(store.get(ERROR_LOGS_KEY).is_some());
    }

    #[test]
    fn test_error_reports_survive_clear() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        journal.error("boom", DAY);
        journal.save().unwrap();
        journal.clear();

        assert!(journal.is_empty());
        assert!(store.get(LOGS_KEY).is_none());
        assert_eq!(journal.error_reports().len(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        journal.record_event(&GameEvent::Paused { reason: PauseReason::Manual }, DAY);
        journal.record_event(&GameEvent::GameOver { score: 9 }, DAY);
        journal.save().unwrap();

        let reloaded = GameLog::load(store, 50);
        let entries: Vec<_> = reloaded.entries().cloned().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::Warning);
        assert_eq!(entries[0].message, "Game over! Final score: 9");
        assert_eq!(entries[1].message, "Game paused");
    }

    #[test]
    fn test_reload_truncates_to_capacity() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        for i in 0..20 {
            journal.info(format!("{i}"), DAY);
        }
        journal.save().unwrap();

        let reloaded = GameLog::load(store, 5);
        assert_eq!(reloaded.len(), 5);
        assert_eq!(reloaded.entries().next().unwrap().message, "19");
    }

    #[test]
    fn test_corrupt_saved_entries_removed() {
        let store = MemoryStore::new();
        store.set(LOGS_KEY, "nope").unwrap();
        let journal = GameLog::load(store.clone(), 50);
        assert!(journal.is_empty());
        assert!(store.get(LOGS_KEY).is_none());
    }

    #[test]
    fn test_forced_close_detection() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        assert!(!journal.check_forced_close(DAY));

        store.set(HEARTBEAT_KEY, &format!("{}", DAY as i64 - 2000)).unwrap();
        assert!(!journal.check_forced_close(DAY));

        store.set(HEARTBEAT_KEY, &format!("{}", DAY as i64 - 6000)).unwrap();
        assert!(journal.check_forced_close(DAY));
        assert_eq!(journal.entries().next().unwrap().level, Level::Error);
        assert_eq!(journal.error_reports().len(), 1);
    }

    #[test]
    fn test_heartbeat_written_once_per_interval() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        journal.heartbeat(DAY);
        assert_eq!(store.get(HEARTBEAT_KEY), Some(format!("{}", DAY as i64)));

        journal.heartbeat(DAY + 400.0);
        assert_eq!(store.get(HEARTBEAT_KEY), Some(format!("{}", DAY as i64)));

        journal.heartbeat(DAY + 1000.0);
        assert_eq!(store.get(HEARTBEAT_KEY), Some(format!("{}", DAY as i64 + 1000)));
    }

    #[test]
    fn test_clean_shutdown_is_not_a_forced_close() {
        let store = MemoryStore::new();
        let mut journal = GameLog::new(store.clone(), 50);
        journal.info("Game started", DAY);
        journal.heartbeat(DAY);
        journal.end_session().unwrap();
        assert_eq!(store.get(HEARTBEAT_KEY), None);

        let mut next = GameLog::load(store, 50);
        assert!(!next.check_forced_close(DAY + 60_000.0));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_markdown_export() {
        assert!(error_report_markdown(&[]).is_none());

        let reports = vec![ErrorReport {
            timestamp: "12:00:00".to_string(),
            message: "image failed to load".to_string(),
            level: Level::Error,
            date: "2024-03-05T12:00:00+00:00".to_string(),
        }];
        let md = error_report_markdown(&reports).unwrap();
        assert!(md.starts_with("# Suika Merge Error Log"));
        assert!(md.contains("### 2024-03-05 12:00:00 UTC"));
        assert!(md.contains("- Level: error"));
        assert!(md.contains("- Message: image failed to load"));
    }

    #[test]
    fn test_export_filename_uses_date() {
        assert_eq!(
            error_report_filename(DAY + 43_200_000.0),
            "suika-merge-error-log-2024-03-05.md"
        );
    }
}
