//! Generation usage log for rate capping.
//!
//! The worker keeps a JSON file of Unix timestamps, one per generated
//! image, and refuses to generate once the hourly or daily window is
//! full. Conservative caps keep the worker inside provider API limits
//! even when cron runs overlap.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;

const HOUR_SECS: i64 = 3_600;
const DAY_SECS: i64 = 86_400;

/// Timestamp log with hourly and daily caps.
pub struct UsageLog {
    path: PathBuf,
    timestamps: Vec<i64>,
    hourly_cap: usize,
    daily_cap: usize,
}

impl UsageLog {
    /// Load the log from `path`; a missing or malformed file starts empty.
    pub fn load(path: impl Into<PathBuf>, hourly_cap: usize, daily_cap: usize) -> Self {
        let path = path.into();
        let timestamps = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Vec<i64>>(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            timestamps,
            hourly_cap,
            daily_cap,
        }
    }

    /// Whether another generation fits under both caps right now.
    pub fn can_generate(&self) -> bool {
        let now = Utc::now().timestamp();
        self.count_since(now - HOUR_SECS) < self.hourly_cap
            && self.count_since(now - DAY_SECS) < self.daily_cap
    }

    /// Record a generation at the current time and persist the log.
    pub fn record(&mut self) -> Result<()> {
        let now = Utc::now().timestamp();
        self.timestamps.push(now);
        // Entries older than the daily window never matter again.
        self.timestamps.retain(|&t| t > now - DAY_SECS);
        self.save()
    }

    fn count_since(&self, cutoff: i64) -> usize {
        self.timestamps.iter().filter(|&&t| t > cutoff).count()
    }

    fn save(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.timestamps)?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("writing usage log {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let log = UsageLog::load("/nonexistent/.enrich_usage.json", 2, 10);
        assert!(log.can_generate());
    }

    #[test]
    fn test_hourly_cap_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        let mut log = UsageLog::load(&path, 2, 10);
        log.record().unwrap();
        log.record().unwrap();
        assert!(!log.can_generate());
    }

    #[test]
    fn test_old_entries_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        let stale = Utc::now().timestamp() - 2 * DAY_SECS;
        std::fs::write(&path, serde_json::to_string(&vec![stale; 50]).unwrap()).unwrap();

        let mut log = UsageLog::load(&path, 2, 10);
        // Stale entries fall outside both windows.
        assert!(log.can_generate());
        log.record().unwrap();

        let reloaded = UsageLog::load(&path, 2, 10);
        assert!(reloaded.can_generate());
        assert_eq!(reloaded.count_since(0), 1);
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.json");
        std::fs::write(&path, "not json").unwrap();
        let log = UsageLog::load(&path, 1, 1);
        assert!(log.can_generate());
    }
}
