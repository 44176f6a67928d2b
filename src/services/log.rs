use crate::types::{Category, HarvestError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// One journal line, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Append-only journal of run-level events, one JSON object per line.
pub struct ActivityLogger {
    log_path: PathBuf,
}

impl ActivityLogger {
    pub fn new() -> Result<Self> {
        let user_dirs = directories::UserDirs::new().ok_or_else(|| {
            HarvestError::storage_error("initialization", "could not determine home directory")
        })?;
        Self::in_dir(user_dirs.home_dir().join(".harvest"))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            log_path: dir.join("activity.log"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(
        &self,
        level: LogLevel,
        category: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            category: category.map(Category::from_raw),
            event: event.to_string(),
            details: details.map(str::to_string),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    /// Entries newest first. Lines that do not parse are skipped.
    pub fn read_logs(&self, category: Option<&str>, errors_only: bool) -> Result<Vec<LogEntry>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }
        let wanted = category.map(Category::from_raw);

        let reader = BufReader::new(fs::File::open(&self.log_path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
                continue;
            };
            if errors_only && entry.level != LogLevel::Error {
                continue;
            }
            if wanted.is_some() && entry.category != wanted {
                continue;
            }
            entries.push(entry);
        }

        entries.reverse();
        Ok(entries)
    }

    pub fn info(&self, category: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
        self.log(LogLevel::Info, category, event, details)
    }

    pub fn error(&self, category: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
        self.log(LogLevel::Error, category, event, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_logger() -> (ActivityLogger, PathBuf) {
        let dir = std::env::temp_dir().join(format!("harvest-log-{}", uuid::Uuid::new_v4()));
        (ActivityLogger::in_dir(&dir).unwrap(), dir)
    }

    #[test]
    fn test_read_logs_filters_and_orders_newest_first() {
        let (logger, dir) = temp_logger();

        logger.info(Some("best_seller"), "harvest", Some("3 records")).unwrap();
        logger.error(Some("most wished for"), "harvest", Some("page unavailable")).unwrap();
        logger.info(Some("best_seller"), "export", None).unwrap();

        let all = logger.read_logs(None, false).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].event, "export");

        let best = logger.read_logs(Some("best seller"), false).unwrap();
        assert_eq!(best.len(), 2);

        let errors = logger.read_logs(None, true).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category.as_ref().map(Category::as_str), Some("most_wished_for"));
        assert_eq!(errors[0].details.as_deref(), Some("page unavailable"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_garbage_lines_are_skipped() {
        let (logger, dir) = temp_logger();
        fs::write(logger.path(), "not json\n").unwrap();
        logger.info(None, "harvest", None).unwrap();

        let all = logger.read_logs(None, false).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].category.is_none());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_read_logs_without_file_is_empty() {
        let (logger, dir) = temp_logger();
        assert!(logger.read_logs(None, false).unwrap().is_empty());
        let _ = fs::remove_dir_all(dir);
    }
}
