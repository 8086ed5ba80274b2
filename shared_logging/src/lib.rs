#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSONL event logging shared by the railcast binaries.
//!
//! Both the training CLI and the prediction server append their audit
//! events (rows loaded, model scores, logins, history-write failures)
//! to a single JSON-lines file that downstream tooling can tail.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Event severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Degraded but recoverable condition.
    Warn,
    /// Failed operation.
    Error,
}

/// One structured event line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Emission time.
    pub at: DateTime<Utc>,
    /// Subsystem emitting the event (e.g. `trainer`, `server`).
    pub component: String,
    /// Severity.
    pub level: EventLevel,
    /// What happened (e.g. `training_complete`, `history_write_failed`).
    pub action: String,
    /// Structured payload attached to the event.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl EventRecord {
    /// Creates an event with an empty payload.
    #[must_use]
    pub fn new(component: impl Into<String>, level: EventLevel, action: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            component: component.into(),
            level,
            action: action.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Attaches the payload of a JSON object to the event.
    ///
    /// Non-object values are stored under a single `value` key so the
    /// record stays a flat map.
    #[must_use]
    pub fn with_fields(mut self, payload: serde_json::Value) -> Self {
        match payload {
            serde_json::Value::Object(map) => self.fields = map,
            other => {
                self.fields.insert("value".to_owned(), other);
            }
        }
        self
    }
}

/// Append-only JSONL event log.
///
/// Writes are serialized through a mutex; the file is flushed per event
/// so a crashed process never loses acknowledged records.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    min_level: EventLevel,
    echo: bool,
    writer: Mutex<File>,
}

impl EventLog {
    /// Opens (or creates) the log file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            min_level: EventLevel::Debug,
            echo: false,
            writer: Mutex::new(file),
        })
    }

    /// Discards events below the given level.
    #[must_use]
    pub fn with_min_level(mut self, level: EventLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Mirrors emitted events to stderr (handy for CLI runs).
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Appends one event as a JSON line.
    pub fn emit(&self, record: &EventRecord) -> Result<()> {
        if record.level < self.min_level {
            return Ok(());
        }
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        if self.echo {
            eprintln!(
                "[{:?}] {} {}",
                record.level, record.component, record.action
            );
        }
        Ok(())
    }

    /// Emits an info-level event with the given payload.
    pub fn info(
        &self,
        component: &str,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.emit(&EventRecord::new(component, EventLevel::Info, action).with_fields(payload))
    }

    /// Emits a warn-level event with the given payload.
    pub fn warn(
        &self,
        component: &str,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.emit(&EventRecord::new(component, EventLevel::Warn, action).with_fields(payload))
    }

    /// Emits an error-level event with the given payload.
    pub fn error(
        &self,
        component: &str,
        action: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.emit(&EventRecord::new(component, EventLevel::Error, action).with_fields(payload))
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn appends_json_lines() {
        let dir = tempdir().unwrap();
        let log = EventLog::open(dir.path().join("events.jsonl")).unwrap();
        log.info("trainer", "training_started", json!({ "rows": 100 }))
            .unwrap();
        log.warn("server", "history_write_failed", json!({ "user": "u" }))
            .unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: EventRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.action, "training_started");
        assert_eq!(first.fields["rows"], json!(100));
    }

    #[test]
    fn min_level_filters() {
        let dir = tempdir().unwrap();
        let log = EventLog::open(dir.path().join("events.jsonl"))
            .unwrap()
            .with_min_level(EventLevel::Warn);
        log.info("server", "login", json!({})).unwrap();
        log.error("server", "login_failed", json!({})).unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("login_failed"));
    }

    #[test]
    fn scalar_payload_lands_under_value_key() {
        let record = EventRecord::new("cli", EventLevel::Info, "done").with_fields(json!(3));
        assert_eq!(record.fields["value"], json!(3));
    }
}
