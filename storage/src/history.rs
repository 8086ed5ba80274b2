use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StorageError;

/// One served prediction, as stored in the history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Account the prediction was served to.
    pub user_id: Uuid,
    /// Journey date exactly as the client submitted it.
    pub date: String,
    /// Temperature input.
    pub temperature: f64,
    /// Rain indicator input (0/1).
    pub rain: u8,
    /// Fog indicator input (0/1).
    pub fog: u8,
    /// Visibility input.
    pub visibility: f64,
    /// Wind speed input.
    pub windspeed: f64,
    /// Delay the model answered, already display-rounded.
    pub predicted_delay: f64,
    /// When the prediction was served.
    pub created_at: DateTime<Utc>,
}

/// Append-only prediction history, one JSON record per line.
///
/// The full log is kept in memory for queries; corrupt lines found at
/// open are skipped rather than poisoning the whole log.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    records: Mutex<Vec<PredictionRecord>>,
    writer: Mutex<File>,
}

impl HistoryStore {
    /// Opens the history log, creating it if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut records = Vec::new();
        if path.exists() {
            for line in BufReader::new(File::open(&path)?).lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                if let Ok(record) = serde_json::from_str::<PredictionRecord>(&line) {
                    records.push(record);
                }
            }
        }
        let writer = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            records: Mutex::new(records),
            writer: Mutex::new(writer),
        })
    }

    /// Appends one record to the log and the in-memory tail.
    pub fn append(&self, record: PredictionRecord) -> Result<(), StorageError> {
        {
            let mut writer = self.writer.lock();
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        self.records.lock().push(record);
        Ok(())
    }

    /// Predictions served to one account, most recent first.
    #[must_use]
    pub fn for_user(&self, user_id: Uuid) -> Vec<PredictionRecord> {
        self.records
            .lock()
            .iter()
            .rev()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Total records across all accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
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
    use tempfile::tempdir;

    fn record(user_id: Uuid, date: &str, delay: f64) -> PredictionRecord {
        PredictionRecord {
            id: Uuid::new_v4(),
            user_id,
            date: date.to_owned(),
            temperature: 15.5,
            rain: 0,
            fog: 0,
            visibility: 8.0,
            windspeed: 12.0,
            predicted_delay: delay,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn queries_return_newest_first_per_user() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("predictions.jsonl")).unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.append(record(alice, "2024-03-15", 4.2)).unwrap();
        store.append(record(bob, "2024-03-16", 1.0)).unwrap();
        store.append(record(alice, "2024-03-17", 9.9)).unwrap();

        let history = store.for_user(alice);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].date, "2024-03-17");
        assert_eq!(history[1].date, "2024-03-15");
    }

    #[test]
    fn log_survives_a_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("predictions.jsonl");
        let alice = Uuid::new_v4();
        {
            let store = HistoryStore::open(&path).unwrap();
            store.append(record(alice, "2024-03-15", 4.2)).unwrap();
        }
        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.for_user(alice)[0].date, "2024-03-15");
    }

    #[test]
    fn corrupt_lines_are_skipped_at_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("predictions.jsonl");
        let alice = Uuid::new_v4();
        {
            let store = HistoryStore::open(&path).unwrap();
            store.append(record(alice, "2024-03-15", 4.2)).unwrap();
        }
        let mut raw = fs::read_to_string(&path).unwrap();
        raw.push_str("{not json\n");
        fs::write(&path, raw).unwrap();

        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
    }
}
