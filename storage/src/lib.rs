#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! File-backed persistence for railcast: the user registry and the
//! per-user prediction history.
//!
//! Both stores keep their working set in memory behind `parking_lot`
//! locks and persist as JSON on disk: the registry as one atomically
//! rewritten document, the history as an append-only JSONL file.

mod history;
mod users;

pub use history::{HistoryStore, PredictionRecord};
pub use users::{UserRecord, UserStore};

use thiserror::Error;

/// Faults raised by the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Registration collided with an existing username or email.
    #[error("username or email already registered")]
    DuplicateUser,
}
