//! Shared application state wiring stores, model, and mailer together.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

use railcast_modeling::SelectedModel;
use railcast_notify::Mailer;
use railcast_storage::{HistoryStore, UserStore};
use shared_logging::{EventLevel, EventLog, EventRecord};

use crate::{auth::SessionStore, config::ServerConfig};

/// Shared state behind every request handler.
///
/// The model is loaded once and never mutated; a missing or corrupt
/// artifact leaves `model` unset and the predict route failing fast
/// until the artifact is fixed and the process restarts.
pub struct AppState {
    /// Active configuration.
    pub config: ServerConfig,
    /// The trained model, if the artifact loaded.
    pub model: Option<Arc<SelectedModel>>,
    /// Account registry.
    pub users: UserStore,
    /// Prediction history log.
    pub history: HistoryStore,
    /// Bearer-session store.
    pub sessions: SessionStore,
    /// Outbound mail client.
    pub mailer: Mailer,
    /// Structured audit log, when configured.
    pub events: Option<EventLog>,
}

impl AppState {
    /// Opens stores, loads the artifact, and assembles shared state.
    pub fn initialize(config: ServerConfig) -> Result<Arc<Self>> {
        let model = match SelectedModel::load(&config.artifact_path) {
            Ok(model) => {
                tracing::info!(
                    artifact = %config.artifact_path.display(),
                    kind = %model.kind,
                    "model artifact loaded"
                );
                Some(Arc::new(model))
            }
            Err(error) => {
                tracing::warn!(
                    artifact = %config.artifact_path.display(),
                    %error,
                    "model artifact unavailable; predictions will answer 503"
                );
                None
            }
        };

        let users = UserStore::open(config.data_dir.join("users.json"))
            .context("opening user registry")?;
        let history = HistoryStore::open(config.data_dir.join("predictions.jsonl"))
            .context("opening prediction history")?;
        let sessions = SessionStore::new(Duration::minutes(config.session_ttl_minutes));
        let mailer = match config.mail.clone() {
            Some(settings) => Mailer::from_settings(settings).context("building mail client")?,
            None => Mailer::disabled(),
        };
        let events = config
            .event_log
            .as_ref()
            .map(EventLog::open)
            .transpose()
            .context("opening event log")?;

        Ok(Arc::new(Self {
            config,
            model,
            users,
            history,
            sessions,
            mailer,
            events,
        }))
    }

    /// Emits a structured audit event; logging faults are soft.
    pub fn record_event(&self, level: EventLevel, action: &str, payload: serde_json::Value) {
        if let Some(log) = &self.events {
            let record = EventRecord::new("server", level, action).with_fields(payload);
            if let Err(error) = log.emit(&record) {
                tracing::warn!(%error, action, "event log write failed");
            }
        }
    }
}
