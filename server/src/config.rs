//! Server configuration loading from TOML with environment overrides.

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use railcast_notify::MailSettings;

/// Server configuration, loaded from TOML with environment overrides
/// for the deploy knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind: String,
    /// Port to bind.
    pub port: u16,
    /// Location of the trained model artifact.
    pub artifact_path: PathBuf,
    /// Directory holding the user registry and history log.
    pub data_dir: PathBuf,
    /// Structured event log; disabled when unset.
    pub event_log: Option<PathBuf>,
    /// Session lifetime in minutes.
    pub session_ttl_minutes: i64,
    /// Mail relay settings; mail is skipped when unset.
    pub mail: Option<MailSettings>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_owned(),
            port: 5000,
            artifact_path: PathBuf::from("artifacts/model.json"),
            data_dir: PathBuf::from("data"),
            event_log: None,
            session_ttl_minutes: 24 * 60,
            mail: None,
        }
    }
}

impl ServerConfig {
    /// Loads and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects unusable settings.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.session_ttl_minutes <= 0 {
            bail!("session_ttl_minutes must be positive");
        }
        Ok(())
    }

    /// Applies `RAILCAST_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any lookup (exposed for tests).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = lookup("RAILCAST_BIND") {
            self.bind = bind;
        }
        if let Some(port) = lookup("RAILCAST_PORT").and_then(|value| value.parse().ok()) {
            self.port = port;
        }
        if let Some(artifact) = lookup("RAILCAST_ARTIFACT") {
            self.artifact_path = PathBuf::from(artifact);
        }
        if let Some(data_dir) = lookup("RAILCAST_DATA_DIR") {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(event_log) = lookup("RAILCAST_EVENT_LOG") {
            self.event_log = Some(PathBuf::from(event_log));
        }
    }

    /// Bind address as a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.bind, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
        assert!(config.mail.is_none());
    }

    #[test]
    fn parses_a_full_document() {
        let config: ServerConfig = toml::from_str(
            r#"
            bind = "127.0.0.1"
            port = 8080
            artifact_path = "out/model.json"
            data_dir = "var/railcast"
            event_log = "var/railcast/events.jsonl"
            session_ttl_minutes = 60

            [mail]
            endpoint = "https://relay.example.net/send"
            sender = "no-reply@railcast.dev"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.artifact_path, PathBuf::from("out/model.json"));
        assert!(config.event_log.is_some());
        assert_eq!(config.mail.unwrap().sender, "no-reply@railcast.dev");
    }

    #[test]
    fn env_overrides_win() {
        let mut config = ServerConfig::default();
        config.apply_overrides(|name| match name {
            "RAILCAST_PORT" => Some("9001".to_owned()),
            "RAILCAST_ARTIFACT" => Some("elsewhere/model.json".to_owned()),
            _ => None,
        });
        assert_eq!(config.port, 9001);
        assert_eq!(config.artifact_path, PathBuf::from("elsewhere/model.json"));
        assert_eq!(config.bind, "0.0.0.0");
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());
    }
}
