#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Best-effort outbound mail.
//!
//! Messages are POSTed as JSON to a configured HTTP mail-relay
//! endpoint. Mail is never load-bearing: callers treat every failure
//! as soft, and an unconfigured mailer simply skips sending.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Relay connection settings, usually read from the server config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    /// Relay endpoint accepting `POST` with a JSON message body.
    pub endpoint: String,
    /// Bearer token for the relay, if it requires one.
    #[serde(default)]
    pub token: Option<String>,
    /// Sender address presented to recipients.
    pub sender: String,
}

/// Faults talking to the relay.
#[derive(Debug, Error)]
pub enum MailError {
    /// The HTTP request itself failed.
    #[error("mail relay request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The relay answered with a non-success status.
    #[error("mail relay answered status {0}")]
    Status(u16),
}

/// Outbound mail client; a disabled instance skips every send.
#[derive(Debug, Clone)]
pub struct Mailer {
    inner: Option<Relay>,
}

#[derive(Debug, Clone)]
struct Relay {
    client: Client,
    settings: MailSettings,
}

impl Mailer {
    /// A mailer that drops everything (no relay configured).
    #[must_use]
    pub const fn disabled() -> Self {
        Self { inner: None }
    }

    /// A mailer bound to the given relay.
    pub fn from_settings(settings: MailSettings) -> Result<Self, MailError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            inner: Some(Relay { client, settings }),
        })
    }

    /// Whether a relay is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Sends the post-registration welcome message.
    ///
    /// Returns `Ok(false)` when no relay is configured.
    pub async fn send_welcome(&self, username: &str, email: &str) -> Result<bool, MailError> {
        let Some(relay) = &self.inner else {
            return Ok(false);
        };
        let body = welcome_payload(&relay.settings.sender, username, email);
        let mut request = relay.client.post(&relay.settings.endpoint).json(&body);
        if let Some(token) = &relay.settings.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Status(response.status().as_u16()));
        }
        Ok(true)
    }
}

fn welcome_payload(sender: &str, username: &str, email: &str) -> Value {
    json!({
        "from": sender,
        "to": email,
        "subject": "Welcome to Railcast",
        "html": format!(
            "<h2>Hello {username},</h2>\
             <p>Your Railcast account is ready. Log in to start predicting \
             train delays.</p>"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_skips_sending() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());
        assert!(!mailer.send_welcome("alice", "alice@example.net").await.unwrap());
    }

    #[test]
    fn welcome_payload_addresses_the_recipient() {
        let payload = welcome_payload("no-reply@railcast.dev", "alice", "alice@example.net");
        assert_eq!(payload["to"], "alice@example.net");
        assert_eq!(payload["from"], "no-reply@railcast.dev");
        assert!(payload["html"].as_str().unwrap().contains("Hello alice"));
    }

    #[test]
    fn settings_deserialize_without_token() {
        let settings: MailSettings = serde_json::from_str(
            r#"{ "endpoint": "https://relay.example.net/send", "sender": "no-reply@railcast.dev" }"#,
        )
        .unwrap();
        assert!(settings.token.is_none());
        let mailer = Mailer::from_settings(settings).unwrap();
        assert!(mailer.is_enabled());
    }
}
