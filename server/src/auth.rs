//! Password hashing, salt generation, and in-memory session tracking.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generates a fresh 16-byte salt, hex-encoded.
#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    hex_encode(&bytes)
}

/// Salted SHA-256 password digest, hex-encoded.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Checks a password against a stored digest without early exit on the
/// first differing byte.
#[must_use]
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let actual = hash_password(password, salt);
    if actual.len() != expected_hash.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// In-memory bearer-session store with a fixed TTL.
///
/// Sessions die with the process; clients re-login after a restart.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Creates a store issuing sessions valid for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issues a new token for the given account.
    #[must_use]
    pub fn issue(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().insert(
            token.clone(),
            Session {
                user_id,
                expires_at: Utc::now() + self.ttl,
            },
        );
        token
    }

    /// Resolves a token to its account, dropping it if expired.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let session = *self.sessions.read().get(token)?;
        if session.expires_at <= Utc::now() {
            self.sessions.write().remove(token);
            return None;
        }
        Some(session.user_id)
    }

    /// Invalidates a token. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.write().remove(token).is_some()
    }

    /// Live (unexpired) session count.
    #[must_use]
    pub fn active(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .values()
            .filter(|session| session.expires_at > now)
            .count()
    }
}
