#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! The railcast HTTP prediction service.
//!
//! Loads the trained model artifact once at startup and serves
//! predictions behind simple bearer-token accounts, with per-user
//! history and best-effort mail on registration. Every request is
//! handled independently; a failure is mapped to a status code and
//! never takes the process down.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
