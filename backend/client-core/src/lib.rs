//! Taskline client core.
//!
//! The session-aware API client and optimistic state-synchronization layer
//! of a multi-device task/chat application. Shells wire these pieces
//! together:
//!
//! - [`credentials::CredentialStore`] - durable owner of the bearer token
//! - [`token`] - local expiry/subject inspection (no verification, no trust)
//! - [`api::ApiClient`] - the request pipeline every outbound call uses
//! - [`session::SessionController`] - process-wide auth state, published as
//!   immutable snapshots
//! - [`sync::TaskSync`] / [`sync::ChatSync`] - optimistic caches reconciled
//!   against the server

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logger;
pub mod session;
pub mod sync;
pub mod token;

#[cfg(test)]
mod tests;

pub const TASKLINE_SERVER_HOSTNAME: &str = "localhost";
pub const TASKLINE_SERVER_PORT: &str = "8000";
pub const TASKLINE_SERVER_BASE_URL: &str = const_format::concatcp!(
    "http://",
    TASKLINE_SERVER_HOSTNAME,
    ":",
    TASKLINE_SERVER_PORT
);

/// Fixed per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
