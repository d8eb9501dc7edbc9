//! Cross-cutting utilities for Taskline.
//!
//! This crate contains pieces shared by every layer but owned by none:
//! error-site capture, secret handling, and HTTP status categorization.
//! Nothing here knows about tasks, conversations, or sessions.
//!
//! ## Architecture
//!
//! - **common** (this crate): cross-cutting utilities
//! - **models**: pure data structures
//! - **client-core**: business logic operating on models
//!
//! The layering keeps concerns separated and makes testing easier.

pub mod error;
pub mod http_status;
pub mod redacted_token;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_token::RedactedToken;
