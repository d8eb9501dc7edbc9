//! Error types for the request pipeline.
//!
//! Key design decisions:
//! - HTTP status codes stored directly (not parsed from strings)
//! - Error payload bodies parse into a tagged [`ErrorDetail`], with an
//!   explicit `Unparseable` variant instead of best-effort field access
//! - All errors include ErrorLocation for debugging
//! - `#[track_caller]` for automatic location capture

use common::{ErrorLocation, HttpStatusCode};

use std::panic::Location;

use serde::Deserialize;
use thiserror::Error as ThisError;

/// Fallback text when a non-2xx body carries no readable detail.
const GENERIC_ERROR_DETAIL: &str = "An error occurred";

/// Errors produced by the request pipeline.
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("Network Error: {message} {location}")]
    Network {
        message: String,
        is_connection: bool,
        location: ErrorLocation,
    },

    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Unauthorized Error: session is no longer valid {location}")]
    Unauthorized { location: ErrorLocation },

    #[error("Server Error: HTTP {status} - {detail} {location}")]
    Http {
        status: HttpStatusCode,
        detail: ErrorDetail,
        location: ErrorLocation,
    },

    #[error("Response Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("URL Parse Error: {message} {location}")]
    UrlParse {
        message: String,
        location: ErrorLocation,
    },
}

/// What a non-2xx response body said, if anything.
///
/// Tagged rather than stringly-typed so callers can distinguish "the server
/// explained itself" from "the body was not parseable" without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    /// The server supplied a human-readable `detail` (or `message`) field.
    Message(String),
    /// The body was empty, not JSON, or carried no recognized field.
    Unparseable,
}

/// The error payload shape FastAPI-style backends return.
#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorDetail {
    /// Parse a response body into a detail, falling back to `Unparseable`.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ErrorPayload>(body) {
            Ok(payload) => payload
                .detail
                .or(payload.message)
                .map_or(ErrorDetail::Unparseable, ErrorDetail::Message),
            Err(_) => ErrorDetail::Unparseable,
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorDetail::Message(detail) => write!(f, "{detail}"),
            ErrorDetail::Unparseable => write!(f, "{GENERIC_ERROR_DETAIL}"),
        }
    }
}

impl ApiError {
    #[track_caller]
    pub fn unauthorized() -> Self {
        ApiError::Unauthorized {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout(message: impl Into<String>) -> Self {
        ApiError::Timeout {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from an HTTP response with explicit status code and raw body.
    #[track_caller]
    pub fn from_http_response(status_code: u16, body: &str) -> Self {
        ApiError::Http {
            status: HttpStatusCode(status_code),
            detail: ErrorDetail::from_body(body),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create from a reqwest error with proper categorization.
    #[track_caller]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        // Check for specific error types BEFORE converting to string
        if error.is_timeout() {
            return ApiError::Timeout {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        if error.is_decode() {
            return ApiError::Decode {
                message: error.to_string(),
                location: ErrorLocation::from(Location::caller()),
            };
        }

        ApiError::Network {
            message: error.to_string(),
            is_connection: error.is_connect(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether this failure invalidated the session globally.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// Get HTTP status code if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(status.0),
            _ => None,
        }
    }

    /// Get error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Network { is_connection: true, .. } => "connection",
            ApiError::Network { .. } => "network",
            ApiError::Timeout { .. } => "timeout",
            ApiError::Unauthorized { .. } => "unauthorized",
            ApiError::Http { status, .. } if status.is_client_error() => "client_error",
            ApiError::Http { status, .. } if status.is_server_error() => "server_error",
            ApiError::Http { .. } => "http",
            ApiError::Decode { .. } => "decode",
            ApiError::UrlParse { .. } => "url_parse",
        }
    }

    /// Text safe to show the user.
    ///
    /// Transient failures invite a retry, server detail passes through, and
    /// nothing here ever contains internal identifiers or source positions.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network { .. } => String::from("Network error. Please try again."),
            ApiError::Timeout { .. } => String::from("Request timed out. Please try again."),
            ApiError::Unauthorized { .. } => {
                String::from("Session expired. Please sign in again.")
            }
            ApiError::Http { detail, .. } => detail.to_string(),
            ApiError::Decode { .. } | ApiError::UrlParse { .. } => {
                String::from(GENERIC_ERROR_DETAIL)
            }
        }
    }
}

impl From<url::ParseError> for ApiError {
    #[track_caller]
    fn from(error: url::ParseError) -> Self {
        ApiError::UrlParse {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
