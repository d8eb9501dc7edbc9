//! Error types for bearer-token inspection.
//!
//! Every variant here means "treat the token as unusable locally" - the
//! inspector fails closed on anything it cannot read.

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TokenError {
    #[error("Token Structure Error: expected three dot-delimited segments, found {segments} {location}")]
    Structure {
        segments: usize,
        location: ErrorLocation,
    },

    #[error("Token Payload Decode Error: {message} {location}")]
    PayloadDecode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Token Payload Parse Error: {message} {location}")]
    PayloadParse {
        message: String,
        location: ErrorLocation,
    },
}

impl TokenError {
    #[track_caller]
    pub fn structure(segments: usize) -> Self {
        TokenError::Structure {
            segments,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn payload_decode(message: impl Into<String>) -> Self {
        TokenError::PayloadDecode {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn payload_parse(message: impl Into<String>) -> Self {
        TokenError::PayloadParse {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
