//! Error types for credential persistence.

use std::path::PathBuf;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CredentialsError {
    #[error("Credential Path Detection Error: {message} {location}")]
    PathDetection {
        message: String,
        location: ErrorLocation,
    },

    #[error("Credential Write Error: {path}: {source} {location}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Credential Serialization Error: {reason} {location}")]
    Serialize {
        reason: String,
        location: ErrorLocation,
    },
}

impl CredentialsError {
    #[track_caller]
    pub fn path_detection(message: impl Into<String>) -> Self {
        CredentialsError::PathDetection {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn write(path: PathBuf, source: std::io::Error) -> Self {
        CredentialsError::Write {
            path,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn serialize(reason: impl Into<String>) -> Self {
        CredentialsError::Serialize {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
