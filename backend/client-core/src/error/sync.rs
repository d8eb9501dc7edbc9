//! Error types for the entity synchronizers.
//!
//! Validation failures are resolved locally and never cross the request
//! pipeline boundary; everything else wraps an [`ApiError`] after the
//! synchronizer has already decided what to do with its optimistic state.

use crate::error::api::ApiError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;
use uuid::Uuid;

#[derive(Debug, ThisError)]
pub enum SyncError {
    #[error("Validation Error: {field} {reason} {location}")]
    Validation {
        field: &'static str,
        reason: ValidationFailure,
        location: ErrorLocation,
    },

    #[error("Unknown Entity Error: no cached entry with id {id} {location}")]
    UnknownEntity { id: Uuid, location: ErrorLocation },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Specific reasons local input validation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailure {
    Empty,
    TooLong { max: usize, actual: usize },
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "is required"),
            Self::TooLong { max, actual } => {
                write!(f, "too long ({actual} chars, maximum {max})")
            }
        }
    }
}

impl SyncError {
    #[track_caller]
    pub fn validation(field: &'static str, reason: ValidationFailure) -> Self {
        SyncError::Validation {
            field,
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unknown_entity(id: Uuid) -> Self {
        SyncError::UnknownEntity {
            id,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether this failure never reached the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SyncError::Validation { .. } | SyncError::UnknownEntity { .. }
        )
    }

    /// Text safe to show the user.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Validation { field, reason, .. } => match reason {
                ValidationFailure::Empty => format!("{} is required", capitalized(field)),
                ValidationFailure::TooLong { max, .. } => {
                    format!("{} must be {max} characters or less", capitalized(field))
                }
            },
            SyncError::UnknownEntity { .. } => String::from("That item no longer exists."),
            SyncError::Api(api) => api.user_message(),
        }
    }
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
