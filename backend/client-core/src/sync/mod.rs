//! Entity synchronizers: optimistic local caches reconciled against the
//! server.
//!
//! Both synchronizers follow the same lifecycle rule: a locally-initiated
//! mutation first applies to the in-memory cache, then is either confirmed
//! (cache entry replaced by the server's authoritative representation) or
//! reverted (restored to the pre-mutation value) - never left half-applied.
//!
//! Overlapping calls against the same entity are not serialized; the last
//! completing server response wins in the cache. That race is accepted (see
//! DESIGN.md) - no sequence numbers are attached.

pub mod chat;
pub mod tasks;

pub use chat::{ChatSync, SendOutcome};
pub use tasks::{PendingDelete, TaskSummary, TaskSync, UpdateOutcome};

use crate::error::sync::{SyncError, ValidationFailure};

/// Validate and normalize free-text input before it may touch the network.
///
/// Validation failures are resolved locally; they never cross the request
/// pipeline boundary.
pub(crate) fn validate_text(
    field: &'static str,
    input: &str,
    max_chars: Option<usize>,
) -> Result<String, SyncError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(SyncError::validation(field, ValidationFailure::Empty));
    }

    if let Some(max) = max_chars {
        let actual = trimmed.chars().count();
        if actual > max {
            return Err(SyncError::validation(
                field,
                ValidationFailure::TooLong { max, actual },
            ));
        }
    }

    Ok(trimmed.to_string())
}
