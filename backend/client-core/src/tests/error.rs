// Unit tests for pipeline error classification
// Tests the tagged error-detail parsing and user-facing messages

use crate::error::api::{ApiError, ErrorDetail};
use crate::error::sync::{SyncError, ValidationFailure};

/// **VALUE**: Verifies the `detail` field is extracted when present.
///
/// **WHY THIS MATTERS**: Server detail is the only specific text users see
/// on a rejected call; dropping it degrades every error to a shrug.
#[test]
fn given_detail_payload_when_parsing_body_then_message_extracted() {
    let detail = ErrorDetail::from_body(r#"{ "detail": "Task not found" }"#);
    assert_eq!(detail, ErrorDetail::Message(String::from("Task not found")));
}

/// **VALUE**: Verifies the `message` fallback field is honored.
#[test]
fn given_message_payload_when_parsing_body_then_message_extracted() {
    let detail = ErrorDetail::from_body(r#"{ "message": "rate limited" }"#);
    assert_eq!(detail, ErrorDetail::Message(String::from("rate limited")));
}

/// **VALUE**: Verifies unreadable bodies become the explicit fallback
/// variant, not a guessed string.
///
/// **BUG THIS CATCHES**: Would catch best-effort field access sneaking back
/// in (e.g. stringifying the whole body as the "detail").
#[test]
fn given_unreadable_bodies_when_parsing_then_unparseable() {
    assert_eq!(ErrorDetail::from_body(""), ErrorDetail::Unparseable);
    assert_eq!(ErrorDetail::from_body("<html>"), ErrorDetail::Unparseable);
    assert_eq!(ErrorDetail::from_body("{}"), ErrorDetail::Unparseable);
    assert_eq!(
        ErrorDetail::from_body(r#"{ "unrelated": 1 }"#),
        ErrorDetail::Unparseable
    );
}

/// **VALUE**: Verifies the status code is stored directly on HTTP errors.
#[test]
fn given_http_response_when_building_error_then_status_stored() {
    let error = ApiError::from_http_response(422, r#"{ "detail": "too long" }"#);

    assert_eq!(error.status_code(), Some(422));
    assert_eq!(error.category(), "client_error");
}

/// **VALUE**: Verifies user-facing text never leaks internals.
///
/// **WHY THIS MATTERS**: `user_message` goes straight to the presentation
/// layer; file paths and source locations in it would leak into screenshots
/// and bug reports.
#[test]
fn given_each_error_kind_when_rendering_user_message_then_text_is_clean() {
    let timeout = ApiError::timeout("deadline elapsed");
    assert_eq!(timeout.user_message(), "Request timed out. Please try again.");

    let unauthorized = ApiError::unauthorized();
    assert_eq!(
        unauthorized.user_message(),
        "Session expired. Please sign in again."
    );

    let http = ApiError::from_http_response(400, r#"{ "detail": "Description is required" }"#);
    assert_eq!(http.user_message(), "Description is required");

    let opaque = ApiError::from_http_response(500, "<html>stack trace</html>");
    assert_eq!(opaque.user_message(), "An error occurred");
    assert!(!opaque.user_message().contains("stack"));
}

/// **VALUE**: Verifies validation failures identify themselves as local.
///
/// **WHY THIS MATTERS**: Synchronizers use this to assert a failure never
/// reached the network and needs no rollback.
#[test]
fn given_validation_failure_when_classifying_then_local() {
    let error = SyncError::validation(
        "description",
        ValidationFailure::TooLong {
            max: 500,
            actual: 501,
        },
    );

    assert!(error.is_local());
    assert_eq!(
        error.user_message(),
        "Description must be 500 characters or less"
    );

    let empty = SyncError::validation("message", ValidationFailure::Empty);
    assert_eq!(empty.user_message(), "Message is required");
}
