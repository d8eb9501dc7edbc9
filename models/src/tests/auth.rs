// Unit tests for auth wire types and claim-derived identity

use crate::{AuthResponse, TokenClaims};

use serde_json::json;

/// **VALUE**: Verifies the signin/signup response body parses per contract.
///
/// **WHY THIS MATTERS**: This is the only place the raw token enters the
/// client; a parse failure here locks users out entirely.
#[test]
fn given_auth_response_json_when_deserialized_then_token_and_user_present() {
    let value = json!({
        "access_token": "aaa.bbb.ccc",
        "token_type": "bearer",
        "user": {
            "id": "user-1",
            "email": "ada@example.com",
            "created_at": "2025-11-01T00:00:00Z"
        }
    });

    let response: AuthResponse = serde_json::from_value(value).unwrap();

    assert_eq!(response.access_token, "aaa.bbb.ccc");
    assert_eq!(response.user.email.as_deref(), Some("ada@example.com"));
}

/// **VALUE**: Verifies identity derivation tolerates sparse claims.
///
/// **WHY THIS MATTERS**: On process start the user is rebuilt from the token
/// alone; servers are free to omit `email` and `iat`, and that must not
/// panic or invent values.
///
/// **BUG THIS CATCHES**: Would catch an `unwrap()` sneaking into the
/// `iat -> created_at` conversion.
#[test]
fn given_minimal_claims_when_deriving_identity_then_optionals_absent() {
    let claims: TokenClaims = serde_json::from_value(json!({ "sub": "user-9" })).unwrap();

    let identity = claims.identity();

    assert_eq!(identity.id, "user-9");
    assert!(identity.email.is_none());
    assert!(identity.created_at.is_none());
}

/// **VALUE**: Verifies `iat` becomes the account timestamp.
#[test]
fn given_full_claims_when_deriving_identity_then_created_at_from_iat() {
    let claims: TokenClaims = serde_json::from_value(json!({
        "sub": "user-9",
        "email": "ada@example.com",
        "iat": 1_700_000_000,
        "exp": 1_700_003_600
    }))
    .unwrap();

    let identity = claims.identity();

    assert_eq!(
        identity.created_at.map(|t| t.timestamp()),
        Some(1_700_000_000)
    );
}
