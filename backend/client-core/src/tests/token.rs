// Unit tests for the token inspector
// Tests the fail-closed policy: anything unreadable counts as expired

use crate::token::{decode, is_expired_at};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

/// A fixed "now" for expiry comparisons, seconds since epoch.
const NOW: i64 = 1_700_000_000;

/// Assemble a three-segment token around the given payload JSON.
fn forge_token(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{payload}.forged-signature")
}

/// **VALUE**: Verifies every malformed structure reads as expired.
///
/// **WHY THIS MATTERS**: The inspector short-circuits requests before they
/// leave the device. Fail-open here would let garbage tokens suppress the
/// short-circuit and waste a round trip; worse, a fail-open `decode` used at
/// startup would claim a session exists when none does.
///
/// **BUG THIS CATCHES**: Would catch an early-return that treats "couldn't
/// parse" as "not expired".
#[test]
fn given_malformed_structures_when_checking_expiry_then_all_read_expired() {
    assert!(is_expired_at("", NOW));
    assert!(is_expired_at("no-dots-at-all", NOW));
    assert!(is_expired_at("only.two", NOW));
    assert!(is_expired_at("one.too.many.segments", NOW));
    assert!(is_expired_at("..", NOW));
}

/// **VALUE**: Verifies a non-base64 payload segment reads as expired.
#[test]
fn given_undecodable_payload_when_checking_expiry_then_expired() {
    assert!(is_expired_at("aGVhZGVy.!!!not-base64!!!.c2ln", NOW));
}

/// **VALUE**: Verifies a base64 payload that is not JSON reads as expired.
#[test]
fn given_non_json_payload_when_checking_expiry_then_expired() {
    let payload = URL_SAFE_NO_PAD.encode(b"plain text, not an object");
    let token = format!("aGVhZGVy.{payload}.c2ln");
    assert!(is_expired_at(&token, NOW));
}

/// **VALUE**: Verifies past `exp` is expired and future `exp` is not.
///
/// **WHY THIS MATTERS**: This is the one comparison the whole optimization
/// exists for; an inverted sign would either spam the server with dead
/// tokens or lock out live sessions.
#[test]
fn given_exp_around_now_when_checking_expiry_then_comparison_is_strict() {
    let past = forge_token(json!({ "sub": "u", "exp": NOW - 1 }));
    let future = forge_token(json!({ "sub": "u", "exp": NOW + 3600 }));

    assert!(is_expired_at(&past, NOW));
    assert!(!is_expired_at(&future, NOW));
}

/// **VALUE**: Verifies a decodable token without `exp` is NOT expired here.
///
/// **WHY THIS MATTERS**: Expiry authority defers to the server when the
/// claim is absent. Treating "no exp" as expired would permanently lock out
/// users of servers that issue non-expiring tokens.
///
/// **BUG THIS CATCHES**: Would catch fail-closed being over-applied to the
/// one documented fail-open case.
#[test]
fn given_token_without_exp_when_checking_expiry_then_not_expired() {
    let token = forge_token(json!({ "sub": "u", "iat": NOW }));
    assert!(!is_expired_at(&token, NOW));
}

/// **VALUE**: Verifies decode surfaces the claims the session needs.
#[test]
fn given_full_payload_when_decoded_then_claims_present() {
    let token = forge_token(json!({
        "sub": "user-42",
        "email": "ada@example.com",
        "iat": NOW - 60,
        "exp": NOW + 60
    }));

    let claims = decode(&token).expect("token should decode");

    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
    assert_eq!(claims.exp, Some(NOW + 60));
}

/// **VALUE**: Verifies a payload without `sub` fails to decode.
///
/// **WHY THIS MATTERS**: The subject is the identity the session is rebuilt
/// from; a token without one is unusable even if unexpired.
#[test]
fn given_payload_without_sub_when_decoded_then_parse_error() {
    let token = forge_token(json!({ "exp": NOW + 60 }));
    assert!(decode(&token).is_err());
}
