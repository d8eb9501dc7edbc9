//! Bearer-token inspection without server round-trips.
//!
//! Decodes the three-part dot-delimited token just far enough to read its
//! expiry and subject claims. This is a client-side optimization to avoid
//! sending requests that are certain to bounce; the server remains the only
//! authority on whether a token is actually valid. No signature is checked
//! here, ever - adding local verification would only manufacture false trust.
//!
//! Fail-closed policy: anything that does not parse is treated as expired.
//! The single deliberate exception is a well-formed payload with no `exp`
//! claim, which is *not* expired by this check - expiry authority defers to
//! the server.

use crate::error::token::TokenError;

use models::TokenClaims;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use log::debug;

const TOKEN_SEGMENTS: usize = 3;

/// Decode the claims carried in a bearer token's payload segment.
///
/// # Errors
/// Returns [`TokenError`] for anything other than a three-segment token
/// whose middle segment is base64url-encoded JSON with a `sub` claim.
pub fn decode(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != TOKEN_SEGMENTS {
        return Err(TokenError::structure(segments.len()));
    }

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| TokenError::payload_decode(e.to_string()))?;

    serde_json::from_slice::<TokenClaims>(&payload_bytes)
        .map_err(|e| TokenError::payload_parse(e.to_string()))
}

/// Whether the token is expired as far as this client can tell.
///
/// True for every undecodable token (fail-closed). False for a decodable
/// token without an `exp` claim. Must never be the sole gate protecting a
/// resource.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now().timestamp())
}

/// Expiry check against an explicit evaluation time (seconds since epoch).
pub(crate) fn is_expired_at(token: &str, now_epoch_seconds: i64) -> bool {
    let claims = match decode(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Treating undecodable token as expired: {}", e);
            return true;
        }
    };

    match claims.exp {
        Some(exp) => exp < now_epoch_seconds,
        // No expiry claim: let the server decide.
        None => false,
    }
}
