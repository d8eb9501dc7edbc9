//! Authentication wire types and decoded token claims.
//!
//! These mirror the `/auth/signup` and `/auth/signin` contract. The token
//! itself stays opaque everywhere except [`TokenClaims`], which is a decoded
//! *hint* — the server remains the sole authority on whether a token is
//! valid.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user as the client knows them.
///
/// Comes from two places: the auth response body on sign-in/sign-up, and the
/// token payload on process start (where `email`/`created_at` may be absent
/// if the server chose not to embed them).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `POST /auth/signup` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/signin` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/signup` and `POST /auth/signin` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserIdentity,
}

/// Claims decoded from the middle segment of a bearer token.
///
/// `exp` and `iat` are seconds since the Unix epoch. A missing `exp` is
/// tolerated (expiry authority defers to the server); a missing `sub` is not.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Derive the user identity embedded in the claims.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.sub.clone(),
            email: self.email.clone(),
            created_at: self
                .iat
                .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single()),
        }
    }
}
