//! The request pipeline: every outbound call goes through here.
//!
//! Per call: resolve the active credential (explicit override beats the
//! stored one), short-circuit locally-expired tokens, attach the bearer
//! header, enforce the fixed timeout, classify the response, and route 401s
//! through the sign-in redirect. Auth entry points (`/auth/*`) use the
//! anonymous variant, which attaches nothing and treats a 401 as an ordinary
//! server error - a wrong password must not bounce the user off the sign-in
//! page they are already on.

pub mod redirect;

pub use redirect::{NavigationSignal, SigninRedirect};

use crate::credentials::CredentialStore;
use crate::error::api::ApiError;
use crate::token;

use common::RedactedToken;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Whether a call carries the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallAuth {
    Bearer,
    Anonymous,
}

/// HTTP client for the taskline backend.
///
/// Cheap to clone; all clones share the same connection pool, credential
/// store, and redirect handle.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    client: Client,
    credentials: CredentialStore,
    redirect: SigninRedirect,
    /// Explicitly-set token that takes precedence over the stored credential.
    override_token: RwLock<Option<RedactedToken>>,
}

impl ApiClient {
    /// Build a client against `base_url_str` with the given timeout.
    pub fn new(
        base_url_str: &str,
        timeout: Duration,
        credentials: CredentialStore,
        redirect: SigninRedirect,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url_str)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::from_reqwest(&e))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                client,
                credentials,
                redirect,
                override_token: RwLock::new(None),
            }),
        })
    }

    /// The redirect handle this client fires on session death.
    pub fn redirect(&self) -> &SigninRedirect {
        &self.inner.redirect
    }

    /// Set (or clear) a token that takes precedence over the stored
    /// credential. Primarily for tests and one-off elevated calls.
    pub fn set_token_override(&self, token: Option<RedactedToken>) {
        let mut guard = self
            .inner
            .override_token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = token;
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.client.get(self.join(path)?);
        self.json(request, CallAuth::Bearer).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.join(path)?).json(body);
        self.json(request, CallAuth::Bearer).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.put(self.join(path)?).json(body);
        self.json(request, CallAuth::Bearer).await
    }

    /// Body-less PATCH (the toggle endpoint takes none).
    pub async fn patch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.inner.client.patch(self.join(path)?);
        self.json(request, CallAuth::Bearer).await
    }

    /// DELETE, succeeding with an empty result on 204 (or any 2xx).
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.inner.client.delete(self.join(path)?);
        let response = self.dispatch(request, CallAuth::Bearer).await?;
        debug!("DELETE {} -> {}", path, response.status());
        Ok(())
    }

    /// POST without a credential and without the 401 escape hatch.
    ///
    /// For `/auth/signin` and `/auth/signup`, where a 401 means "wrong
    /// password", not "session died".
    pub async fn post_anonymous<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.inner.client.post(self.join(path)?).json(body);
        self.json(request, CallAuth::Anonymous).await
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn resolved_credential(&self) -> Option<RedactedToken> {
        let guard = self
            .inner
            .override_token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone().or_else(|| self.inner.credentials.get())
    }

    async fn json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        auth: CallAuth,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(request, auth).await?;
        response.json::<T>().await.map_err(|e| {
            warn!("Failed to decode response body: {}", e);
            ApiError::decode(e.to_string())
        })
    }

    /// Steps 1-7 of the per-call algorithm; returns the successful response.
    async fn dispatch(
        &self,
        mut request: RequestBuilder,
        auth: CallAuth,
    ) -> Result<Response, ApiError> {
        if auth == CallAuth::Bearer {
            if let Some(credential) = self.resolved_credential() {
                // Locally-expired tokens never leave the device; the server
                // would only echo the 401 back.
                if token::is_expired(credential.as_str()) {
                    warn!("Stored token is expired - short-circuiting request");
                    self.inner.redirect.trigger();
                    return Err(ApiError::unauthorized());
                }
                request = request.bearer_auth(credential.as_str());
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let error = ApiError::from_reqwest(&e);
                warn!("Request failed ({}): {}", error.category(), e);
                return Err(error);
            }
        };

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return match auth {
                CallAuth::Bearer => {
                    // Regardless of response body.
                    self.inner.redirect.trigger();
                    Err(ApiError::unauthorized())
                }
                CallAuth::Anonymous => {
                    let body = response.text().await.unwrap_or_default();
                    Err(ApiError::from_http_response(status.as_u16(), &body))
                }
            };
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = ApiError::from_http_response(status.as_u16(), &body);
            warn!("Server rejected request ({}): HTTP {}", error.category(), status);
            return Err(error);
        }

        Ok(response)
    }
}
