//! Process-wide authentication state.
//!
//! The session controller derives its state from the credential store and
//! the token inspector, and publishes an immutable snapshot on every
//! transition. Consumers subscribe rather than reaching into globals; the
//! controller is an owned, injected object, not a module-level singleton.
//!
//! State machine: `Initializing -> Authenticated | Unauthenticated`, leaving
//! `Initializing` exactly once per process. No protected content may render
//! while `Initializing` or `Unauthenticated` - the snapshot makes that
//! checkable by every consumer.

use crate::api::ApiClient;
use crate::credentials::CredentialStore;
use crate::error::session::SessionError;
use crate::token;

use common::RedactedToken;
use models::{AuthResponse, SigninRequest, SignupRequest, UserIdentity};

use std::sync::{Arc, RwLock};

use log::{info, warn};
use tokio::sync::watch;

const SIGNIN_ENDPOINT: &str = "/auth/signin";
const SIGNUP_ENDPOINT: &str = "/auth/signup";

/// The authentication state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Process start; stored credential not yet examined.
    Initializing,
    /// A credential exists and was unexpired when last evaluated.
    Authenticated(UserIdentity),
    /// No usable credential.
    Unauthenticated,
}

/// Immutable view published to consumers on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<UserIdentity>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl SessionSnapshot {
    fn from_state(state: &SessionState) -> Self {
        match state {
            SessionState::Initializing => Self {
                user: None,
                is_authenticated: false,
                is_loading: true,
            },
            SessionState::Authenticated(user) => Self {
                user: Some(user.clone()),
                is_authenticated: true,
                is_loading: false,
            },
            SessionState::Unauthenticated => Self {
                user: None,
                is_authenticated: false,
                is_loading: false,
            },
        }
    }
}

/// Owner of process-wide authentication state.
///
/// Cheap to clone; all clones share the same state and publication channel.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    credentials: CredentialStore,
    state: RwLock<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    /// Create a controller in the `Initializing` state.
    pub fn new(api: ApiClient, credentials: CredentialStore) -> Self {
        let initial = SessionState::Initializing;
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::from_state(&initial));
        Self {
            inner: Arc::new(SessionInner {
                api,
                credentials,
                state: RwLock::new(initial),
                snapshot_tx,
            }),
        }
    }

    /// Resolve `Initializing` from the stored credential, synchronously.
    ///
    /// Decodes the stored token locally (no server round-trip) and
    /// transitions to `Authenticated` or `Unauthenticated`. Calling this
    /// again after the state has resolved is a logged no-op.
    pub fn initialize(&self) -> SessionSnapshot {
        {
            let state = read_lock(&self.inner.state);
            if *state != SessionState::Initializing {
                warn!("Session already initialized - ignoring repeat call");
                return SessionSnapshot::from_state(&state);
            }
        }

        let resolved = match self.inner.credentials.get() {
            Some(credential) if !token::is_expired(credential.as_str()) => {
                match token::decode(credential.as_str()) {
                    Ok(claims) => {
                        info!("Session restored for subject {}", claims.sub);
                        SessionState::Authenticated(claims.identity())
                    }
                    Err(e) => {
                        warn!("Stored token undecodable ({}) - starting signed out", e);
                        SessionState::Unauthenticated
                    }
                }
            }
            Some(_) => {
                info!("Stored token expired - starting signed out");
                SessionState::Unauthenticated
            }
            None => {
                info!("No stored credential - starting signed out");
                SessionState::Unauthenticated
            }
        };

        self.transition(resolved)
    }

    /// `POST /auth/signin`; on success stores the credential and transitions
    /// to `Authenticated` from any state.
    pub async fn sign_in(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<UserIdentity, SessionError> {
        let request = SigninRequest {
            email: email.into(),
            password: password.into(),
        };
        let response: AuthResponse = self
            .inner
            .api
            .post_anonymous(SIGNIN_ENDPOINT, &request)
            .await?;

        self.adopt(response)
    }

    /// `POST /auth/signup`; on success stores the credential and transitions
    /// to `Authenticated` from any state.
    pub async fn sign_up(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<UserIdentity, SessionError> {
        let request = SignupRequest {
            email: email.into(),
            password: password.into(),
        };
        let response: AuthResponse = self
            .inner
            .api
            .post_anonymous(SIGNUP_ENDPOINT, &request)
            .await?;

        self.adopt(response)
    }

    /// Clear the credential, transition to `Unauthenticated`, and request
    /// navigation to sign-in.
    pub fn sign_out(&self) -> Result<(), SessionError> {
        self.inner.credentials.clear()?;
        self.transition(SessionState::Unauthenticated);
        info!("Signed out");
        self.inner.api.redirect().request_signin();
        Ok(())
    }

    /// Subscribe to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        read_lock(&self.inner.state).clone()
    }

    /// Store the credential from an auth response and go `Authenticated`.
    fn adopt(&self, response: AuthResponse) -> Result<UserIdentity, SessionError> {
        let user = response.user.clone();
        self.inner
            .credentials
            .set(RedactedToken::new(response.access_token))?;

        info!("Signed in as {}", user.id);
        self.transition(SessionState::Authenticated(user.clone()));
        // A fresh session makes the next expiry a new redirect-worthy event.
        self.inner.api.redirect().rearm();

        Ok(user)
    }

    fn transition(&self, next: SessionState) -> SessionSnapshot {
        let snapshot = {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *state = next;
            SessionSnapshot::from_state(&state)
        };
        // Ignore the error: no subscribers just means no shell is attached yet.
        let _ = self.inner.snapshot_tx.send(snapshot.clone());
        snapshot
    }
}

fn read_lock(state: &RwLock<SessionState>) -> std::sync::RwLockReadGuard<'_, SessionState> {
    state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}
