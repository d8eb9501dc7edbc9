//! The unauthenticated escape hatch.
//!
//! When any authenticated call learns the session is dead (locally-expired
//! token or a server 401), this is the one place that reacts: remember where
//! the user was, signal navigation to the sign-in entry point, and do
//! nothing else. Credential state is cleared only by an explicit sign-out.
//!
//! The hatch fires at most once per redirect-worthy event. Two calls racing
//! into a 401 produce one navigation signal; it re-arms when the session
//! controller completes a sign-in or the consumer calls [`SigninRedirect::rearm`]
//! after navigating.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::watch;

/// Route of the sign-in entry page.
pub const SIGNIN_PATH: &str = "/signin";

/// Route of the sign-up entry page.
pub const SIGNUP_PATH: &str = "/signup";

/// Whether a path is one of the auth entry pages.
///
/// Auth entry pages are never remembered as a return location - bouncing a
/// user "back" to /signin after they sign in would be a loop.
pub fn is_auth_entry(path: &str) -> bool {
    path == SIGNIN_PATH || path == SIGNUP_PATH
}

/// What the shell should do about authentication, published on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSignal {
    /// Nothing pending.
    Idle,
    /// Navigate to the sign-in entry point now.
    SigninRequired,
}

/// Shared handle to the escape hatch.
///
/// Cheap to clone; all clones share the pending flag, the remembered return
/// location, and the signal channel.
#[derive(Clone)]
pub struct SigninRedirect {
    inner: Arc<RedirectInner>,
}

struct RedirectInner {
    /// True between a fire and the next re-arm.
    pending: AtomicBool,
    /// Where the user currently is, as last reported by the shell.
    current_location: Mutex<Option<String>>,
    /// Where to send the user back after the next successful sign-in.
    return_to: Mutex<Option<String>>,
    signal_tx: watch::Sender<NavigationSignal>,
}

impl SigninRedirect {
    pub fn new() -> Self {
        let (signal_tx, _) = watch::channel(NavigationSignal::Idle);
        Self {
            inner: Arc::new(RedirectInner {
                pending: AtomicBool::new(false),
                current_location: Mutex::new(None),
                return_to: Mutex::new(None),
                signal_tx,
            }),
        }
    }

    /// Subscribe to navigation signals.
    pub fn subscribe(&self) -> watch::Receiver<NavigationSignal> {
        self.inner.signal_tx.subscribe()
    }

    /// Shell callback: the user is now at `path`.
    pub fn set_location(&self, path: impl Into<String>) {
        let mut current = lock(&self.inner.current_location);
        *current = Some(path.into());
    }

    /// Fire the escape hatch.
    ///
    /// Remembers the current location (unless it is an auth entry page) and
    /// signals navigation to sign-in. Returns true if this call actually
    /// fired; false if a redirect was already pending (the signal is not
    /// repeated, so concurrent failures cannot loop).
    pub fn trigger(&self) -> bool {
        if self.inner.pending.swap(true, Ordering::SeqCst) {
            debug!("Signin redirect already pending - not firing again");
            return false;
        }

        let current = lock(&self.inner.current_location).clone();
        if let Some(path) = current.filter(|p| !is_auth_entry(p)) {
            let mut return_to = lock(&self.inner.return_to);
            *return_to = Some(path);
        }

        warn!("Session invalid - redirecting to sign-in");
        // Ignore the error: no subscribers just means no shell is attached yet.
        let _ = self.inner.signal_tx.send(NavigationSignal::SigninRequired);
        true
    }

    /// Re-arm the hatch so the next redirect-worthy event can fire.
    ///
    /// Called by the session controller on successful sign-in/sign-up, and
    /// by the shell once it has navigated to sign-in.
    pub fn rearm(&self) {
        if self.inner.pending.swap(false, Ordering::SeqCst) {
            debug!("Signin redirect re-armed");
        }
        let _ = self.inner.signal_tx.send(NavigationSignal::Idle);
    }

    /// Signal navigation to sign-in without remembering a return location.
    ///
    /// Used by explicit sign-out: the user chose to leave, so there is
    /// nowhere to send them "back" to afterwards.
    pub fn request_signin(&self) {
        self.inner.pending.store(true, Ordering::SeqCst);
        let mut return_to = lock(&self.inner.return_to);
        *return_to = None;
        drop(return_to);
        let _ = self.inner.signal_tx.send(NavigationSignal::SigninRequired);
    }

    /// Consume the remembered return location, if any.
    ///
    /// The shell calls this after a successful sign-in to put the user back
    /// where the session died.
    pub fn take_return_location(&self) -> Option<String> {
        lock(&self.inner.return_to).take()
    }

    /// Whether a redirect has fired and not yet been re-armed.
    pub fn is_pending(&self) -> bool {
        self.inner.pending.load(Ordering::SeqCst)
    }
}

impl Default for SigninRedirect {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
