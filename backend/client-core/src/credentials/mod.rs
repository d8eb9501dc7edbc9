//! Durable storage for the session credential.
//!
//! The store is the sole owner of persisted session material: one bearer
//! token per device, written on sign-in/sign-up success, removed on
//! sign-out. It never navigates and never judges the token - that is the
//! session controller's and token inspector's business.
//!
//! # Security
//! - The token lives in a [`RedactedToken`] in memory (zeroized on drop,
//!   redacted Debug)
//! - Only `credentials.json` ever sees the raw value

pub mod paths;

pub use paths::{TasklinePaths, detect_taskline_paths};

use crate::error::credentials::CredentialsError;

use common::RedactedToken;

use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use serde::Deserialize;

/// On-disk shape of the credential file.
#[derive(Deserialize)]
struct StoredCredential {
    access_token: String,
}

/// Device-local credential store backed by `credentials.json`.
///
/// Cheap to clone; all clones share the same cached token and file.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    paths: TasklinePaths,
    cached: RwLock<Option<RedactedToken>>,
}

impl CredentialStore {
    /// Open the store at the detected platform location.
    pub fn open() -> Result<Self, CredentialsError> {
        Ok(Self::with_paths(detect_taskline_paths()?))
    }

    /// Open the store at explicit paths.
    pub fn with_paths(paths: TasklinePaths) -> Self {
        let cached = RwLock::new(read_credential_file(&paths));
        debug!(
            "Credential store opened at {:?} (via {})",
            paths.credential_file, paths.source
        );
        Self {
            inner: Arc::new(StoreInner { paths, cached }),
        }
    }

    /// The current credential, if one is stored.
    pub fn get(&self) -> Option<RedactedToken> {
        self.inner
            .cached
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Persist a new credential, replacing any previous one.
    ///
    /// Idempotent; side-effects only the store. Uses temp file + rename for
    /// atomicity (no corruption on crash).
    pub fn set(&self, token: RedactedToken) -> Result<(), CredentialsError> {
        let dir = &self.inner.paths.data_dir;
        std::fs::create_dir_all(dir).map_err(|e| CredentialsError::write(dir.clone(), e))?;

        // RedactedToken refuses blanket serialization; the raw value is
        // extracted explicitly here and nowhere else.
        let json = serde_json::json!({ "access_token": token.as_str() });
        let contents = serde_json::to_string_pretty(&json)
            .map_err(|e| CredentialsError::serialize(e.to_string()))?;

        let file_path = &self.inner.paths.credential_file;
        let temp_path = file_path.with_extension("json.tmp");

        std::fs::write(&temp_path, contents)
            .map_err(|e| CredentialsError::write(temp_path.clone(), e))?;
        std::fs::rename(&temp_path, file_path)
            .map_err(|e| CredentialsError::write(file_path.clone(), e))?;

        let mut cached = self
            .inner
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cached = Some(token);

        info!("Credential stored ({} chars)", cached.as_ref().map_or(0, RedactedToken::len));
        Ok(())
    }

    /// Remove the stored credential.
    ///
    /// Idempotent: clearing an empty store succeeds.
    pub fn clear(&self) -> Result<(), CredentialsError> {
        let file_path = &self.inner.paths.credential_file;
        match std::fs::remove_file(file_path) {
            Ok(()) => info!("Credential cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Credential clear requested but no credential was stored");
            }
            Err(e) => return Err(CredentialsError::write(file_path.clone(), e)),
        }

        let mut cached = self
            .inner
            .cached
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cached = None;

        Ok(())
    }
}

/// Read the credential file, treating anything unreadable as absent.
///
/// A corrupt file must never brick startup - signing in again rewrites it.
fn read_credential_file(paths: &TasklinePaths) -> Option<RedactedToken> {
    let contents = match std::fs::read_to_string(&paths.credential_file) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(
                "Failed to read credential file {:?}: {} - treating as signed out",
                paths.credential_file, e
            );
            return None;
        }
    };

    match serde_json::from_str::<StoredCredential>(&contents) {
        Ok(stored) if !stored.access_token.is_empty() => {
            Some(RedactedToken::new(stored.access_token))
        }
        Ok(_) => {
            warn!("Credential file held an empty token - treating as signed out");
            None
        }
        Err(e) => {
            warn!(
                "Failed to parse credential file {:?}: {} - treating as signed out",
                paths.credential_file, e
            );
            None
        }
    }
}
