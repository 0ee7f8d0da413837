//! Authentication Module
//!
//! Owns the session token: the only code that reads or writes the
//! persisted slot.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::storage::{SecureStorage, StorageError};

/// Storage key holding the persisted session
pub const SESSION_KEY: &str = "token";

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub email: String,
}

/// Login input; never persisted
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Returned when a flow needs a session and none is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no active session, redirect to login")]
pub struct LoginRequired;

/// Manages authentication state
pub struct AuthManager {
    session: Mutex<Option<Session>>,
    storage: SecureStorage,
}

impl AuthManager {
    /// Create an auth manager, restoring any session persisted in `storage`
    pub fn new(storage: SecureStorage) -> Self {
        let restored = if !storage.exists(SESSION_KEY) {
            debug!("No stored session found");
            None
        } else {
            Self::restore(&storage)
        };

        Self {
            session: Mutex::new(restored),
            storage,
        }
    }

    fn restore(storage: &SecureStorage) -> Option<Session> {
        match storage.load::<Session>(SESSION_KEY) {
            Ok(session) => {
                info!("Restored stored session for: {}", session.email);
                Some(session)
            }
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                warn!("Discarding unreadable stored session: {}", e);
                let _ = storage.delete(SESSION_KEY);
                None
            }
        }
    }

    /// Persist and set the current session
    ///
    /// Nothing changes in memory when the session cannot be saved.
    pub fn set_session(&self, session: Session) -> Result<(), StorageError> {
        self.storage.save(SESSION_KEY, &session).map_err(|e| {
            error!("Failed to save session: {}", e);
            e
        })?;

        info!("Session set for user: {}", session.email);
        if let Ok(mut slot) = self.session.lock() {
            *slot = Some(session);
        }
        Ok(())
    }

    /// Get the current session, if any
    pub fn get_session(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|slot| slot.clone())
    }

    /// Gate for authenticated flows
    pub fn require_session(&self) -> Result<Session, LoginRequired> {
        self.get_session().ok_or_else(|| {
            debug!("No session, login required");
            LoginRequired
        })
    }

    /// Check if currently authenticated
    pub fn is_authenticated(&self) -> bool {
        self.get_session().is_some()
    }

    /// Clear the current session and its persisted copy
    pub fn clear_session(&self) {
        if let Ok(mut slot) = self.session.lock() {
            *slot = None;
        }

        if let Err(e) = self.storage.delete(SESSION_KEY) {
            error!("Failed to delete stored session: {}", e);
        }

        info!("Session cleared");
    }
}
