//! User sessions
//!
//! A session is created when a username/password pair matches the
//! credential directory and is valid for a fixed window (24 hours by
//! default) from the login instant. Sessions live in a `KeyValueStore`
//! under [`SESSION_KEY`]; the last username typed is echoed under
//! [`LAST_USERNAME_KEY`] so a login form can be prefilled.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{read_json, write_json, Clock, KeyValueStore};

use crate::credentials::{normalize_username, Credential, CredentialDirectory};
use crate::error::PartyError;
use crate::role::ActorRole;

/// Store key of the active session
pub const SESSION_KEY: &str = "currentUser";

/// Store key of the last username used to sign in
pub const LAST_USERNAME_KEY: &str = "lastUsername";

/// Default session lifetime
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub username: String,
    pub role: ActorRole,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub login_at: DateTime<Utc>,
}

impl UserSession {
    /// Opens a session for a directory entry
    pub fn from_credential(credential: &Credential, login_at: DateTime<Utc>) -> Self {
        Self {
            username: normalize_username(&credential.username),
            role: credential.role,
            display_name: credential.display_name.clone(),
            email: credential.email.clone(),
            phone: credential.phone.clone(),
            login_at,
        }
    }

    /// The first instant at which the session is no longer valid
    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.login_at + ttl
    }

    /// True while `now - login_at < ttl`
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.login_at < ttl
    }
}

/// Login, logout and session checks over an injected store and clock
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn KeyValueStore>,
    directory: Arc<CredentialDirectory>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        directory: Arc<CredentialDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            clock,
            ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Overrides the session lifetime
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Checks the credentials and opens a session
    ///
    /// On a mismatch any existing session is removed.
    ///
    /// # Errors
    ///
    /// Returns `PartyError::InvalidCredentials` if no entry matches, or
    /// `PartyError::Store` if the store fails
    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession, PartyError> {
        let normalized = normalize_username(username);
        write_json(self.store.as_ref(), LAST_USERNAME_KEY, &normalized).await?;

        match self.open_session(&normalized, password).await {
            Err(PartyError::InvalidCredentials) => {
                self.store.remove(SESSION_KEY).await?;
                Err(PartyError::InvalidCredentials)
            }
            outcome => outcome,
        }
    }

    /// Checks the credentials and opens a session, touching nothing on a mismatch
    ///
    /// For stores shared by several callers, where a failed attempt must not
    /// end a session the caller does not own.
    ///
    /// # Errors
    ///
    /// Returns `PartyError::InvalidCredentials` if no entry matches, or
    /// `PartyError::Store` if the store fails
    pub async fn open_session(&self, username: &str, password: &str) -> Result<UserSession, PartyError> {
        let normalized = normalize_username(username);
        let Some(credential) = self.directory.authenticate(&normalized, password) else {
            info!(username = %normalized, "Login rejected");
            return Err(PartyError::InvalidCredentials);
        };

        let session = UserSession::from_credential(credential, self.clock.now());
        write_json(self.store.as_ref(), SESSION_KEY, &session).await?;

        info!(username = %session.username, role = %session.role, "User logged in");
        Ok(session)
    }

    /// Removes the session; returns whether one existed
    pub async fn logout(&self) -> Result<bool, PartyError> {
        let removed = self.store.remove(SESSION_KEY).await?;
        if removed {
            info!("User logged out");
        }
        Ok(removed)
    }

    /// Returns the session if it exists and is still inside its window
    ///
    /// An expired session is removed from the store.
    pub async fn current_session(&self) -> Result<Option<UserSession>, PartyError> {
        let Some(session) = read_json::<UserSession>(self.store.as_ref(), SESSION_KEY).await? else {
            return Ok(None);
        };

        if session.is_valid_at(self.clock.now(), self.ttl) {
            return Ok(Some(session));
        }

        debug!(username = %session.username, "Session expired");
        self.store.remove(SESSION_KEY).await?;
        Ok(None)
    }

    pub async fn is_logged_in(&self) -> Result<bool, PartyError> {
        Ok(self.current_session().await?.is_some())
    }

    /// Returns the session or `PartyError::NotLoggedIn`
    pub async fn require_session(&self) -> Result<UserSession, PartyError> {
        self.current_session().await?.ok_or(PartyError::NotLoggedIn)
    }

    /// The username echoed by the last login attempt
    pub async fn last_username(&self) -> Result<Option<String>, PartyError> {
        Ok(read_json(self.store.as_ref(), LAST_USERNAME_KEY).await?)
    }
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("ttl", &self.ttl)
            .field("directory_entries", &self.directory.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_session_window_is_half_open() {
        let login_at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let directory = CredentialDirectory::demo();
        let session = UserSession::from_credential(directory.find("individual").unwrap(), login_at);
        let ttl = Duration::hours(24);

        assert!(session.is_valid_at(login_at, ttl));
        assert!(session.is_valid_at(login_at + Duration::hours(24) - Duration::seconds(1), ttl));
        assert!(!session.is_valid_at(login_at + Duration::hours(24), ttl));
        assert_eq!(session.expires_at(ttl), login_at + Duration::hours(24));
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let login_at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let directory = CredentialDirectory::demo();
        let session = UserSession::from_credential(directory.find("intermediary").unwrap(), login_at);
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["displayName"], "Kamau Insurance Brokers");
        assert_eq!(json["role"], "intermediary");
        assert!(json["loginAt"].as_str().unwrap().starts_with("2026-10-18T09:00:00"));
    }
}
