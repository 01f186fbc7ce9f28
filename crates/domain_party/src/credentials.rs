//! Credential directory
//!
//! A small allow-list of portal users loaded from configuration. Lookups
//! are pure: the directory never changes once built.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PartyError;
use crate::role::ActorRole;

/// Canonical form of a username: trimmed and lowercased
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// A directory entry
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub role: ActorRole,
    pub display_name: String,
    pub email: String,
    pub phone: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// The set of users allowed to sign in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialDirectory {
    entries: Vec<Credential>,
}

impl CredentialDirectory {
    /// Builds a directory, rejecting usernames that collide after normalization
    pub fn new(entries: Vec<Credential>) -> Result<Self, PartyError> {
        let mut directory = Self::default();
        for entry in entries {
            directory.add(entry)?;
        }
        Ok(directory)
    }

    /// The two demonstration accounts the portal ships with
    pub fn demo() -> Self {
        Self {
            entries: vec![
                Credential {
                    username: "individual".to_string(),
                    password: "individual123".to_string(),
                    role: ActorRole::Individual,
                    display_name: "Jane Wanjiku".to_string(),
                    email: "jane.wanjiku@example.co.ke".to_string(),
                    phone: "0712345678".to_string(),
                },
                Credential {
                    username: "intermediary".to_string(),
                    password: "intermediary123".to_string(),
                    role: ActorRole::Intermediary,
                    display_name: "Kamau Insurance Brokers".to_string(),
                    email: "desk@kamaubrokers.co.ke".to_string(),
                    phone: "0722000111".to_string(),
                },
            ],
        }
    }

    /// Adds an entry
    ///
    /// # Errors
    ///
    /// Returns `PartyError::DuplicateUsername` if the normalized username is taken
    pub fn add(&mut self, entry: Credential) -> Result<(), PartyError> {
        let wanted = normalize_username(&entry.username);
        if self.find(&wanted).is_some() {
            return Err(PartyError::DuplicateUsername(wanted));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Looks up an entry by username, ignoring case and surrounding whitespace
    pub fn find(&self, username: &str) -> Option<&Credential> {
        let wanted = normalize_username(username);
        self.entries
            .iter()
            .find(|c| normalize_username(&c.username) == wanted)
    }

    /// Returns the entry whose username and password both match
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Credential> {
        self.find(username).filter(|c| c.password == password)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
