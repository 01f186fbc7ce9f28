//! Actor roles and account types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PartyError;

/// Who is asking for the quote
///
/// Intermediaries earn commission on the premiums they place and must name
/// the client they are quoting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    #[default]
    Individual,
    Intermediary,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Individual => "individual",
            ActorRole::Intermediary => "intermediary",
        }
    }

    pub fn is_intermediary(&self) -> bool {
        matches!(self, ActorRole::Intermediary)
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" => Ok(ActorRole::Individual),
            "intermediary" => Ok(ActorRole::Intermediary),
            other => Err(PartyError::invalid(format!("unknown role: {}", other))),
        }
    }
}

/// The KYC discriminator chosen on the registration and KYC forms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Individual,
    Corporate,
    Intermediary,
}

impl AccountType {
    /// Every account type, in display order
    pub const ALL: [AccountType; 3] = [
        AccountType::Individual,
        AccountType::Corporate,
        AccountType::Intermediary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Individual => "individual",
            AccountType::Corporate => "corporate",
            AccountType::Intermediary => "intermediary",
        }
    }

    /// The role an account of this type acts in
    pub fn actor_role(&self) -> ActorRole {
        match self {
            AccountType::Individual | AccountType::Corporate => ActorRole::Individual,
            AccountType::Intermediary => ActorRole::Intermediary,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AccountType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PartyError::invalid(format!("unknown account type: {}", wanted)))
    }
}

impl From<AccountType> for ActorRole {
    fn from(account_type: AccountType) -> Self {
        account_type.actor_role()
    }
}
