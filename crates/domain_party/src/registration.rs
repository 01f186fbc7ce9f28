//! Account registration
//!
//! Validates the sign-up form (KYC fields for the chosen account type plus
//! username, password, confirmation and terms) and keeps a snapshot of the
//! last accepted submission under [`REGISTRATION_KEY`]. Passwords are never
//! part of the snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{
    read_json, write_json, Clock, FieldRules, FormValues, KeyValueStore, Rule, Timezone,
};

use crate::credentials::normalize_username;
use crate::error::PartyError;
use crate::kyc::{validators_for, ACCOUNT_TYPE_FIELD};
use crate::role::AccountType;

/// Store key of the last registration snapshot
pub const REGISTRATION_KEY: &str = "registrationData";

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

const SECRET_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Rules for the account-type selector alone
fn discriminator_rules() -> FieldRules {
    FieldRules::new().field(
        ACCOUNT_TYPE_FIELD,
        [
            Rule::Required,
            Rule::OneOf(AccountType::ALL.iter().map(|t| t.as_str().to_string()).collect()),
        ],
    )
}

/// The full registration rule set for an account type
pub fn registration_rules(account_type: AccountType) -> FieldRules {
    discriminator_rules()
        .merge(validators_for(account_type))
        .field("username", [Rule::Required, Rule::MinLength(3)])
        .field("password", [Rule::Required, Rule::MinLength(MIN_PASSWORD_LENGTH)])
        .field(
            "confirm_password",
            [Rule::Required, Rule::SameAs("password".to_string())],
        )
        .field("accept_terms", [Rule::Accepted])
}

/// The stored record of an accepted registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSnapshot {
    pub username: String,
    pub account_type: AccountType,
    pub values: FormValues,
    pub submitted_at: DateTime<Utc>,
}

/// Validates and records registrations
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    timezone: Timezone,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, timezone: Timezone) -> Self {
        Self {
            store,
            clock,
            timezone,
        }
    }

    /// Validates the form and stores the snapshot
    ///
    /// # Errors
    ///
    /// Returns `PartyError::Validation` with every failing field if the form
    /// is rejected
    pub async fn register(&self, form: &FormValues) -> Result<RegistrationSnapshot, PartyError> {
        let today = self.timezone.today(self.clock.as_ref());

        let account_type = match form.get(ACCOUNT_TYPE_FIELD).map(str::parse::<AccountType>) {
            Some(Ok(account_type)) => account_type,
            _ => {
                let report = discriminator_rules().validate(form, today);
                return Err(PartyError::Validation(report));
            }
        };

        let rules = registration_rules(account_type);
        rules.validate(form, today).into_result()?;

        let kept: Vec<&str> = rules
            .field_names()
            .filter(|f| !SECRET_FIELDS.contains(f))
            .collect();
        let snapshot = RegistrationSnapshot {
            username: normalize_username(form.raw("username")),
            account_type,
            values: form.select(kept),
            submitted_at: self.clock.now(),
        };

        write_json(self.store.as_ref(), REGISTRATION_KEY, &snapshot).await?;
        info!(username = %snapshot.username, account_type = %account_type, "Registration recorded");
        Ok(snapshot)
    }

    /// The last accepted registration, if any
    pub async fn last_registration(&self) -> Result<Option<RegistrationSnapshot>, PartyError> {
        Ok(read_json(self.store.as_ref(), REGISTRATION_KEY).await?)
    }
}
