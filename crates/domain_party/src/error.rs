//! Party domain errors
//!
//! This module defines the error types that can occur in the party domain:
//! credential failures, form validation failures and store failures.

use core_kernel::{PortError, ValidationReport};
use thiserror::Error;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Username and password did not match any directory entry
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No valid session exists
    #[error("Not logged in")]
    NotLoggedIn,

    /// A submitted form failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// A value could not be interpreted
    #[error("Invalid party data: {0}")]
    InvalidData(String),

    /// Two directory entries share a username
    #[error("Duplicate username: {0}")]
    DuplicateUsername(String),

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl PartyError {
    /// Creates an InvalidData error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidData(message.into())
    }

    /// Returns the validation report if this is a validation failure
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            PartyError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl From<ValidationReport> for PartyError {
    fn from(report: ValidationReport) -> Self {
        PartyError::Validation(report)
    }
}
