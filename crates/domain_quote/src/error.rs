//! Quote domain errors
//!
//! This module defines all error types that can occur while pricing,
//! collecting and storing quotes.

use core_kernel::{CoreError, PortError, QuoteId, ValidationReport};
use thiserror::Error;

use crate::wizard::Overlay;

/// Errors that can occur in the quote domain
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Sum insured must be strictly positive
    #[error("Invalid sum insured: {0}")]
    InvalidSumInsured(String),

    /// A form or sub-form failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationReport),

    /// The main form is blocked by an open overlay
    #[error("The {0} form must be submitted or closed first")]
    OverlayOpen(Overlay),

    /// An overlay operation was attempted with no overlay open
    #[error("No overlay is open")]
    NoOverlayOpen,

    /// A validated field could not be converted to its typed form
    #[error("Invalid value for {field}: {message}")]
    InvalidField {
        field: String,
        message: String,
    },

    /// The wizard is not in a state that allows the operation
    #[error("Invalid wizard state: {0}")]
    InvalidState(String),

    /// A quote with the same id is already pending
    #[error("Duplicate quote: {0}")]
    DuplicateQuote(QuoteId),

    /// No pending quote has the given id
    #[error("Quote not found: {0}")]
    QuoteNotFound(QuoteId),

    /// Rate table or validation policy is misconfigured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backing store failed
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl QuoteError {
    /// Creates an InvalidField error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        QuoteError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the validation report if this is a validation failure
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            QuoteError::Validation(report) => Some(report),
            _ => None,
        }
    }
}

impl From<ValidationReport> for QuoteError {
    fn from(report: ValidationReport) -> Self {
        QuoteError::Validation(report)
    }
}

impl From<CoreError> for QuoteError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Port(port) => QuoteError::Store(port),
            other => QuoteError::Configuration(other.to_string()),
        }
    }
}
