//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use core_kernel::ValidationReport;
use domain_billing::{BillingError, PaymentError};
use domain_party::PartyError;
use domain_quote::{Overlay, QuoteError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The form opened an overlay that needs a referral instead of a quote
    #[error("The {0} form must be completed before quoting")]
    ReferralRequired(Overlay),

    #[error("Validation failed")]
    Validation(ValidationReport),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Payment timed out: {0}")]
    PaymentTimeout(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::ReferralRequired(_) => (StatusCode::CONFLICT, "referral_required"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Unprocessable(_) => (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable"),
            ApiError::PaymentDeclined(_) => (StatusCode::PAYMENT_REQUIRED, "payment_declined"),
            ApiError::PaymentTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "payment_timeout"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let details = match &self {
            ApiError::Validation(report) => serde_json::to_value(report.errors()).ok(),
            ApiError::ReferralRequired(overlay) => Some(serde_json::json!({ "overlay": overlay })),
            _ => None,
        };

        let message = match &self {
            ApiError::Validation(report) => report.to_string(),
            ApiError::NotFound(m)
            | ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Conflict(m)
            | ApiError::Unprocessable(m)
            | ApiError::PaymentDeclined(m)
            | ApiError::PaymentTimeout(m)
            | ApiError::Internal(m) => m.clone(),
            ApiError::ReferralRequired(_) => self.to_string(),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::InvalidCredentials | PartyError::NotLoggedIn => {
                ApiError::Unauthorized(err.to_string())
            }
            PartyError::Validation(report) => ApiError::Validation(report),
            PartyError::InvalidData(message) => ApiError::BadRequest(message),
            PartyError::DuplicateUsername(_) => ApiError::Conflict(err.to_string()),
            PartyError::Store(e) => {
                error!(error = %e, "Party store failure");
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::Validation(report) => ApiError::Validation(report),
            QuoteError::OverlayOpen(overlay) => ApiError::ReferralRequired(overlay),
            QuoteError::InvalidSumInsured(_) | QuoteError::InvalidField { .. } => {
                ApiError::Unprocessable(err.to_string())
            }
            QuoteError::NoOverlayOpen | QuoteError::InvalidState(_) | QuoteError::DuplicateQuote(_) => {
                ApiError::Conflict(err.to_string())
            }
            QuoteError::QuoteNotFound(_) => ApiError::NotFound(err.to_string()),
            QuoteError::Store(e) if e.is_not_found() => ApiError::NotFound(e.to_string()),
            QuoteError::Store(_) | QuoteError::Configuration(_) => {
                error!(error = %err, "Quote service failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Timeout(_) => ApiError::PaymentTimeout(err.to_string()),
            PaymentError::Declined(_) => ApiError::PaymentDeclined(err.to_string()),
            PaymentError::InvalidRequest(_) => ApiError::Unprocessable(err.to_string()),
            PaymentError::Gateway(_) => {
                error!(error = %err, "Payment gateway failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Payment(e) => e.into(),
            BillingError::Quote(e) => e.into(),
            BillingError::NothingDue(_) => ApiError::Conflict(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid ({})", field, e.code),
                })
            })
            .collect();
        messages.sort();
        ApiError::Unprocessable(messages.join("; "))
    }
}
