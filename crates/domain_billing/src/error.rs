//! Billing domain errors

use std::time::Duration;

use core_kernel::QuoteId;
use domain_quote::QuoteError;
use thiserror::Error;

/// Ways a payment run can fail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// The gateway did not answer within the bound
    #[error("Payment timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The gateway rejected the payment
    #[error("Payment declined: {0}")]
    Declined(String),

    /// The request was rejected before reaching the gateway
    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    /// The gateway failed for another reason
    #[error("Gateway error: {0}")]
    Gateway(String),
}

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// The payment run failed
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Loading or removing the pending quote failed
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// The quote carries no premium to charge
    #[error("Nothing to pay for quote {0}")]
    NothingDue(QuoteId),
}
