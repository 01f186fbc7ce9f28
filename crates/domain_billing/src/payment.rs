//! Payment contract
//!
//! The request and result shapes exchanged with a payment modal. Field
//! names on the wire are camelCase.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, Pattern};

use crate::error::PaymentError;

/// Payment rail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// M-PESA STK push to the customer's phone
    Stk,
    /// M-PESA paybill, paid by the customer from their phone
    Paybill,
    /// Debit or credit card
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Stk, PaymentMethod::Paybill, PaymentMethod::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Stk => "stk",
            PaymentMethod::Paybill => "paybill",
            PaymentMethod::Card => "card",
        }
    }

    /// True if the method needs the payer's phone number
    pub fn requires_phone(&self) -> bool {
        matches!(self, PaymentMethod::Stk)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PaymentError::InvalidRequest(format!("unknown payment method {}", wanted)))
    }
}

/// What the payer is asked to pay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub reference: String,
    pub description: String,
}

impl PaymentRequest {
    pub fn new(amount: Money, reference: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            amount: amount.amount(),
            currency: amount.currency(),
            phone_number: None,
            reference: reference.into(),
            description: description.into(),
        }
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency)
    }

    /// Checks the request can be sent with the given method
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidRequest` for a non-positive amount, a
    /// blank reference, or a missing or malformed phone number on STK push
    pub fn validate(&self, method: PaymentMethod) -> Result<(), PaymentError> {
        if self.amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidRequest(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        if self.reference.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("reference is required".to_string()));
        }
        if method.requires_phone() {
            let phone = Pattern::kenyan_phone();
            match self.phone_number.as_deref().map(str::trim) {
                Some(number) if phone.is_match(number) => {}
                Some(number) => {
                    return Err(PaymentError::InvalidRequest(format!(
                        "phone number {} {}",
                        number,
                        phone.hint()
                    )))
                }
                None => {
                    return Err(PaymentError::InvalidRequest(
                        "phone number is required for STK push".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

/// What the payment modal returns when it completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub success: bool,
    pub method: PaymentMethod,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpesa_receipt: Option<String>,
}
