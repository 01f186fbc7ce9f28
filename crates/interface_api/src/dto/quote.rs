//! Quote, product and premium DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{FieldError, FormValues};
use domain_quote::{CoverProduct, InsuranceType, PendingQuote, ReferralRequest};

/// A complete quote form, submitted in one go
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub insurance_type: InsuranceType,
    pub values: FormValues,
    /// Overlay sub-form values, used if the form opens an overlay
    #[serde(default)]
    pub referral: Option<FormValues>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteRequest {
    pub values: FormValues,
    #[serde(default)]
    pub referral: Option<FormValues>,
}

/// Result of submitting a quote form
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuoteOutcome {
    Quote(PendingQuote),
    Referral(ReferralRequest),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStepRequest {
    pub insurance_type: InsuranceType,
    /// Wizard step number, 1 to 4
    pub step: u8,
    #[serde(default)]
    pub values: FormValues,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateStepResponse {
    pub valid: bool,
    pub step: u8,
    pub title: String,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub code: String,
    pub name: String,
    pub rate: Decimal,
}

impl From<&CoverProduct> for ProductResponse {
    fn from(product: &CoverProduct) -> Self {
        Self {
            code: product.code.clone(),
            name: product.name.clone(),
            rate: product.rate.as_decimal(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PremiumRequest {
    pub sum_insured: Decimal,
    #[validate(length(min = 1, message = "Product is required"))]
    pub product: String,
}
