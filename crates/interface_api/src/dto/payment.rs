//! Payment DTOs

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayQuoteRequest {
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub method: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}
