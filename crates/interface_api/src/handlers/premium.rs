//! Premium calculation handler

use axum::{extract::State, Extension, Json};
use validator::Validate;

use domain_quote::PremiumBreakdown;

use crate::auth::Claims;
use crate::dto::quote::PremiumRequest;
use crate::{error::ApiError, AppState};

/// Prices a sum insured for the caller's role
pub async fn calculate_premium(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<PremiumRequest>,
) -> Result<Json<PremiumBreakdown>, ApiError> {
    request.validate()?;

    let premium = state
        .calculator
        .quote(request.sum_insured, &request.product, claims.role)?;
    Ok(Json(premium.rounded()))
}
