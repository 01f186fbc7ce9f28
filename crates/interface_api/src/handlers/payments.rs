//! Payment handler

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use domain_billing::{CancelSignal, PaymentMethod, PaymentResult};

use crate::auth::Claims;
use crate::dto::payment::PayQuoteRequest;
use crate::handlers::quotes::parse_quote_id;
use crate::{error::ApiError, AppState};

/// Pays for one of the caller's pending quotes
///
/// The request waits for the gateway up to the configured bound. A paid
/// quote leaves the pending list.
pub async fn pay_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(request): Json<PayQuoteRequest>,
) -> Result<Json<PaymentResult>, ApiError> {
    request.validate()?;
    let id = parse_quote_id(&id)?;
    let method: PaymentMethod = request.method.parse()?;

    let result = state
        .settlement(&claims.sub)
        .settle(id, method, request.phone_number, CancelSignal::never())
        .await?
        .ok_or_else(|| ApiError::Conflict("Payment was cancelled".to_string()))?;

    info!(user = %claims.sub, quote_id = %id, %method, "Quote paid over API");
    Ok(Json(result))
}
