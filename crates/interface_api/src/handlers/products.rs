//! Product catalogue handler

use axum::{extract::State, Json};

use crate::dto::quote::ProductResponse;
use crate::AppState;

/// Lists the cover products with their rates
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductResponse>> {
    Json(
        state
            .calculator
            .rates
            .products()
            .iter()
            .map(ProductResponse::from)
            .collect(),
    )
}
