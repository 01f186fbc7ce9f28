//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token, then requires the token owner's stored
/// session to still be valid. The claims are added to the request
/// extensions for handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("Missing or invalid Authorization header");
        return ApiError::Unauthorized("Missing bearer token".to_string()).into_response();
    };

    let claims = match crate::auth::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(error = %e, "Token validation failed");
            return ApiError::Unauthorized(e.to_string()).into_response();
        }
    };

    match state.sessions(&claims.sub).is_logged_in().await {
        Ok(true) => {}
        Ok(false) => {
            warn!(user = %claims.sub, "Token presented without a live session");
            return ApiError::Unauthorized("Session has ended".to_string()).into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Audit logging middleware
///
/// Logs every API request with its outcome and duration
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
