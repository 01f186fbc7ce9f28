//! Login, registration and session handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use validator::Validate;

use core_kernel::FormValues;
use domain_party::RegistrationSnapshot;

use crate::auth::{create_token, Claims};
use crate::dto::auth::*;
use crate::{error::ApiError, AppState};

/// Checks credentials and opens a session
///
/// The store is scoped by the attempted username, so a rejected attempt
/// leaves that user's live session alone.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    request.validate()?;

    let sessions = state.sessions(&request.username);
    let session = sessions.open_session(&request.username, &request.password).await?;
    let token = create_token(&session, &state.config.jwt_secret, sessions.ttl())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        expires_at: session.expires_at(sessions.ttl()),
        session,
    }))
}

/// Validates and records a registration form
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<FormValues>,
) -> Result<(StatusCode, Json<RegistrationSnapshot>), ApiError> {
    let snapshot = state.registrations(form.raw("username")).register(&form).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Returns the caller's session
pub async fn current_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<SessionResponse>, ApiError> {
    let sessions = state.sessions(&claims.sub);
    let session = sessions.require_session().await?;

    Ok(Json(SessionResponse {
        expires_at: session.expires_at(sessions.ttl()),
        session,
    }))
}

/// Ends the caller's session
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ApiError> {
    state.sessions(&claims.sub).logout().await?;
    Ok(StatusCode::NO_CONTENT)
}
