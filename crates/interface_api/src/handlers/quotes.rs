//! Quote handlers
//!
//! A quote form is submitted whole and replayed through the quote wizard,
//! so the API applies exactly the rules and side effects of the
//! step-by-step flow: overlays, account-type switching and per-step
//! validation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use core_kernel::{FormValues, QuoteId};
use domain_quote::{
    Overlay, OverlayResolution, PendingQuote, QuoteWizard, StepOutcome, WizardStep,
};

use crate::auth::Claims;
use crate::dto::quote::*;
use crate::{error::ApiError, AppState};

/// Parses a quote id with or without its display prefix
pub(crate) fn parse_quote_id(raw: &str) -> Result<QuoteId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid quote id: {}", raw)))
}

/// Validates one wizard step without changing anything
pub async fn validate_step(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ValidateStepRequest>,
) -> Result<Json<ValidateStepResponse>, ApiError> {
    let step = WizardStep::from_number(request.step)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown step {}", request.step)))?;

    let ctx = state.wizard_context(claims.role);
    let rules = state
        .policy
        .rules_for_step(step, request.insurance_type, claims.role, &request.values)?;
    let report = rules.validate(&request.values, ctx.today());

    Ok(Json(ValidateStepResponse {
        valid: report.is_valid(),
        step: step.number(),
        title: step.title().to_string(),
        errors: report.errors().to_vec(),
    }))
}

/// Creates a pending quote from a complete form
///
/// Returns `201` with the stored quote, or `202` with a referral when the
/// form opened an overlay and its sub-form was supplied.
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteOutcome>), ApiError> {
    let wizard = QuoteWizard::new(state.wizard_context(claims.role), request.insurance_type);
    complete(&state, &claims, wizard, &request.values, request.referral).await
}

/// Re-submits a stored quote with changed values, keeping its id
pub async fn update_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteOutcome>), ApiError> {
    let id = parse_quote_id(&id)?;
    let existing = state.quotes(&claims.sub).require(id).await?;

    let wizard = QuoteWizard::edit(state.wizard_context(claims.role), &existing);
    complete(&state, &claims, wizard, &request.values, request.referral).await
}

/// Lists the caller's pending quotes
pub async fn list_quotes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PendingQuote>>, ApiError> {
    Ok(Json(state.quotes(&claims.sub).list().await?))
}

/// Gets one of the caller's pending quotes
pub async fn get_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<PendingQuote>, ApiError> {
    let id = parse_quote_id(&id)?;
    Ok(Json(state.quotes(&claims.sub).require(id).await?))
}

/// Deletes one of the caller's pending quotes
pub async fn delete_quote(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_quote_id(&id)?;
    if state.quotes(&claims.sub).remove(id).await? {
        info!(user = %claims.sub, quote_id = %id, "Quote deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Quote {} not found", id)))
    }
}

/// Replays the form through the wizard up to the stored quote
async fn complete(
    state: &AppState,
    claims: &Claims,
    mut wizard: QuoteWizard,
    values: &FormValues,
    referral: Option<FormValues>,
) -> Result<(StatusCode, Json<QuoteOutcome>), ApiError> {
    for (field, value) in values.iter() {
        if let Some(overlay) = wizard.set_field(field, value)? {
            return refer(claims, &mut wizard, overlay, referral);
        }
    }

    let repository = state.quotes(&claims.sub);
    loop {
        match wizard.submit_and_save(&repository).await? {
            StepOutcome::Advanced { .. } => continue,
            StepOutcome::QuoteReady(quote) => {
                info!(user = %claims.sub, quote_id = %quote.id, title = %quote.title, "Quote stored");
                return Ok((StatusCode::CREATED, Json(QuoteOutcome::Quote(quote))));
            }
            StepOutcome::PaymentSelected(_) => {
                return Err(ApiError::Internal("wizard passed the quote step".to_string()))
            }
        }
    }
}

/// Resolves an overlay opened while replaying the form
fn refer(
    claims: &Claims,
    wizard: &mut QuoteWizard,
    overlay: Overlay,
    referral: Option<FormValues>,
) -> Result<(StatusCode, Json<QuoteOutcome>), ApiError> {
    let Some(values) = referral else {
        wizard.resolve_overlay(OverlayResolution::Cancel)?;
        return Err(ApiError::ReferralRequired(overlay));
    };

    for (field, value) in values.iter() {
        wizard.set_overlay_field(field, value)?;
    }
    let referral = wizard
        .resolve_overlay(OverlayResolution::Submit)?
        .ok_or_else(|| ApiError::Internal("overlay produced no referral".to_string()))?;

    info!(user = %claims.sub, referral_id = %referral.id, kind = %overlay, "Referral submitted");
    Ok((StatusCode::ACCEPTED, Json(QuoteOutcome::Referral(referral))))
}
