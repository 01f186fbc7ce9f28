//! HTTP API Layer
//!
//! This crate exposes the quoting core over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers per concern (auth, products, premium,
//!   quotes, payments)
//! - **Middleware**: bearer authentication and audit logging
//! - **DTOs**: request/response bodies, camelCase on the wire
//! - **Error Handling**: domain errors mapped to status codes and a JSON body
//!
//! Every authenticated user gets their own view of the store, so sessions
//! and pending quotes never mix between users.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config, store, Arc::new(SystemClock), gateway);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use core_kernel::{Clock, KeyValueStore, ScopedStore};
use domain_billing::{PaymentGateway, QuoteSettlement};
use domain_party::{normalize_username, ActorRole, CredentialDirectory, RegistrationService, SessionService};
use domain_quote::{PendingQuoteRepository, PendingWriteLocks, PremiumCalculator, QuotePolicy, WizardContext};

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{auth as auth_handlers, health, payments, premium, products, quotes};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub store: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub directory: Arc<CredentialDirectory>,
    pub calculator: Arc<PremiumCalculator>,
    pub policy: Arc<QuotePolicy>,
    pub quote_locks: PendingWriteLocks,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let quoting = config.quoting.clone();
        Self {
            directory: Arc::new(quoting.credentials),
            calculator: Arc::new(PremiumCalculator::new(quoting.rates, quoting.premium)),
            policy: Arc::new(quoting.policy),
            quote_locks: PendingWriteLocks::new(),
            config: Arc::new(config),
            store,
            clock,
            gateway,
        }
    }

    /// The store as seen by one user
    pub fn user_store(&self, username: &str) -> Arc<dyn KeyValueStore> {
        Arc::new(ScopedStore::new(self.store.clone(), user_scope(username)))
    }

    pub fn sessions(&self, username: &str) -> SessionService {
        SessionService::new(self.user_store(username), self.directory.clone(), self.clock.clone())
            .with_ttl(self.config.session_ttl())
    }

    pub fn registrations(&self, username: &str) -> RegistrationService {
        RegistrationService::new(self.user_store(username), self.clock.clone(), self.config.timezone)
    }

    pub fn quotes(&self, username: &str) -> PendingQuoteRepository {
        PendingQuoteRepository::with_write_lock(
            self.user_store(username),
            self.quote_locks.for_scope(&user_scope(username)),
        )
    }

    pub fn settlement(&self, username: &str) -> QuoteSettlement {
        QuoteSettlement::new(self.quotes(username), self.gateway.clone(), self.config.payment.timeout())
    }

    pub fn wizard_context(&self, role: ActorRole) -> WizardContext {
        WizardContext::new(
            role,
            self.policy.clone(),
            self.calculator.clone(),
            self.clock.clone(),
            self.config.timezone,
        )
    }
}

fn user_scope(username: &str) -> String {
    format!("users/{}", normalize_username(username))
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let open_api_routes = Router::new()
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/register", post(auth_handlers::register))
        .layer(axum_middleware::from_fn(audit_middleware));

    // Quote routes
    let quote_routes = Router::new()
        .route("/", post(quotes::create_quote).get(quotes::list_quotes))
        .route("/validate", post(quotes::validate_step))
        .route(
            "/:id",
            get(quotes::get_quote)
                .put(quotes::update_quote)
                .delete(quotes::delete_quote),
        )
        .route("/:id/payments", post(payments::pay_quote));

    // Protected API routes
    let protected_routes = Router::new()
        .route("/auth/session", get(auth_handlers::current_session))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/products", get(products::list_products))
        .route("/premium", post(premium::calculate_premium))
        .nest("/quotes", quote_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", open_api_routes.merge(protected_routes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
