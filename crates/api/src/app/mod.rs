//! HTTP application wiring (Axum router + service wiring).
//!
//! - `routes/`: HTTP handlers, one file per audience (public, company, admin)
//! - `dto.rs`: request/response DTOs and mapping from domain types
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use eventdesk_infra::{ServiceConfig, ServiceError, Services};

use crate::config::AppConfig;
use crate::middleware;
use crate::session::Hs256Sessions;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared state handed to every handler.
pub struct AppState {
    pub services: Services,
    pub sessions: Hs256Sessions,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Bootstraps the configured admin account before returning.
pub fn build_app(config: &AppConfig) -> Result<Router, ServiceError> {
    let services = Services::in_memory(ServiceConfig {
        rejection_policy: config.rejection_policy,
        public_base_url: config.public_base_url.clone(),
    });

    if let Some(admin) = &config.admin {
        services
            .identity
            .bootstrap_admin(&admin.email, &admin.password, "Administrator")?;
    }

    let sessions = Hs256Sessions::new(config.jwt_secret.as_bytes(), config.session_ttl);
    let auth_state = middleware::AuthState {
        sessions: Arc::new(sessions.clone()),
    };
    let state = Arc::new(AppState { services, sessions });

    // Public routes: a bearer token is optional but must be valid when sent.
    let public = routes::public_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::optional_auth,
    ));

    // Protected routes: require a session.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(public)
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(state))))
}
