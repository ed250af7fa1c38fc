use axum::{
    Router,
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::app::errors::{self, ApiError};

pub mod admin;
pub mod auth;
pub mod company;
pub mod events;
pub mod registrations;
pub mod system;
pub mod tickets;

/// Endpoints open to anonymous callers.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/events", get(events::list))
        .route("/events/featured", get(events::featured))
        .route("/events/map", get(events::mapped))
        .route("/events/:id", get(events::get_event))
        .route(
            "/events/:id/guest-registrations",
            post(registrations::register_guest),
        )
        .route("/registrations/:id", delete(registrations::cancel))
        .route("/tickets/verify", get(tickets::verify))
}

/// Endpoints that need a signed-in account.
pub fn protected_router() -> Router {
    Router::new()
        .route("/me", get(auth::me))
        .route("/me/registrations", get(registrations::mine))
        .route("/events/:id/registrations", post(registrations::register))
        .nest("/company", company::router())
        .nest("/admin", admin::router())
}

/// Run CPU-heavy work (credential hashing) off the async workers.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!("blocking task failed: {e}");
        ApiError::from(errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "request could not be completed",
        ))
    })?
}
