use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::app::AppState;
use crate::app::dto::{
    self, CancellationView, GuestRegistrationRequest, MyRegistrationView, RegistrationView,
};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let record = state
        .services
        .ledger
        .register(&principal.principal(), event_id)?;

    let view = RegistrationView::new(record, &state.services.tickets)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

/// Anonymous registration; the body is optional.
pub async fn register_guest(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<GuestRegistrationRequest>>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let body = body.map(|Json(b)| b).unwrap_or_default();

    let record = state.services.ledger.register_guest(
        event_id,
        body.name.as_deref(),
        body.email.as_deref(),
    )?;

    let view = RegistrationView::new(record, &state.services.tickets)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

/// Guests cancel with the registration id alone; account registrations
/// need their holder or an admin.
pub async fn cancel(
    Extension(state): Extension<Arc<AppState>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let registration_id = dto::parse_registration_id(&id)?;
    let actor = principal.map(|Extension(p)| p.principal());

    let registration = state
        .services
        .ledger
        .cancel(actor.as_ref(), &registration_id)?;

    Ok(Json(CancellationView {
        registration_id: registration.id,
        event_id: registration.event_id,
        status: registration.status,
        cancelled_at: registration.cancelled_at,
    })
    .into_response())
}

pub async fn mine(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let views = state
        .services
        .ledger
        .list_for_attendee(&principal.principal())?
        .into_iter()
        .map(|r| MyRegistrationView::new(r, &state.services.tickets, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(views).into_response())
}
