use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::Utc;

use eventdesk_infra::services::EventDraft;

use crate::app::AppState;
use crate::app::dto::{self, CreateEventRequest, EventView, RegistrationView, UpdateEventRequest};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/events", post(create_event).get(list_own_events))
        .route("/events/:id", patch(update_event))
        .route("/events/:id/submit", post(submit_event))
        .route("/events/:id/registrations", get(event_roster))
        .route("/dashboard", get(dashboard))
}

pub async fn create_event(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Response, ApiError> {
    let event = state
        .services
        .catalog
        .create(&principal.principal(), EventDraft::from(body))?;

    Ok((StatusCode::CREATED, Json(EventView::at(&event, Utc::now()))).into_response())
}

pub async fn list_own_events(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let events = state.services.catalog.list_by_owner(&principal.principal())?;
    Ok(Json(EventView::list(&events, Utc::now())).into_response())
}

pub async fn update_event(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let patch = body.into_patch()?;

    let event = state
        .services
        .catalog
        .update_details(&principal.principal(), event_id, patch)?;
    Ok(Json(EventView::at(&event, Utc::now())).into_response())
}

pub async fn submit_event(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let event = state
        .services
        .catalog
        .submit(&principal.principal(), event_id)?;
    Ok(Json(EventView::at(&event, Utc::now())).into_response())
}

pub async fn event_roster(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let views = state
        .services
        .ledger
        .list_for_event(&principal.principal(), event_id)?
        .into_iter()
        .map(|record| RegistrationView::new(record, &state.services.tickets))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(views).into_response())
}

pub async fn dashboard(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let dashboard = state
        .services
        .catalog
        .company_dashboard(&principal.principal())?;
    Ok(Json(dashboard).into_response())
}
