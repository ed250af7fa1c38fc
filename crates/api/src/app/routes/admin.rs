use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use eventdesk_catalog::ModerationDecision;

use crate::app::AppState;
use crate::app::dto::{
    self, AccountView, ApprovalRequest, EventView, FeaturedRequest, RoleQuery, StatusQuery,
};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/:id/approve", post(approve_event))
        .route("/events/:id/reject", post(reject_event))
        .route("/events/:id/featured", post(set_featured))
        .route("/events/:id/history", get(event_history))
        .route("/accounts", get(list_accounts))
        .route("/accounts/:id/approval", post(set_approval))
        .route("/dashboard", get(dashboard))
}

pub async fn list_events(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<StatusQuery>,
) -> Result<Response, ApiError> {
    let status = query.parse()?;
    let events = state
        .services
        .catalog
        .list_by_status(&principal.principal(), status)?;
    Ok(Json(EventView::list(&events, Utc::now())).into_response())
}

pub async fn approve_event(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    moderate(&state, &principal, &id, ModerationDecision::Approve)
}

pub async fn reject_event(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    moderate(&state, &principal, &id, ModerationDecision::Reject)
}

fn moderate(
    state: &AppState,
    principal: &PrincipalContext,
    id: &str,
    decision: ModerationDecision,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(id)?;
    let event = state
        .services
        .catalog
        .transition(&principal.principal(), event_id, decision)?;
    Ok(Json(EventView::at(&event, Utc::now())).into_response())
}

pub async fn set_featured(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<FeaturedRequest>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let event = state
        .services
        .catalog
        .set_featured(&principal.principal(), event_id, body.featured)?;
    Ok(Json(EventView::at(&event, Utc::now())).into_response())
}

pub async fn event_history(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let entries = state
        .services
        .catalog
        .history(&principal.principal(), event_id)?;
    Ok(Json(entries).into_response())
}

pub async fn list_accounts(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<RoleQuery>,
) -> Result<Response, ApiError> {
    let role = query.parse()?;
    let accounts = state
        .services
        .identity
        .list_by_role(&principal.principal(), role)?;
    Ok(Json(accounts.iter().map(AccountView::from).collect::<Vec<_>>()).into_response())
}

pub async fn set_approval(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<ApprovalRequest>,
) -> Result<Response, ApiError> {
    let account_id = dto::parse_account_id(&id)?;
    let account = state
        .services
        .identity
        .set_approval(&principal.principal(), account_id, body.status)?;
    Ok(Json(AccountView::from(&account)).into_response())
}

pub async fn dashboard(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let dashboard = state
        .services
        .catalog
        .admin_dashboard(&principal.principal())?;
    Ok(Json(dashboard).into_response())
}
