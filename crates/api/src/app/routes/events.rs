use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::app::AppState;
use crate::app::dto::{self, CatalogQuery, EventView};
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub async fn list(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, ApiError> {
    let filter = query.into_filter()?;
    let events = state.services.catalog.list_published(&filter)?;
    Ok(Json(EventView::list(&events, Utc::now())).into_response())
}

pub async fn featured(Extension(state): Extension<Arc<AppState>>) -> Result<Response, ApiError> {
    let events = state.services.catalog.list_featured()?;
    Ok(Json(EventView::list(&events, Utc::now())).into_response())
}

pub async fn mapped(Extension(state): Extension<Arc<AppState>>) -> Result<Response, ApiError> {
    let events = state.services.catalog.list_mapped()?;
    Ok(Json(EventView::list(&events, Utc::now())).into_response())
}

/// Unpublished events answer 404 unless the caller owns them or is an admin.
pub async fn get_event(
    Extension(state): Extension<Arc<AppState>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let event_id = dto::parse_event_id(&id)?;
    let viewer = principal.map(|Extension(p)| p.principal());

    let event = state.services.catalog.get(viewer.as_ref(), event_id)?;
    Ok(Json(EventView::at(&event, Utc::now())).into_response())
}
