use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use eventdesk_identity::{Account, Principal};
use eventdesk_infra::services::{SignUpOutcome, SignUpRequest};

use crate::app::dto::{self, AccountView, SessionResponse};
use crate::app::errors::{self, ApiError};
use crate::app::{AppState, routes::blocking};
use crate::context::PrincipalContext;

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::SignUpRequest>,
) -> Result<Response, ApiError> {
    let request = SignUpRequest {
        email: body.email,
        secret: body.password,
        role: body.role,
        display_name: body.name,
        organization_name: body.organization_name,
    };

    let worker = state.clone();
    let outcome = blocking(move || Ok(worker.services.identity.register(request)?)).await?;

    let response = match outcome {
        SignUpOutcome::Authenticated(account) => session_for(&state, &account)?,
        SignUpOutcome::RequiresApproval(account) => SessionResponse {
            token: None,
            expires_at: None,
            requires_approval: true,
            account: AccountView::from(&account),
        },
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<Response, ApiError> {
    let worker = state.clone();
    let account = blocking(move || {
        Ok(worker
            .services
            .identity
            .authenticate(&body.email, &body.password)?)
    })
    .await?;

    Ok(Json(session_for(&state, &account)?).into_response())
}

pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let account = state.services.identity.get(principal.account_id())?;
    Ok(Json(AccountView::from(&account)).into_response())
}

fn session_for(state: &AppState, account: &Account) -> Result<SessionResponse, ApiError> {
    let now = Utc::now();
    let token = state
        .sessions
        .issue(Principal::new(account.id, account.role), now)
        .map_err(|e| {
            tracing::error!("session issue failed: {e}");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", e.to_string())
        })?;

    Ok(SessionResponse {
        token: Some(token),
        expires_at: Some(now + state.sessions.ttl()),
        requires_approval: false,
        account: AccountView::from(account),
    })
}
