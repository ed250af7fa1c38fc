use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::app::dto::{TicketVerification, VerifyQuery};
use crate::app::errors::ApiError;

/// Decode a scanned ticket. `fresh=true` also reports the live ledger status.
pub async fn verify(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<VerifyQuery>,
) -> Result<Response, ApiError> {
    let verifier = &state.services.tickets;
    let ticket = verifier.verify(&query.data)?;
    let freshness = if query.fresh {
        Some(verifier.check_freshness(&ticket)?)
    } else {
        None
    };

    Ok(Json(TicketVerification {
        valid: true,
        ticket,
        freshness,
    })
    .into_response())
}
