use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use eventdesk_catalog::CatalogError;
use eventdesk_core::DomainError;
use eventdesk_identity::{AuthError, AuthzError, SignUpError};
use eventdesk_infra::ServiceError;
use eventdesk_infra::journal::JournalError;
use eventdesk_registration::LedgerError;
use eventdesk_tickets::TicketError;

/// Handler error: a service failure rendered as a JSON error body.
#[derive(Debug)]
pub struct ApiError(Response);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(service_error_to_response(err))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(domain_error_to_response(err))
    }
}

impl From<Response> for ApiError {
    fn from(response: Response) -> Self {
        Self(response)
    }
}

pub fn service_error_to_response(err: ServiceError) -> Response {
    let message = err.to_string();
    match err {
        ServiceError::Auth(AuthError::InvalidCredentials) => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", message)
        }
        ServiceError::Auth(AuthError::PendingApproval { .. }) => {
            json_error(StatusCode::FORBIDDEN, "pending_approval", message)
        }
        ServiceError::Auth(AuthError::AccountSuspended { .. }) => {
            json_error(StatusCode::FORBIDDEN, "account_suspended", message)
        }

        ServiceError::SignUp(SignUpError::EmailTaken { .. }) => {
            json_error(StatusCode::CONFLICT, "email_taken", message)
        }
        ServiceError::SignUp(SignUpError::Domain(e)) => domain_error_to_response(e),

        ServiceError::Forbidden(AuthzError::Unauthenticated) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", message)
        }
        ServiceError::Forbidden(AuthzError::Forbidden(_) | AuthzError::NotOwner(_)) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", message)
        }

        ServiceError::Catalog(
            CatalogError::EventNotFound { .. } | CatalogError::NotPublished { .. },
        ) => json_error(StatusCode::NOT_FOUND, "event_not_found", message),
        ServiceError::Catalog(CatalogError::IllegalTransition { .. }) => {
            json_error(StatusCode::CONFLICT, "illegal_transition", message)
        }
        ServiceError::Catalog(CatalogError::SoldOut { .. }) => {
            json_error(StatusCode::CONFLICT, "event_full", message)
        }
        ServiceError::Catalog(CatalogError::CapacityBelowRegistrations { .. }) => {
            json_error(StatusCode::CONFLICT, "capacity_below_registrations", message)
        }
        ServiceError::Catalog(CatalogError::Domain(e)) => domain_error_to_response(e),

        ServiceError::Ledger(LedgerError::EventNotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, "event_not_found", message)
        }
        ServiceError::Ledger(LedgerError::EventFull { .. }) => {
            json_error(StatusCode::CONFLICT, "event_full", message)
        }
        ServiceError::Ledger(LedgerError::AlreadyRegistered { .. }) => {
            json_error(StatusCode::CONFLICT, "already_registered", message)
        }
        ServiceError::Ledger(LedgerError::RegistrationNotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, "registration_not_found", message)
        }
        ServiceError::Ledger(LedgerError::Domain(e)) => domain_error_to_response(e),

        ServiceError::Ticket(TicketError::MalformedPayload(_)) => {
            json_error(StatusCode::BAD_REQUEST, "malformed_payload", message)
        }
        ServiceError::Ticket(TicketError::Encode(_)) => {
            tracing::error!("ticket encoding failed: {message}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "ticket_error", message)
        }

        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::AccountNotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "account_not_found", message)
        }

        ServiceError::Journal(JournalError::Concurrency(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        ServiceError::Journal(_) | ServiceError::Store(_) | ServiceError::Credential(_) => {
            tracing::error!("storage failure: {message}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
