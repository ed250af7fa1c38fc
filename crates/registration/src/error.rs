use thiserror::Error;

use eventdesk_core::{AccountId, DomainError, EventId};

use crate::RegistrationId;

/// Registration ledger failure.
///
/// A concurrency-induced full event is reported exactly like one that was
/// already full when the request arrived.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Missing, or not published.
    #[error("event {event_id} not found")]
    EventNotFound { event_id: EventId },

    #[error("this event is fully booked (event {event_id}, capacity {capacity})")]
    EventFull { event_id: EventId, capacity: u32 },

    #[error("account {account_id} is already registered for event {event_id}")]
    AlreadyRegistered {
        event_id: EventId,
        account_id: AccountId,
    },

    /// Unknown, or already cancelled.
    #[error("registration {registration_id} not found")]
    RegistrationNotFound { registration_id: RegistrationId },

    #[error("{0}")]
    Domain(#[from] DomainError),
}
