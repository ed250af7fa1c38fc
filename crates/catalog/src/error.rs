use thiserror::Error;

use eventdesk_core::{DomainError, EventId};

use crate::{EventStatus, LifecycleAction};

/// Catalog error with the context a caller needs to react.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("event {event_id} not found")]
    EventNotFound { event_id: EventId },

    #[error("cannot {action} event {event_id} while it is {from}")]
    IllegalTransition {
        event_id: EventId,
        from: EventStatus,
        action: LifecycleAction,
    },

    #[error("event {event_id} is not open for registration")]
    NotPublished { event_id: EventId },

    #[error("event {event_id} is fully booked (capacity {capacity})")]
    SoldOut { event_id: EventId, capacity: u32 },

    #[error("capacity {capacity} is below the {registered} seats already taken for event {event_id}")]
    CapacityBelowRegistrations {
        event_id: EventId,
        capacity: u32,
        registered: u32,
    },

    #[error("{0}")]
    Domain(#[from] DomainError),
}
