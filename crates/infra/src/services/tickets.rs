//! Ticket verification on top of the pure ticket codec.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use eventdesk_tickets::{TicketPayload, decode, verification_link};

use crate::services::ServiceError;
use crate::store::InMemoryStore;

/// Live ledger status of a decoded ticket.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketFreshness {
    Active,
    Cancelled,
    /// No registration with this id for this event.
    Unknown,
}

pub struct TicketVerifier {
    store: Arc<InMemoryStore>,
    base_url: String,
}

impl TicketVerifier {
    pub fn new(store: Arc<InMemoryStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    /// Decode a scanned ticket. Never consults the ledger.
    pub fn verify(&self, data: &str) -> Result<TicketPayload, ServiceError> {
        decode(data).map_err(|err| {
            debug!("ticket rejected: {err}");
            err.into()
        })
    }

    /// Compare a decoded ticket with the current ledger state.
    pub fn check_freshness(&self, payload: &TicketPayload) -> Result<TicketFreshness, ServiceError> {
        let registration = self.store.read_registrations(|t| {
            t.get(&payload.registration_id)
                .map(|r| r.registration.clone())
        })?;

        Ok(match registration {
            Some(r) if r.event_id != payload.event_id => TicketFreshness::Unknown,
            Some(r) if r.is_active() => TicketFreshness::Active,
            Some(_) => TicketFreshness::Cancelled,
            None => TicketFreshness::Unknown,
        })
    }

    pub fn link_for(&self, payload: &TicketPayload) -> Result<String, ServiceError> {
        Ok(verification_link(&self.base_url, payload)?)
    }
}
