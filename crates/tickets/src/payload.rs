use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_catalog::Event;
use eventdesk_core::EventId;
use eventdesk_identity::Account;
use eventdesk_registration::{Registration, RegistrationId};

/// Ticket wire format. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub event_title: String,
    pub event_date: NaiveDate,
    #[serde(with = "eventdesk_catalog::schedule::hhmm")]
    pub event_time: NaiveTime,
    pub event_location: String,
    pub account_name: String,
    pub account_email: String,
    /// Account id, or the guest id for anonymous registrations.
    pub account_id: String,
    pub issued_at: DateTime<Utc>,
}

/// Identity printed on a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketHolder {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl TicketHolder {
    pub fn guest(guest_id: &str, name: &str, email: &str) -> Self {
        Self {
            id: guest_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

impl From<&Account> for TicketHolder {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.display_name.clone(),
            email: account.email.clone(),
        }
    }
}

/// Freeze the registration, event and holder snapshots into a ticket.
///
/// Later edits to the event do not alter an issued ticket.
pub fn issue(registration: &Registration, event: &Event, holder: &TicketHolder) -> TicketPayload {
    TicketPayload {
        registration_id: registration.id.clone(),
        event_id: registration.event_id,
        event_title: event.details.title.clone(),
        event_date: event.details.date,
        event_time: event.details.time,
        event_location: event.details.format.location().to_string(),
        account_name: holder.name.clone(),
        account_email: holder.email.clone(),
        account_id: holder.id.clone(),
        issued_at: registration.issued_at,
    }
}
