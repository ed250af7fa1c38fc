//! Registration aggregate (event-sourced).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{Aggregate, AggregateRoot, DomainError, DomainEvent, EventId};

use crate::{Attendee, LedgerError, RegistrationId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Active,
    Cancelled,
}

/// A seat held by one attendee for one event.
///
/// Registrations are never deleted; cancellation is a status change.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub attendee: Attendee,
    pub issued_at: DateTime<Utc>,
    pub status: RegistrationStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub created: bool,
}

impl Registration {
    pub fn empty(id: RegistrationId, event_id: EventId) -> Self {
        Self {
            id,
            event_id,
            attendee: Attendee::Guest {
                guest_id: String::new(),
                name: String::new(),
                email: String::new(),
            },
            issued_at: DateTime::<Utc>::default(),
            status: RegistrationStatus::Active,
            cancelled_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.created && self.status == RegistrationStatus::Active
    }
}

impl AggregateRoot for Registration {
    type Id = RegistrationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct IssueRegistration {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub attendee: Attendee,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CancelRegistration {
    pub registration_id: RegistrationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum RegistrationCommand {
    Issue(IssueRegistration),
    Cancel(CancelRegistration),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegistrationEvent {
    Issued {
        registration_id: RegistrationId,
        event_id: EventId,
        attendee: Attendee,
        issued_at: DateTime<Utc>,
    },
    Cancelled {
        registration_id: RegistrationId,
        event_id: EventId,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent for RegistrationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RegistrationEvent::Issued { .. } => "registration.issued",
            RegistrationEvent::Cancelled { .. } => "registration.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            RegistrationEvent::Issued { issued_at, .. } => *issued_at,
            RegistrationEvent::Cancelled { occurred_at, .. } => *occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Registration {
    type Command = RegistrationCommand;
    type Event = RegistrationEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            RegistrationEvent::Issued {
                registration_id,
                event_id,
                attendee,
                issued_at,
            } => {
                self.id = registration_id.clone();
                self.event_id = *event_id;
                self.attendee = attendee.clone();
                self.issued_at = *issued_at;
                self.status = RegistrationStatus::Active;
                self.created = true;
            }
            RegistrationEvent::Cancelled { occurred_at, .. } => {
                self.status = RegistrationStatus::Cancelled;
                self.cancelled_at = Some(*occurred_at);
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            RegistrationCommand::Issue(cmd) => {
                if self.created {
                    return Err(DomainError::invariant("registration already issued").into());
                }
                Ok(vec![RegistrationEvent::Issued {
                    registration_id: cmd.registration_id.clone(),
                    event_id: cmd.event_id,
                    attendee: cmd.attendee.clone(),
                    issued_at: cmd.issued_at,
                }])
            }
            RegistrationCommand::Cancel(cmd) => {
                // Cancelling twice is reported like an unknown registration.
                if !self.is_active() {
                    return Err(LedgerError::RegistrationNotFound {
                        registration_id: cmd.registration_id.clone(),
                    });
                }
                Ok(vec![RegistrationEvent::Cancelled {
                    registration_id: cmd.registration_id.clone(),
                    event_id: self.event_id,
                    occurred_at: cmd.occurred_at,
                }])
            }
        }
    }
}
