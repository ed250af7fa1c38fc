//! Registration ledger: seat reservation, cancellation and attendee views.
//!
//! `register` and `cancel` run entirely under the event's slot lock, so the
//! capacity check, the seat counter and the registration record always move
//! together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use eventdesk_catalog::{CatalogError, Event, EventCommand, ReleaseSeat, ReserveSeat, ScheduleStatus};
use eventdesk_core::{Aggregate, DomainError, EventId};
use eventdesk_identity::{AuthzError, Permission, Principal, authorize, ensure_owner};
use eventdesk_registration::{
    Attendee, CancelRegistration, IssueRegistration, LedgerError, Registration,
    RegistrationCommand, RegistrationId, RegistrationStatus,
};
use eventdesk_tickets::{TicketHolder, TicketPayload, issue};

use crate::journal::{self, EVENT_STREAM, Journal, REGISTRATION_STREAM};
use crate::services::{ServiceError, active_account};
use crate::store::{EventSlot, InMemoryStore, RegistrationRecord};

/// A registration joined with the event as it looks now.
///
/// `ticket` keeps the details frozen at issuance; `event` reflects later edits.
#[derive(Debug, Clone)]
pub struct AttendeeRegistration {
    pub registration_id: RegistrationId,
    pub status: RegistrationStatus,
    pub issued_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub ticket: TicketPayload,
    pub event: Event,
    pub schedule_status: ScheduleStatus,
}

pub struct RegistrationLedger {
    store: Arc<InMemoryStore>,
    journal: Arc<dyn Journal>,
}

impl RegistrationLedger {
    pub fn new(store: Arc<InMemoryStore>, journal: Arc<dyn Journal>) -> Self {
        Self { store, journal }
    }

    /// Register the calling account for a published event.
    #[tracing::instrument(skip_all, fields(event_id = %event_id, account_id = %actor.account_id))]
    pub fn register(
        &self,
        actor: &Principal,
        event_id: EventId,
    ) -> Result<RegistrationRecord, ServiceError> {
        authorize(actor, &Permission::REGISTRATIONS_CREATE)?;

        let account = active_account(&self.store, actor)?;

        self.issue(
            event_id,
            Attendee::account(account.id),
            TicketHolder::from(&account),
        )
    }

    /// Anonymous registration. Blank name or email fall back to guest placeholders.
    #[tracing::instrument(skip_all, fields(event_id = %event_id))]
    pub fn register_guest(
        &self,
        event_id: EventId,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<RegistrationRecord, ServiceError> {
        let attendee = Attendee::guest(name, email);
        let Attendee::Guest {
            guest_id,
            name,
            email,
        } = &attendee
        else {
            return Err(DomainError::invariant("guest attendee expected").into());
        };
        let holder = TicketHolder::guest(guest_id, name, email);
        self.issue(event_id, attendee, holder)
    }

    /// Cancel an active registration.
    ///
    /// Account-held registrations need their own account or an admin; guest
    /// registrations are cancelled by anyone holding the id.
    #[tracing::instrument(skip_all, fields(registration_id = %registration_id))]
    pub fn cancel(
        &self,
        actor: Option<&Principal>,
        registration_id: &RegistrationId,
    ) -> Result<Registration, ServiceError> {
        let not_found = || LedgerError::RegistrationNotFound {
            registration_id: registration_id.clone(),
        };

        let existing = self
            .store
            .read_registrations(|t| t.get(registration_id).map(|r| r.registration.clone()))?
            .ok_or_else(not_found)?;
        if !existing.is_active() {
            warn!("cancel rejected: registration is not active");
            return Err(not_found().into());
        }
        authorize_cancel(actor, &existing)?;

        let event_id = existing.event_id;
        let outcome = self
            .store
            .with_event(event_id, |slot| -> Result<Registration, ServiceError> {
                self.store
                    .write_registrations(|table| -> Result<Registration, ServiceError> {
                        let record = table.get_mut(registration_id).ok_or_else(not_found)?;
                        let now = Utc::now();

                        // Re-decided under the lock: a concurrent cancel may have won.
                        let cancelled = record.registration.handle(&RegistrationCommand::Cancel(
                            CancelRegistration {
                                registration_id: registration_id.clone(),
                                occurred_at: now,
                            },
                        ))?;
                        let released = slot.event.handle(&EventCommand::ReleaseSeat(ReleaseSeat {
                            event_id,
                            occurred_at: now,
                        }))?;

                        journal::record(
                            &*self.journal,
                            REGISTRATION_STREAM,
                            &mut record.registration,
                            cancelled,
                        )?;
                        journal::record(&*self.journal, EVENT_STREAM, &mut slot.event, released)?;

                        if let Some(account_id) = record.registration.attendee.account_id() {
                            slot.clear_active(account_id, registration_id);
                        }
                        Ok(record.registration.clone())
                    })?
            })?;

        let registration = outcome.ok_or_else(not_found)??;
        info!(event_id = %event_id, "registration cancelled");
        Ok(registration)
    }

    /// Every registration held by the calling account, joined with the
    /// current event snapshot.
    pub fn list_for_attendee(
        &self,
        actor: &Principal,
    ) -> Result<Vec<AttendeeRegistration>, ServiceError> {
        let records = self
            .store
            .read_registrations(|t| t.for_attendee(&Attendee::account(actor.account_id).key()))?;

        let now = Utc::now();
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let Some(event) = self.store.event_snapshot(record.registration.event_id)? else {
                continue;
            };
            out.push(AttendeeRegistration {
                registration_id: record.registration.id.clone(),
                status: record.registration.status,
                issued_at: record.registration.issued_at,
                cancelled_at: record.registration.cancelled_at,
                schedule_status: event.schedule_status(now),
                ticket: record.ticket,
                event,
            });
        }
        Ok(out)
    }

    /// Roster of an event for its owner or an admin.
    pub fn list_for_event(
        &self,
        actor: &Principal,
        event_id: EventId,
    ) -> Result<Vec<RegistrationRecord>, ServiceError> {
        let event = self
            .store
            .event_snapshot(event_id)?
            .ok_or(CatalogError::EventNotFound { event_id })?;

        if !actor.has(&Permission::EVENTS_VIEW_ALL) {
            authorize(actor, &Permission::EVENTS_MANAGE_OWN)?;
            ensure_owner(actor, event.owner, format!("event {event_id}"))?;
        }
        Ok(self.store.read_registrations(|t| t.for_event(event_id))?)
    }

    pub fn find(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<Option<RegistrationRecord>, ServiceError> {
        Ok(self
            .store
            .read_registrations(|t| t.get(registration_id).cloned())?)
    }

    fn issue(
        &self,
        event_id: EventId,
        attendee: Attendee,
        holder: TicketHolder,
    ) -> Result<RegistrationRecord, ServiceError> {
        let now = Utc::now();
        let outcome = self
            .store
            .with_event(event_id, |slot| self.issue_locked(slot, attendee, &holder, now))?;

        match outcome.ok_or(LedgerError::EventNotFound { event_id })? {
            Ok(record) => {
                info!(
                    registration_id = %record.registration.id,
                    attendee = %record.registration.attendee.key(),
                    "registration issued"
                );
                Ok(record)
            }
            Err(err) => {
                warn!("registration rejected: {err}");
                Err(err)
            }
        }
    }

    /// Runs with the slot lock held. Order of checks: published, capacity,
    /// one active registration per account.
    fn issue_locked(
        &self,
        slot: &mut EventSlot,
        attendee: Attendee,
        holder: &TicketHolder,
        now: DateTime<Utc>,
    ) -> Result<RegistrationRecord, ServiceError> {
        let event_id = slot.event.id;

        if !slot.event.is_published() {
            return Err(LedgerError::EventNotFound { event_id }.into());
        }
        if slot.event.registered_count >= slot.event.capacity {
            return Err(LedgerError::EventFull {
                event_id,
                capacity: slot.event.capacity,
            }
            .into());
        }
        if let Some(account_id) = attendee.account_id() {
            if slot.active_registration(account_id).is_some() {
                return Err(LedgerError::AlreadyRegistered {
                    event_id,
                    account_id,
                }
                .into());
            }
        }

        let issued_at = slot.clock_mut().next(now);
        let registration_id = RegistrationId::derive(event_id, issued_at);

        let mut registration = Registration::empty(registration_id.clone(), event_id);
        let issued = registration.handle(&RegistrationCommand::Issue(IssueRegistration {
            registration_id: registration_id.clone(),
            event_id,
            attendee: attendee.clone(),
            issued_at,
        }))?;
        let reserved = slot
            .event
            .handle(&EventCommand::ReserveSeat(ReserveSeat {
                event_id,
                occurred_at: issued_at,
            }))
            .map_err(seat_error)?;

        journal::record(&*self.journal, REGISTRATION_STREAM, &mut registration, issued)?;
        journal::record(&*self.journal, EVENT_STREAM, &mut slot.event, reserved)?;

        let ticket = issue(&registration, &slot.event, holder);
        let record = RegistrationRecord {
            registration,
            ticket,
        };
        self.store
            .write_registrations(|table| table.insert(record.clone()))?;
        if let Some(account_id) = attendee.account_id() {
            slot.mark_active(account_id, registration_id);
        }
        Ok(record)
    }
}

/// Seat errors from the catalog surface as ledger errors.
fn seat_error(err: CatalogError) -> ServiceError {
    match err {
        CatalogError::SoldOut { event_id, capacity } => {
            LedgerError::EventFull { event_id, capacity }.into()
        }
        CatalogError::NotPublished { event_id } | CatalogError::EventNotFound { event_id } => {
            LedgerError::EventNotFound { event_id }.into()
        }
        other => other.into(),
    }
}

fn authorize_cancel(
    actor: Option<&Principal>,
    registration: &Registration,
) -> Result<(), AuthzError> {
    let Some(owner) = registration.attendee.account_id() else {
        return Ok(());
    };
    let actor = actor.ok_or(AuthzError::Unauthenticated)?;
    if actor.has(&Permission::REGISTRATIONS_CANCEL_ANY) {
        return Ok(());
    }
    ensure_owner(actor, owner, format!("registration {}", registration.id))
}
