//! In-memory state for accounts, catalog events and registrations.
//!
//! Each catalog event lives in its own slot behind a mutex. Seat accounting
//! for an event happens entirely while that slot is held, so different events
//! never contend with each other.
//!
//! Lock order: event slot, then the registration table, then the journal.
//! The accounts table is never locked while a slot is held.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;

use eventdesk_catalog::Event;
use eventdesk_core::{AccountId, EventId};
use eventdesk_identity::Account;
use eventdesk_registration::{IssuanceClock, Registration, RegistrationId};
use eventdesk_tickets::TicketPayload;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AccountTable {
    by_id: HashMap<AccountId, Account>,
    /// Normalized email → id.
    by_email: HashMap<String, AccountId>,
}

impl AccountTable {
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.by_id.get(&id)
    }

    pub fn find_by_email(&self, normalized_email: &str) -> Option<&Account> {
        self.by_email
            .get(normalized_email)
            .and_then(|id| self.by_id.get(id))
    }

    pub fn upsert(&mut self, account: Account) {
        self.by_email.insert(account.email.clone(), account.id);
        self.by_id.insert(account.id, account);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.by_id.values()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Event slots
// ─────────────────────────────────────────────────────────────────────────────

/// One catalog event plus the per-event registration bookkeeping.
#[derive(Debug)]
pub struct EventSlot {
    pub event: Event,
    /// Account → its active registration for this event.
    active: HashMap<AccountId, RegistrationId>,
    clock: IssuanceClock,
}

impl EventSlot {
    fn new(event: Event) -> Self {
        Self {
            event,
            active: HashMap::new(),
            clock: IssuanceClock::default(),
        }
    }

    pub fn active_registration(&self, account_id: AccountId) -> Option<&RegistrationId> {
        self.active.get(&account_id)
    }

    pub fn mark_active(&mut self, account_id: AccountId, registration_id: RegistrationId) {
        self.active.insert(account_id, registration_id);
    }

    pub fn clear_active(&mut self, account_id: AccountId, registration_id: &RegistrationId) {
        if self.active.get(&account_id) == Some(registration_id) {
            self.active.remove(&account_id);
        }
    }

    pub fn clock_mut(&mut self) -> &mut IssuanceClock {
        &mut self.clock
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registrations
// ─────────────────────────────────────────────────────────────────────────────

/// A registration together with the ticket frozen when it was issued.
#[derive(Debug, Clone)]
pub struct RegistrationRecord {
    pub registration: Registration,
    pub ticket: TicketPayload,
}

#[derive(Debug, Default)]
pub struct RegistrationTable {
    by_id: HashMap<RegistrationId, RegistrationRecord>,
    by_event: HashMap<EventId, Vec<RegistrationId>>,
    /// Attendee key → registrations in issuance order.
    by_attendee: HashMap<String, Vec<RegistrationId>>,
}

impl RegistrationTable {
    pub fn get(&self, id: &RegistrationId) -> Option<&RegistrationRecord> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &RegistrationId) -> Option<&mut RegistrationRecord> {
        self.by_id.get_mut(id)
    }

    pub fn insert(&mut self, record: RegistrationRecord) {
        let id = record.registration.id.clone();
        self.by_event
            .entry(record.registration.event_id)
            .or_default()
            .push(id.clone());
        self.by_attendee
            .entry(record.registration.attendee.key())
            .or_default()
            .push(id.clone());
        self.by_id.insert(id, record);
    }

    pub fn for_event(&self, event_id: EventId) -> Vec<RegistrationRecord> {
        self.collect(self.by_event.get(&event_id))
    }

    pub fn for_attendee(&self, attendee_key: &str) -> Vec<RegistrationRecord> {
        self.collect(self.by_attendee.get(attendee_key))
    }

    pub fn active_count(&self) -> usize {
        self.by_id
            .values()
            .filter(|r| r.registration.is_active())
            .count()
    }

    fn collect(&self, ids: Option<&Vec<RegistrationId>>) -> Vec<RegistrationRecord> {
        ids.into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: RwLock<AccountTable>,
    events: RwLock<BTreeMap<EventId, Arc<Mutex<EventSlot>>>>,
    registrations: RwLock<RegistrationTable>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_accounts<R>(&self, f: impl FnOnce(&AccountTable) -> R) -> Result<R, StoreError> {
        let guard = self
            .accounts
            .read()
            .map_err(|_| StoreError::Poisoned("accounts"))?;
        Ok(f(&guard))
    }

    pub fn write_accounts<R>(
        &self,
        f: impl FnOnce(&mut AccountTable) -> R,
    ) -> Result<R, StoreError> {
        let mut guard = self
            .accounts
            .write()
            .map_err(|_| StoreError::Poisoned("accounts"))?;
        Ok(f(&mut guard))
    }

    pub fn insert_event(&self, event: Event) -> Result<(), StoreError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| StoreError::Poisoned("events"))?;
        events.insert(event.id, Arc::new(Mutex::new(EventSlot::new(event))));
        Ok(())
    }

    /// Run `f` while holding the event's slot lock. `None` if the event is unknown.
    pub fn with_event<R>(
        &self,
        event_id: EventId,
        f: impl FnOnce(&mut EventSlot) -> R,
    ) -> Result<Option<R>, StoreError> {
        let slot = {
            let events = self
                .events
                .read()
                .map_err(|_| StoreError::Poisoned("events"))?;
            events.get(&event_id).cloned()
        };
        let Some(slot) = slot else {
            return Ok(None);
        };

        let mut guard = slot.lock().map_err(|_| StoreError::Poisoned("event slot"))?;
        Ok(Some(f(&mut guard)))
    }

    /// Consistent copy of every event, each taken under its own slot lock.
    pub fn event_snapshots(&self) -> Result<Vec<Event>, StoreError> {
        let slots: Vec<_> = {
            let events = self
                .events
                .read()
                .map_err(|_| StoreError::Poisoned("events"))?;
            events.values().cloned().collect()
        };

        slots
            .iter()
            .map(|slot| {
                slot.lock()
                    .map(|guard| guard.event.clone())
                    .map_err(|_| StoreError::Poisoned("event slot"))
            })
            .collect()
    }

    pub fn event_snapshot(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        self.with_event(event_id, |slot| slot.event.clone())
    }

    pub fn read_registrations<R>(
        &self,
        f: impl FnOnce(&RegistrationTable) -> R,
    ) -> Result<R, StoreError> {
        let guard = self
            .registrations
            .read()
            .map_err(|_| StoreError::Poisoned("registrations"))?;
        Ok(f(&guard))
    }

    pub fn write_registrations<R>(
        &self,
        f: impl FnOnce(&mut RegistrationTable) -> R,
    ) -> Result<R, StoreError> {
        let mut guard = self
            .registrations
            .write()
            .map_err(|_| StoreError::Poisoned("registrations"))?;
        Ok(f(&mut guard))
    }
}
