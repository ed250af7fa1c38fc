//! Event creation, moderation and catalog queries.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::info;

use eventdesk_catalog::{
    CatalogError, CatalogEvent, CatalogFilter, CompanyDashboard, CreateEvent, Event, EventCommand,
    EventDetails, EventFormat, EventStatus, ModerateEvent, ModerationDecision, RejectionPolicy,
    SetFeatured, SubmitEvent, UpdateEventDetails, list_featured, list_mapped, list_published,
};
use eventdesk_core::{Aggregate, EventId};
use eventdesk_identity::{ApprovalStatus, Permission, Principal, Role, authorize, ensure_owner};

use crate::journal::{self, EVENT_STREAM, Journal, JournalEntry};
use crate::services::{ServiceError, active_account};
use crate::store::InMemoryStore;

#[derive(Debug, Clone)]
pub struct EventDraft {
    pub details: EventDetails,
    pub capacity: u32,
}

/// Partial edit of an event; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub format: Option<EventFormat>,
    pub image_url: Option<String>,
    pub capacity: Option<u32>,
}

impl EventPatch {
    fn merge(self, event: &Event) -> (EventDetails, u32) {
        let current = &event.details;
        let details = EventDetails {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| current.description.clone()),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            date: self.date.unwrap_or(current.date),
            time: self.time.unwrap_or(current.time),
            format: self.format.unwrap_or_else(|| current.format.clone()),
            image_url: self.image_url.or_else(|| current.image_url.clone()),
        };
        (details, self.capacity.unwrap_or(event.capacity))
    }
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdminDashboard {
    pub published_events: usize,
    pub pending_events: usize,
    pub companies: usize,
    pub pending_companies: usize,
    pub public_accounts: usize,
    pub total_registrations: usize,
}

pub struct EventCatalog {
    store: Arc<InMemoryStore>,
    journal: Arc<dyn Journal>,
    policy: RejectionPolicy,
}

impl EventCatalog {
    pub fn new(
        store: Arc<InMemoryStore>,
        journal: Arc<dyn Journal>,
        policy: RejectionPolicy,
    ) -> Self {
        Self {
            store,
            journal,
            policy,
        }
    }

    pub fn rejection_policy(&self) -> RejectionPolicy {
        self.policy
    }

    /// Company-only. New events always start `pending` with no registrations.
    #[tracing::instrument(skip_all, fields(owner = %actor.account_id))]
    pub fn create(&self, actor: &Principal, draft: EventDraft) -> Result<Event, ServiceError> {
        authorize(actor, &Permission::EVENTS_CREATE)?;

        let organizer_name = active_account(&self.store, actor)?
            .public_name()
            .to_string();

        let mut event = Event::empty(EventId::new());
        let events = event.handle(&EventCommand::Create(CreateEvent {
            event_id: event.id,
            owner: actor.account_id,
            organizer_name,
            details: draft.details,
            capacity: draft.capacity,
            occurred_at: Utc::now(),
        }))?;
        journal::record(&*self.journal, EVENT_STREAM, &mut event, events)?;
        self.store.insert_event(event.clone())?;

        info!(event_id = %event.id, status = %event.status, "event created");
        Ok(event)
    }

    /// Owner-only, `draft → pending`.
    #[tracing::instrument(skip_all, fields(event_id = %event_id))]
    pub fn submit(&self, actor: &Principal, event_id: EventId) -> Result<Event, ServiceError> {
        authorize(actor, &Permission::EVENTS_MANAGE_OWN)?;
        active_account(&self.store, actor)?;

        let event = self.mutate(event_id, |event| {
            ensure_owner(actor, event.owner, format!("event {event_id}"))?;
            Ok(event.handle(&EventCommand::Submit(SubmitEvent {
                event_id,
                occurred_at: Utc::now(),
            }))?)
        })?;
        info!(status = %event.status, "event submitted");
        Ok(event)
    }

    /// Admin-only approve/reject of a pending event.
    #[tracing::instrument(skip_all, fields(event_id = %event_id, decision = ?decision))]
    pub fn transition(
        &self,
        actor: &Principal,
        event_id: EventId,
        decision: ModerationDecision,
    ) -> Result<Event, ServiceError> {
        authorize(actor, &Permission::EVENTS_MODERATE)?;

        let policy = self.policy;
        let event = self.mutate(event_id, |event| {
            Ok(event.handle(&EventCommand::Moderate(ModerateEvent {
                event_id,
                decision,
                policy,
                occurred_at: Utc::now(),
            }))?)
        })?;
        info!(status = %event.status, by = %actor.account_id, "event moderated");
        Ok(event)
    }

    /// Owner-only edit. Issued tickets keep the details they were issued with.
    #[tracing::instrument(skip_all, fields(event_id = %event_id))]
    pub fn update_details(
        &self,
        actor: &Principal,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<Event, ServiceError> {
        authorize(actor, &Permission::EVENTS_MANAGE_OWN)?;
        active_account(&self.store, actor)?;

        let event = self.mutate(event_id, |event| {
            ensure_owner(actor, event.owner, format!("event {event_id}"))?;
            let (details, capacity) = patch.merge(event);
            Ok(event.handle(&EventCommand::UpdateDetails(UpdateEventDetails {
                event_id,
                details,
                capacity,
                occurred_at: Utc::now(),
            }))?)
        })?;
        info!(capacity = event.capacity, "event details updated");
        Ok(event)
    }

    /// Admin-only. Only published events can be featured.
    #[tracing::instrument(skip_all, fields(event_id = %event_id, featured = featured))]
    pub fn set_featured(
        &self,
        actor: &Principal,
        event_id: EventId,
        featured: bool,
    ) -> Result<Event, ServiceError> {
        authorize(actor, &Permission::EVENTS_FEATURE)?;

        self.mutate(event_id, |event| {
            Ok(event.handle(&EventCommand::SetFeatured(SetFeatured {
                event_id,
                featured,
                occurred_at: Utc::now(),
            }))?)
        })
    }

    /// Published events are visible to anyone; other states only to the
    /// owner and to admins. Anything else looks like a missing event.
    pub fn get(&self, viewer: Option<&Principal>, event_id: EventId) -> Result<Event, ServiceError> {
        let event = self
            .store
            .event_snapshot(event_id)?
            .ok_or(CatalogError::EventNotFound { event_id })?;

        let visible = event.is_published()
            || viewer.is_some_and(|p| {
                p.account_id == event.owner || p.has(&Permission::EVENTS_VIEW_ALL)
            });
        if !visible {
            return Err(CatalogError::EventNotFound { event_id }.into());
        }
        Ok(event)
    }

    pub fn list_published(&self, filter: &CatalogFilter) -> Result<Vec<Event>, ServiceError> {
        Ok(list_published(self.store.event_snapshots()?, filter))
    }

    pub fn list_featured(&self) -> Result<Vec<Event>, ServiceError> {
        Ok(list_featured(self.store.event_snapshots()?))
    }

    pub fn list_mapped(&self) -> Result<Vec<Event>, ServiceError> {
        Ok(list_mapped(self.store.event_snapshots()?))
    }

    /// The caller's own events in every state.
    pub fn list_by_owner(&self, actor: &Principal) -> Result<Vec<Event>, ServiceError> {
        authorize(actor, &Permission::EVENTS_MANAGE_OWN)?;
        self.owned_by(actor)
    }

    /// Admin view; `None` lists every event.
    pub fn list_by_status(
        &self,
        actor: &Principal,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>, ServiceError> {
        authorize(actor, &Permission::EVENTS_VIEW_ALL)?;
        Ok(self
            .store
            .event_snapshots()?
            .into_iter()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .collect())
    }

    pub fn company_dashboard(&self, actor: &Principal) -> Result<CompanyDashboard, ServiceError> {
        authorize(actor, &Permission::DASHBOARD_COMPANY)?;
        Ok(CompanyDashboard::from_events(&self.owned_by(actor)?))
    }

    pub fn admin_dashboard(&self, actor: &Principal) -> Result<AdminDashboard, ServiceError> {
        authorize(actor, &Permission::DASHBOARD_ADMIN)?;

        let mut dashboard = self.store.read_accounts(|t| {
            t.iter().fold(AdminDashboard::default(), |mut acc, a| {
                match a.role {
                    Role::Company => {
                        acc.companies += 1;
                        if a.approval_status == ApprovalStatus::Pending {
                            acc.pending_companies += 1;
                        }
                    }
                    Role::Public => acc.public_accounts += 1,
                    Role::Admin => {}
                }
                acc
            })
        })?;

        for event in self.store.event_snapshots()? {
            match event.status {
                EventStatus::Published => dashboard.published_events += 1,
                EventStatus::Pending => dashboard.pending_events += 1,
                EventStatus::Draft | EventStatus::Rejected => {}
            }
        }
        dashboard.total_registrations = self.store.read_registrations(|t| t.active_count())?;
        Ok(dashboard)
    }

    /// Admin-only audit trail of an event, oldest first.
    pub fn history(
        &self,
        actor: &Principal,
        event_id: EventId,
    ) -> Result<Vec<JournalEntry>, ServiceError> {
        authorize(actor, &Permission::EVENTS_VIEW_ALL)?;

        let entries = self
            .journal
            .load_stream(EVENT_STREAM, &event_id.to_string())?;
        if entries.is_empty() {
            return Err(CatalogError::EventNotFound { event_id }.into());
        }
        Ok(entries)
    }

    fn owned_by(&self, actor: &Principal) -> Result<Vec<Event>, ServiceError> {
        Ok(self
            .store
            .event_snapshots()?
            .into_iter()
            .filter(|e| e.owner == actor.account_id)
            .collect())
    }

    /// Decide, journal and apply under the event's slot lock.
    fn mutate(
        &self,
        event_id: EventId,
        decide: impl FnOnce(&Event) -> Result<Vec<CatalogEvent>, ServiceError>,
    ) -> Result<Event, ServiceError> {
        let outcome = self
            .store
            .with_event(event_id, |slot| -> Result<Event, ServiceError> {
                let events = decide(&slot.event)?;
                journal::record(&*self.journal, EVENT_STREAM, &mut slot.event, events)?;
                Ok(slot.event.clone())
            })?;
        outcome.ok_or(CatalogError::EventNotFound { event_id })?
    }
}
