//! Catalog event aggregate (event-sourced).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{AccountId, Aggregate, AggregateRoot, DomainError, DomainEvent, EventId};

use crate::CatalogError;

// ─────────────────────────────────────────────────────────────────────────────
// Status & Policies
// ─────────────────────────────────────────────────────────────────────────────

/// Moderation lifecycle state. Only `Published` events are publicly visible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    #[default]
    Pending,
    Published,
    Rejected,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Pending => "pending",
            EventStatus::Published => "published",
            EventStatus::Rejected => "rejected",
        }
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(EventStatus::Draft),
            "pending" => Ok(EventStatus::Pending),
            "published" => Ok(EventStatus::Published),
            "rejected" => Ok(EventStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown event status '{other}'"))),
        }
    }
}

/// Action attempted against the lifecycle, reported in `IllegalTransition`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    Submit,
    Approve,
    Reject,
    Edit,
    Feature,
}

impl core::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::Approve => "approve",
            LifecycleAction::Reject => "reject",
            LifecycleAction::Edit => "edit",
            LifecycleAction::Feature => "feature",
        })
    }
}

/// Admin moderation decision on a pending event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationDecision {
    Approve,
    Reject,
}

/// Where a rejected event goes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RejectionPolicy {
    /// Back to `draft`; the owner may edit and resubmit.
    #[default]
    ReturnToDraft,
    /// To `rejected`, which accepts no further transitions or edits.
    Terminal,
}

impl core::str::FromStr for RejectionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "return_to_draft" => Ok(RejectionPolicy::ReturnToDraft),
            "terminal" | "rejected" => Ok(RejectionPolicy::Terminal),
            other => Err(DomainError::validation(format!(
                "unknown rejection policy '{other}' (expected draft or terminal)"
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Details
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::validation("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::validation("longitude must be within [-180, 180]"));
        }
        Ok(Self { latitude, longitude })
    }
}

/// Venue or online delivery of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventFormat {
    Venue {
        location: String,
        coordinates: Option<GeoPoint>,
    },
    Online {
        location: String,
        stream_ref: Option<String>,
    },
}

impl EventFormat {
    pub fn location(&self) -> &str {
        match self {
            EventFormat::Venue { location, .. } | EventFormat::Online { location, .. } => location,
        }
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        match self {
            EventFormat::Venue { coordinates, .. } => *coordinates,
            EventFormat::Online { .. } => None,
        }
    }
}

impl Default for EventFormat {
    fn default() -> Self {
        EventFormat::Venue {
            location: String::new(),
            coordinates: None,
        }
    }
}

/// Owner-editable descriptive fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(with = "crate::schedule::hhmm")]
    pub time: NaiveTime,
    pub format: EventFormat,
    pub image_url: Option<String>,
}

impl EventDetails {
    /// Trim text fields and check what is required.
    fn normalized(&self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        let category = self.category.trim().to_string();
        if category.is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }

        let format = match &self.format {
            EventFormat::Venue {
                location,
                coordinates,
            } => {
                if let Some(point) = coordinates {
                    GeoPoint::new(point.latitude, point.longitude)?;
                }
                EventFormat::Venue {
                    location: location.trim().to_string(),
                    coordinates: *coordinates,
                }
            }
            EventFormat::Online {
                location,
                stream_ref,
            } => EventFormat::Online {
                location: location.trim().to_string(),
                stream_ref: stream_ref
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            },
        };
        if format.location().is_empty() {
            return Err(DomainError::validation("location cannot be empty"));
        }

        Ok(Self {
            title,
            description: self.description.trim().to_string(),
            category,
            date: self.date,
            time: self.time,
            format,
            image_url: self.image_url.clone(),
        })
    }
}

fn ensure_capacity(capacity: u32) -> Result<(), DomainError> {
    if capacity == 0 {
        return Err(DomainError::validation("capacity must be positive"));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Event Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Catalog event aggregate.
///
/// # Invariants
/// - `0 <= registered_count <= capacity`, `capacity > 0`.
/// - Status changes only along the moderation lifecycle.
/// - Only published events can be featured or take registrations.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: EventId,
    pub owner: AccountId,
    pub organizer_name: String,
    pub details: EventDetails,
    pub capacity: u32,
    pub registered_count: u32,
    pub status: EventStatus,
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub created: bool,
}

impl Event {
    pub fn empty(id: EventId) -> Self {
        Self {
            id,
            owner: AccountId::from_uuid(Default::default()),
            organizer_name: String::new(),
            details: EventDetails::default(),
            capacity: 0,
            registered_count: 0,
            status: EventStatus::default(),
            featured: false,
            created_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == EventStatus::Published
    }

    pub fn spots_remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.registered_count)
    }

    /// Registered share of capacity, rounded, capped at 100.
    pub fn fill_percent(&self) -> u8 {
        if self.capacity == 0 {
            return 0;
        }
        let registered = u64::from(self.registered_count);
        let capacity = u64::from(self.capacity);
        ((registered * 100 + capacity / 2) / capacity).min(100) as u8
    }

    fn ensure_exists(&self) -> Result<(), CatalogError> {
        if !self.created {
            return Err(CatalogError::EventNotFound { event_id: self.id });
        }
        Ok(())
    }

    fn illegal(&self, action: LifecycleAction) -> CatalogError {
        CatalogError::IllegalTransition {
            event_id: self.id,
            from: self.status,
            action,
        }
    }
}

impl AggregateRoot for Event {
    type Id = EventId;

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
pub struct CreateEvent {
    pub event_id: EventId,
    pub owner: AccountId,
    pub organizer_name: String,
    pub details: EventDetails,
    pub capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SubmitEvent {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ModerateEvent {
    pub event_id: EventId,
    pub decision: ModerationDecision,
    pub policy: RejectionPolicy,
    pub occurred_at: DateTime<Utc>,
}

/// Replaces details and capacity wholesale; callers merge partial edits first.
#[derive(Debug, Clone)]
pub struct UpdateEventDetails {
    pub event_id: EventId,
    pub details: EventDetails,
    pub capacity: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SetFeatured {
    pub event_id: EventId,
    pub featured: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReserveSeat {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReleaseSeat {
    pub event_id: EventId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum EventCommand {
    Create(CreateEvent),
    Submit(SubmitEvent),
    Moderate(ModerateEvent),
    UpdateDetails(UpdateEventDetails),
    SetFeatured(SetFeatured),
    ReserveSeat(ReserveSeat),
    ReleaseSeat(ReleaseSeat),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CatalogEvent {
    Created {
        event_id: EventId,
        owner: AccountId,
        organizer_name: String,
        details: EventDetails,
        capacity: u32,
        occurred_at: DateTime<Utc>,
    },
    Submitted {
        event_id: EventId,
        occurred_at: DateTime<Utc>,
    },
    Published {
        event_id: EventId,
        occurred_at: DateTime<Utc>,
    },
    Rejected {
        event_id: EventId,
        to: EventStatus,
        occurred_at: DateTime<Utc>,
    },
    DetailsUpdated {
        event_id: EventId,
        details: EventDetails,
        capacity: u32,
        occurred_at: DateTime<Utc>,
    },
    FeaturedChanged {
        event_id: EventId,
        featured: bool,
        occurred_at: DateTime<Utc>,
    },
    SeatReserved {
        event_id: EventId,
        registered_count: u32,
        occurred_at: DateTime<Utc>,
    },
    SeatReleased {
        event_id: EventId,
        registered_count: u32,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::Created { .. } => "catalog.event.created",
            CatalogEvent::Submitted { .. } => "catalog.event.submitted",
            CatalogEvent::Published { .. } => "catalog.event.published",
            CatalogEvent::Rejected { .. } => "catalog.event.rejected",
            CatalogEvent::DetailsUpdated { .. } => "catalog.event.details_updated",
            CatalogEvent::FeaturedChanged { .. } => "catalog.event.featured_changed",
            CatalogEvent::SeatReserved { .. } => "catalog.event.seat_reserved",
            CatalogEvent::SeatReleased { .. } => "catalog.event.seat_released",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CatalogEvent::Created { occurred_at, .. }
            | CatalogEvent::Submitted { occurred_at, .. }
            | CatalogEvent::Published { occurred_at, .. }
            | CatalogEvent::Rejected { occurred_at, .. }
            | CatalogEvent::DetailsUpdated { occurred_at, .. }
            | CatalogEvent::FeaturedChanged { occurred_at, .. }
            | CatalogEvent::SeatReserved { occurred_at, .. }
            | CatalogEvent::SeatReleased { occurred_at, .. } => *occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Event {
    type Command = EventCommand;
    type Event = CatalogEvent;
    type Error = CatalogError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CatalogEvent::Created {
                event_id,
                owner,
                organizer_name,
                details,
                capacity,
                occurred_at,
            } => {
                self.id = *event_id;
                self.owner = *owner;
                self.organizer_name = organizer_name.clone();
                self.details = details.clone();
                self.capacity = *capacity;
                self.registered_count = 0;
                self.status = EventStatus::Pending;
                self.featured = false;
                self.created_at = Some(*occurred_at);
                self.created = true;
            }
            CatalogEvent::Submitted { .. } => self.status = EventStatus::Pending,
            CatalogEvent::Published { .. } => self.status = EventStatus::Published,
            CatalogEvent::Rejected { to, .. } => self.status = *to,
            CatalogEvent::DetailsUpdated {
                details, capacity, ..
            } => {
                self.details = details.clone();
                self.capacity = *capacity;
            }
            CatalogEvent::FeaturedChanged { featured, .. } => self.featured = *featured,
            CatalogEvent::SeatReserved {
                registered_count, ..
            }
            | CatalogEvent::SeatReleased {
                registered_count, ..
            } => self.registered_count = *registered_count,
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            EventCommand::Create(cmd) => self.handle_create(cmd),
            EventCommand::Submit(cmd) => self.handle_submit(cmd),
            EventCommand::Moderate(cmd) => self.handle_moderate(cmd),
            EventCommand::UpdateDetails(cmd) => self.handle_update_details(cmd),
            EventCommand::SetFeatured(cmd) => self.handle_set_featured(cmd),
            EventCommand::ReserveSeat(cmd) => self.handle_reserve_seat(cmd),
            EventCommand::ReleaseSeat(cmd) => self.handle_release_seat(cmd),
        }
    }
}

impl Event {
    // ─────────────────────────────────────────────────────────────────────────
    // Command Handlers
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_create(&self, cmd: &CreateEvent) -> Result<Vec<CatalogEvent>, CatalogError> {
        if self.created {
            return Err(DomainError::invariant("event already exists").into());
        }
        ensure_capacity(cmd.capacity)?;
        let details = cmd.details.normalized()?;

        Ok(vec![CatalogEvent::Created {
            event_id: cmd.event_id,
            owner: cmd.owner,
            organizer_name: cmd.organizer_name.trim().to_string(),
            details,
            capacity: cmd.capacity,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_submit(&self, cmd: &SubmitEvent) -> Result<Vec<CatalogEvent>, CatalogError> {
        self.ensure_exists()?;
        if self.status != EventStatus::Draft {
            return Err(self.illegal(LifecycleAction::Submit));
        }
        Ok(vec![CatalogEvent::Submitted {
            event_id: cmd.event_id,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_moderate(&self, cmd: &ModerateEvent) -> Result<Vec<CatalogEvent>, CatalogError> {
        self.ensure_exists()?;
        let action = match cmd.decision {
            ModerationDecision::Approve => LifecycleAction::Approve,
            ModerationDecision::Reject => LifecycleAction::Reject,
        };
        if self.status != EventStatus::Pending {
            return Err(self.illegal(action));
        }

        let event = match cmd.decision {
            ModerationDecision::Approve => CatalogEvent::Published {
                event_id: cmd.event_id,
                occurred_at: cmd.occurred_at,
            },
            ModerationDecision::Reject => CatalogEvent::Rejected {
                event_id: cmd.event_id,
                to: match cmd.policy {
                    RejectionPolicy::ReturnToDraft => EventStatus::Draft,
                    RejectionPolicy::Terminal => EventStatus::Rejected,
                },
                occurred_at: cmd.occurred_at,
            },
        };
        Ok(vec![event])
    }

    fn handle_update_details(
        &self,
        cmd: &UpdateEventDetails,
    ) -> Result<Vec<CatalogEvent>, CatalogError> {
        self.ensure_exists()?;
        if self.status == EventStatus::Rejected {
            return Err(self.illegal(LifecycleAction::Edit));
        }
        ensure_capacity(cmd.capacity)?;
        if cmd.capacity < self.registered_count {
            return Err(CatalogError::CapacityBelowRegistrations {
                event_id: self.id,
                capacity: cmd.capacity,
                registered: self.registered_count,
            });
        }
        let details = cmd.details.normalized()?;

        Ok(vec![CatalogEvent::DetailsUpdated {
            event_id: cmd.event_id,
            details,
            capacity: cmd.capacity,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_set_featured(&self, cmd: &SetFeatured) -> Result<Vec<CatalogEvent>, CatalogError> {
        self.ensure_exists()?;
        if cmd.featured && !self.is_published() {
            return Err(self.illegal(LifecycleAction::Feature));
        }
        if self.featured == cmd.featured {
            return Ok(vec![]);
        }
        Ok(vec![CatalogEvent::FeaturedChanged {
            event_id: cmd.event_id,
            featured: cmd.featured,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_reserve_seat(&self, cmd: &ReserveSeat) -> Result<Vec<CatalogEvent>, CatalogError> {
        self.ensure_exists()?;
        if !self.is_published() {
            return Err(CatalogError::NotPublished { event_id: self.id });
        }
        if self.registered_count >= self.capacity {
            return Err(CatalogError::SoldOut {
                event_id: self.id,
                capacity: self.capacity,
            });
        }
        Ok(vec![CatalogEvent::SeatReserved {
            event_id: cmd.event_id,
            registered_count: self.registered_count + 1,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_release_seat(&self, cmd: &ReleaseSeat) -> Result<Vec<CatalogEvent>, CatalogError> {
        self.ensure_exists()?;
        // Floor at zero.
        if self.registered_count == 0 {
            return Ok(vec![]);
        }
        Ok(vec![CatalogEvent::SeatReleased {
            event_id: cmd.event_id,
            registered_count: self.registered_count - 1,
            occurred_at: cmd.occurred_at,
        }])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn test_details() -> EventDetails {
        EventDetails {
            title: "  RustConf Meetup ".to_string(),
            description: "Talks and pizza".to_string(),
            category: "Technology".to_string(),
            date: NaiveDate::from_ymd_opt(2030, 5, 17).unwrap(),
            time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            format: EventFormat::Venue {
                location: "Hall A".to_string(),
                coordinates: Some(GeoPoint {
                    latitude: 52.52,
                    longitude: 13.40,
                }),
            },
            image_url: None,
        }
    }

    fn run(event: &mut Event, cmd: EventCommand) -> Result<usize, CatalogError> {
        let events = event.handle(&cmd)?;
        let count = events.len();
        for e in events {
            event.apply(&e);
        }
        Ok(count)
    }

    fn created(capacity: u32) -> Event {
        let id = EventId::new();
        let mut event = Event::empty(id);
        run(
            &mut event,
            EventCommand::Create(CreateEvent {
                event_id: id,
                owner: AccountId::new(),
                organizer_name: "Acme".to_string(),
                details: test_details(),
                capacity,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        event
    }

    fn moderate(
        event: &mut Event,
        decision: ModerationDecision,
        policy: RejectionPolicy,
    ) -> Result<usize, CatalogError> {
        let event_id = event.id;
        run(
            event,
            EventCommand::Moderate(ModerateEvent {
                event_id,
                decision,
                policy,
                occurred_at: test_time(),
            }),
        )
    }

    fn published(capacity: u32) -> Event {
        let mut event = created(capacity);
        moderate(&mut event, ModerationDecision::Approve, RejectionPolicy::default()).unwrap();
        event
    }

    fn reserve(event: &mut Event) -> Result<usize, CatalogError> {
        let event_id = event.id;
        run(
            event,
            EventCommand::ReserveSeat(ReserveSeat {
                event_id,
                occurred_at: test_time(),
            }),
        )
    }

    fn release(event: &mut Event) -> Result<usize, CatalogError> {
        let event_id = event.id;
        run(
            event,
            EventCommand::ReleaseSeat(ReleaseSeat {
                event_id,
                occurred_at: test_time(),
            }),
        )
    }

    #[test]
    fn create_starts_pending_with_trimmed_fields() {
        let event = created(50);
        assert_eq!(event.status, EventStatus::Pending);
        assert_eq!(event.registered_count, 0);
        assert_eq!(event.details.title, "RustConf Meetup");
        assert!(!event.featured);
    }

    #[test]
    fn create_rejects_zero_capacity_and_bad_coordinates() {
        let id = EventId::new();
        let event = Event::empty(id);
        let zero = EventCommand::Create(CreateEvent {
            event_id: id,
            owner: AccountId::new(),
            organizer_name: "Acme".to_string(),
            details: test_details(),
            capacity: 0,
            occurred_at: test_time(),
        });
        assert!(matches!(event.handle(&zero), Err(CatalogError::Domain(_))));

        let mut details = test_details();
        details.format = EventFormat::Venue {
            location: "Nowhere".to_string(),
            coordinates: Some(GeoPoint {
                latitude: 123.0,
                longitude: 0.0,
            }),
        };
        let bad = EventCommand::Create(CreateEvent {
            event_id: id,
            owner: AccountId::new(),
            organizer_name: "Acme".to_string(),
            details,
            capacity: 10,
            occurred_at: test_time(),
        });
        assert!(event.handle(&bad).is_err());
    }

    #[test]
    fn approve_pending_publishes() {
        let event = published(10);
        assert_eq!(event.status, EventStatus::Published);
    }

    #[test]
    fn approve_draft_is_illegal() {
        let mut event = created(10);
        moderate(&mut event, ModerationDecision::Reject, RejectionPolicy::ReturnToDraft).unwrap();
        assert_eq!(event.status, EventStatus::Draft);

        match moderate(&mut event, ModerationDecision::Approve, RejectionPolicy::default()) {
            Err(CatalogError::IllegalTransition { from, action, .. }) => {
                assert_eq!(from, EventStatus::Draft);
                assert_eq!(action, LifecycleAction::Approve);
            }
            other => panic!("Expected IllegalTransition, got {other:?}"),
        }
    }

    #[test]
    fn published_is_terminal_for_moderation() {
        let mut event = published(10);
        assert!(matches!(
            moderate(&mut event, ModerationDecision::Reject, RejectionPolicy::default()),
            Err(CatalogError::IllegalTransition { from: EventStatus::Published, .. })
        ));
    }

    #[test]
    fn rejected_draft_can_be_resubmitted() {
        let mut event = created(10);
        moderate(&mut event, ModerationDecision::Reject, RejectionPolicy::ReturnToDraft).unwrap();
        let event_id = event.id;
        run(
            &mut event,
            EventCommand::Submit(SubmitEvent {
                event_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(event.status, EventStatus::Pending);
    }

    #[test]
    fn terminal_rejection_blocks_resubmission_and_edits() {
        let mut event = created(10);
        moderate(&mut event, ModerationDecision::Reject, RejectionPolicy::Terminal).unwrap();
        assert_eq!(event.status, EventStatus::Rejected);

        let event_id = event.id;
        let submit = EventCommand::Submit(SubmitEvent {
            event_id,
            occurred_at: test_time(),
        });
        assert!(matches!(
            event.handle(&submit),
            Err(CatalogError::IllegalTransition { action: LifecycleAction::Submit, .. })
        ));

        let edit = EventCommand::UpdateDetails(UpdateEventDetails {
            event_id,
            details: test_details(),
            capacity: 10,
            occurred_at: test_time(),
        });
        assert!(matches!(
            event.handle(&edit),
            Err(CatalogError::IllegalTransition { action: LifecycleAction::Edit, .. })
        ));
    }

    #[test]
    fn submit_only_from_draft() {
        let event = created(10);
        let cmd = EventCommand::Submit(SubmitEvent {
            event_id: event.id,
            occurred_at: test_time(),
        });
        assert!(matches!(
            event.handle(&cmd),
            Err(CatalogError::IllegalTransition { from: EventStatus::Pending, .. })
        ));
    }

    #[test]
    fn reserve_requires_published_and_free_seat() {
        let mut pending = created(1);
        assert!(matches!(reserve(&mut pending), Err(CatalogError::NotPublished { .. })));

        let mut event = published(1);
        reserve(&mut event).unwrap();
        assert_eq!(event.registered_count, 1);
        assert!(matches!(
            reserve(&mut event),
            Err(CatalogError::SoldOut { capacity: 1, .. })
        ));
    }

    #[test]
    fn release_floors_at_zero() {
        let mut event = published(2);
        assert_eq!(release(&mut event).unwrap(), 0);
        assert_eq!(event.registered_count, 0);
    }

    #[test]
    fn capacity_cannot_drop_below_registrations() {
        let mut event = published(5);
        reserve(&mut event).unwrap();
        reserve(&mut event).unwrap();

        let cmd = EventCommand::UpdateDetails(UpdateEventDetails {
            event_id: event.id,
            details: test_details(),
            capacity: 1,
            occurred_at: test_time(),
        });
        assert!(matches!(
            event.handle(&cmd),
            Err(CatalogError::CapacityBelowRegistrations {
                capacity: 1,
                registered: 2,
                ..
            })
        ));
    }

    #[test]
    fn only_published_events_can_be_featured() {
        let mut event = created(5);
        let event_id = event.id;
        let feature = || {
            EventCommand::SetFeatured(SetFeatured {
                event_id,
                featured: true,
                occurred_at: test_time(),
            })
        };
        assert!(event.handle(&feature()).is_err());

        moderate(&mut event, ModerationDecision::Approve, RejectionPolicy::default()).unwrap();
        assert_eq!(run(&mut event, feature()).unwrap(), 1);
        assert!(event.featured);
        assert_eq!(run(&mut event, feature()).unwrap(), 0);
    }

    #[test]
    fn fill_percent_and_spots_remaining() {
        let mut event = published(3);
        reserve(&mut event).unwrap();
        assert_eq!(event.spots_remaining(), 2);
        assert_eq!(event.fill_percent(), 33);
        reserve(&mut event).unwrap();
        reserve(&mut event).unwrap();
        assert_eq!(event.fill_percent(), 100);
        assert_eq!(event.spots_remaining(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any interleaving of reservations and releases keeps the
        /// counter within [0, capacity].
        #[test]
        fn seat_counter_stays_within_capacity(
            capacity in 1u32..20,
            ops in prop::collection::vec(any::<bool>(), 0..200)
        ) {
            let mut event = published(capacity);
            for reserve_op in ops {
                let before = event.registered_count;
                let outcome = if reserve_op { reserve(&mut event) } else { release(&mut event) };
                match outcome {
                    Ok(_) => {}
                    Err(CatalogError::SoldOut { .. }) => prop_assert_eq!(before, capacity),
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
                prop_assert!(event.registered_count <= event.capacity);
            }
        }
    }
}
