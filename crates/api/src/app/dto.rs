use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_catalog::schedule::{hhmm, parse_time};
use eventdesk_catalog::{
    CatalogFilter, Countdown, Event, EventDetails, EventFormat, EventStatus, ScheduleStatus,
    SortOrder,
};
use eventdesk_core::{AccountId, DomainError, EventId};
use eventdesk_identity::{Account, ApprovalStatus, Role};
use eventdesk_infra::ServiceError;
use eventdesk_infra::services::{
    AttendeeRegistration, EventDraft, EventPatch, TicketFreshness, TicketVerifier,
};
use eventdesk_infra::store::RegistrationRecord;
use eventdesk_registration::{Attendee, RegistrationId, RegistrationStatus};
use eventdesk_tickets::{TicketPayload, encode};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: chrono::NaiveTime,
    pub format: EventFormat,
    pub image_url: Option<String>,
    pub capacity: u32,
}

impl From<CreateEventRequest> for EventDraft {
    fn from(body: CreateEventRequest) -> Self {
        EventDraft {
            details: EventDetails {
                title: body.title,
                description: body.description,
                category: body.category,
                date: body.date,
                time: body.time,
                format: body.format,
                image_url: body.image_url,
            },
            capacity: body.capacity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    /// `HH:MM`.
    pub time: Option<String>,
    pub format: Option<EventFormat>,
    pub image_url: Option<String>,
    pub capacity: Option<u32>,
}

impl UpdateEventRequest {
    pub fn into_patch(self) -> Result<EventPatch, DomainError> {
        let time = self.time.as_deref().map(parse_time).transpose()?;
        Ok(EventPatch {
            title: self.title,
            description: self.description,
            category: self.category,
            date: self.date,
            time,
            format: self.format,
            image_url: self.image_url,
            capacity: self.capacity,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GuestRegistrationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturedRequest {
    pub featured: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub status: ApprovalStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

impl CatalogQuery {
    pub fn into_filter(self) -> Result<CatalogFilter, DomainError> {
        let sort = match self.sort.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<SortOrder>()?,
            _ => SortOrder::default(),
        };
        Ok(CatalogFilter {
            category: self.category,
            text: self.q,
            sort,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    pub fn parse(&self) -> Result<Option<EventStatus>, DomainError> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty() && !s.trim().eq_ignore_ascii_case("all"))
            .map(str::parse)
            .transpose()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

impl RoleQuery {
    pub fn parse(&self) -> Result<Option<Role>, DomainError> {
        self.role
            .as_deref()
            .filter(|s| !s.trim().is_empty() && !s.trim().eq_ignore_ascii_case("all"))
            .map(str::parse)
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub data: String,
    #[serde(default)]
    pub fresh: bool,
}

pub fn parse_event_id(raw: &str) -> Result<EventId, DomainError> {
    raw.parse()
}

pub fn parse_account_id(raw: &str) -> Result<AccountId, DomainError> {
    raw.parse()
}

pub fn parse_registration_id(raw: &str) -> Result<RegistrationId, DomainError> {
    raw.parse()
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: AccountId,
    pub email: String,
    pub role: Role,
    pub approval_status: ApprovalStatus,
    pub display_name: String,
    pub organization_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
            approval_status: account.approval_status,
            display_name: account.display_name.clone(),
            organization_name: account.organization_name.clone(),
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Absent when the account must wait for approval.
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub requires_approval: bool,
    pub account: AccountView,
}

#[derive(Debug, Serialize)]
pub struct EventView {
    pub id: EventId,
    pub owner: AccountId,
    pub organizer_name: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: chrono::NaiveTime,
    pub format: EventFormat,
    pub image_url: Option<String>,
    pub capacity: u32,
    pub registered_count: u32,
    pub spots_remaining: u32,
    pub fill_percent: u8,
    pub status: EventStatus,
    pub featured: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub schedule_status: ScheduleStatus,
    pub countdown: Countdown,
}

impl EventView {
    pub fn at(event: &Event, now: DateTime<Utc>) -> Self {
        let details = &event.details;
        Self {
            id: event.id,
            owner: event.owner,
            organizer_name: event.organizer_name.clone(),
            title: details.title.clone(),
            description: details.description.clone(),
            category: details.category.clone(),
            date: details.date,
            time: details.time,
            format: details.format.clone(),
            image_url: details.image_url.clone(),
            capacity: event.capacity,
            registered_count: event.registered_count,
            spots_remaining: event.spots_remaining(),
            fill_percent: event.fill_percent(),
            status: event.status,
            featured: event.featured,
            created_at: event.created_at,
            schedule_status: event.schedule_status(now),
            countdown: event.countdown(now),
        }
    }

    pub fn list(events: &[Event], now: DateTime<Utc>) -> Vec<Self> {
        events.iter().map(|e| Self::at(e, now)).collect()
    }
}

/// Issued ticket with its scannable encoding.
#[derive(Debug, Serialize)]
pub struct TicketView {
    pub payload: TicketPayload,
    pub data: String,
    pub verification_link: String,
}

impl TicketView {
    pub fn new(payload: TicketPayload, verifier: &TicketVerifier) -> Result<Self, ServiceError> {
        let data = encode(&payload)?;
        let verification_link = verifier.link_for(&payload)?;
        Ok(Self {
            payload,
            data,
            verification_link,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegistrationView {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub status: RegistrationStatus,
    pub attendee: Attendee,
    pub issued_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub ticket: TicketView,
}

impl RegistrationView {
    pub fn new(record: RegistrationRecord, verifier: &TicketVerifier) -> Result<Self, ServiceError> {
        let registration = record.registration;
        Ok(Self {
            registration_id: registration.id,
            event_id: registration.event_id,
            status: registration.status,
            attendee: registration.attendee,
            issued_at: registration.issued_at,
            cancelled_at: registration.cancelled_at,
            ticket: TicketView::new(record.ticket, verifier)?,
        })
    }
}

/// A registration as its attendee sees it: frozen ticket plus the live event.
#[derive(Debug, Serialize)]
pub struct MyRegistrationView {
    pub registration_id: RegistrationId,
    pub status: RegistrationStatus,
    pub issued_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub ticket: TicketView,
    pub event: EventView,
}

impl MyRegistrationView {
    pub fn new(
        registration: AttendeeRegistration,
        verifier: &TicketVerifier,
        now: DateTime<Utc>,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            event: EventView::at(&registration.event, now),
            registration_id: registration.registration_id,
            status: registration.status,
            issued_at: registration.issued_at,
            cancelled_at: registration.cancelled_at,
            ticket: TicketView::new(registration.ticket, verifier)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CancellationView {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub status: RegistrationStatus,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TicketVerification {
    pub valid: bool,
    pub ticket: TicketPayload,
    /// Only present when the caller asked for a ledger check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freshness: Option<TicketFreshness>,
}
