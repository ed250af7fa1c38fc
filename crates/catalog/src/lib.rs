//! `eventdesk-catalog`: catalog events, their moderation lifecycle and seat counter.
//!
//! Lifecycle:
//!
//! ```text
//! draft --submit--> pending --approve--> published
//!                   pending --reject---> draft      (RejectionPolicy::ReturnToDraft)
//!                   pending --reject---> rejected   (RejectionPolicy::Terminal)
//! ```

pub mod error;
pub mod event;
pub mod query;
pub mod schedule;
pub mod stats;

pub use error::CatalogError;
pub use event::{
    CatalogEvent, CreateEvent, Event, EventCommand, EventDetails, EventFormat, EventStatus,
    GeoPoint, LifecycleAction, ModerateEvent, ModerationDecision, RejectionPolicy, ReleaseSeat,
    ReserveSeat, SetFeatured, SubmitEvent, UpdateEventDetails,
};
pub use query::{CatalogFilter, SortOrder, list_featured, list_mapped, list_published};
pub use schedule::{Countdown, ScheduleStatus};
pub use stats::CompanyDashboard;
