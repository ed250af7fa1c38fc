//! `eventdesk-registration`: registrations of attendees to catalog events.
//!
//! The capacity check itself lives on the catalog event's seat counter; this
//! crate models the registration record, its identifier and attendee.

pub mod attendee;
pub mod clock;
pub mod error;
pub mod id;
pub mod registration;

pub use attendee::Attendee;
pub use clock::IssuanceClock;
pub use error::LedgerError;
pub use id::RegistrationId;
pub use registration::{
    CancelRegistration, IssueRegistration, Registration, RegistrationCommand, RegistrationEvent,
    RegistrationStatus,
};
