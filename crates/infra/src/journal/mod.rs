//! Append-only audit journal.
//!
//! Every committed domain event is recorded in a per-stream, sequenced
//! journal before the aggregate that produced it moves on.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryJournal;
pub use r#trait::{Journal, JournalEntry, JournalError, UncommittedEntry};

use serde::Serialize;

use eventdesk_core::{Aggregate, AggregateRoot, DomainEvent, ExpectedVersion};

pub const ACCOUNT_STREAM: &str = "identity.account";
pub const EVENT_STREAM: &str = "catalog.event";
pub const REGISTRATION_STREAM: &str = "registration";

/// Append `events` to the aggregate's stream, then apply them.
///
/// The append is checked against the aggregate's current version, so a
/// stale aggregate is rejected before its state changes.
pub fn record<A>(
    journal: &dyn Journal,
    stream_type: &str,
    aggregate: &mut A,
    events: Vec<A::Event>,
) -> Result<Vec<JournalEntry>, JournalError>
where
    A: Aggregate,
    A::Event: DomainEvent + Serialize,
{
    if events.is_empty() {
        return Ok(vec![]);
    }

    let stream_id = aggregate.id().to_string();
    let entries = events
        .iter()
        .map(|e| UncommittedEntry::from_typed(stream_type, &stream_id, e))
        .collect::<Result<Vec<_>, _>>()?;

    let committed = journal.append(entries, ExpectedVersion::Exact(aggregate.version()))?;
    for event in &events {
        aggregate.apply(event);
    }
    Ok(committed)
}
