use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use eventdesk_core::{DomainEvent, ExpectedVersion};

/// A domain event ready to be appended (no sequence number yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEntry {
    pub entry_id: Uuid,
    /// Kind of aggregate the stream belongs to, e.g. `catalog.event`.
    pub stream_type: String,
    pub stream_id: String,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

/// A journaled event with its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entry_id: Uuid,
    pub stream_type: String,
    pub stream_id: String,

    /// 1-based, gapless position in the stream.
    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("journal lock poisoned")]
    Poisoned,
}

/// Append-only, per-stream sequenced journal.
///
/// `append` is all-or-nothing for a batch, which must target a single
/// stream; sequence numbers continue from the stream's current length.
/// `load_stream` returns an empty vector for an unknown stream.
pub trait Journal: Send + Sync {
    fn append(
        &self,
        entries: Vec<UncommittedEntry>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<JournalEntry>, JournalError>;

    fn load_stream(
        &self,
        stream_type: &str,
        stream_id: &str,
    ) -> Result<Vec<JournalEntry>, JournalError>;
}

impl UncommittedEntry {
    pub fn from_typed<E>(
        stream_type: impl Into<String>,
        stream_id: impl Into<String>,
        event: &E,
    ) -> Result<Self, JournalError>
    where
        E: DomainEvent + Serialize,
    {
        let payload = serde_json::to_value(event).map_err(|e| {
            JournalError::InvalidAppend(format!("payload serialization failed: {e}"))
        })?;

        Ok(Self {
            entry_id: Uuid::now_v7(),
            stream_type: stream_type.into(),
            stream_id: stream_id.into(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}
