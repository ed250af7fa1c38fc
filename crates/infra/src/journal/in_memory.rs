use std::collections::HashMap;
use std::sync::RwLock;

use eventdesk_core::ExpectedVersion;

use super::r#trait::{Journal, JournalEntry, JournalError, UncommittedEntry};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StreamKey {
    stream_type: String,
    stream_id: String,
}

/// In-memory journal. Contents live as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    streams: RwLock<HashMap<StreamKey, Vec<JournalEntry>>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[JournalEntry]) -> u64 {
        stream.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl Journal for InMemoryJournal {
    fn append(
        &self,
        entries: Vec<UncommittedEntry>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<JournalEntry>, JournalError> {
        let Some(first) = entries.first() else {
            return Ok(vec![]);
        };
        let key = StreamKey {
            stream_type: first.stream_type.clone(),
            stream_id: first.stream_id.clone(),
        };

        for (idx, e) in entries.iter().enumerate() {
            if e.stream_type != key.stream_type || e.stream_id != key.stream_id {
                return Err(JournalError::InvalidAppend(format!(
                    "batch spans multiple streams (index {idx})"
                )));
            }
        }

        let mut streams = self.streams.write().map_err(|_| JournalError::Poisoned)?;
        let stream = streams.entry(key).or_default();
        let current = Self::current_version(stream);

        if !expected_version.matches(current) {
            return Err(JournalError::Concurrency(format!(
                "expected {expected_version:?}, found {current}"
            )));
        }

        let mut next = current + 1;
        let mut committed = Vec::with_capacity(entries.len());
        for e in entries {
            let entry = JournalEntry {
                entry_id: e.entry_id,
                stream_type: e.stream_type,
                stream_id: e.stream_id,
                sequence_number: next,
                event_type: e.event_type,
                event_version: e.event_version,
                occurred_at: e.occurred_at,
                payload: e.payload,
            };
            next += 1;
            stream.push(entry.clone());
            committed.push(entry);
        }

        Ok(committed)
    }

    fn load_stream(
        &self,
        stream_type: &str,
        stream_id: &str,
    ) -> Result<Vec<JournalEntry>, JournalError> {
        let key = StreamKey {
            stream_type: stream_type.to_string(),
            stream_id: stream_id.to_string(),
        };
        let streams = self.streams.read().map_err(|_| JournalError::Poisoned)?;
        Ok(streams.get(&key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn entry(stream_id: &str, event_type: &str) -> UncommittedEntry {
        UncommittedEntry {
            entry_id: Uuid::now_v7(),
            stream_type: "catalog.event".to_string(),
            stream_id: stream_id.to_string(),
            event_type: event_type.to_string(),
            event_version: 1,
            occurred_at: Utc::now(),
            payload: json!({}),
        }
    }

    #[test]
    fn sequence_numbers_continue_across_appends() {
        let journal = InMemoryJournal::new();
        journal
            .append(vec![entry("e1", "created"), entry("e1", "submitted")], ExpectedVersion::Exact(0))
            .unwrap();
        let committed = journal
            .append(vec![entry("e1", "published")], ExpectedVersion::Exact(2))
            .unwrap();
        assert_eq!(committed[0].sequence_number, 3);

        let stream = journal.load_stream("catalog.event", "e1").unwrap();
        let seqs: Vec<u64> = stream.iter().map(|e| e.sequence_number).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn stale_expected_version_is_rejected() {
        let journal = InMemoryJournal::new();
        journal.append(vec![entry("e1", "created")], ExpectedVersion::Exact(0)).unwrap();

        let err = journal
            .append(vec![entry("e1", "submitted")], ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, JournalError::Concurrency(_)));
        assert_eq!(journal.load_stream("catalog.event", "e1").unwrap().len(), 1);
    }

    #[test]
    fn batch_must_target_one_stream() {
        let journal = InMemoryJournal::new();
        let err = journal
            .append(vec![entry("e1", "created"), entry("e2", "created")], ExpectedVersion::Any)
            .unwrap_err();
        assert!(matches!(err, JournalError::InvalidAppend(_)));
        assert!(journal.load_stream("catalog.event", "e1").unwrap().is_empty());
    }
}
