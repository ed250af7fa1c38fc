use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{DomainError, EventId};

const PREFIX: &str = "REG-";

/// Registration identifier: `REG-<event id>-<issued-at millis>`.
///
/// Uniqueness across the ledger comes from the event id plus a per-event
/// monotonic issuance clock (see [`crate::IssuanceClock`]).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistrationId(String);

impl RegistrationId {
    pub fn derive(event_id: EventId, issued_at: DateTime<Utc>) -> Self {
        Self(format!("{PREFIX}{event_id}-{}", issued_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RegistrationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_id(format!("RegistrationId: '{s}'"));
        let rest = s.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let (event, millis) = rest.rsplit_once('-').ok_or_else(invalid)?;
        event.parse::<EventId>().map_err(|_| invalid())?;
        millis.parse::<i64>().map_err(|_| invalid())?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for RegistrationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegistrationId> for String {
    fn from(value: RegistrationId) -> Self {
        value.0
    }
}
