//! Schedule helpers: start instant, relative status and countdown.
//!
//! Scheduled date/time carry no zone; they are interpreted as UTC.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::DomainError;

use crate::Event;

/// `HH:MM` (de)serialization for `NaiveTime`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Parse a strict `HH:MM` time.
pub fn parse_time(raw: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(raw.trim(), hhmm::FORMAT)
        .map_err(|e| DomainError::validation(format!("time must be HH:MM ({e})")))
}

/// Where an event sits relative to now.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Upcoming,
    /// Starts within the next 24 hours.
    UpcomingSoon,
    Completed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub expired: bool,
}

impl Countdown {
    pub const EXPIRED: Countdown = Countdown {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        expired: true,
    };
}

impl Event {
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.details.date.and_time(self.details.time).and_utc()
    }

    pub fn schedule_status(&self, now: DateTime<Utc>) -> ScheduleStatus {
        let until = self.starts_at() - now;
        if until <= Duration::zero() {
            ScheduleStatus::Completed
        } else if until < Duration::hours(24) {
            ScheduleStatus::UpcomingSoon
        } else {
            ScheduleStatus::Upcoming
        }
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        let remaining = (self.starts_at() - now).num_seconds();
        if remaining <= 0 {
            return Countdown::EXPIRED;
        }
        Countdown {
            days: remaining / 86_400,
            hours: (remaining % 86_400) / 3_600,
            minutes: (remaining % 3_600) / 60,
            seconds: remaining % 60,
            expired: false,
        }
    }
}
