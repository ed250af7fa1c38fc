use chrono::{DateTime, Duration, DurationRound, Utc};

/// Per-event issuance clock.
///
/// Hands out millisecond-precision instants that strictly increase, so two
/// registrations for the same event issued within one millisecond still get
/// distinct registration ids. Must be used under the event's lock.
#[derive(Debug, Clone, Default)]
pub struct IssuanceClock {
    last: Option<DateTime<Utc>>,
}

impl IssuanceClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = now
            .duration_trunc(Duration::milliseconds(1))
            .unwrap_or(now);
        let issued = match self.last {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last = Some(issued);
        issued
    }
}
