use serde::Serialize;

use crate::{Event, EventStatus};

/// Counters shown on a company's dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompanyDashboard {
    pub total_events: usize,
    pub published: usize,
    pub pending: usize,
    pub draft: usize,
    pub rejected: usize,
    pub total_registrations: u64,
    pub total_capacity: u64,
}

impl CompanyDashboard {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        events.into_iter().fold(Self::default(), |mut acc, e| {
            acc.total_events += 1;
            match e.status {
                EventStatus::Published => acc.published += 1,
                EventStatus::Pending => acc.pending += 1,
                EventStatus::Draft => acc.draft += 1,
                EventStatus::Rejected => acc.rejected += 1,
            }
            acc.total_registrations += u64::from(e.registered_count);
            acc.total_capacity += u64::from(e.capacity);
            acc
        })
    }
}
