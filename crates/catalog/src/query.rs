//! Public catalog queries over event snapshots.
//!
//! Pure functions: callers pass snapshots in a deterministic order (creation
//! order) and get published events back, filtered and stably sorted.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eventdesk_core::DomainError;

use crate::{Event, EventFormat};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending by scheduled date.
    #[default]
    Date,
    /// Descending by registered count.
    Popularity,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortOrder::Date),
            "popularity" | "popular" => Ok(SortOrder::Popularity),
            other => Err(DomainError::validation(format!(
                "unknown sort '{other}' (expected date or popularity)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact category, compared case-insensitively. `None` or "all" matches everything.
    pub category: Option<String>,
    /// Substring matched against title, description and location.
    pub text: Option<String>,
    pub sort: SortOrder,
}

impl CatalogFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty()
                && !category.eq_ignore_ascii_case("all")
                && !event.details.category.eq_ignore_ascii_case(category)
            {
                return false;
            }
        }

        match self.text.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [
                    event.details.title.as_str(),
                    event.details.description.as_str(),
                    event.details.format.location(),
                ]
                .iter()
                .any(|haystack| haystack.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Published events matching `filter`, sorted by `filter.sort`.
pub fn list_published(events: impl IntoIterator<Item = Event>, filter: &CatalogFilter) -> Vec<Event> {
    let mut out: Vec<Event> = events
        .into_iter()
        .filter(|e| e.is_published() && filter.matches(e))
        .collect();

    // `sort_by` is stable: ties keep input order.
    match filter.sort {
        SortOrder::Date => out.sort_by(|a, b| a.details.date.cmp(&b.details.date)),
        SortOrder::Popularity => out.sort_by(|a, b| b.registered_count.cmp(&a.registered_count)),
    }
    out
}

/// Published and featured events, soonest first.
pub fn list_featured(events: impl IntoIterator<Item = Event>) -> Vec<Event> {
    let mut out: Vec<Event> = events
        .into_iter()
        .filter(|e| e.is_published() && e.featured)
        .collect();
    out.sort_by(|a, b| a.details.date.cmp(&b.details.date));
    out
}

/// Published venue events that carry coordinates (map feed).
pub fn list_mapped(events: impl IntoIterator<Item = Event>) -> Vec<Event> {
    events
        .into_iter()
        .filter(|e| {
            e.is_published()
                && matches!(
                    e.details.format,
                    EventFormat::Venue {
                        coordinates: Some(_),
                        ..
                    }
                )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventStatus, GeoPoint};
    use chrono::NaiveDate;
    use eventdesk_core::EventId;

    fn event(title: &str, category: &str, day: u32, registered: u32, status: EventStatus) -> Event {
        let mut e = Event::empty(EventId::new());
        e.created = true;
        e.status = status;
        e.capacity = 100;
        e.registered_count = registered;
        e.details.title = title.to_string();
        e.details.description = format!("{title} description");
        e.details.category = category.to_string();
        e.details.date = NaiveDate::from_ymd_opt(2030, 3, day).unwrap();
        e.details.format = EventFormat::Venue {
            location: "Riverside Hall".to_string(),
            coordinates: None,
        };
        e
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.details.title.as_str()).collect()
    }

    fn sample() -> Vec<Event> {
        vec![
            event("Jazz Night", "Music", 20, 5, EventStatus::Published),
            event("Rust Workshop", "Technology", 10, 40, EventStatus::Published),
            event("Secret Draft", "Music", 1, 0, EventStatus::Draft),
            event("Blues Jam", "music", 10, 40, EventStatus::Published),
            event("Pending Gala", "Music", 2, 0, EventStatus::Pending),
        ]
    }

    #[test]
    fn only_published_events_are_listed() {
        let out = list_published(sample(), &CatalogFilter::default());
        assert_eq!(titles(&out), vec!["Rust Workshop", "Blues Jam", "Jazz Night"]);
    }

    #[test]
    fn category_filter_is_case_insensitive_and_all_matches_everything() {
        let filter = CatalogFilter {
            category: Some("MUSIC".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(titles(&list_published(sample(), &filter)), vec!["Blues Jam", "Jazz Night"]);

        let all = CatalogFilter {
            category: Some("all".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(list_published(sample(), &all).len(), 3);
    }

    #[test]
    fn text_query_searches_title_description_and_location() {
        let by_title = CatalogFilter {
            text: Some("WORKSHOP".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(titles(&list_published(sample(), &by_title)), vec!["Rust Workshop"]);

        let by_location = CatalogFilter {
            text: Some("riverside".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(list_published(sample(), &by_location).len(), 3);
    }

    #[test]
    fn popularity_sort_is_descending_and_stable() {
        let filter = CatalogFilter {
            sort: SortOrder::Popularity,
            ..CatalogFilter::default()
        };
        assert_eq!(
            titles(&list_published(sample(), &filter)),
            vec!["Rust Workshop", "Blues Jam", "Jazz Night"]
        );
    }

    #[test]
    fn featured_and_mapped_feeds() {
        let mut events = sample();
        events[0].featured = true;
        events[2].featured = true;
        events[1].details.format = EventFormat::Venue {
            location: "Hall".to_string(),
            coordinates: Some(GeoPoint {
                latitude: 1.0,
                longitude: 2.0,
            }),
        };

        assert_eq!(titles(&list_featured(events.clone())), vec!["Jazz Night"]);
        assert_eq!(titles(&list_mapped(events)), vec!["Rust Workshop"]);
    }

    #[test]
    fn sort_parses_aliases() {
        assert_eq!("popular".parse::<SortOrder>().unwrap(), SortOrder::Popularity);
        assert!("random".parse::<SortOrder>().is_err());
    }
}
