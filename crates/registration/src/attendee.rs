use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eventdesk_core::AccountId;

pub const GUEST_DEFAULT_NAME: &str = "Guest User";
pub const GUEST_DEFAULT_EMAIL: &str = "guest@example.com";

/// Who a registration is for.
///
/// Authenticated accounts are limited to one active registration per event.
/// Guests are anonymous and not deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Attendee {
    Account {
        account_id: AccountId,
    },
    Guest {
        guest_id: String,
        name: String,
        email: String,
    },
}

impl Attendee {
    pub fn account(account_id: AccountId) -> Self {
        Attendee::Account { account_id }
    }

    /// Guest identity; blank fields fall back to the generic guest placeholder.
    pub fn guest(name: Option<&str>, email: Option<&str>) -> Self {
        let pick = |value: Option<&str>, fallback: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Attendee::Guest {
            guest_id: format!("guest-{}", Uuid::new_v4()),
            name: pick(name, GUEST_DEFAULT_NAME),
            email: pick(email, GUEST_DEFAULT_EMAIL).to_lowercase(),
        }
    }

    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            Attendee::Account { account_id } => Some(*account_id),
            Attendee::Guest { .. } => None,
        }
    }

    /// Stable key used to index registrations by attendee.
    pub fn key(&self) -> String {
        match self {
            Attendee::Account { account_id } => account_id.to_string(),
            Attendee::Guest { guest_id, .. } => guest_id.clone(),
        }
    }
}
