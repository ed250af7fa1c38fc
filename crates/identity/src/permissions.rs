use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "events.create"). There is no
/// wildcard: every role is granted an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Company
    pub const EVENTS_CREATE: Permission = Permission::from_static("events.create");
    pub const EVENTS_MANAGE_OWN: Permission = Permission::from_static("events.manage_own");
    pub const DASHBOARD_COMPANY: Permission = Permission::from_static("dashboard.company");

    // Admin
    pub const EVENTS_MODERATE: Permission = Permission::from_static("events.moderate");
    pub const EVENTS_FEATURE: Permission = Permission::from_static("events.feature");
    pub const EVENTS_VIEW_ALL: Permission = Permission::from_static("events.view_all");
    pub const ACCOUNTS_APPROVE: Permission = Permission::from_static("accounts.approve");
    pub const ACCOUNTS_VIEW: Permission = Permission::from_static("accounts.view");
    pub const REGISTRATIONS_CANCEL_ANY: Permission =
        Permission::from_static("registrations.cancel_any");
    pub const DASHBOARD_ADMIN: Permission = Permission::from_static("dashboard.admin");

    // Public
    pub const REGISTRATIONS_CREATE: Permission = Permission::from_static("registrations.create");
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role → permission policy.
pub fn permissions_for(role: Role) -> Vec<Permission> {
    match role {
        Role::Admin => vec![
            Permission::EVENTS_MODERATE,
            Permission::EVENTS_FEATURE,
            Permission::EVENTS_VIEW_ALL,
            Permission::ACCOUNTS_APPROVE,
            Permission::ACCOUNTS_VIEW,
            Permission::REGISTRATIONS_CANCEL_ANY,
            Permission::DASHBOARD_ADMIN,
        ],
        Role::Company => vec![
            Permission::EVENTS_CREATE,
            Permission::EVENTS_MANAGE_OWN,
            Permission::DASHBOARD_COMPANY,
        ],
        Role::Public => vec![Permission::REGISTRATIONS_CREATE],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_cannot_create_events_on_behalf_of_companies() {
        assert!(!permissions_for(Role::Admin).contains(&Permission::EVENTS_CREATE));
    }

    #[test]
    fn only_public_accounts_register_for_events() {
        for role in [Role::Admin, Role::Company] {
            assert!(!permissions_for(role).contains(&Permission::REGISTRATIONS_CREATE));
        }
        assert!(permissions_for(Role::Public).contains(&Permission::REGISTRATIONS_CREATE));
    }
}
