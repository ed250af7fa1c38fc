use thiserror::Error;

use eventdesk_core::AccountId;

use crate::{Permission, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),

    #[error("forbidden: {0} belongs to another account")]
    NotOwner(String),
}

/// Authorize a principal for a single permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.has(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Require that `principal` owns the resource described by `resource`.
pub fn ensure_owner(
    principal: &Principal,
    owner: AccountId,
    resource: impl core::fmt::Display,
) -> Result<(), AuthzError> {
    if principal.account_id == owner {
        Ok(())
    } else {
        Err(AuthzError::NotOwner(resource.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn principal(role: Role) -> Principal {
        Principal::new(AccountId::new(), role)
    }

    #[test]
    fn company_may_create_events() {
        assert!(authorize(&principal(Role::Company), &Permission::EVENTS_CREATE).is_ok());
    }

    #[test]
    fn public_cannot_moderate() {
        let err = authorize(&principal(Role::Public), &Permission::EVENTS_MODERATE).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("events.moderate".to_string()));
    }

    #[test]
    fn admin_cannot_register_for_events() {
        assert!(authorize(&principal(Role::Admin), &Permission::REGISTRATIONS_CREATE).is_err());
    }

    #[test]
    fn ownership_is_checked_by_account_id() {
        let company = principal(Role::Company);
        assert!(ensure_owner(&company, company.account_id, "event").is_ok());

        let err = ensure_owner(&company, AccountId::new(), "event 42").unwrap_err();
        assert_eq!(err, AuthzError::NotOwner("event 42".to_string()));
    }
}
