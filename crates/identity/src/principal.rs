use serde::{Deserialize, Serialize};

use eventdesk_core::AccountId;

use crate::{Permission, Role, permissions_for};

/// A fully resolved caller for authorization decisions.
///
/// Built by the transport layer from verified session claims; every core
/// operation that needs a caller takes one of these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub account_id: AccountId,
    pub role: Role,
}

impl Principal {
    pub fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }

    pub fn permissions(&self) -> Vec<Permission> {
        permissions_for(self.role)
    }

    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions().contains(permission)
    }
}
