use core::str::FromStr;

use serde::{Deserialize, Serialize};

use eventdesk_core::DomainError;

/// Account role.
///
/// The role is fixed at sign-up; it decides which permissions a session carries
/// and whether the account is subject to approval.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Company,
    Public,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Company => "company",
            Role::Public => "public",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "company" => Ok(Role::Company),
            "public" => Ok(Role::Public),
            other => Err(DomainError::validation(format!(
                "unknown role '{other}' (expected admin, company or public)"
            ))),
        }
    }
}

/// Approval state of an account.
///
/// `Pending` and `Approved` only apply to company accounts; admins and public
/// accounts move between `Active` and `Suspended`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Active,
    Pending,
    Approved,
    Suspended,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Active => "active",
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Suspended => "suspended",
        }
    }

    /// Status a freshly registered account starts in.
    pub fn initial_for(role: Role) -> Self {
        match role {
            Role::Company => ApprovalStatus::Pending,
            Role::Admin | Role::Public => ApprovalStatus::Active,
        }
    }

    /// Whether an admin may move an account with `role` into this status.
    pub fn allowed_for(self, role: Role) -> bool {
        match role {
            Role::Company => matches!(
                self,
                ApprovalStatus::Pending | ApprovalStatus::Approved | ApprovalStatus::Suspended
            ),
            Role::Admin | Role::Public => {
                matches!(self, ApprovalStatus::Active | ApprovalStatus::Suspended)
            }
        }
    }
}

impl core::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ApprovalStatus::Active),
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "suspended" => Ok(ApprovalStatus::Suspended),
            other => Err(DomainError::validation(format!(
                "unknown approval status '{other}'"
            ))),
        }
    }
}
