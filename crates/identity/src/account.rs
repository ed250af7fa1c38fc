//! Account aggregate for identity management (event-sourced).
//!
//! An account is opened once at sign-up and afterwards only changes through
//! admin approval decisions. Accounts are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventdesk_core::{AccountId, Aggregate, AggregateRoot, DomainError, DomainEvent};

use crate::{ApprovalStatus, AuthError, Role};

/// Canonical form used for uniqueness checks and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// Account aggregate.
///
/// # Invariants
/// - `email` is stored normalized (trimmed, lowercase).
/// - `credential_hash` is a PHC string, never the plaintext secret.
/// - Company accounts always carry an organization name.
/// - `approval_status` is one of the statuses allowed for `role`.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub credential_hash: String,
    pub role: Role,
    pub approval_status: ApprovalStatus,
    pub display_name: String,
    pub organization_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub version: u64,
    pub created: bool,
}

impl Account {
    pub fn empty(id: AccountId) -> Self {
        Self {
            id,
            email: String::new(),
            credential_hash: String::new(),
            role: Role::Public,
            approval_status: ApprovalStatus::Active,
            display_name: String::new(),
            organization_name: None,
            created_at: None,
            version: 0,
            created: false,
        }
    }

    /// Gate applied after the credential check succeeded.
    pub fn check_sign_in(&self) -> Result<(), AuthError> {
        match (self.role, self.approval_status) {
            (Role::Company, ApprovalStatus::Approved) => Ok(()),
            (Role::Company, status) => Err(AuthError::PendingApproval {
                account_id: self.id,
                status,
            }),
            (_, ApprovalStatus::Suspended) => Err(AuthError::AccountSuspended {
                account_id: self.id,
            }),
            _ => Ok(()),
        }
    }

    /// Name shown on tickets and listings: the organization for companies,
    /// the person otherwise.
    pub fn public_name(&self) -> &str {
        self.organization_name
            .as_deref()
            .unwrap_or(&self.display_name)
    }
}

impl AggregateRoot for Account {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenAccount {
    pub account_id: AccountId,
    pub email: String,
    pub credential_hash: String,
    pub role: Role,
    pub display_name: String,
    pub organization_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SetApproval {
    pub account_id: AccountId,
    pub status: ApprovalStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum AccountCommand {
    Open(OpenAccount),
    SetApproval(SetApproval),
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOpened {
    pub account_id: AccountId,
    pub email: String,
    /// Kept out of the serialized audit payload.
    #[serde(skip, default)]
    pub credential_hash: String,
    pub role: Role,
    pub approval_status: ApprovalStatus,
    pub display_name: String,
    pub organization_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalChanged {
    pub account_id: AccountId,
    pub from: ApprovalStatus,
    pub to: ApprovalStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountEvent {
    Opened(AccountOpened),
    ApprovalChanged(ApprovalChanged),
}

impl DomainEvent for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Opened(_) => "identity.account.opened",
            AccountEvent::ApprovalChanged(_) => "identity.account.approval_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AccountEvent::Opened(e) => e.occurred_at,
            AccountEvent::ApprovalChanged(e) => e.occurred_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for Account {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened(e) => {
                self.id = e.account_id;
                self.email = e.email.clone();
                self.credential_hash = e.credential_hash.clone();
                self.role = e.role;
                self.approval_status = e.approval_status;
                self.display_name = e.display_name.clone();
                self.organization_name = e.organization_name.clone();
                self.created_at = Some(e.occurred_at);
                self.created = true;
            }
            AccountEvent::ApprovalChanged(e) => {
                self.approval_status = e.to;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::Open(cmd) => self.handle_open(cmd),
            AccountCommand::SetApproval(cmd) => self.handle_set_approval(cmd),
        }
    }
}

impl Account {
    fn handle_open(&self, cmd: &OpenAccount) -> Result<Vec<AccountEvent>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("account already exists"));
        }

        let email = normalize_email(&cmd.email);
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.contains('@')
            }
            None => false,
        };
        if !valid_email {
            return Err(DomainError::validation("invalid email format"));
        }

        if cmd.display_name.trim().is_empty() {
            return Err(DomainError::validation("display name cannot be empty"));
        }
        if cmd.credential_hash.is_empty() {
            return Err(DomainError::validation("credential hash cannot be empty"));
        }

        let organization_name = match cmd.role {
            Role::Company => {
                let name = cmd
                    .organization_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        DomainError::validation("company accounts need an organization name")
                    })?;
                Some(name.to_string())
            }
            Role::Admin | Role::Public => None,
        };

        Ok(vec![AccountEvent::Opened(AccountOpened {
            account_id: cmd.account_id,
            email,
            credential_hash: cmd.credential_hash.clone(),
            role: cmd.role,
            approval_status: ApprovalStatus::initial_for(cmd.role),
            display_name: cmd.display_name.trim().to_string(),
            organization_name,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_approval(&self, cmd: &SetApproval) -> Result<Vec<AccountEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }

        if !cmd.status.allowed_for(self.role) {
            return Err(DomainError::validation(format!(
                "status '{}' does not apply to {} accounts",
                cmd.status, self.role
            )));
        }

        // Idempotent: already there.
        if self.approval_status == cmd.status {
            return Ok(vec![]);
        }

        Ok(vec![AccountEvent::ApprovalChanged(ApprovalChanged {
            account_id: cmd.account_id,
            from: self.approval_status,
            to: cmd.status,
            occurred_at: cmd.occurred_at,
        })])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn open(role: Role, email: &str, organization: Option<&str>) -> OpenAccount {
        OpenAccount {
            account_id: AccountId::new(),
            email: email.to_string(),
            credential_hash: "$argon2id$stub".to_string(),
            role,
            display_name: "Dana".to_string(),
            organization_name: organization.map(str::to_string),
            occurred_at: now(),
        }
    }

    fn opened(cmd: OpenAccount) -> Account {
        let mut account = Account::empty(cmd.account_id);
        for event in account.handle(&AccountCommand::Open(cmd)).unwrap() {
            account.apply(&event);
        }
        account
    }

    fn set_status(account: &mut Account, status: ApprovalStatus) -> usize {
        let cmd = AccountCommand::SetApproval(SetApproval {
            account_id: account.id,
            status,
            occurred_at: now(),
        });
        let events = account.handle(&cmd).unwrap();
        let count = events.len();
        for event in events {
            account.apply(&event);
        }
        count
    }

    #[test]
    fn open_normalizes_email() {
        let account = opened(open(Role::Public, "  Dana@Example.COM ", None));
        assert_eq!(account.email, "dana@example.com");
        assert_eq!(account.approval_status, ApprovalStatus::Active);
        assert_eq!(account.version, 1);
    }

    #[test]
    fn open_rejects_invalid_email() {
        let cmd = open(Role::Public, "not-an-email", None);
        let account = Account::empty(cmd.account_id);
        let result = account.handle(&AccountCommand::Open(cmd));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn company_requires_organization_and_starts_pending() {
        let cmd = open(Role::Company, "org@example.com", Some("   "));
        let account = Account::empty(cmd.account_id);
        assert!(account.handle(&AccountCommand::Open(cmd)).is_err());

        let account = opened(open(Role::Company, "org@example.com", Some("Acme Events")));
        assert_eq!(account.approval_status, ApprovalStatus::Pending);
        assert_eq!(account.public_name(), "Acme Events");
    }

    #[test]
    fn pending_company_cannot_sign_in_until_approved() {
        let mut account = opened(open(Role::Company, "org@example.com", Some("Acme")));
        match account.check_sign_in() {
            Err(AuthError::PendingApproval { status, .. }) => {
                assert_eq!(status, ApprovalStatus::Pending)
            }
            other => panic!("Expected PendingApproval, got {other:?}"),
        }

        set_status(&mut account, ApprovalStatus::Approved);
        assert!(account.check_sign_in().is_ok());
    }

    #[test]
    fn suspended_company_reports_pending_approval() {
        let mut account = opened(open(Role::Company, "org@example.com", Some("Acme")));
        set_status(&mut account, ApprovalStatus::Approved);
        set_status(&mut account, ApprovalStatus::Suspended);
        assert!(matches!(
            account.check_sign_in(),
            Err(AuthError::PendingApproval {
                status: ApprovalStatus::Suspended,
                ..
            })
        ));
    }

    #[test]
    fn suspended_public_account_is_refused() {
        let mut account = opened(open(Role::Public, "p@example.com", None));
        set_status(&mut account, ApprovalStatus::Suspended);
        assert!(matches!(
            account.check_sign_in(),
            Err(AuthError::AccountSuspended { .. })
        ));
    }

    #[test]
    fn set_approval_is_idempotent() {
        let mut account = opened(open(Role::Company, "org@example.com", Some("Acme")));
        assert_eq!(set_status(&mut account, ApprovalStatus::Approved), 1);
        assert_eq!(set_status(&mut account, ApprovalStatus::Approved), 0);
        assert_eq!(account.version, 2);
    }

    #[test]
    fn set_approval_rejects_status_foreign_to_role() {
        let account = opened(open(Role::Public, "p@example.com", None));
        let cmd = AccountCommand::SetApproval(SetApproval {
            account_id: account.id,
            status: ApprovalStatus::Approved,
            occurred_at: now(),
        });
        assert!(matches!(account.handle(&cmd), Err(DomainError::Validation(_))));
    }

    #[test]
    fn audit_payload_omits_credential_hash() {
        let cmd = open(Role::Public, "p@example.com", None);
        let account = Account::empty(cmd.account_id);
        let events = account.handle(&AccountCommand::Open(cmd)).unwrap();
        let payload = serde_json::to_value(&events[0]).unwrap();
        assert!(!payload.to_string().contains("argon2"));
    }
}
