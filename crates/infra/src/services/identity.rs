//! Account sign-up, sign-in and admin approval.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use eventdesk_core::{AccountId, Aggregate, DomainError};
use eventdesk_identity::{
    Account, AccountCommand, ApprovalStatus, AuthError, OpenAccount, Permission, Principal, Role,
    SetApproval, SignUpError, authorize, hash_secret, normalize_email, verify_secret,
};

use crate::journal::{self, ACCOUNT_STREAM, Journal};
use crate::services::ServiceError;
use crate::store::InMemoryStore;

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub secret: String,
    pub role: Role,
    pub display_name: String,
    pub organization_name: Option<String>,
}

/// Result of a successful sign-up.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Public accounts may sign in straight away.
    Authenticated(Account),
    /// Company accounts wait for an admin.
    RequiresApproval(Account),
}

impl SignUpOutcome {
    pub fn account(&self) -> &Account {
        match self {
            SignUpOutcome::Authenticated(a) | SignUpOutcome::RequiresApproval(a) => a,
        }
    }
}

pub struct IdentityStore {
    store: Arc<InMemoryStore>,
    journal: Arc<dyn Journal>,
}

impl IdentityStore {
    pub fn new(store: Arc<InMemoryStore>, journal: Arc<dyn Journal>) -> Self {
        Self { store, journal }
    }

    /// Check credentials, then the approval gate.
    ///
    /// An unknown email and a wrong secret both fail with `InvalidCredentials`.
    #[tracing::instrument(skip_all)]
    pub fn authenticate(&self, email: &str, secret: &str) -> Result<Account, ServiceError> {
        let email = normalize_email(email);
        let account = self
            .store
            .read_accounts(|t| t.find_by_email(&email).cloned())?;

        let Some(account) = account else {
            warn!("sign-in rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials.into());
        };
        if !verify_secret(secret, &account.credential_hash)? {
            warn!(account_id = %account.id, "sign-in rejected: invalid credentials");
            return Err(AuthError::InvalidCredentials.into());
        }

        if let Err(err) = account.check_sign_in() {
            warn!(account_id = %account.id, status = %account.approval_status, "sign-in rejected: {err}");
            return Err(err.into());
        }

        info!(account_id = %account.id, role = %account.role, "signed in");
        Ok(account)
    }

    /// Self-service sign-up for public and company accounts.
    #[tracing::instrument(skip_all, fields(role = %request.role))]
    pub fn register(&self, request: SignUpRequest) -> Result<SignUpOutcome, ServiceError> {
        if request.role == Role::Admin {
            return Err(SignUpError::Domain(DomainError::validation(
                "admin accounts cannot be self-registered",
            ))
            .into());
        }

        let account = self.open(request)?;
        info!(account_id = %account.id, role = %account.role, "account opened");

        Ok(match account.role {
            Role::Company => SignUpOutcome::RequiresApproval(account),
            Role::Admin | Role::Public => SignUpOutcome::Authenticated(account),
        })
    }

    /// Ensure an admin account exists for `email`. Idempotent.
    #[tracing::instrument(skip_all)]
    pub fn bootstrap_admin(
        &self,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Account, ServiceError> {
        let normalized = normalize_email(email);
        let existing = self
            .store
            .read_accounts(|t| t.find_by_email(&normalized).cloned())?;

        match existing {
            Some(account) if account.role == Role::Admin => Ok(account),
            Some(_) => Err(SignUpError::EmailTaken { email: normalized }.into()),
            None => {
                let account = self.open(SignUpRequest {
                    email: normalized,
                    secret: secret.to_string(),
                    role: Role::Admin,
                    display_name: display_name.to_string(),
                    organization_name: None,
                })?;
                info!(account_id = %account.id, "admin account bootstrapped");
                Ok(account)
            }
        }
    }

    /// Admin-only. Setting the current status again is a no-op.
    #[tracing::instrument(skip_all, fields(account_id = %account_id, status = %status))]
    pub fn set_approval(
        &self,
        actor: &Principal,
        account_id: AccountId,
        status: ApprovalStatus,
    ) -> Result<Account, ServiceError> {
        authorize(actor, &Permission::ACCOUNTS_APPROVE)?;

        self.store.write_accounts(|table| -> Result<Account, ServiceError> {
            let mut account = table
                .get(account_id)
                .cloned()
                .ok_or(ServiceError::AccountNotFound(account_id))?;

            let events = account.handle(&AccountCommand::SetApproval(SetApproval {
                account_id,
                status,
                occurred_at: Utc::now(),
            }))?;
            if events.is_empty() {
                return Ok(account);
            }

            let from = account.approval_status;
            journal::record(&*self.journal, ACCOUNT_STREAM, &mut account, events)?;
            table.upsert(account.clone());
            info!(%from, to = %account.approval_status, by = %actor.account_id, "approval changed");
            Ok(account)
        })?
    }

    pub fn get(&self, account_id: AccountId) -> Result<Account, ServiceError> {
        self.store
            .read_accounts(|t| t.get(account_id).cloned())?
            .ok_or(ServiceError::AccountNotFound(account_id))
    }

    /// Admin account listing, oldest first, optionally narrowed to one role.
    pub fn list_by_role(
        &self,
        actor: &Principal,
        role: Option<Role>,
    ) -> Result<Vec<Account>, ServiceError> {
        authorize(actor, &Permission::ACCOUNTS_VIEW)?;

        let mut accounts: Vec<Account> = self.store.read_accounts(|t| {
            t.iter()
                .filter(|a| role.is_none_or(|r| a.role == r))
                .cloned()
                .collect()
        })?;
        accounts.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.email.cmp(&b.email))
        });
        Ok(accounts)
    }

    fn open(&self, request: SignUpRequest) -> Result<Account, ServiceError> {
        if request.secret.is_empty() {
            return Err(SignUpError::Domain(DomainError::validation("password cannot be empty")).into());
        }
        // Hashing stays outside the accounts lock.
        let credential_hash = hash_secret(&request.secret)?;
        let email = normalize_email(&request.email);

        self.store.write_accounts(|table| -> Result<Account, ServiceError> {
            if table.find_by_email(&email).is_some() {
                return Err(SignUpError::EmailTaken { email: email.clone() }.into());
            }

            let mut account = Account::empty(AccountId::new());
            let events = account
                .handle(&AccountCommand::Open(OpenAccount {
                    account_id: account.id,
                    email: email.clone(),
                    credential_hash,
                    role: request.role,
                    display_name: request.display_name,
                    organization_name: request.organization_name,
                    occurred_at: Utc::now(),
                }))
                .map_err(SignUpError::from)?;

            journal::record(&*self.journal, ACCOUNT_STREAM, &mut account, events)?;
            table.upsert(account.clone());
            Ok(account)
        })?
    }
}
