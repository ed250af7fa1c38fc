//! Application services: the transactional entry points of EventDesk.
//!
//! Each service checks authorization first, runs the aggregate decision
//! under the relevant lock, journals what happened and only then exposes the
//! new state.

pub mod catalog;
pub mod identity;
pub mod ledger;
pub mod tickets;

pub use catalog::{AdminDashboard, EventCatalog, EventDraft, EventPatch};
pub use identity::{IdentityStore, SignUpOutcome, SignUpRequest};
pub use ledger::{AttendeeRegistration, RegistrationLedger};
pub use tickets::{TicketFreshness, TicketVerifier};

use std::sync::Arc;

use thiserror::Error;

use eventdesk_catalog::{CatalogError, RejectionPolicy};
use eventdesk_core::{AccountId, DomainError};
use eventdesk_identity::{Account, AuthError, AuthzError, CredentialError, Principal, SignUpError};
use eventdesk_registration::LedgerError;
use eventdesk_tickets::TicketError;

use crate::journal::{InMemoryJournal, Journal, JournalError};
use crate::store::{InMemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    SignUp(#[from] SignUpError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Ticket(#[from] TicketError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

/// Load the session's account and re-apply the sign-in gate, so a suspension
/// takes effect on sessions issued before it.
pub(crate) fn active_account(
    store: &InMemoryStore,
    actor: &Principal,
) -> Result<Account, ServiceError> {
    let account = store
        .read_accounts(|t| t.get(actor.account_id).cloned())?
        .ok_or(ServiceError::AccountNotFound(actor.account_id))?;
    if let Err(err) = account.check_sign_in() {
        tracing::warn!(
            account_id = %account.id,
            status = %account.approval_status,
            "session rejected: {err}"
        );
        return Err(err.into());
    }
    Ok(account)
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub rejection_policy: RejectionPolicy,
    /// Prefix of ticket verification links.
    pub public_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rejection_policy: RejectionPolicy::default(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// All services wired against one shared store and journal.
pub struct Services {
    pub identity: IdentityStore,
    pub catalog: EventCatalog,
    pub ledger: RegistrationLedger,
    pub tickets: TicketVerifier,
}

impl Services {
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::with_journal(config, Arc::new(InMemoryJournal::new()))
    }

    pub fn with_journal(config: ServiceConfig, journal: Arc<dyn Journal>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            identity: IdentityStore::new(store.clone(), journal.clone()),
            catalog: EventCatalog::new(store.clone(), journal.clone(), config.rejection_policy),
            ledger: RegistrationLedger::new(store.clone(), journal),
            tickets: TicketVerifier::new(store, config.public_base_url),
        }
    }
}
