use thiserror::Error;

use eventdesk_core::{AccountId, DomainError};

use crate::ApprovalStatus;

/// Sign-in failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong secret; the two are deliberately indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Company account whose approval status is not `approved`.
    #[error("account {account_id} is {status}; company accounts need admin approval before signing in")]
    PendingApproval {
        account_id: AccountId,
        status: ApprovalStatus,
    },

    #[error("account {account_id} is suspended")]
    AccountSuspended { account_id: AccountId },
}

/// Account registration failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignUpError {
    #[error("email '{email}' is already registered")]
    EmailTaken { email: String },

    #[error("{0}")]
    Domain(#[from] DomainError),
}
