//! `eventdesk-identity`: accounts, credentials and the authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod account;
pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use account::{
    Account, AccountCommand, AccountEvent, AccountOpened, ApprovalChanged, OpenAccount,
    SetApproval, normalize_email,
};
pub use authorize::{AuthzError, authorize, ensure_owner};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialError, hash_secret, verify_secret};
pub use error::{AuthError, SignUpError};
pub use permissions::{Permission, permissions_for};
pub use principal::Principal;
pub use roles::{ApprovalStatus, Role};
