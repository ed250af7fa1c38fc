//! HS256 session tokens carrying [`SessionClaims`].
//!
//! The signature is checked by `jsonwebtoken`; the time window is checked by
//! `validate_claims`, so expiry follows the claims' own timestamps rather than
//! the registered `exp` claim.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use eventdesk_identity::{Principal, SessionClaims, TokenValidationError, validate_claims};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to encode session token: {0}")]
    Encoding(String),

    #[error("invalid session token")]
    InvalidToken,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies bearer tokens for the auth middleware.
pub trait SessionValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError>;
}

#[derive(Clone)]
pub struct Hs256Sessions {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl core::fmt::Debug for Hs256Sessions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Sessions")
            .field("ttl", &self.ttl)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl Hs256Sessions {
    pub fn new(secret: &[u8], ttl: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Sign a session for `principal` valid from `now` for the configured ttl.
    pub fn issue(&self, principal: Principal, now: DateTime<Utc>) -> Result<String, SessionError> {
        let claims = SessionClaims::new(principal, now, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Encoding(e.to_string()))
    }
}

impl SessionValidator for Hs256Sessions {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        let claims = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| SessionError::InvalidToken)?
            .claims;
        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdesk_core::AccountId;
    use eventdesk_identity::Role;

    fn sessions(secret: &str) -> Hs256Sessions {
        Hs256Sessions::new(secret.as_bytes(), chrono::Duration::minutes(30))
    }

    #[test]
    fn issued_token_validates_back_to_the_principal() {
        let sessions = sessions("secret");
        let principal = Principal::new(AccountId::new(), Role::Company);
        let now = Utc::now();

        let token = sessions.issue(principal, now).unwrap();
        let claims = sessions
            .validate(&token, now + chrono::Duration::minutes(1))
            .unwrap();
        assert_eq!(claims.principal(), principal);
        assert_eq!(claims.expires_at, now + chrono::Duration::minutes(30));
    }

    #[test]
    fn expired_token_is_rejected() {
        let sessions = sessions("secret");
        let now = Utc::now();
        let token = sessions
            .issue(Principal::new(AccountId::new(), Role::Public), now)
            .unwrap();

        let err = sessions
            .validate(&token, now + chrono::Duration::minutes(31))
            .unwrap_err();
        assert!(matches!(err, SessionError::Claims(TokenValidationError::Expired)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let now = Utc::now();
        let token = sessions("one")
            .issue(Principal::new(AccountId::new(), Role::Admin), now)
            .unwrap();

        assert!(matches!(
            sessions("two").validate(&token, now),
            Err(SessionError::InvalidToken)
        ));
        assert!(matches!(
            sessions("one").validate("not-a-token", now),
            Err(SessionError::InvalidToken)
        ));
    }
}
