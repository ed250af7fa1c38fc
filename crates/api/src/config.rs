//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use eventdesk_catalog::RejectionPolicy;
use eventdesk_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;
/// Thirty days.
pub const MAX_SESSION_TTL_MINUTES: i64 = 30 * 24 * 60;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Admin account created at startup when both credentials are configured.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub public_base_url: String,
    pub rejection_policy: RejectionPolicy,
    pub log_format: LogFormat,
    pub admin: Option<AdminBootstrap>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"[REDACTED]")
            .field("session_ttl", &self.session_ttl)
            .field("public_base_url", &self.public_base_url)
            .field("rejection_policy", &self.rejection_policy)
            .field("log_format", &self.log_format)
            .field("admin", &self.admin)
            .finish()
    }
}

impl AppConfig {
    /// Defaults suitable for tests: ephemeral bind, fixed secret, no admin.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            session_ttl: chrono::Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            rejection_policy: RejectionPolicy::default(),
            log_format: LogFormat::default(),
            admin: None,
        }
    }

    pub fn with_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some(AdminBootstrap {
            email: email.into(),
            password: password.into(),
        });
        self
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("EVENTDESK_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("EVENTDESK_BIND_ADDR", e.to_string()))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let ttl_minutes = match get("EVENTDESK_SESSION_TTL_MINUTES") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                ConfigError::invalid("EVENTDESK_SESSION_TTL_MINUTES", e.to_string())
            })?,
            None => DEFAULT_SESSION_TTL_MINUTES,
        };
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(ConfigError::invalid(
                "EVENTDESK_SESSION_TTL_MINUTES",
                format!("must be between 1 and {MAX_SESSION_TTL_MINUTES}"),
            ));
        }
        let session_ttl = chrono::Duration::try_minutes(ttl_minutes).ok_or_else(|| {
            ConfigError::invalid("EVENTDESK_SESSION_TTL_MINUTES", "out of range")
        })?;

        let public_base_url = get("EVENTDESK_PUBLIC_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string());

        let rejection_policy = match get("EVENTDESK_REJECTION_POLICY") {
            Some(raw) => raw
                .parse::<RejectionPolicy>()
                .map_err(|e| ConfigError::invalid("EVENTDESK_REJECTION_POLICY", e.to_string()))?,
            None => RejectionPolicy::default(),
        };

        let log_format = match get("EVENTDESK_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("EVENTDESK_LOG_FORMAT", e.to_string()))?,
            None => LogFormat::default(),
        };

        let admin = match (get("EVENTDESK_ADMIN_EMAIL"), get("EVENTDESK_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Incomplete(
                    "EVENTDESK_ADMIN_EMAIL",
                    "EVENTDESK_ADMIN_PASSWORD",
                ));
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            session_ttl,
            public_base_url,
            rejection_policy,
            log_format,
            admin,
        })
    }
}
