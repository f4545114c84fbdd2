//! Process configuration.
//!
//! Built once at startup and handed to the pieces that need it; nothing in
//! this workspace reads the environment at call time.

use crate::{OtcError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Validity window applied when issuance does not specify one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

/// Administrator identity used when `ADMIN_EMAIL` is unset.
pub const DEFAULT_ADMIN_EMAIL: &str = "user@gmail.com";

/// Runtime configuration for the OTC service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OtcConfig {
    /// The one identity allowed to request issuance (exact match).
    pub admin_email: String,
    /// Default TTL for issued codes.
    #[serde(default = "default_ttl")]
    pub default_ttl: Duration,
    /// Backing store target. `None` selects the in-memory store.
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

impl Default for OtcConfig {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            default_ttl: DEFAULT_TTL,
            redis_url: None,
        }
    }
}

impl OtcConfig {
    /// Load configuration from the process environment.
    ///
    /// Reads `ADMIN_EMAIL`, `REDIS_URL` and `OTC_DEFAULT_TTL_SECS`; every
    /// option has a default and an empty value counts as unset. A TTL that
    /// is not a positive integer is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from a variable lookup. [`from_env`] passes the
    /// real environment; tests pass a closure over fixed values.
    ///
    /// [`from_env`]: OtcConfig::from_env
    fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).filter(|value| !value.is_empty());

        let mut config = Self::default();
        if let Some(email) = var("ADMIN_EMAIL") {
            config.admin_email = email;
        }
        if let Some(url) = var("REDIS_URL") {
            config.redis_url = Some(url);
        }
        if let Some(raw) = var("OTC_DEFAULT_TTL_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                OtcError::InvalidArgument(format!(
                    "OTC_DEFAULT_TTL_SECS must be an integer number of seconds, got {:?}",
                    raw
                ))
            })?;
            if secs == 0 {
                return Err(OtcError::InvalidArgument(
                    "OTC_DEFAULT_TTL_SECS must be positive".to_string(),
                ));
            }
            config.default_ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Set the administrator email.
    pub fn with_admin_email(mut self, email: impl Into<String>) -> Self {
        self.admin_email = email.into();
        self
    }

    /// Set the default TTL for issued codes.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Point the service at a Redis instance.
    pub fn with_redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }
}
