//! One-time code (OTC) lifecycle engine.
//!
//! This crate implements the core of a short-lived code service: a
//! privileged caller requests a numeric code for an opaque key, the code is
//! delivered out-of-band, and whoever presents the matching key/code pair
//! gets exactly one successful verification before the code is gone.
//!
//! The engine keeps no code state in process memory. Every pending code
//! lives in a backing expiring key-value store injected through the
//! [`ExpiringStore`] trait, so the engine itself holds no locks and can be
//! replicated across processes when the store is shared (e.g. Redis via the
//! `redis-store` feature).
//!
//! Verification is deliberately open to anyone holding a plausible
//! key/code pair; only issuance is gated, through [`AdminPolicy`]. Rate
//! limiting is left to the deployment in front of this service.
//!
//! # Example
//!
//! ```
//! use otc_core::{MemoryStore, OtcManager};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> otc_core::Result<()> {
//! let manager = OtcManager::new(Arc::new(MemoryStore::new()));
//!
//! let code = manager.issue("session-42", Duration::from_secs(120)).await?;
//! assert!(manager.verify("session-42", &code).await?);
//! assert!(!manager.verify("session-42", &code).await?); // single use
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod code;
pub mod config;
pub mod manager;
#[cfg(feature = "redis-store")]
pub mod redis_store;
pub mod storage;

pub use admin::{AdminPolicy, SingleAdmin};
pub use code::{generate_code, CODE_LENGTH};
pub use config::OtcConfig;
pub use manager::OtcManager;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisStore;
pub use storage::{ExpiringStore, MemoryStore};

/// Result type for OTC operations.
pub type Result<T> = std::result::Result<T, OtcError>;

#[derive(thiserror::Error, Debug)]
pub enum OtcError {
    /// The caller handed the engine something it refuses to work with
    /// (empty key, zero TTL). Raised before any storage call is made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The backing store failed or could not be reached. Never folded into
    /// a verification result: a storage outage is not a wrong code.
    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(feature = "redis-store")]
impl From<redis::RedisError> for OtcError {
    fn from(e: redis::RedisError) -> Self {
        OtcError::Storage(e.to_string())
    }
}
