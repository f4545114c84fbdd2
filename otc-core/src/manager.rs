//! Issue and verify one-time codes.

use crate::code::generate_code;
use crate::config::DEFAULT_TTL;
use crate::storage::ExpiringStore;
use crate::{OtcError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The one-time code engine.
///
/// One manager serves every key; keys never interact. The manager itself
/// is stateless between calls, so it can be shared freely (`Arc`) and
/// replicated across processes as long as the replicas share a store.
pub struct OtcManager {
    store: Arc<dyn ExpiringStore>,
    default_ttl: Duration,
}

impl OtcManager {
    /// Create a manager with the stock default TTL (120 seconds).
    pub fn new(store: Arc<dyn ExpiringStore>) -> Self {
        Self::with_default_ttl(store, DEFAULT_TTL)
    }

    /// Create a manager whose [`issue_default`] uses `default_ttl`.
    ///
    /// [`issue_default`]: OtcManager::issue_default
    pub fn with_default_ttl(store: Arc<dyn ExpiringStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Issue a fresh code for `key`, valid for `ttl`.
    ///
    /// Any code already pending for `key` is overwritten and becomes
    /// permanently unverifiable. Returns the new code; delivering it to
    /// the verifying party is the caller's problem.
    ///
    /// Fails with [`OtcError::InvalidArgument`] on an empty key or zero
    /// TTL, before anything reaches the store.
    pub async fn issue(&self, key: &str, ttl: Duration) -> Result<String> {
        if key.is_empty() {
            return Err(OtcError::InvalidArgument(
                "key must not be empty".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(OtcError::InvalidArgument(
                "ttl must be positive".to_string(),
            ));
        }
        let code = generate_code();
        self.store.put(key, &code, ttl).await?;
        debug!(%key, ttl_secs = ttl.as_secs(), "issued one-time code");
        Ok(code)
    }

    /// Issue a fresh code for `key` with the manager's default TTL.
    pub async fn issue_default(&self, key: &str) -> Result<String> {
        self.issue(key, self.default_ttl).await
    }

    /// Verify `code` against the pending code for `key`, consuming it on
    /// success.
    ///
    /// `Ok(false)` covers every non-match: nothing pending (never issued,
    /// expired, or already consumed) or a wrong code. A mismatch leaves
    /// the pending code in place, so the holder can retry before expiry.
    /// At most one call per issued code returns `Ok(true)`; the
    /// compare-and-consume step is atomic in the store
    /// ([`ExpiringStore::remove_if_eq`]), so racing verifiers cannot both
    /// win.
    ///
    /// Storage failures surface as [`OtcError::Storage`], never as
    /// `Ok(false)`: an outage must not read as "wrong code".
    pub async fn verify(&self, key: &str, code: &str) -> Result<bool> {
        let consumed = self.store.remove_if_eq(key, code).await?;
        debug!(%key, consumed, "one-time code verification attempt");
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{CODE_MAX, CODE_MIN};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    const TTL: Duration = Duration::from_secs(60);

    fn manager() -> OtcManager {
        OtcManager::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_issue_rejects_empty_key() {
        let result = manager().issue("", TTL).await;
        assert!(matches!(result, Err(OtcError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_issue_rejects_zero_ttl() {
        let result = manager().issue("session-42", Duration::ZERO).await;
        assert!(matches!(result, Err(OtcError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_issued_code_is_six_digits_in_range() {
        let code = manager().issue("session-42", TTL).await.unwrap();
        assert_eq!(code.len(), 6);
        let value: u32 = code.parse().unwrap();
        assert!((CODE_MIN..=CODE_MAX).contains(&value));
    }

    #[tokio::test]
    async fn test_issue_then_verify() {
        let manager = manager();
        let code = manager.issue("session-42", TTL).await.unwrap();
        assert!(manager.verify("session-42", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_verification_is_single_use() {
        let manager = manager();
        let code = manager.issue("session-42", TTL).await.unwrap();
        assert!(manager.verify("session-42", &code).await.unwrap());
        assert!(!manager.verify("session-42", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_code_does_not_consume() {
        let manager = manager();
        let code = manager.issue("session-42", TTL).await.unwrap();
        // "000000" can never be issued, so it is always a safe wrong guess.
        assert!(!manager.verify("session-42", "000000").await.unwrap());
        assert!(manager.verify("session-42", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_unknown_key_is_false_not_error() {
        assert!(!manager().verify("never-issued", "123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_with_huge_default_ttl() {
        // An absurd configured TTL must not take down the issuance path
        let manager = OtcManager::with_default_ttl(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(u64::MAX),
        );
        let code = manager.issue_default("session-42").await.unwrap();
        assert!(manager.verify("session-42", &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_default_uses_default_ttl() {
        let manager = OtcManager::with_default_ttl(
            Arc::new(MemoryStore::new()),
            Duration::from_millis(30),
        );
        let code = manager.issue_default("session-42").await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!manager.verify("session-42", &code).await.unwrap());
    }

    /// Store whose every operation fails, standing in for an unreachable
    /// backend.
    struct FailingStore;

    #[async_trait]
    impl ExpiringStore for FailingStore {
        async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
            Err(OtcError::Storage("store offline".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(OtcError::Storage("store offline".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(OtcError::Storage("store offline".to_string()))
        }

        async fn remove_if_eq(&self, _key: &str, _expected: &str) -> Result<bool> {
            Err(OtcError::Storage("store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_from_issue() {
        let manager = OtcManager::new(Arc::new(FailingStore));
        let result = manager.issue("session-42", TTL).await;
        assert!(matches!(result, Err(OtcError::Storage(_))));
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_a_false_verification() {
        let manager = OtcManager::new(Arc::new(FailingStore));
        let result = manager.verify("session-42", "123456").await;
        assert!(matches!(result, Err(OtcError::Storage(_))));
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        // Invalid input must be rejected even when the store is down.
        let manager = OtcManager::new(Arc::new(FailingStore));
        let result = manager.issue("", TTL).await;
        assert!(matches!(result, Err(OtcError::InvalidArgument(_))));
    }
}
