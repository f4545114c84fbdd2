//! Backing storage for pending codes.
//!
//! Everything the engine knows lives in an expiring key-value store behind
//! the [`ExpiringStore`] trait. The trait is narrow (four operations) so a
//! test fake fits in a handful of lines and a production store maps each
//! call onto one command.

use crate::{OtcError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Expiring key-value capability the engine runs against.
///
/// Implementations own entry lifetime: an entry stored with a TTL must
/// behave as absent once the TTL elapses, without the engine sweeping it.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Store `value` under `key` for `ttl`, replacing any existing entry
    /// and its remaining lifetime.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Read the live value for `key`. Expired entries read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove the entry for `key`. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete the entry for `key` iff its live value equals `expected`,
    /// returning whether an entry was removed.
    ///
    /// This compare-and-delete MUST be atomic with respect to other calls
    /// for the same key: two concurrent callers presenting the same value
    /// must not both see `true`. The single-use guarantee of verification
    /// rests on this contract, not on any lock in the engine.
    async fn remove_if_eq(&self, key: &str, expected: &str) -> Result<bool>;
}

#[derive(Clone, Debug)]
struct StoredEntry {
    value: String,
    /// `None` when `now + ttl` exceeds the monotonic clock's range; such
    /// an entry outlives the process instead of expiring.
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }
}

/// In-memory implementation of [`ExpiringStore`].
///
/// The default store for development and tests. State is process-local: a
/// restart forgets every pending code and two instances never see each
/// other's entries. Use [`RedisStore`] for anything shared.
///
/// Expiry is passive. An entry past its deadline is dropped by whichever
/// read or compare-and-delete touches it next, plus whatever
/// [`purge_expired`] removes. Every operation takes the one internal
/// mutex, which is what makes `remove_if_eq` atomic here.
///
/// [`RedisStore`]: crate::redis_store::RedisStore
/// [`purge_expired`]: MemoryStore::purge_expired
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

fn lock_error(context: &str) -> OtcError {
    OtcError::Storage(format!("MemoryStore: lock poisoned during {}", context))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, counting expired entries that no
    /// operation has touched yet.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed.
    ///
    /// Expiry is otherwise lazy, so a key that is never touched again would
    /// keep its dead entry around. Call this periodically if the key space
    /// is unbounded.
    pub fn purge_expired(&self) -> Result<usize> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| lock_error("purge_expired"))?;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| lock_error("put"))?;
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                expires_at: Instant::now().checked_add(ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().map_err(|_| lock_error("get"))?;
        let now = Instant::now();
        let expired = match entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => return Ok(None),
        };
        if expired {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| lock_error("delete"))?;
        entries.remove(key);
        Ok(())
    }

    async fn remove_if_eq(&self, key: &str, expected: &str) -> Result<bool> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| lock_error("remove_if_eq"))?;
        let now = Instant::now();
        let (expired, matches) = match entries.get(key) {
            Some(entry) => (entry.is_expired(now), entry.value == expected),
            None => return Ok(false),
        };
        if expired {
            entries.remove(key);
            return Ok(false);
        }
        if matches {
            entries.remove(key);
            return Ok(true);
        }
        Ok(false)
    }
}
