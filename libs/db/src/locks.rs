//! In-process keyed locks with module namespacing.
//!
//! Serializes work on a single key (e.g. one event) across tasks of this
//! process. Waiters are bounded by [`LockConfig::max_wait`]; slots for keys
//! nobody holds or waits on are dropped as soon as the last guard goes away.

use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Configuration for lock acquisition attempts.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Maximum duration to wait for lock acquisition (`None` = unlimited).
    pub max_wait: Option<Duration>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            max_wait: Some(Duration::from_secs(30)),
        }
    }
}

#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out after {waited:?} waiting for lock '{key}'")]
    Timeout { key: String, waited: Duration },
}

type Slots<K> = Arc<DashMap<K, Arc<Mutex<()>>>>;

/// Table of per-key async mutexes under one namespace.
pub struct KeyedLocks<K>
where
    K: Eq + Hash,
{
    namespace: String,
    slots: Slots<K>,
    config: LockConfig,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
{
    pub fn new(namespace: impl Into<String>, config: LockConfig) -> Self {
        Self {
            namespace: namespace.into(),
            slots: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Acquire the lock for `key`, waiting at most `max_wait`.
    pub async fn lock(&self, key: K) -> Result<KeyedLockGuard<K>, LockError> {
        let slot = self
            .slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let namespaced_key = format!("{}:{}", self.namespace, key);
        let guard = match self.config.max_wait {
            Some(max_wait) => match tokio::time::timeout(max_wait, slot.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    release_slot(&self.slots, &key);
                    tracing::warn!(key = %namespaced_key, ?max_wait, "lock wait timed out");
                    return Err(LockError::Timeout {
                        key: namespaced_key,
                        waited: max_wait,
                    });
                }
            },
            None => slot.lock_owned().await,
        };

        Ok(KeyedLockGuard {
            namespaced_key,
            key,
            guard: Some(guard),
            slots: Arc::clone(&self.slots),
        })
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.slots.len()
    }
}

fn release_slot<K: Eq + Hash>(slots: &DashMap<K, Arc<Mutex<()>>>, key: &K) {
    slots.remove_if(key, |_, slot| Arc::strong_count(slot) == 1);
}

/// Held lock; released on drop.
pub struct KeyedLockGuard<K>
where
    K: Eq + Hash,
{
    namespaced_key: String,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
    slots: Slots<K>,
}

impl<K: Eq + Hash> KeyedLockGuard<K> {
    /// Lock key with namespace ("namespace:key").
    pub fn key(&self) -> &str {
        &self.namespaced_key
    }
}

impl<K: Eq + Hash> Drop for KeyedLockGuard<K> {
    fn drop(&mut self) {
        drop(self.guard.take());
        release_slot(&self.slots, &self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn guard_reports_namespaced_key() {
        let locks = KeyedLocks::new("event_registration", LockConfig::default());
        let guard = locks.lock(42u32).await.unwrap();
        assert_eq!(guard.key(), "event_registration:42");
        assert_eq!(locks.active_keys(), 1);
        drop(guard);
        assert_eq!(locks.active_keys(), 0);
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new(
            "test",
            LockConfig {
                max_wait: Some(Duration::from_millis(50)),
            },
        );
        let _a = locks.lock("a".to_string()).await.unwrap();
        let b = locks.lock("b".to_string()).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn same_key_times_out_while_held() {
        let locks = KeyedLocks::new(
            "test",
            LockConfig {
                max_wait: Some(Duration::from_millis(30)),
            },
        );
        let held = locks.lock(7u64).await.unwrap();
        let err = locks.lock(7u64).await.err().expect("second lock must time out");
        assert!(matches!(err, LockError::Timeout { ref key, .. } if key == "test:7"));
        drop(held);
        assert_eq!(locks.active_keys(), 0);
        assert!(locks.lock(7u64).await.is_ok());
    }

    #[tokio::test]
    async fn same_key_is_mutually_exclusive() {
        let locks = Arc::new(KeyedLocks::new("test", LockConfig { max_wait: None }));
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let locks = locks.clone();
            let inside = inside.clone();
            let max_seen = max_seen.clone();
            handles.push(tokio::spawn(async move {
                let _g = locks.lock(1u32).await.unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active_keys(), 0);
    }
}
