//! Cache Store Module
//!
//! Named in-memory TTL cache with a producer-backed `get` and a periodic sweep.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy};
use crate::clock::{Clock, SystemClock};
use crate::tasks::{spawn_sweep_task, Sweep};

// == TTL Cache ==
/// Map from string key to a timestamped value.
///
/// Cloning is cheap; clones share the same entries and sweep timer.
pub struct TtlCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<V> {
    name: String,
    max_age: Duration,
    policy: EvictionPolicy,
    clock: Arc<dyn Clock>,
    state: RwLock<State<V>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

struct State<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

impl<V> Inner<V> {
    fn sweeper(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.sweeper.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn clear(&self, forced: bool) -> usize {
        let now = self.clock.now_ms();
        let mut state = self.state.write().await;
        let before = state.entries.len();

        if forced {
            state.entries.clear();
        } else {
            let (max_age, policy) = (self.max_age, self.policy);
            state
                .entries
                .retain(|_, entry| !entry.check_time_diff(max_age, now, policy));
        }

        let removed = before - state.entries.len();
        state.stats.record_evictions(removed);
        state.stats.record_sweep();
        state.stats.total_entries = state.entries.len();
        removed
    }
}

#[async_trait]
impl<V: Send + Sync + 'static> Sweep for Inner<V> {
    fn label(&self) -> &str {
        &self.name
    }

    async fn sweep(&self) -> usize {
        self.clear(false).await
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache whose entries live for `max_age` under `policy`.
    pub fn new(name: impl Into<String>, max_age: Duration, policy: EvictionPolicy) -> Self {
        Self::with_clock(name, max_age, policy, Arc::new(SystemClock))
    }

    /// Same as [`TtlCache::new`] but reading time from `clock`.
    pub fn with_clock(
        name: impl Into<String>,
        max_age: Duration,
        policy: EvictionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State {
                    entries: HashMap::new(),
                    stats: CacheStats::named(name.clone()),
                }),
                name,
                max_age,
                policy,
                clock,
                sweeper: Mutex::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.inner.policy
    }

    // == Get ==
    /// Returns the cached value for `key`, or runs `producer` and caches its result.
    ///
    /// The lock is not held while the producer runs, so concurrent misses on the
    /// same key each run their own producer and the last one to finish wins.
    /// A failing producer stores nothing.
    pub async fn get<F, Fut, E>(&self, key: &str, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(key).await {
            return Ok(value);
        }

        let value = producer().await?;
        Ok(self.set(key, value).await)
    }

    /// Hit path of [`TtlCache::get`]: counts the lookup and renews under `Renew`.
    async fn lookup(&self, key: &str) -> Option<V> {
        let now = self.inner.clock.now_ms();
        let (max_age, policy) = (self.inner.max_age, self.inner.policy);
        let mut guard = self.inner.state.write().await;
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) => entry.check_time_diff(max_age, now, policy),
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        if expired {
            state.entries.remove(key);
            state.stats.record_evictions(1);
            state.stats.record_miss();
            state.stats.total_entries = state.entries.len();
            debug!(cache = %self.inner.name, key, "lazily evicted stale entry");
            return None;
        }

        let entry = state.entries.get_mut(key)?;
        if policy == EvictionPolicy::Renew {
            entry.renew(now);
        }
        state.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Peek ==
    /// Returns the stored value without counting, renewing or expiring it.
    pub async fn peek(&self, key: &str) -> Option<V> {
        let state = self.inner.state.read().await;
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` as a fresh entry, replacing any previous one.
    pub async fn set(&self, key: &str, value: V) -> V {
        let entry = CacheEntry::new(value.clone(), self.inner.clock.now_ms());
        let mut state = self.inner.state.write().await;
        state.entries.insert(key.to_string(), entry);
        state.stats.total_entries = state.entries.len();
        value
    }

    // == Delete ==
    /// Removes `key`; returns whether an entry was present.
    pub async fn delete(&self, key: &str) -> bool {
        let mut state = self.inner.state.write().await;
        let removed = state.entries.remove(key).is_some();
        state.stats.total_entries = state.entries.len();
        removed
    }

    // == Renew ==
    /// Resets the idle age of `key`; returns whether an entry was present.
    pub async fn renew(&self, key: &str) -> bool {
        let now = self.inner.clock.now_ms();
        let mut state = self.inner.state.write().await;
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.renew(now);
                true
            }
            None => false,
        }
    }

    // == Check Time Diff ==
    /// Whether `key` has outlived `max_age` under this cache's policy.
    ///
    /// Missing keys report `false`.
    pub async fn check_time_diff(&self, key: &str, max_age: Duration) -> bool {
        let now = self.inner.clock.now_ms();
        let state = self.inner.state.read().await;
        state
            .entries
            .get(key)
            .is_some_and(|entry| entry.check_time_diff(max_age, now, self.inner.policy))
    }

    // == Clear ==
    /// Removes every stale entry, or every entry when `forced`.
    ///
    /// Returns the number of entries removed.
    pub async fn clear(&self, forced: bool) -> usize {
        self.inner.clear(forced).await
    }

    // == Sweep Timer ==
    /// Starts sweeping every `frequency`. Returns false if already running.
    pub fn start(&self, frequency: Duration) -> bool {
        let mut sweeper = self.inner.sweeper();
        if sweeper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }
        *sweeper = Some(spawn_sweep_task(Arc::downgrade(&self.inner), frequency));
        true
    }

    /// Stops the sweep timer. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        match self.inner.sweeper().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .sweeper()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let state = self.inner.state.read().await;
        let mut stats = state.stats.clone();
        stats.total_entries = state.entries.len();
        stats
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
