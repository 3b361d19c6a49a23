//! Cache Orchestrator Module
//!
//! Decides, per catalogue call, whether the answer comes from the durable
//! store, the in-memory cache or the remote catalogue.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheStats, TtlCache};
use crate::catalogue::key::{cache_key, log_key};
use crate::catalogue::policy::{lookup, OperationPolicy};
use crate::catalogue::{CatalogueClient, DurableStore};
use crate::clock::Clock;
use crate::error::CatalogueError;

/// Field stamped into durable records when they are written.
pub const CACHE_TIME_FIELD: &str = "cache_time";

// == Cache Orchestrator ==
pub struct CacheOrchestrator {
    client: Arc<dyn CatalogueClient>,
    store: Arc<dyn DurableStore>,
    memory: TtlCache<Value>,
    clock: Arc<dyn Clock>,
}

impl CacheOrchestrator {
    pub fn new(
        client: Arc<dyn CatalogueClient>,
        store: Arc<dyn DurableStore>,
        memory: TtlCache<Value>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            store,
            memory,
            clock,
        }
    }

    /// The in-memory tier, for sweeping and stats.
    pub fn memory(&self) -> &TtlCache<Value> {
        &self.memory
    }

    pub async fn stats(&self) -> CacheStats {
        self.memory.stats().await
    }

    // == Call ==
    /// Runs `operation`, answering from cache when a fresh copy exists.
    ///
    /// Failures are logged and reported as `None`, meaning "nothing right
    /// now" rather than "confirmed empty".
    pub async fn call(&self, api_key: &str, operation: &str, args: &[Value]) -> Option<Value> {
        let policy = lookup(operation);
        let logged = log_key(operation, args, policy);

        let outcome = match policy {
            Some(policy) => self.call_cached(api_key, policy, args, &logged).await,
            None => {
                debug!(key = %logged, "Uncached catalogue operation");
                self.client.call(api_key, operation, args).await
            }
        };

        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                error!(key = %logged, "Catalogue call failed: {}", err);
                None
            }
        }
    }

    async fn call_cached(
        &self,
        api_key: &str,
        policy: &OperationPolicy,
        args: &[Value],
        logged: &str,
    ) -> Result<Value, CatalogueError> {
        let key = cache_key(policy.name, args, Some(policy));
        let forced = policy.is_forced(args);
        let now = self.clock.now_ms();

        if forced {
            info!(key = %logged, "Forced refresh");
            self.memory.delete(&key).await;
        } else if let Some(record) = self.fresh_record(&key, policy, now, logged).await {
            return Ok(record);
        }

        let value = self
            .memory
            .get(&key, move || async move {
                info!(key = %logged, "Fetching from catalogue");
                self.client.call(api_key, policy.name, args).await
            })
            .await?;

        let mut record = match value {
            Value::Object(record) => record,
            other => return Ok(other),
        };
        record.insert(CACHE_TIME_FIELD.to_string(), Value::from(now));
        let record = Value::Object(record);

        if let Err(err) = self.store.set(&key, record.clone()).await {
            warn!(key = %logged, "Failed to persist catalogue record: {}", err);
        }
        Ok(record)
    }

    /// Durable record for `key` if it carries a `cache_time` within the TTL.
    async fn fresh_record(
        &self,
        key: &str,
        policy: &OperationPolicy,
        now: u64,
        logged: &str,
    ) -> Option<Value> {
        let record = match self.store.get(key).await {
            Ok(record) => record?,
            Err(err) => {
                warn!(key = %logged, "Durable store read failed, treating as miss: {}", err);
                return None;
            }
        };

        let cached_at = record.get(CACHE_TIME_FIELD).and_then(Value::as_u64)?;
        if now.saturating_sub(cached_at) < policy.ttl_ms() {
            debug!(key = %logged, cached_at, "Durable store hit");
            Some(record)
        } else {
            debug!(key = %logged, cached_at, "Durable record expired");
            None
        }
    }

    // == Invalidation ==
    /// Drops the cached answer for one call from both tiers.
    pub async fn invalidate(&self, operation: &str, args: &[Value]) -> Result<(), CatalogueError> {
        let key = cache_key(operation, args, lookup(operation));
        self.memory.delete(&key).await;
        self.store.delete(&key).await?;
        Ok(())
    }

    /// Empties both tiers.
    pub async fn clear(&self) -> Result<(), CatalogueError> {
        let removed = self.memory.clear(true).await;
        self.store.clear().await?;
        info!(removed, "Cleared catalogue cache");
        Ok(())
    }
}
