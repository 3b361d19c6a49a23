//! Property-Based Tests for Cache Module
//!
//! Uses proptest with logical time so expiry properties need no sleeping.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{EvictionPolicy, TtlCache};
use crate::clock::ManualClock;

// == Test Configuration ==
const MAX_AGE: Duration = Duration::from_secs(60);
const MAX_AGE_MS: u64 = 60_000;

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,48}"
}

fn policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop_oneof![Just(EvictionPolicy::Strict), Just(EvictionPolicy::Renew)]
}

/// Entries with arbitrary insertion times, possibly far in the past.
fn aged_entries_strategy() -> impl Strategy<Value = Vec<(String, u64)>> {
    prop::collection::vec((valid_key_strategy(), 0u64..10 * MAX_AGE_MS), 0..64)
}

fn cache_with(clock: &Arc<ManualClock>, policy: EvictionPolicy) -> TtlCache<u64> {
    TtlCache::with_clock("prop", MAX_AGE, policy, clock.clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A forced clear empties the cache whatever the number and age of entries.
    #[test]
    fn prop_forced_clear_empties_cache(
        entries in aged_entries_strategy(),
        policy in policy_strategy()
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = cache_with(&clock, policy);

            for (key, at) in &entries {
                clock.set(*at);
                cache.set(key, *at).await;
            }
            let stored = cache.len().await;

            clock.set(10 * MAX_AGE_MS);
            let removed = cache.clear(true).await;

            prop_assert_eq!(removed, stored);
            prop_assert!(cache.is_empty().await);
            Ok(())
        })?;
    }

    // After a sweep, nothing older than the bound survives and nothing younger is lost.
    #[test]
    fn prop_sweep_respects_bound(
        entries in aged_entries_strategy(),
        policy in policy_strategy(),
        now in 0u64..10 * MAX_AGE_MS
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = cache_with(&clock, policy);

            let mut latest = std::collections::HashMap::new();
            for (key, at) in &entries {
                clock.set(*at);
                cache.set(key, *at).await;
                latest.insert(key.clone(), *at);
            }

            clock.set(now);
            cache.clear(false).await;

            for (key, at) in &latest {
                let fresh = now.saturating_sub(*at) <= MAX_AGE_MS;
                prop_assert_eq!(cache.peek(key).await.is_some(), fresh, "key {}", key);
            }
            Ok(())
        })?;
    }

    // Under the renew policy a hit always resets the entry's age.
    #[test]
    fn prop_hit_renews_under_renew_policy(
        key in valid_key_strategy(),
        idle in 0u64..MAX_AGE_MS,
        later in 0u64..MAX_AGE_MS
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = cache_with(&clock, EvictionPolicy::Renew);
            cache.set(&key, 1).await;

            clock.advance(idle);
            let hit = cache.get(&key, || async { Err::<u64, ()>(()) }).await;
            prop_assert_eq!(hit, Ok(1));
            prop_assert!(!cache.check_time_diff(&key, Duration::ZERO).await);

            clock.advance(later);
            prop_assert!(!cache.check_time_diff(&key, MAX_AGE).await);
            Ok(())
        })?;
    }

    // The last `set` for a key always wins.
    #[test]
    fn prop_last_set_wins(
        key in valid_key_strategy(),
        values in prop::collection::vec(any::<u64>(), 1..16)
    ) {
        tokio_test::block_on(async {
            let clock = Arc::new(ManualClock::new(0));
            let cache = cache_with(&clock, EvictionPolicy::Strict);

            for value in &values {
                cache.set(&key, *value).await;
            }

            prop_assert_eq!(cache.peek(&key).await, values.last().copied());
            prop_assert_eq!(cache.len().await, 1);
            Ok(())
        })?;
    }
}
