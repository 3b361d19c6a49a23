//! Operation Policy Module
//!
//! Fixed table of catalogue operations that are worth caching and how.

use std::time::Duration;

use serde_json::Value;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Operation that reports the caller's rate-limit state.
///
/// Every remote call changes that state, so it is never cached.
pub const RATE_LIMITS: &str = "getRateLimits";

/// Caching rules for one catalogue operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPolicy {
    pub name: &'static str,
    /// How long a durable record stays fresh
    pub ttl: Duration,
    /// Argument position holding a "refresh now" flag
    pub force_refresh_arg: Option<usize>,
    /// Argument position holding a secret that must not be logged
    pub secret_arg: Option<usize>,
}

impl OperationPolicy {
    const fn cached(name: &'static str, ttl: Duration) -> Self {
        Self {
            name,
            ttl,
            force_refresh_arg: None,
            secret_arg: None,
        }
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }

    /// True when the force-refresh argument is present and `true`.
    pub fn is_forced(&self, args: &[Value]) -> bool {
        self.force_refresh_arg
            .and_then(|index| args.get(index))
            .is_some_and(|flag| matches!(flag, Value::Bool(true)))
    }
}

// == Operation Table ==
pub const OPERATIONS: &[OperationPolicy] = &[
    OperationPolicy::cached("getModInfo", DAY),
    OperationPolicy::cached("getModFiles", HOUR),
    OperationPolicy {
        secret_arg: Some(3),
        ..OperationPolicy::cached("getDownloadURLs", HOUR)
    },
    OperationPolicy::cached("getTrending", HOUR),
    OperationPolicy {
        force_refresh_arg: Some(0),
        ..OperationPolicy::cached("getTrackedMods", HOUR)
    },
];

/// Policy for `operation`, or `None` when it is passed straight through.
pub fn lookup(operation: &str) -> Option<&'static OperationPolicy> {
    OPERATIONS.iter().find(|policy| policy.name == operation)
}
