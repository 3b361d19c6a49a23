//! Eviction Policy Module
//!
//! Decides which timestamp an entry's age is measured from.

use std::fmt;
use std::str::FromStr;

// == Eviction Policy ==
/// How a cache measures the age of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Age counts from creation; reads never extend an entry's life.
    #[default]
    Strict,
    /// Age counts from the last access or renewal; only idle entries expire.
    Renew,
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(EvictionPolicy::Strict),
            "renew" => Ok(EvictionPolicy::Renew),
            other => Err(format!("unknown eviction policy: {other}")),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Strict => f.write_str("strict"),
            EvictionPolicy::Renew => f.write_str("renew"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Strict));
        assert_eq!(" Renew ".parse::<EvictionPolicy>(), Ok(EvictionPolicy::Renew));
        assert!("lru".parse::<EvictionPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_round_trips() {
        for policy in [EvictionPolicy::Strict, EvictionPolicy::Renew] {
            assert_eq!(policy.to_string().parse::<EvictionPolicy>(), Ok(policy));
        }
    }
}
