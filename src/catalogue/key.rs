//! Cache Key Module
//!
//! Storage keys and their redacted logging twins.

use serde_json::Value;

use crate::catalogue::OperationPolicy;

/// Stands in for a secret argument in log lines.
pub const REDACTED: &str = "<redacted>";

/// Key used for lookup in both cache tiers.
///
/// `"{operation}:{args as a JSON array}"`. The force-refresh flag is left out
/// so a forced call replaces the entry ordinary calls read.
pub fn cache_key(operation: &str, args: &[Value], policy: Option<&OperationPolicy>) -> String {
    render(operation, args, policy, false)
}

/// Same shape as [`cache_key`] with the secret argument masked. Logging only.
pub fn log_key(operation: &str, args: &[Value], policy: Option<&OperationPolicy>) -> String {
    render(operation, args, policy, true)
}

fn render(
    operation: &str,
    args: &[Value],
    policy: Option<&OperationPolicy>,
    redact: bool,
) -> String {
    let force = policy.and_then(|p| p.force_refresh_arg);
    let secret = policy.and_then(|p| p.secret_arg);

    let parts: Vec<Value> = args
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != force)
        .map(|(index, arg)| {
            if redact && Some(index) == secret {
                Value::String(REDACTED.to_string())
            } else {
                arg.clone()
            }
        })
        .collect();

    format!("{}:{}", operation, Value::Array(parts))
}
