//! TTL Sweep Task
//!
//! Background task that periodically evicts stale cache entries.

use std::sync::Weak;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Something holding entries that can age out.
#[async_trait]
pub trait Sweep: Send + Sync + 'static {
    /// Name used in log lines.
    fn label(&self) -> &str;

    /// Removes stale entries and returns how many were removed.
    async fn sweep(&self) -> usize;
}

/// Spawns a background task that sweeps `target` every `interval`.
///
/// The task only holds a weak reference, so it exits on its own once the
/// target is dropped. Abort the returned handle to stop it earlier.
///
/// # Example
/// ```ignore
/// let handle = spawn_sweep_task(Arc::downgrade(&inner), Duration::from_secs(60));
/// // Later:
/// handle.abort();
/// ```
pub fn spawn_sweep_task<S: Sweep>(target: Weak<S>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Some(target) = target.upgrade() {
            info!(
                cache = target.label(),
                "Starting TTL sweep task with interval of {:?}", interval
            );
        }

        loop {
            tokio::time::sleep(interval).await;

            let Some(target) = target.upgrade() else {
                debug!("TTL sweep: cache dropped, stopping");
                break;
            };

            let removed = target.sweep().await;
            if removed > 0 {
                info!(cache = target.label(), "TTL sweep: removed {} stale entries", removed);
            } else {
                debug!(cache = target.label(), "TTL sweep: no stale entries found");
            }
        }
    })
}
