//! Cache Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::TtlCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task holds only a weak reference, so it exits on its own once the
/// cache is dropped. It also exits when `shutdown` is cancelled, which
/// `TtlCache::close` does.
///
/// Expired entries stay readable as stale until a sweep removes them, so the
/// interval bounds how long a stale fallback remains available.
pub fn spawn_sweeper<V>(
    cache: Weak<TtlCache<V>>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Starting cache sweeper");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.cancelled() => {
                    debug!("Cache sweeper stopped");
                    return;
                }
            }

            let Some(cache) = cache.upgrade() else {
                debug!("Cache dropped, sweeper exiting");
                return;
            };

            let removed = cache.purge_expired();
            if removed > 0 {
                info!(removed, "Cache sweep removed expired entries");
            } else {
                debug!("Cache sweep found no expired entries");
            }
        }
    })
}
