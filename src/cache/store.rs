//! Cache Store Module
//!
//! Generic TTL cache over a concurrent map, with optional stale reads and a
//! background sweeper.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats};
use crate::error::{DiscoveryError, Result};
use crate::tasks::spawn_sweeper;

// == Cache Config ==
/// Immutable cache settings, validated once by [`TtlCache::new`].
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// TTL used by `set_default`; None means entries never expire
    pub default_ttl: Option<Duration>,
    /// Interval of the background sweeper; None disables it
    pub sweep_interval: Option<Duration>,
    /// Serve expired entries as [`Lookup::Stale`] instead of [`Lookup::Absent`]
    pub return_stale: bool,
}

impl CacheConfig {
    fn validate(&self) -> Result<()> {
        if matches!(self.sweep_interval, Some(interval) if interval.is_zero()) {
            return Err(DiscoveryError::Config(
                "cache sweep interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

// == Lookup ==
/// Outcome of a cache read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Entry present and not expired
    Fresh(V),
    /// Entry present but expired, returned because stale reads are enabled
    Stale(V),
    /// No usable entry
    Absent,
}

impl<V> Lookup<V> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    /// Returns the value only if it is fresh.
    pub fn fresh(self) -> Option<V> {
        match self {
            Lookup::Fresh(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value whether fresh or stale.
    pub fn into_value(self) -> Option<V> {
        match self {
            Lookup::Fresh(value) | Lookup::Stale(value) => Some(value),
            Lookup::Absent => None,
        }
    }

    /// Maps the value, keeping freshness; `None` from `f` becomes `Absent`.
    pub fn filter_map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(V) -> Option<U>,
    {
        match self {
            Lookup::Fresh(value) => f(value).map_or(Lookup::Absent, Lookup::Fresh),
            Lookup::Stale(value) => f(value).map_or(Lookup::Absent, Lookup::Stale),
            Lookup::Absent => Lookup::Absent,
        }
    }
}

// == TTL Cache ==
/// Key/value store with per-entry expiration.
///
/// Safe for concurrent use through a shared reference; the map is sharded so
/// readers never observe a half-written entry.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    config: CacheConfig,
    stats: StatsRecorder,
    closed: AtomicBool,
    shutdown: CancellationToken,
    sweeper: OnceLock<JoinHandle<()>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and, when a sweep interval is configured, starts its sweeper.
    ///
    /// Starting the sweeper requires a running Tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let cache = Arc::new(Self {
            entries: DashMap::new(),
            config,
            stats: StatsRecorder::default(),
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            sweeper: OnceLock::new(),
        });

        if let Some(interval) = cache.config.sweep_interval {
            if tokio::runtime::Handle::try_current().is_err() {
                return Err(DiscoveryError::Config(
                    "cache sweeper requires a Tokio runtime".to_string(),
                ));
            }
            let handle = spawn_sweeper(Arc::downgrade(&cache), interval, cache.shutdown.clone());
            let _ = cache.sweeper.set(handle);
        }

        Ok(cache)
    }

    // == Get ==
    /// Looks up `key`, distinguishing fresh, stale and absent entries.
    pub fn get(&self, key: &str) -> Lookup<V> {
        if self.is_closed() {
            return Lookup::Absent;
        }

        let now = Instant::now();
        let lookup = match self.entries.get(key) {
            None => Lookup::Absent,
            Some(entry) if !entry.is_expired_at(now) => Lookup::Fresh(entry.value.clone()),
            Some(entry) if self.config.return_stale => Lookup::Stale(entry.value.clone()),
            Some(_) => Lookup::Absent,
        };

        match &lookup {
            Lookup::Fresh(_) => self.stats.record_hit(),
            Lookup::Stale(_) => self.stats.record_stale(),
            Lookup::Absent => self.stats.record_miss(),
        }
        lookup
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// A `None` or zero TTL stores an entry that never expires.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        if self.is_closed() {
            debug!(key = %key, "Ignoring set on closed cache");
            return;
        }
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Stores `value` with the configured default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: V) {
        self.set(key, value, self.config.default_ttl);
    }

    // == Delete ==
    /// Removes the entry for `key`, if any.
    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    // == Range ==
    /// Visits every non-expired entry in unspecified order until `visit` breaks.
    ///
    /// `visit` must not write to this cache; shard locks are held while it runs.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &V) -> ControlFlow<()>,
    {
        if self.is_closed() {
            return;
        }

        let now = Instant::now();
        for item in self.entries.iter() {
            if item.value().is_expired_at(now) {
                continue;
            }
            if visit(item.key(), &item.value().value).is_break() {
                break;
            }
        }
    }

    // == Purge Expired ==
    /// Removes every expired entry, regardless of the stale-read setting.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        self.stats.record_swept(removed);
        removed
    }

    // == Close ==
    /// Stops the sweeper and drops every entry. Later operations are no-ops.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.cancel();
        self.entries.clear();
        debug!("Cache closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Returns true while a background sweeper task is alive.
    pub fn sweeper_running(&self) -> bool {
        self.sweeper
            .get()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Drop for TtlCache<V> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
