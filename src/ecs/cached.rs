//! Caching ECS client
//!
//! Wraps another [`EcsClient`] and applies a caching policy per operation:
//!
//! | Operation | Cache key | TTL | Remote error with cached entry |
//! |-----------|-----------|-----|--------------------------------|
//! | ListClusters | `ListClusters` | 1h | serve stale entry |
//! | ListServices | `ListServices-{cluster}` | 5m | serve stale entry |
//! | ListTasks | not cached | - | - |
//! | DescribeTasks | `DescribeTasks-{task}` | cache default | error, cached subset dropped |
//! | ListTagsForResource | `ListTagsForResource-{arn}` | cache default | serve stale entry |

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::cache::{CacheConfig, Lookup, TtlCache};
use crate::ecs::client::operation;
use crate::ecs::{EcsClient, Tag, Task};
use crate::error::Result;

pub const CLUSTERS_TTL: Duration = Duration::from_secs(60 * 60);
pub const SERVICES_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Cache payload, one variant per cached operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedResponse {
    Clusters(Vec<String>),
    Services(Vec<String>),
    Task(Task),
    Tags(Vec<Tag>),
}

impl CachedResponse {
    fn into_clusters(self) -> Option<Vec<String>> {
        match self {
            CachedResponse::Clusters(arns) => Some(arns),
            _ => None,
        }
    }

    fn into_services(self) -> Option<Vec<String>> {
        match self {
            CachedResponse::Services(arns) => Some(arns),
            _ => None,
        }
    }

    fn into_task(self) -> Option<Task> {
        match self {
            CachedResponse::Task(task) => Some(task),
            _ => None,
        }
    }

    fn into_tags(self) -> Option<Vec<Tag>> {
        match self {
            CachedResponse::Tags(tags) => Some(tags),
            _ => None,
        }
    }
}

fn cache_key(operation: &str, arn: &str) -> String {
    format!("{}-{}", operation, arn)
}

/// Cache settings the decorator is designed around.
///
/// The sweep interval is twice the default TTL so a stale fallback stays
/// available through outages shorter than that window.
pub fn default_cache_config() -> CacheConfig {
    CacheConfig {
        default_ttl: Some(DEFAULT_TTL),
        sweep_interval: Some(SWEEP_INTERVAL),
        return_stale: true,
    }
}

// == Caching Client ==
pub struct CachingEcsClient {
    inner: Arc<dyn EcsClient>,
    cache: Arc<TtlCache<CachedResponse>>,
}

impl CachingEcsClient {
    pub fn new(inner: Arc<dyn EcsClient>, cache: Arc<TtlCache<CachedResponse>>) -> Self {
        Self { inner, cache }
    }

    /// Wraps `inner` with a fresh cache built from [`default_cache_config`].
    ///
    /// Must be called within a Tokio runtime, which hosts the sweeper.
    pub fn with_default_cache(inner: Arc<dyn EcsClient>) -> Result<Self> {
        Ok(Self::new(inner, TtlCache::new(default_cache_config())?))
    }

    pub fn cache(&self) -> &Arc<TtlCache<CachedResponse>> {
        &self.cache
    }

    /// Read-through lookup with stale fallback on remote failure.
    async fn fetch_with_fallback<T, Fut>(
        &self,
        operation: &'static str,
        key: String,
        ttl: Option<Duration>,
        unwrap: fn(CachedResponse) -> Option<T>,
        wrap: fn(T) -> CachedResponse,
        fetch: Fut,
    ) -> Result<T>
    where
        T: Clone + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let stale = match self.cache.get(&key).filter_map(unwrap) {
            Lookup::Fresh(value) => {
                info!(operation, key = %key, "Cache hit");
                return Ok(value);
            }
            Lookup::Stale(value) => Some(value),
            Lookup::Absent => None,
        };

        match fetch.await {
            Ok(value) => {
                self.cache.set(key, wrap(value.clone()), ttl);
                Ok(value)
            }
            Err(err) => match stale {
                Some(value) => {
                    warn!(
                        operation,
                        key = %key,
                        error = %err,
                        "Remote call failed, stale cache response found and used"
                    );
                    Ok(value)
                }
                None => Err(err),
            },
        }
    }
}

#[async_trait]
impl EcsClient for CachingEcsClient {
    async fn list_clusters(&self) -> Result<Vec<String>> {
        self.fetch_with_fallback(
            operation::LIST_CLUSTERS,
            operation::LIST_CLUSTERS.to_string(),
            Some(CLUSTERS_TTL),
            CachedResponse::into_clusters,
            CachedResponse::Clusters,
            self.inner.list_clusters(),
        )
        .await
    }

    async fn list_services(&self, cluster_arn: &str) -> Result<Vec<String>> {
        self.fetch_with_fallback(
            operation::LIST_SERVICES,
            cache_key(operation::LIST_SERVICES, cluster_arn),
            Some(SERVICES_TTL),
            CachedResponse::into_services,
            CachedResponse::Services,
            self.inner.list_services(cluster_arn),
        )
        .await
    }

    async fn list_tasks(&self, cluster_arn: &str, service_arn: &str) -> Result<Vec<String>> {
        self.inner.list_tasks(cluster_arn, service_arn).await
    }

    async fn describe_tasks(&self, cluster_arn: &str, task_arns: &[String]) -> Result<Vec<Task>> {
        let mut cached = Vec::new();
        let mut uncached = Vec::new();

        for arn in task_arns {
            let key = cache_key(operation::DESCRIBE_TASKS, arn);
            match self.cache.get(&key).filter_map(CachedResponse::into_task) {
                Lookup::Fresh(task) => {
                    info!(task = %arn, "DescribeTasks cache hit");
                    cached.push(task);
                }
                _ => uncached.push(arn.clone()),
            }
        }

        if uncached.is_empty() {
            return Ok(cached);
        }

        let mut tasks = match self.inner.describe_tasks(cluster_arn, &uncached).await {
            Ok(tasks) => tasks,
            Err(err) => {
                // The cached subset is dropped: callers see the failure, not a partial list.
                if !cached.is_empty() {
                    warn!(
                        cached = cached.len(),
                        uncached = uncached.len(),
                        "DescribeTasks failed, discarding cached tasks for this call"
                    );
                }
                return Err(err);
            }
        };

        for task in &tasks {
            self.cache.set_default(
                cache_key(operation::DESCRIBE_TASKS, &task.task_arn),
                CachedResponse::Task(task.clone()),
            );
        }

        tasks.extend(cached);
        Ok(tasks)
    }

    async fn list_tags_for_resource(&self, resource_arn: &str) -> Result<Vec<Tag>> {
        self.fetch_with_fallback(
            operation::LIST_TAGS_FOR_RESOURCE,
            cache_key(operation::LIST_TAGS_FOR_RESOURCE, resource_arn),
            self.cache.config().default_ttl,
            CachedResponse::into_tags,
            CachedResponse::Tags,
            self.inner.list_tags_for_resource(resource_arn),
        )
        .await
    }
}
