//! API Handlers
//!
//! HTTP request handlers for the discovery endpoints.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};

use crate::cache::TtlCache;
use crate::discovery::TargetGroup;
use crate::ecs::CachedResponse;
use crate::error::{DiscoveryError, Result};
use crate::models::{render_static_configs, HealthResponse, StatsResponse, StaticConfig};

/// The most recent successful refresh.
#[derive(Debug, Clone)]
pub struct TargetSnapshot {
    pub groups: Vec<TargetGroup>,
    pub refreshed_at: DateTime<Utc>,
}

/// Application state shared across all handlers.
///
/// Holds the latest published target groups and the response cache whose
/// statistics are exposed on `/stats`.
#[derive(Clone)]
pub struct AppState {
    /// Latest batch, `None` until the first refresh succeeds
    pub targets: Arc<RwLock<Option<TargetSnapshot>>>,
    /// Cache behind the caching ECS client
    pub cache: Arc<TtlCache<CachedResponse>>,
}

impl AppState {
    pub fn new(cache: Arc<TtlCache<CachedResponse>>) -> Self {
        Self {
            targets: Arc::new(RwLock::new(None)),
            cache,
        }
    }

    /// Replaces the published batch.
    pub async fn publish(&self, groups: Vec<TargetGroup>) {
        let snapshot = TargetSnapshot {
            groups,
            refreshed_at: Utc::now(),
        };
        *self.targets.write().await = Some(snapshot);
    }

    pub async fn snapshot(&self) -> Option<TargetSnapshot> {
        self.targets.read().await.clone()
    }
}

/// Handler for GET /targets
///
/// Returns the latest batch in Prometheus `http_sd` format.
pub async fn targets_handler(State(state): State<AppState>) -> Result<Json<Vec<StaticConfig>>> {
    let targets = state.targets.read().await;
    let snapshot = targets.as_ref().ok_or(DiscoveryError::NotReady)?;

    Ok(Json(render_static_configs(&snapshot.groups)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let last_refresh = state.targets.read().await.as_ref().map(|s| s.refreshed_at);
    Json(HealthResponse::healthy(last_refresh))
}
