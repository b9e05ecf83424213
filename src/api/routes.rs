//! API Routes
//!
//! Configures the Axum router with the discovery endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, stats_handler, targets_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /targets` - Latest target groups in `http_sd` format
/// - `GET /stats` - Response cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/targets", get(targets_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, TtlCache};
    use crate::discovery::TargetGroup;
    use crate::labels::LabelSet;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_state() -> AppState {
        AppState::new(TtlCache::new(CacheConfig::default()).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, json) = get(create_router(create_test_state()), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert!(json["last_refresh"].is_null());
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let (status, json) = get(create_router(create_test_state()), "/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hits"], 0);
        assert_eq!(json["total_entries"], 0);
    }

    #[tokio::test]
    async fn test_targets_unavailable_before_refresh() {
        let (status, json) = get(create_router(create_test_state()), "/targets").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "No targets discovered yet");
    }

    #[tokio::test]
    async fn test_targets_endpoint() {
        let state = create_test_state();
        let mut group = TargetGroup::new("c1", "svcA", LabelSet::new());
        group.add_target("10.0.0.1");
        state.publish(vec![group]).await;

        let (status, json) = get(create_router(state), "/targets").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["targets"][0], "10.0.0.1");
        assert_eq!(json[0]["labels"]["__meta_ecs_service_name"], "svcA");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _) = get(create_router(create_test_state()), "/set").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
