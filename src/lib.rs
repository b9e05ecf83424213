//! ECS service discovery
//!
//! Periodically walks ECS clusters, services and tasks and publishes one
//! Prometheus target group per service, backed by a TTL cache that keeps
//! serving stale responses while the remote API is failing.

pub mod api;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod ecs;
pub mod error;
pub mod labels;
pub mod models;
pub mod output;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{CacheConfig, Lookup, TtlCache};
pub use config::Config;
pub use discovery::{Discovery, TargetGroup};
pub use ecs::{CachingEcsClient, EcsClient, HttpEcsClient};
pub use error::{DiscoveryError, Result};
pub use output::FileSdWriter;
pub use tasks::{spawn_publisher, spawn_sweeper};
