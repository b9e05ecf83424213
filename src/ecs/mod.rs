//! ECS Module
//!
//! The remote API seam: resource types, the client trait, an HTTP
//! implementation and the caching decorator that wraps it.

mod cached;
mod client;
mod http;
mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use cached::{
    default_cache_config, CachedResponse, CachingEcsClient, CLUSTERS_TTL, DEFAULT_TTL,
    SERVICES_TTL, SWEEP_INTERVAL,
};
pub use client::{operation, EcsClient};
pub use http::HttpEcsClient;
pub use types::{resource_name, Cluster, NetworkInterface, Service, Tag, Task};
