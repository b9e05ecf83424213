//! The read-only slice of the ECS API that discovery depends on.

use async_trait::async_trait;

use crate::ecs::{Tag, Task};
use crate::error::Result;

/// Operation names, shared by error reports, cache keys and the wire protocol.
pub mod operation {
    pub const LIST_CLUSTERS: &str = "ListClusters";
    pub const LIST_SERVICES: &str = "ListServices";
    pub const LIST_TASKS: &str = "ListTasks";
    pub const DESCRIBE_TASKS: &str = "DescribeTasks";
    pub const LIST_TAGS_FOR_RESOURCE: &str = "ListTagsForResource";
}

/// Hierarchical list/describe calls keyed by ARN.
///
/// Only the first page of each list is returned.
#[async_trait]
pub trait EcsClient: Send + Sync {
    /// ARNs of all clusters.
    async fn list_clusters(&self) -> Result<Vec<String>>;

    /// ARNs of the services in a cluster.
    async fn list_services(&self, cluster_arn: &str) -> Result<Vec<String>>;

    /// ARNs of the running tasks of a service.
    async fn list_tasks(&self, cluster_arn: &str, service_arn: &str) -> Result<Vec<String>>;

    /// Details for the given tasks.
    async fn describe_tasks(&self, cluster_arn: &str, task_arns: &[String]) -> Result<Vec<Task>>;

    /// Tags attached to a resource.
    async fn list_tags_for_resource(&self, resource_arn: &str) -> Result<Vec<Tag>>;
}
