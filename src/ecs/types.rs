//! ECS resource types as seen by discovery.

use serde::{Deserialize, Serialize};

/// Returns the trailing path segment of an ARN, used as a readable name.
///
/// `arn:aws:ecs:eu-west-1:123:cluster/prod` becomes `prod`.
pub fn resource_name(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

// == Cluster ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub arn: String,
}

impl Cluster {
    pub fn new(arn: impl Into<String>) -> Self {
        Self { arn: arn.into() }
    }

    pub fn name(&self) -> &str {
        resource_name(&self.arn)
    }
}

// == Service ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub arn: String,
    pub tags: Vec<Tag>,
}

impl Service {
    pub fn name(&self) -> &str {
        resource_name(&self.arn)
    }
}

// == Tag ==
/// A resource tag; keys are free-form and normalized before use as labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// == Task ==
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub private_ipv4_address: Option<String>,
}

/// A running task and the network interfaces of its containers, in order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_arn: String,
    pub network_interfaces: Vec<NetworkInterface>,
}

impl Task {
    /// Builds a task with a single interface carrying `ip`.
    pub fn with_ip(task_arn: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            task_arn: task_arn.into(),
            network_interfaces: vec![NetworkInterface {
                private_ipv4_address: Some(ip.into()),
            }],
        }
    }

    /// First non-empty private IPv4 address across the task's interfaces.
    pub fn private_ipv4(&self) -> Option<&str> {
        self.network_interfaces
            .iter()
            .filter_map(|nic| nic.private_ipv4_address.as_deref())
            .find(|ip| !ip.is_empty())
    }
}
