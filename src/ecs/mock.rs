//! In-memory `EcsClient` that records every call, for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ecs::client::operation;
use crate::ecs::{EcsClient, Tag, Task};
use crate::error::{DiscoveryError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListClusters,
    ListServices(String),
    ListTasks(String, String),
    DescribeTasks(Vec<String>),
    ListTagsForResource(String),
}

#[derive(Debug, Default)]
struct State {
    clusters: Vec<String>,
    services: HashMap<String, Vec<String>>,
    task_arns: HashMap<String, Vec<String>>,
    tasks: HashMap<String, Task>,
    tags: HashMap<String, Vec<Tag>>,
    failing: HashSet<String>,
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct MockEcsClient {
    state: Mutex<State>,
}

impl MockEcsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(self, cluster_arn: &str) -> Self {
        self.state.lock().unwrap().clusters.push(cluster_arn.to_string());
        self
    }

    pub fn with_service(self, cluster_arn: &str, service_arn: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .services
            .entry(cluster_arn.to_string())
            .or_default()
            .push(service_arn.to_string());
        self
    }

    pub fn with_task(self, service_arn: &str, task: Task) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state
                .task_arns
                .entry(service_arn.to_string())
                .or_default()
                .push(task.task_arn.clone());
            state.tasks.insert(task.task_arn.clone(), task);
        }
        self
    }

    pub fn with_tags(self, resource_arn: &str, tags: Vec<Tag>) -> Self {
        self.state
            .lock()
            .unwrap()
            .tags
            .insert(resource_arn.to_string(), tags);
        self
    }

    /// Makes every call of `operation` fail.
    pub fn fail(&self, operation: &str) {
        self.state.lock().unwrap().failing.insert(operation.to_string());
    }

    /// Makes `operation` fail only for the given ARN argument.
    pub fn fail_for(&self, operation: &str, arn: &str) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(format!("{}:{}", operation, arn));
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failing.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call, operation: &'static str, arn: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let fails = state.failing.contains(operation)
            || arn.is_some_and(|arn| state.failing.contains(&format!("{}:{}", operation, arn)));
        if fails {
            return Err(DiscoveryError::remote(operation, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl EcsClient for MockEcsClient {
    async fn list_clusters(&self) -> Result<Vec<String>> {
        self.record(Call::ListClusters, operation::LIST_CLUSTERS, None)?;
        Ok(self.state.lock().unwrap().clusters.clone())
    }

    async fn list_services(&self, cluster_arn: &str) -> Result<Vec<String>> {
        self.record(
            Call::ListServices(cluster_arn.to_string()),
            operation::LIST_SERVICES,
            Some(cluster_arn),
        )?;
        let state = self.state.lock().unwrap();
        Ok(state.services.get(cluster_arn).cloned().unwrap_or_default())
    }

    async fn list_tasks(&self, cluster_arn: &str, service_arn: &str) -> Result<Vec<String>> {
        self.record(
            Call::ListTasks(cluster_arn.to_string(), service_arn.to_string()),
            operation::LIST_TASKS,
            Some(service_arn),
        )?;
        let state = self.state.lock().unwrap();
        Ok(state.task_arns.get(service_arn).cloned().unwrap_or_default())
    }

    async fn describe_tasks(&self, _cluster_arn: &str, task_arns: &[String]) -> Result<Vec<Task>> {
        self.record(
            Call::DescribeTasks(task_arns.to_vec()),
            operation::DESCRIBE_TASKS,
            None,
        )?;
        let state = self.state.lock().unwrap();
        Ok(task_arns
            .iter()
            .filter_map(|arn| state.tasks.get(arn).cloned())
            .collect())
    }

    async fn list_tags_for_resource(&self, resource_arn: &str) -> Result<Vec<Tag>> {
        self.record(
            Call::ListTagsForResource(resource_arn.to_string()),
            operation::LIST_TAGS_FOR_RESOURCE,
            Some(resource_arn),
        )?;
        let state = self.state.lock().unwrap();
        Ok(state.tags.get(resource_arn).cloned().unwrap_or_default())
    }
}
