//! ECS client over the AWS JSON 1.1 protocol.
//!
//! Requests are sent unsigned; point the endpoint at a signing proxy or a
//! local emulator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ecs::client::operation;
use crate::ecs::{EcsClient, NetworkInterface, Tag, Task};
use crate::error::{DiscoveryError, Result};

const TARGET_PREFIX: &str = "AmazonEC2ContainerServiceV20141113";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const AMZ_TARGET: &str = "X-Amz-Target";

// == Wire Types ==
#[derive(Serialize)]
struct ListServicesRequest<'a> {
    cluster: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListTasksRequest<'a> {
    cluster: &'a str,
    service_name: &'a str,
}

#[derive(Serialize)]
struct DescribeTasksRequest<'a> {
    cluster: &'a str,
    tasks: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListTagsRequest<'a> {
    resource_arn: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListClustersResponse {
    #[serde(default)]
    cluster_arns: Vec<String>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListServicesResponse {
    #[serde(default)]
    service_arns: Vec<String>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTasksResponse {
    #[serde(default)]
    task_arns: Vec<String>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct DescribeTasksResponse {
    #[serde(default)]
    tasks: Vec<WireTask>,
    #[serde(default)]
    failures: Vec<WireFailure>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTask {
    task_arn: Option<String>,
    #[serde(default)]
    containers: Vec<WireContainer>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireContainer {
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
}

#[derive(Deserialize)]
struct WireFailure {
    arn: Option<String>,
    reason: Option<String>,
}

#[derive(Deserialize)]
struct ListTagsResponse {
    #[serde(default)]
    tags: Vec<WireTag>,
}

#[derive(Deserialize)]
struct WireTag {
    key: Option<String>,
    value: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl WireTask {
    /// Tasks without an ARN are dropped.
    fn into_task(self) -> Option<Task> {
        let task_arn = self.task_arn?;
        let network_interfaces = self
            .containers
            .into_iter()
            .flat_map(|container| container.network_interfaces)
            .collect();
        Some(Task {
            task_arn,
            network_interfaces,
        })
    }
}

fn log_truncated(operation: &'static str, next_token: &Option<String>) {
    if next_token.is_some() {
        debug!(operation, "More results available, only the first page is used");
    }
}

// == HTTP Client ==
#[derive(Debug, Clone)]
pub struct HttpEcsClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpEcsClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    async fn call<B, R>(&self, operation: &'static str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AMZ_TARGET, format!("{}.{}", TARGET_PREFIX, operation))
            .header(CONTENT_TYPE, AMZ_JSON)
            .json(body)
            .send()
            .await
            .map_err(|e| DiscoveryError::remote(operation, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DiscoveryError::remote(operation, e.to_string()))?;

        if !status.is_success() {
            let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
            let message = match (body.kind, body.message) {
                (Some(kind), Some(message)) => format!("{} ({}): {}", status, kind, message),
                (Some(kind), None) => format!("{} ({})", status, kind),
                (None, Some(message)) => format!("{}: {}", status, message),
                (None, None) => status.to_string(),
            };
            return Err(DiscoveryError::remote(operation, message));
        }

        serde_json::from_str(&text)
            .map_err(|e| DiscoveryError::remote(operation, format!("invalid response: {}", e)))
    }
}

#[async_trait]
impl EcsClient for HttpEcsClient {
    async fn list_clusters(&self) -> Result<Vec<String>> {
        let response: ListClustersResponse = self
            .call(operation::LIST_CLUSTERS, &serde_json::json!({}))
            .await?;
        log_truncated(operation::LIST_CLUSTERS, &response.next_token);
        Ok(response.cluster_arns)
    }

    async fn list_services(&self, cluster_arn: &str) -> Result<Vec<String>> {
        let response: ListServicesResponse = self
            .call(
                operation::LIST_SERVICES,
                &ListServicesRequest {
                    cluster: cluster_arn,
                },
            )
            .await?;
        log_truncated(operation::LIST_SERVICES, &response.next_token);
        Ok(response.service_arns)
    }

    async fn list_tasks(&self, cluster_arn: &str, service_arn: &str) -> Result<Vec<String>> {
        let response: ListTasksResponse = self
            .call(
                operation::LIST_TASKS,
                &ListTasksRequest {
                    cluster: cluster_arn,
                    service_name: service_arn,
                },
            )
            .await?;
        log_truncated(operation::LIST_TASKS, &response.next_token);
        Ok(response.task_arns)
    }

    async fn describe_tasks(&self, cluster_arn: &str, task_arns: &[String]) -> Result<Vec<Task>> {
        if task_arns.is_empty() {
            return Ok(Vec::new());
        }

        let response: DescribeTasksResponse = self
            .call(
                operation::DESCRIBE_TASKS,
                &DescribeTasksRequest {
                    cluster: cluster_arn,
                    tasks: task_arns,
                },
            )
            .await?;

        for failure in &response.failures {
            warn!(
                arn = failure.arn.as_deref().unwrap_or("unknown"),
                reason = failure.reason.as_deref().unwrap_or("unknown"),
                "DescribeTasks reported a failure"
            );
        }

        Ok(response
            .tasks
            .into_iter()
            .filter_map(WireTask::into_task)
            .collect())
    }

    async fn list_tags_for_resource(&self, resource_arn: &str) -> Result<Vec<Tag>> {
        let response: ListTagsResponse = self
            .call(
                operation::LIST_TAGS_FOR_RESOURCE,
                &ListTagsRequest { resource_arn },
            )
            .await?;

        Ok(response
            .tags
            .into_iter()
            .filter_map(|tag| Some(Tag::new(tag.key?, tag.value.unwrap_or_default())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Fake ECS endpoint answering by `X-Amz-Target`.
    async fn fake_ecs(headers: HeaderMap, body: String) -> (StatusCode, Json<Value>) {
        let body: Value = serde_json::from_str(&body).unwrap_or_default();
        let target = headers
            .get(AMZ_TARGET)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .trim_start_matches("AmazonEC2ContainerServiceV20141113.")
            .to_string();

        match target.as_str() {
            "ListClusters" => (
                StatusCode::OK,
                Json(json!({ "clusterArns": ["arn:cluster/c1"], "nextToken": "more" })),
            ),
            "ListServices" => (
                StatusCode::OK,
                Json(json!({ "serviceArns": [format!("{}/svcA", body["cluster"].as_str().unwrap_or_default())] })),
            ),
            "ListTasks" => (
                StatusCode::OK,
                Json(json!({ "taskArns": ["arn:task/1", "arn:task/2"] })),
            ),
            "DescribeTasks" => (
                StatusCode::OK,
                Json(json!({
                    "tasks": [
                        {
                            "taskArn": "arn:task/1",
                            "containers": [
                                { "networkInterfaces": [] },
                                { "networkInterfaces": [{ "privateIpv4Address": "10.0.0.1" }] }
                            ]
                        },
                        { "taskArn": "arn:task/2", "containers": [] }
                    ],
                    "failures": [{ "arn": "arn:task/3", "reason": "MISSING" }]
                })),
            ),
            "ListTagsForResource" => (
                StatusCode::OK,
                Json(json!({ "tags": [{ "key": "team", "value": "infra" }, { "value": "orphan" }] })),
            ),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "__type": "ThrottlingException", "message": "Rate exceeded" })),
            ),
        }
    }

    async fn spawn_fake_ecs() -> HttpEcsClient {
        let app = Router::new().route("/", post(fake_ecs));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        HttpEcsClient::new(format!("http://{}/", addr), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_calls_read_first_page() {
        let client = spawn_fake_ecs().await;

        assert_eq!(client.list_clusters().await.unwrap(), vec!["arn:cluster/c1"]);
        assert_eq!(
            client.list_services("arn:cluster/c1").await.unwrap(),
            vec!["arn:cluster/c1/svcA"]
        );
        assert_eq!(
            client.list_tasks("arn:cluster/c1", "svcA").await.unwrap(),
            vec!["arn:task/1", "arn:task/2"]
        );
    }

    #[tokio::test]
    async fn test_describe_tasks_flattens_container_interfaces() {
        let client = spawn_fake_ecs().await;

        let tasks = client
            .describe_tasks("arn:cluster/c1", &["arn:task/1".to_string(), "arn:task/2".to_string()])
            .await
            .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].private_ipv4(), Some("10.0.0.1"));
        assert_eq!(tasks[1].private_ipv4(), None);
    }

    #[tokio::test]
    async fn test_describe_tasks_empty_skips_request() {
        let client = HttpEcsClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();

        assert!(client.describe_tasks("c", &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tags_drops_keyless_tags() {
        let client = spawn_fake_ecs().await;

        let tags = client.list_tags_for_resource("arn:service/svcA").await.unwrap();

        assert_eq!(tags, vec![Tag::new("team", "infra")]);
    }

    #[tokio::test]
    async fn test_error_body_becomes_remote_error() {
        let client = spawn_fake_ecs().await;

        let err = client
            .call::<_, Value>("UnknownOperation", &json!({}))
            .await
            .unwrap_err();

        match err {
            DiscoveryError::Remote { operation, message } => {
                assert_eq!(operation, "UnknownOperation");
                assert!(message.contains("ThrottlingException"));
                assert!(message.contains("Rate exceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_remote_error() {
        let client = HttpEcsClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();

        assert!(matches!(
            client.list_clusters().await,
            Err(DiscoveryError::Remote { .. })
        ));
    }
}
