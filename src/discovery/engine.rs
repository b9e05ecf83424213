//! Discovery Engine
//!
//! Walks clusters, services and tasks on every tick and emits one batch of
//! target groups per successful refresh.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::discovery::TargetGroup;
use crate::ecs::{Cluster, EcsClient, Service};
use crate::error::{DiscoveryError, Result};
use crate::labels::tags_to_label_set;

pub struct Discovery {
    client: Arc<dyn EcsClient>,
    refresh_interval: Duration,
}

impl Discovery {
    pub fn new(client: Arc<dyn EcsClient>, refresh_interval: Duration) -> Result<Self> {
        if refresh_interval.is_zero() {
            return Err(DiscoveryError::Config(
                "refresh interval must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            client,
            refresh_interval,
        })
    }

    // == Run ==
    /// Refreshes immediately, then once per interval, sending each successful
    /// batch on `tx` until `shutdown` is cancelled or the receiver goes away.
    ///
    /// Ticks never overlap. A full channel blocks the loop, delaying the next tick.
    /// A failed refresh is logged and nothing is sent, so the consumer keeps
    /// the previous batch.
    pub async fn run(self, shutdown: CancellationToken, tx: mpsc::Sender<Vec<TargetGroup>>) {
        info!(
            refresh_interval_secs = self.refresh_interval.as_secs(),
            "Starting discovery"
        );

        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.refresh().await {
                Ok(groups) => {
                    tokio::select! {
                        sent = tx.send(groups) => {
                            if sent.is_err() {
                                info!("Target group receiver closed");
                                break;
                            }
                        }
                        _ = shutdown.cancelled() => break,
                    }
                }
                Err(err) => error!(error = %err, "Error in refresh loop"),
            }
        }

        info!("Discovery stopped");
    }

    // == Refresh ==
    /// One sequential traversal. Any hard failure aborts the whole refresh.
    pub async fn refresh(&self) -> Result<Vec<TargetGroup>> {
        info!("Refreshing targets");

        let clusters = self.client.list_clusters().await?;
        let mut groups = Vec::new();

        for cluster_arn in clusters {
            let cluster = Cluster::new(cluster_arn);
            debug!(cluster = %cluster.arn, "Checking cluster");

            let services = self.client.list_services(&cluster.arn).await?;
            for service_arn in services {
                groups.push(self.refresh_service(&cluster, service_arn).await?);
            }
        }

        info!(groups = groups.len(), "Refreshed targets");
        Ok(groups)
    }

    async fn refresh_service(&self, cluster: &Cluster, service_arn: String) -> Result<TargetGroup> {
        debug!(service = %service_arn, "Checking service");

        let task_arns = self.client.list_tasks(&cluster.arn, &service_arn).await?;
        let tasks = if task_arns.is_empty() {
            Vec::new()
        } else {
            match self.client.describe_tasks(&cluster.arn, &task_arns).await {
                Ok(tasks) => tasks,
                Err(err) => {
                    warn!(
                        cluster = cluster.name(),
                        service = %service_arn,
                        error = %err,
                        "Describing tasks failed, service emitted without targets"
                    );
                    Vec::new()
                }
            }
        };
        let tags = self.client.list_tags_for_resource(&service_arn).await?;

        let service = Service {
            arn: service_arn,
            tags,
        };
        let mut group = TargetGroup::new(
            cluster.name(),
            service.name(),
            tags_to_label_set(&service.tags),
        );

        let mut addresses = Vec::with_capacity(tasks.len());
        for task in &tasks {
            match task.private_ipv4() {
                Some(ip) => addresses.push(ip),
                None => warn!(
                    task = %task.task_arn,
                    cluster = cluster.name(),
                    service = service.name(),
                    "Task has no network interfaces"
                ),
            }
        }

        // Describe order depends on cache state; keep targets stable across ticks.
        addresses.sort_unstable();
        for ip in addresses {
            group.add_target(ip);
        }

        Ok(group)
    }
}
