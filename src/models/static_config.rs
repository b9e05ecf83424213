//! Prometheus `file_sd` / `http_sd` target group format.

use serde::{Deserialize, Serialize};

use crate::discovery::TargetGroup;
use crate::labels::{LabelSet, ADDRESS_LABEL};

/// One entry of a `file_sd` JSON file or an `http_sd` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticConfig {
    pub targets: Vec<String>,
    pub labels: LabelSet,
}

impl From<&TargetGroup> for StaticConfig {
    /// Addresses become sorted `targets`; any other per-target labels are
    /// folded into the group labels.
    fn from(group: &TargetGroup) -> Self {
        let mut labels = group.labels.clone();
        let mut targets = Vec::with_capacity(group.targets.len());

        for target in &group.targets {
            for (name, value) in target {
                if name == ADDRESS_LABEL {
                    targets.push(value.clone());
                } else {
                    labels.insert(name.clone(), value.clone());
                }
            }
        }

        targets.sort();
        Self { targets, labels }
    }
}

/// Renders a batch in stable order, sorted by group source.
pub fn render_static_configs(groups: &[TargetGroup]) -> Vec<StaticConfig> {
    let mut sorted: Vec<&TargetGroup> = groups.iter().collect();
    sorted.sort_by(|a, b| a.source.cmp(&b.source));
    sorted.into_iter().map(StaticConfig::from).collect()
}
