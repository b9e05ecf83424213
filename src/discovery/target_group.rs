//! Target groups emitted once per refresh.

use serde::Serialize;

use crate::labels::{LabelSet, ADDRESS_LABEL, CLUSTER_NAME_LABEL, SERVICE_NAME_LABEL};

/// Scrape targets of one service plus the labels they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetGroup {
    /// `<cluster>/<service>`, unique within a refresh
    pub source: String,
    pub labels: LabelSet,
    /// One label set per target, each holding `__address__`
    pub targets: Vec<LabelSet>,
}

impl TargetGroup {
    /// Creates an empty group; cluster and service labels override tag labels.
    pub fn new(cluster_name: &str, service_name: &str, tag_labels: LabelSet) -> Self {
        let mut labels = tag_labels;
        labels.insert(CLUSTER_NAME_LABEL.to_string(), cluster_name.to_string());
        labels.insert(SERVICE_NAME_LABEL.to_string(), service_name.to_string());

        Self {
            source: format!("{}/{}", cluster_name, service_name),
            labels,
            targets: Vec::new(),
        }
    }

    pub fn add_target(&mut self, address: &str) {
        let mut target = LabelSet::new();
        target.insert(ADDRESS_LABEL.to_string(), address.to_string());
        self.targets.push(target);
    }

    /// Addresses of all targets, in insertion order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .filter_map(|target| target.get(ADDRESS_LABEL).map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::service_tag_label;

    #[test]
    fn test_new_group_has_required_labels() {
        let group = TargetGroup::new("c1", "svcA", LabelSet::new());

        assert_eq!(group.source, "c1/svcA");
        assert_eq!(group.labels[CLUSTER_NAME_LABEL], "c1");
        assert_eq!(group.labels[SERVICE_NAME_LABEL], "svcA");
        assert!(group.targets.is_empty());
    }

    #[test]
    fn test_metadata_labels_win_over_tags() {
        let mut tags = LabelSet::new();
        tags.insert(CLUSTER_NAME_LABEL.to_string(), "spoofed".to_string());
        tags.insert(service_tag_label("team"), "infra".to_string());

        let group = TargetGroup::new("c1", "svcA", tags);

        assert_eq!(group.labels[CLUSTER_NAME_LABEL], "c1");
        assert_eq!(group.labels[&service_tag_label("team")], "infra");
    }

    #[test]
    fn test_add_target() {
        let mut group = TargetGroup::new("c1", "svcA", LabelSet::new());
        group.add_target("10.0.0.1");
        group.add_target("10.0.0.2");

        assert_eq!(group.addresses().collect::<Vec<_>>(), vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(
            serde_json::to_value(&group.targets).unwrap(),
            serde_json::json!([{ "__address__": "10.0.0.1" }, { "__address__": "10.0.0.2" }])
        );
    }
}
