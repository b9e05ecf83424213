//! Prometheus label names and tag-key normalization.

use std::collections::BTreeMap;

use crate::ecs::Tag;

/// Label name to value; keys are unique and case-sensitive.
pub type LabelSet = BTreeMap<String, String>;

pub const ADDRESS_LABEL: &str = "__address__";
pub const SERVICE_TAG_LABEL_PREFIX: &str = "__meta_ecs_service_tag_";
pub const CLUSTER_NAME_LABEL: &str = "__meta_ecs_cluster_name";
pub const SERVICE_NAME_LABEL: &str = "__meta_ecs_service_name";

/// Turns an arbitrary tag key into a valid label name suffix.
///
/// Characters outside `[a-zA-Z0-9_]` become `_`, camelCase boundaries get an
/// `_`, and the result is lowercased: `prometheus.io/scrape` becomes
/// `prometheus_io_scrape`, `someCamelCase` becomes `some_camel_case`.
pub fn sanitize_label_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev_lower = false;

    for c in key.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        };
        if prev_lower && c.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c.to_ascii_lowercase());
    }

    out
}

/// Label name for a service tag key.
pub fn service_tag_label(key: &str) -> String {
    format!("{}{}", SERVICE_TAG_LABEL_PREFIX, sanitize_label_name(key))
}

/// Converts service tags into labels; values pass through unchanged.
///
/// Keys that normalize to the same name collide and the later tag wins.
pub fn tags_to_label_set(tags: &[Tag]) -> LabelSet {
    tags.iter()
        .map(|tag| (service_tag_label(&tag.key), tag.value.clone()))
        .collect()
}
