//! Domain models for health metrics and their entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single self-reported metric value for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntry {
    pub id: String,
    /// Registry key this entry belongs to. Free-form strings are accepted
    /// for legacy/dynamic metrics that were never registered.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Numeric value; the entry UI keeps it on a 1-10 scale but the store
    /// does not enforce that.
    pub value: f64,
    /// YYYY-MM-DD
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HealthEntry {
    /// Generate a unique entry ID.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// A trackable metric the user has registered. Disabling hides a metric
/// from the tracking UI without touching its historical entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRegistryItem {
    /// Normalized identifier derived from the label at creation time,
    /// stable thereafter.
    pub key: String,
    /// Original display string.
    pub label: String,
    pub enabled: bool,
}

/// The registry seeded on first launch.
pub fn default_metrics() -> Vec<MetricRegistryItem> {
    [("sleep", "Sleep"), ("mood", "Mood"), ("energy", "Energy"), ("stress", "Stress")]
        .into_iter()
        .map(|(key, label)| MetricRegistryItem {
            key: key.to_string(),
            label: label.to_string(),
            enabled: true,
        })
        .collect()
}

/// Normalize a user-entered metric label into a registry key:
/// lowercased, whitespace runs collapsed to single underscores.
pub fn metric_key_from_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Clamp an entry value to the 1-10 scale used by the entry UI.
pub fn clamp_to_scale(value: f64) -> f64 {
    value.clamp(1.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_from_label() {
        assert_eq!(metric_key_from_label("Sleep"), "sleep");
        assert_eq!(metric_key_from_label("Sleep Quality"), "sleep_quality");
        assert_eq!(metric_key_from_label("  Resting   HR  "), "resting_hr");
    }

    #[test]
    fn test_default_metrics_all_enabled() {
        let metrics = default_metrics();
        assert_eq!(metrics.len(), 4);
        assert!(metrics.iter().all(|m| m.enabled));
        assert_eq!(metrics[0].key, "sleep");
    }

    #[test]
    fn test_clamp_to_scale() {
        assert_eq!(clamp_to_scale(0.0), 1.0);
        assert_eq!(clamp_to_scale(5.5), 5.5);
        assert_eq!(clamp_to_scale(12.0), 10.0);
    }

    #[test]
    fn test_entry_type_serializes_as_type() {
        let entry = HealthEntry {
            id: HealthEntry::generate_id(),
            entry_type: "sleep".to_string(),
            value: 7.0,
            date: "2024-01-01".to_string(),
            note: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"type\":\"sleep\""));
        assert!(!json.contains("entry_type"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(HealthEntry::generate_id(), HealthEntry::generate_id());
    }
}
