//! # Snapshot Migration
//!
//! Persisted store records carry an explicit schema version, and migration
//! from any historical shape to the current one is a pure function over the
//! raw document, testable without a live store.
//!
//! Legacy supplement records (pre-versioning) may lack `timeMinutes`,
//! `daysOfWeek`, `startDate`, or `endDate`; the rules below patch them:
//!
//! - missing `timeMinutes` → derived from `time` (`h*60+m`, unparseable → 0)
//! - missing `daysOfWeek`  → all seven days
//! - missing `startDate`   → legacy `createdAt` if present, else today
//! - missing `endDate`     → null (ongoing)
//!
//! Migration is idempotent: records that already satisfy the current shape
//! pass through untouched.

use serde::{Deserialize, Serialize};
use shared::SupplementRoute;
use std::collections::HashMap;

use crate::domain::models::health::{default_metrics, HealthEntry, MetricRegistryItem};
use crate::domain::models::supplement::{time_to_minutes, Supplement, ALL_DAYS};

/// Current supplement snapshot schema version. Version 1 is the legacy
/// unversioned shape.
pub const SUPPLEMENT_SNAPSHOT_VERSION: u32 = 2;

/// Current health snapshot schema version.
pub const HEALTH_SNAPSHOT_VERSION: u32 = 1;

/// The supplement store's persisted record: definitions, the date-scoped
/// taken ledger, and the selected-date cursor. Rewritten whole on every
/// mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementSnapshot {
    pub version: u32,
    pub supplements: Vec<Supplement>,
    /// date (YYYY-MM-DD) → supplement id → wall-clock time taken.
    pub taken_times_by_date: HashMap<String, HashMap<String, String>>,
    pub selected_date: String,
}

/// The health store's persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub version: u32,
    pub entries: Vec<HealthEntry>,
    pub metrics: Vec<MetricRegistryItem>,
}

/// A supplement record as it may appear in any historical snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSupplementRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dose: Option<String>,
    pub route: SupplementRoute,
    pub time: String,
    #[serde(default)]
    pub time_minutes: Option<u32>,
    #[serde(default)]
    pub days_of_week: Option<Vec<u8>>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub catalog_id: Option<String>,
    /// Legacy creation stamp; feeds the `startDate` fallback.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A supplement store document as read back from storage, any version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSupplementSnapshot {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub supplements: Vec<RawSupplementRecord>,
    #[serde(default)]
    pub taken_times_by_date: HashMap<String, HashMap<String, String>>,
    #[serde(default)]
    pub selected_date: Option<String>,
}

/// A health store document as read back from storage, any version.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHealthSnapshot {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub entries: Vec<HealthEntry>,
    #[serde(default)]
    pub metrics: Option<Vec<MetricRegistryItem>>,
}

fn migrate_record(raw: RawSupplementRecord, today: &str) -> Supplement {
    let time_minutes = raw
        .time_minutes
        .unwrap_or_else(|| time_to_minutes(&raw.time));
    let days_of_week = raw.days_of_week.unwrap_or_else(|| ALL_DAYS.to_vec());
    let start_date = raw
        .start_date
        .or(raw.created_at)
        .unwrap_or_else(|| today.to_string());

    Supplement {
        id: raw.id,
        name: raw.name,
        dose: raw.dose,
        route: raw.route,
        time: raw.time,
        time_minutes,
        days_of_week,
        start_date,
        end_date: raw.end_date,
        catalog_id: raw.catalog_id,
    }
}

/// Bring a supplement store document of any version up to the current
/// shape. `today` anchors the `startDate` fallback so the function stays
/// pure.
pub fn migrate_supplement_snapshot(raw: RawSupplementSnapshot, today: &str) -> SupplementSnapshot {
    SupplementSnapshot {
        version: SUPPLEMENT_SNAPSHOT_VERSION,
        supplements: raw
            .supplements
            .into_iter()
            .map(|record| migrate_record(record, today))
            .collect(),
        taken_times_by_date: raw.taken_times_by_date,
        selected_date: raw.selected_date.unwrap_or_else(|| today.to_string()),
    }
}

/// Bring a health store document up to the current shape. No record-level
/// rules exist today; an unversioned document just gains the tag, and a
/// missing registry is seeded with the defaults.
pub fn migrate_health_snapshot(raw: RawHealthSnapshot) -> HealthSnapshot {
    HealthSnapshot {
        version: HEALTH_SNAPSHOT_VERSION,
        entries: raw.entries,
        metrics: raw.metrics.unwrap_or_else(default_metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TODAY: &str = "2024-06-05";

    fn parse_raw(value: serde_json::Value) -> RawSupplementSnapshot {
        serde_json::from_value(value).unwrap()
    }

    fn legacy_snapshot() -> serde_json::Value {
        json!({
            "supplements": [
                {
                    "id": "1",
                    "name": "Omega 3",
                    "dose": "1 capsule",
                    "route": "tablet",
                    "time": "8:30",
                    "createdAt": "2023-11-20"
                },
                {
                    "id": "2",
                    "name": "Vitamin D",
                    "route": "liquid",
                    "time": "whenever"
                }
            ],
            "takenTimesByDate": {
                "2024-06-04": { "1": "08:32" }
            }
        })
    }

    #[test]
    fn test_legacy_record_derives_time_minutes() {
        let snapshot = migrate_supplement_snapshot(parse_raw(legacy_snapshot()), TODAY);
        assert_eq!(snapshot.supplements[0].time_minutes, 8 * 60 + 30);
        // Unparseable time falls back to minute 0.
        assert_eq!(snapshot.supplements[1].time_minutes, 0);
    }

    #[test]
    fn test_legacy_record_defaults_days_of_week() {
        let snapshot = migrate_supplement_snapshot(parse_raw(legacy_snapshot()), TODAY);
        for supplement in &snapshot.supplements {
            assert_eq!(supplement.days_of_week, ALL_DAYS.to_vec());
        }
    }

    #[test]
    fn test_legacy_record_start_date_fallbacks() {
        let snapshot = migrate_supplement_snapshot(parse_raw(legacy_snapshot()), TODAY);
        // createdAt wins when present.
        assert_eq!(snapshot.supplements[0].start_date, "2023-11-20");
        // Otherwise today.
        assert_eq!(snapshot.supplements[1].start_date, TODAY);
    }

    #[test]
    fn test_legacy_record_end_date_defaults_to_none() {
        let snapshot = migrate_supplement_snapshot(parse_raw(legacy_snapshot()), TODAY);
        assert!(snapshot.supplements.iter().all(|s| s.end_date.is_none()));
    }

    #[test]
    fn test_ledger_and_version_carried() {
        let snapshot = migrate_supplement_snapshot(parse_raw(legacy_snapshot()), TODAY);
        assert_eq!(snapshot.version, SUPPLEMENT_SNAPSHOT_VERSION);
        assert_eq!(snapshot.selected_date, TODAY);
        assert_eq!(
            snapshot.taken_times_by_date["2024-06-04"]["1"],
            "08:32".to_string()
        );
    }

    #[test]
    fn test_migration_is_idempotent() {
        let once = migrate_supplement_snapshot(parse_raw(legacy_snapshot()), TODAY);

        // Feed the migrated snapshot back through the raw parser and
        // migrate again; nothing may change.
        let reparsed: RawSupplementSnapshot =
            serde_json::from_value(serde_json::to_value(&once).unwrap()).unwrap();
        let twice = migrate_supplement_snapshot(reparsed, TODAY);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_conforming_record_passes_through_untouched() {
        let value = json!({
            "version": SUPPLEMENT_SNAPSHOT_VERSION,
            "supplements": [{
                "id": "9",
                "name": "Zinc",
                "route": "powder",
                "time": "21:00",
                "timeMinutes": 1260,
                "daysOfWeek": [2, 4],
                "startDate": "2024-01-15",
                "endDate": "2024-03-01"
            }],
            "takenTimesByDate": {},
            "selectedDate": "2024-02-02"
        });
        let snapshot = migrate_supplement_snapshot(parse_raw(value), TODAY);
        let supplement = &snapshot.supplements[0];
        assert_eq!(supplement.time_minutes, 1260);
        assert_eq!(supplement.days_of_week, vec![2, 4]);
        assert_eq!(supplement.start_date, "2024-01-15");
        assert_eq!(supplement.end_date.as_deref(), Some("2024-03-01"));
        assert_eq!(snapshot.selected_date, "2024-02-02");
    }

    #[test]
    fn test_inconsistent_time_minutes_is_kept_verbatim() {
        // When both fields are present the stored sort key wins; migration
        // does not re-derive it from the display string.
        let value = json!({
            "supplements": [{
                "id": "3",
                "name": "Iron",
                "route": "tablet",
                "time": "09:00",
                "timeMinutes": 600
            }]
        });
        let snapshot = migrate_supplement_snapshot(parse_raw(value), TODAY);
        assert_eq!(snapshot.supplements[0].time_minutes, 600);
        assert_eq!(snapshot.supplements[0].time, "09:00");
    }

    #[test]
    fn test_health_snapshot_gains_version_and_default_registry() {
        let raw: RawHealthSnapshot = serde_json::from_value(json!({
            "entries": [{
                "id": "e1",
                "type": "sleep",
                "value": 7.0,
                "date": "2024-06-01"
            }]
        }))
        .unwrap();

        let snapshot = migrate_health_snapshot(raw);
        assert_eq!(snapshot.version, HEALTH_SNAPSHOT_VERSION);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.metrics.len(), 4);
    }

    #[test]
    fn test_health_snapshot_existing_registry_is_kept() {
        let raw: RawHealthSnapshot = serde_json::from_value(json!({
            "version": HEALTH_SNAPSHOT_VERSION,
            "entries": [],
            "metrics": [{ "key": "focus", "label": "Focus", "enabled": false }]
        }))
        .unwrap();

        let snapshot = migrate_health_snapshot(raw);
        assert_eq!(snapshot.metrics.len(), 1);
        assert_eq!(snapshot.metrics[0].key, "focus");
        assert!(!snapshot.metrics[0].enabled);
    }
}
