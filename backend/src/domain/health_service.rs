//! Service for the health metric store: the metric registry and the flat
//! list of dated entries.
//!
//! Same commit discipline as the supplement store: in-memory first, notify,
//! then persist the whole snapshot without rollback on failure.

use anyhow::Result;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

use shared::MetricPoint;

use crate::domain::models::health::{default_metrics, HealthEntry, MetricRegistryItem};
use crate::domain::notify::ChangeNotifier;
use crate::storage::json::migration::{HealthSnapshot, HEALTH_SNAPSHOT_VERSION};
use crate::storage::json::HealthStoreRepository;

/// How many points a metric chart series carries at most.
const SERIES_CAP: usize = 50;

struct HealthState {
    entries: Vec<HealthEntry>,
    metrics: Vec<MetricRegistryItem>,
}

/// The health metric store.
#[derive(Clone)]
pub struct HealthService {
    state: Arc<Mutex<HealthState>>,
    repository: HealthStoreRepository,
    notifier: Arc<ChangeNotifier>,
}

impl HealthService {
    /// Create the service, rehydrating persisted state or seeding the
    /// default metric registry.
    pub fn new(repository: HealthStoreRepository) -> Result<Self> {
        let state = match repository.load()? {
            Some(snapshot) => {
                info!(
                    "Rehydrated health store: {} entries, {} metrics",
                    snapshot.entries.len(),
                    snapshot.metrics.len()
                );
                HealthState {
                    entries: snapshot.entries,
                    metrics: snapshot.metrics,
                }
            }
            None => {
                info!("No persisted health store; seeding default metrics");
                HealthState {
                    entries: Vec::new(),
                    metrics: default_metrics(),
                }
            }
        };

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            repository,
            notifier: Arc::new(ChangeNotifier::new()),
        })
    }

    /// Register a listener called after every committed mutation.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener);
    }

    /* ---------- Entry mutations ---------- */

    /// Append an entry unconditionally; same-day duplicates per type are
    /// allowed (queries resolve "the" value as the latest match).
    pub fn add_entry(&self, entry: HealthEntry) -> Result<()> {
        debug!("Adding health entry: {} on {}", entry.entry_type, entry.date);
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.entries.push(entry);
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Remove an entry by id. Unknown ids are a silent no-op.
    pub fn delete_entry(&self, id: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let before = state.entries.len();
            state.entries.retain(|e| e.id != id);
            if state.entries.len() == before {
                warn!("Deleting unknown health entry: {}", id);
            }
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /* ---------- Registry mutations ---------- */

    /// Insert a registry item unless its key already exists (first write
    /// wins; duplicates are silently ignored).
    pub fn add_metric(&self, metric: MetricRegistryItem) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if state.metrics.iter().any(|m| m.key == metric.key) {
                debug!("Metric already registered: {}", metric.key);
                return Ok(());
            }
            info!("Registering metric: {} ({})", metric.label, metric.key);
            state.metrics.push(metric);
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Re-enable a registry item. Unknown keys are a silent no-op.
    pub fn enable_metric(&self, key: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            match state.metrics.iter_mut().find(|m| m.key == key) {
                Some(metric) => metric.enabled = true,
                None => {
                    warn!("Enabling unknown metric: {}", key);
                    return Ok(());
                }
            }
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Remove a registry item and cascade-delete every entry of its type.
    pub fn delete_metric(&self, key: &str) -> Result<()> {
        info!("Deleting metric: {}", key);
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.metrics.retain(|m| m.key != key);
            state.entries.retain(|e| e.entry_type != key);
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /* ---------- Queries ---------- */

    pub fn list_entries(&self) -> Vec<HealthEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    pub fn list_metrics(&self) -> Vec<MetricRegistryItem> {
        self.state.lock().unwrap().metrics.clone()
    }

    /// Registry items shown in the tracking UI.
    pub fn enabled_metrics(&self) -> Vec<MetricRegistryItem> {
        self.state
            .lock()
            .unwrap()
            .metrics
            .iter()
            .filter(|m| m.enabled)
            .cloned()
            .collect()
    }

    /// Chart series for one metric: entries of that type in date order,
    /// capped to the most recent points.
    pub fn metric_series(&self, entry_type: &str) -> Vec<MetricPoint> {
        let mut matches: Vec<HealthEntry> = self
            .state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.date.cmp(&b.date));

        let skip = matches.len().saturating_sub(SERIES_CAP);
        matches
            .into_iter()
            .skip(skip)
            .map(|e| MetricPoint {
                date: e.date,
                value: e.value,
            })
            .collect()
    }

    /// "The" entry for a (type, date): the latest of the matches, or None.
    pub fn latest_entry_for(&self, entry_type: &str, date: &str) -> Option<HealthEntry> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.entry_type == entry_type && e.date == date)
            .last()
            .cloned()
    }

    /* ---------- Persistence ---------- */

    fn snapshot_of(state: &HealthState) -> HealthSnapshot {
        HealthSnapshot {
            version: HEALTH_SNAPSHOT_VERSION,
            entries: state.entries.clone(),
            metrics: state.metrics.clone(),
        }
    }

    fn commit(&self, snapshot: &HealthSnapshot) -> Result<()> {
        self.notifier.notify();
        self.repository.save(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::test_utils::TestEnvironment;

    fn setup() -> (HealthService, TestEnvironment) {
        let env = TestEnvironment::new().unwrap();
        let service = HealthService::new(env.health_repo()).unwrap();
        (service, env)
    }

    fn entry(id: &str, entry_type: &str, value: f64, date: &str) -> HealthEntry {
        HealthEntry {
            id: id.to_string(),
            entry_type: entry_type.to_string(),
            value,
            date: date.to_string(),
            note: None,
        }
    }

    #[test]
    fn test_first_launch_seeds_default_registry() {
        let (service, _env) = setup();
        let metrics = service.list_metrics();
        assert_eq!(metrics.len(), 4);
        assert!(metrics.iter().all(|m| m.enabled));
        assert!(service.list_entries().is_empty());
    }

    #[test]
    fn test_add_entry_permits_same_day_duplicates() {
        let (service, _env) = setup();
        service.add_entry(entry("e1", "sleep", 6.0, "2024-06-01")).unwrap();
        service.add_entry(entry("e2", "sleep", 8.0, "2024-06-01")).unwrap();
        assert_eq!(service.list_entries().len(), 2);

        // The latest match is "the" value for that day.
        let latest = service.latest_entry_for("sleep", "2024-06-01").unwrap();
        assert_eq!(latest.id, "e2");
        assert_eq!(latest.value, 8.0);
    }

    #[test]
    fn test_delete_entry_by_id() {
        let (service, _env) = setup();
        service.add_entry(entry("e1", "mood", 5.0, "2024-06-01")).unwrap();
        service.delete_entry("e1").unwrap();
        assert!(service.list_entries().is_empty());

        // Unknown id is a no-op.
        service.delete_entry("ghost").unwrap();
    }

    #[test]
    fn test_add_metric_first_write_wins() {
        let (service, _env) = setup();
        service
            .add_metric(MetricRegistryItem {
                key: "focus".to_string(),
                label: "Focus".to_string(),
                enabled: true,
            })
            .unwrap();
        service
            .add_metric(MetricRegistryItem {
                key: "focus".to_string(),
                label: "Focus (duplicate)".to_string(),
                enabled: false,
            })
            .unwrap();

        let focus: Vec<MetricRegistryItem> = service
            .list_metrics()
            .into_iter()
            .filter(|m| m.key == "focus")
            .collect();
        assert_eq!(focus.len(), 1);
        assert_eq!(focus[0].label, "Focus");
        assert!(focus[0].enabled);
    }

    #[test]
    fn test_enable_metric() {
        let (service, _env) = setup();
        service
            .add_metric(MetricRegistryItem {
                key: "focus".to_string(),
                label: "Focus".to_string(),
                enabled: false,
            })
            .unwrap();
        assert_eq!(service.enabled_metrics().len(), 4);

        service.enable_metric("focus").unwrap();
        assert_eq!(service.enabled_metrics().len(), 5);

        // Unknown key is a no-op.
        service.enable_metric("ghost").unwrap();
    }

    #[test]
    fn test_delete_metric_cascades_to_entries() {
        let (service, _env) = setup();
        service.add_entry(entry("e1", "sleep", 7.0, "2024-06-01")).unwrap();
        service.add_entry(entry("e2", "sleep", 6.0, "2024-06-02")).unwrap();
        service.add_entry(entry("e3", "mood", 9.0, "2024-06-02")).unwrap();

        service.delete_metric("sleep").unwrap();

        assert!(!service.list_metrics().iter().any(|m| m.key == "sleep"));
        assert!(!service.list_entries().iter().any(|e| e.entry_type == "sleep"));
        // Other metrics' entries survive.
        assert_eq!(service.list_entries().len(), 1);
    }

    #[test]
    fn test_metric_series_is_date_ordered_and_capped() {
        let (service, _env) = setup();
        let mut dates: Vec<String> = (1..=30).map(|d| format!("2024-03-{:02}", d)).collect();
        dates.extend((1..=30).map(|d| format!("2024-04-{:02}", d)));

        // Insert newest-first to prove the series sorts by date.
        for (i, date) in dates.iter().enumerate().rev() {
            service
                .add_entry(entry(&format!("e{}", i), "sleep", i as f64, date))
                .unwrap();
        }

        let series = service.metric_series("sleep");
        assert_eq!(series.len(), 50);
        // The oldest ten days fell off the cap.
        assert_eq!(series[0].date, "2024-03-11");
        assert_eq!(series.last().unwrap().date, "2024-04-30");
        let mut sorted = series.clone();
        sorted.sort_by(|a, b| a.date.cmp(&b.date));
        assert_eq!(series, sorted);
    }

    #[test]
    fn test_state_survives_restart() {
        let env = TestEnvironment::new().unwrap();
        {
            let service = HealthService::new(env.health_repo()).unwrap();
            service.add_entry(entry("e1", "stress", 4.0, "2024-06-01")).unwrap();
        }

        let service = HealthService::new(env.health_repo()).unwrap();
        assert_eq!(service.list_entries().len(), 1);
        assert_eq!(service.list_metrics().len(), 4);
    }
}
