//! Service for the supplement store: the definition list, the date-scoped
//! "taken" ledger, and the selected-date cursor.
//!
//! All mutations commit to in-memory state first (the session's source of
//! truth), notify subscribers, then persist the whole snapshot. A failed
//! persist is surfaced in the returned `Result` but never rolls back the
//! in-memory change.

use anyhow::Result;
use chrono::Local;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use shared::{SupplementMarker, SupplementRoute};

use crate::domain::commands::supplements::{AddSupplementCommand, UpdateSupplementCommand};
use crate::domain::models::supplement::{minutes_to_label, Supplement, ALL_DAYS};
use crate::domain::notify::ChangeNotifier;
use crate::storage::json::migration::{SupplementSnapshot, SUPPLEMENT_SNAPSHOT_VERSION};
use crate::storage::json::SupplementStoreRepository;

struct SupplementState {
    supplements: Vec<Supplement>,
    /// date (YYYY-MM-DD) → supplement id → wall-clock time taken.
    taken_times_by_date: HashMap<String, HashMap<String, String>>,
    selected_date: String,
}

/// The supplement store.
#[derive(Clone)]
pub struct SupplementService {
    state: Arc<Mutex<SupplementState>>,
    repository: SupplementStoreRepository,
    notifier: Arc<ChangeNotifier>,
}

pub(crate) fn local_today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn local_time_label() -> String {
    Local::now().format("%H:%M").to_string()
}

impl SupplementService {
    /// Create the service, rehydrating persisted state (migrated as needed)
    /// or seeding the first-launch defaults.
    pub fn new(repository: SupplementStoreRepository) -> Result<Self> {
        Self::new_with_today(repository, &local_today())
    }

    /// As `new`, with an explicit "today" anchoring migration fallbacks and
    /// the default selected date. Used directly by tests.
    pub fn new_with_today(repository: SupplementStoreRepository, today: &str) -> Result<Self> {
        let state = match repository.load(today)? {
            Some(snapshot) => {
                info!(
                    "Rehydrated supplement store: {} definitions",
                    snapshot.supplements.len()
                );
                SupplementState {
                    supplements: snapshot.supplements,
                    taken_times_by_date: snapshot.taken_times_by_date,
                    selected_date: snapshot.selected_date,
                }
            }
            None => {
                info!("No persisted supplement store; seeding defaults");
                Self::seeded_state(today)
            }
        };

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            repository,
            notifier: Arc::new(ChangeNotifier::new()),
        })
    }

    /// First-launch state: one example definition so the home screen is not
    /// empty.
    fn seeded_state(today: &str) -> SupplementState {
        SupplementState {
            supplements: vec![Supplement {
                id: "1".to_string(),
                name: "Omega 3".to_string(),
                dose: Some("1 capsule".to_string()),
                route: SupplementRoute::Tablet,
                time: "08:00".to_string(),
                time_minutes: 8 * 60,
                days_of_week: ALL_DAYS.to_vec(),
                start_date: today.to_string(),
                end_date: None,
                catalog_id: None,
            }],
            taken_times_by_date: HashMap::new(),
            selected_date: today.to_string(),
        }
    }

    /// Register a listener called after every committed mutation.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener);
    }

    /* ---------- Mutations ---------- */

    /// Append a definition. The caller owns id uniqueness and validation;
    /// `start_date` defaults to today, `end_date` to ongoing.
    pub fn add_supplement(&self, command: AddSupplementCommand) -> Result<Supplement> {
        info!("Adding supplement: {}", command.name);

        let supplement = Supplement {
            id: command.id,
            name: command.name,
            dose: command.dose,
            route: command.route,
            time: minutes_to_label(command.time_minutes),
            time_minutes: command.time_minutes,
            days_of_week: command.days_of_week,
            start_date: command.start_date.unwrap_or_else(local_today),
            end_date: command.end_date,
            catalog_id: command.catalog_id,
        };

        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.supplements.push(supplement.clone());
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)?;
        Ok(supplement)
    }

    /// Merge a partial update into the definition matching `id`. Unknown
    /// ids are a silent no-op. Cross-field invariants are not re-checked;
    /// in particular `time` and `time_minutes` are applied independently.
    pub fn update_supplement(&self, command: UpdateSupplementCommand) -> Result<()> {
        let UpdateSupplementCommand { id, patch } = command;

        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let Some(supplement) = state.supplements.iter_mut().find(|s| s.id == id) else {
                warn!("Ignoring update for unknown supplement: {}", id);
                return Ok(());
            };

            if let Some(name) = patch.name {
                supplement.name = name;
            }
            if let Some(dose) = patch.dose {
                supplement.dose = dose;
            }
            if let Some(route) = patch.route {
                supplement.route = route;
            }
            if let Some(time) = patch.time {
                supplement.time = time;
            }
            if let Some(time_minutes) = patch.time_minutes {
                supplement.time_minutes = time_minutes;
            }
            if let Some(days_of_week) = patch.days_of_week {
                supplement.days_of_week = days_of_week;
            }
            if let Some(start_date) = patch.start_date {
                supplement.start_date = start_date;
            }
            if let Some(end_date) = patch.end_date {
                supplement.end_date = end_date;
            }
            if let Some(catalog_id) = patch.catalog_id {
                supplement.catalog_id = catalog_id;
            }

            debug!("Updated supplement: {}", id);
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Remove a definition and purge its id from every date bucket of the
    /// taken ledger. Unknown ids still sweep the ledger (orphan cleanup).
    pub fn delete_supplement(&self, id: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let before = state.supplements.len();
            state.supplements.retain(|s| s.id != id);
            if state.supplements.len() == before {
                warn!("Deleting unknown supplement: {}", id);
            } else {
                info!("Deleted supplement: {}", id);
            }

            for bucket in state.taken_times_by_date.values_mut() {
                bucket.remove(id);
            }
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Flip the taken state of `id` for the currently selected date,
    /// recording the current wall-clock time on insert.
    pub fn toggle_taken(&self, id: &str) -> Result<()> {
        self.toggle_taken_at(id, &local_time_label())
    }

    /// As `toggle_taken`, with an explicit time label. Used by tests.
    pub fn toggle_taken_at(&self, id: &str, time_label: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            if !state.supplements.iter().any(|s| s.id == id) {
                warn!("Ignoring toggle for unknown supplement: {}", id);
                return Ok(());
            }

            let date = state.selected_date.clone();
            let bucket = state.taken_times_by_date.entry(date.clone()).or_default();
            if bucket.remove(id).is_some() {
                debug!("Unmarked supplement {} for {}", id, date);
            } else {
                bucket.insert(id.to_string(), time_label.to_string());
                debug!("Marked supplement {} taken at {} for {}", id, time_label, date);
            }
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /// Move the selected-date cursor. No effect on definitions or ledger.
    pub fn set_selected_date(&self, date: &str) -> Result<()> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.selected_date = date.to_string();
            Self::snapshot_of(&state)
        };
        self.commit(&snapshot)
    }

    /* ---------- Queries ---------- */

    /// All definitions in insertion order.
    pub fn list_supplements(&self) -> Vec<Supplement> {
        self.state.lock().unwrap().supplements.clone()
    }

    /// All definitions sorted by time of day (stable for equal times).
    pub fn list_supplements_by_time(&self) -> Vec<Supplement> {
        let mut supplements = self.list_supplements();
        supplements.sort_by_key(|s| s.time_minutes);
        supplements
    }

    pub fn get_supplement(&self, id: &str) -> Option<Supplement> {
        self.state
            .lock()
            .unwrap()
            .supplements
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn selected_date(&self) -> String {
        self.state.lock().unwrap().selected_date.clone()
    }

    /// The taken ledger bucket for one date (empty map if none).
    pub fn taken_times_for(&self, date: &str) -> HashMap<String, String> {
        self.state
            .lock()
            .unwrap()
            .taken_times_by_date
            .get(date)
            .cloned()
            .unwrap_or_default()
    }

    /// Start-date markers for decorating metric charts.
    pub fn supplement_markers(&self) -> Vec<SupplementMarker> {
        self.state
            .lock()
            .unwrap()
            .supplements
            .iter()
            .map(|s| SupplementMarker {
                name: s.name.clone(),
                start_date: s.start_date.clone(),
            })
            .collect()
    }

    /* ---------- Persistence ---------- */

    fn snapshot_of(state: &SupplementState) -> SupplementSnapshot {
        SupplementSnapshot {
            version: SUPPLEMENT_SNAPSHOT_VERSION,
            supplements: state.supplements.clone(),
            taken_times_by_date: state.taken_times_by_date.clone(),
            selected_date: state.selected_date.clone(),
        }
    }

    /// Notify subscribers of the committed in-memory state, then persist.
    fn commit(&self, snapshot: &SupplementSnapshot) -> Result<()> {
        self.notifier.notify();
        self.repository.save(snapshot)
    }
}
