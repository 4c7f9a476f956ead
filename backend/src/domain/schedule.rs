//! Schedule projection: the derived, grouped-by-time "due today" view.
//!
//! This is a pure derivation over the supplement list, the selected date,
//! and that date's taken ledger bucket. Nothing here reads or mutates
//! store state beyond its explicit inputs, so identical inputs always give
//! a structurally identical result.

use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::{BTreeMap, HashMap};

use shared::{DaySchedule, ScheduleTimeGroup, ScheduledDose};

use crate::domain::models::supplement::Supplement;
use crate::domain::supplement_service::SupplementService;

/// Weekday index (0 = Sunday) of an ISO date, or None if unparseable.
fn weekday_index(date: &str) -> Option<u8> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.weekday().num_days_from_sunday() as u8)
}

/// Build the schedule for one date.
///
/// Due-ness is decided by `days_of_week` alone; a definition whose
/// `start_date`/`end_date` range excludes the date still appears when its
/// weekday matches. `search` filters by case-insensitive name containment
/// (blank means no filter). Groups are keyed by exact `time_minutes`,
/// ascending; within a group, definition order is preserved.
pub fn day_schedule(
    supplements: &[Supplement],
    selected_date: &str,
    taken_times: &HashMap<String, String>,
    search: Option<&str>,
) -> DaySchedule {
    let Some(weekday) = weekday_index(selected_date) else {
        debug!("Unparseable selected date: {}", selected_date);
        return DaySchedule {
            date: selected_date.to_string(),
            groups: Vec::new(),
        };
    };

    let needle = search
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut by_minute: BTreeMap<u32, Vec<&Supplement>> = BTreeMap::new();
    for supplement in supplements {
        if !supplement.is_due_on(weekday) {
            continue;
        }
        if let Some(needle) = &needle {
            if !supplement.name.to_lowercase().contains(needle.as_str()) {
                continue;
            }
        }
        by_minute.entry(supplement.time_minutes).or_default().push(supplement);
    }

    let groups = by_minute
        .into_iter()
        .map(|(time_minutes, members)| ScheduleTimeGroup {
            time_minutes,
            // The group header shows the first member's display time.
            time_label: members[0].time.clone(),
            doses: members
                .into_iter()
                .map(|s| ScheduledDose {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    dose: s.dose.clone(),
                    route: s.route,
                    taken_at: taken_times.get(&s.id).cloned(),
                })
                .collect(),
        })
        .collect();

    DaySchedule {
        date: selected_date.to_string(),
        groups,
    }
}

/// Orchestrates store reads into the pure projection.
#[derive(Clone, Default)]
pub struct ScheduleService;

impl ScheduleService {
    pub fn new() -> Self {
        Self
    }

    /// The schedule for the store's currently selected date, optionally
    /// filtered by a search query.
    pub fn schedule_for_selected_date(
        &self,
        supplements: &SupplementService,
        search: Option<&str>,
    ) -> DaySchedule {
        let date = supplements.selected_date();
        let definitions = supplements.list_supplements();
        let taken_times = supplements.taken_times_for(&date);
        day_schedule(&definitions, &date, &taken_times, search)
    }
}
