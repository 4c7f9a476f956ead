//! Shared data models between the core services and the UI layer.
//!
//! Everything in this crate is plain data: the schedule projection output,
//! the catalog wire types, and the small display helpers pickers need. The
//! backend maps its domain models into these types so UI code never depends
//! on store internals.

use serde::{Deserialize, Serialize};

/// How a supplement is administered. Closed set; persisted as lowercase
/// strings ("tablet", "liquid", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplementRoute {
    Tablet,
    Liquid,
    Topical,
    Injectable,
    Powder,
}

/// A route paired with its picker label.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOption {
    pub route: SupplementRoute,
    pub label: &'static str,
}

/// Ordered route options for the add/edit picker.
pub const ROUTE_OPTIONS: [RouteOption; 5] = [
    RouteOption { route: SupplementRoute::Tablet, label: "Tablet / Capsule" },
    RouteOption { route: SupplementRoute::Liquid, label: "Liquid" },
    RouteOption { route: SupplementRoute::Powder, label: "Powder" },
    RouteOption { route: SupplementRoute::Topical, label: "Topical" },
    RouteOption { route: SupplementRoute::Injectable, label: "Injectable" },
];

/// One supplement due in a schedule group, with its taken state resolved
/// for the selected date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledDose {
    pub id: String,
    pub name: String,
    pub dose: Option<String>,
    pub route: SupplementRoute,
    /// Wall-clock time this was marked taken on the selected date, if any.
    pub taken_at: Option<String>,
}

/// All doses sharing one exact time slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleTimeGroup {
    /// Minutes since local midnight; the canonical group key.
    pub time_minutes: u32,
    /// Display label for the slot, e.g. "08:00".
    pub time_label: String,
    pub doses: Vec<ScheduledDose>,
}

/// The derived "due today" view for one calendar date: time groups in
/// ascending order, doses in definition order within each group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaySchedule {
    pub date: String,
    pub groups: Vec<ScheduleTimeGroup>,
}

impl DaySchedule {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// A catalog search/insert result: just enough to link a definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogHit {
    pub id: String,
    pub name: String,
}

/// One benefit tag attached to a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogBenefit {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
}

/// Full editorial catalog entry, as returned by fetch-by-id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub what_is_it: Option<String>,
    pub why_use_it: Option<String>,
    pub risks_and_interactions: Option<String>,
    pub evidence: Option<String>,
    /// Evidence score, 0-100.
    pub evidence_score: Option<f64>,
    pub benefits: Vec<CatalogBenefit>,
}

/// Fields for adding a new entry to the shared catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCatalogEntry {
    pub name: String,
    pub what_is_it: String,
    pub why_use_it: String,
    pub risks_and_interactions: String,
    pub evidence: String,
    pub evidence_score: Option<f64>,
}

/// Marker for decorating a metric chart with a supplement start date.
/// Pixel placement is the chart renderer's problem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplementMarker {
    pub name: String,
    /// YYYY-MM-DD
    pub start_date: String,
}

/// One point of a metric chart series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricPoint {
    /// YYYY-MM-DD
    pub date: String,
    pub value: f64,
}
