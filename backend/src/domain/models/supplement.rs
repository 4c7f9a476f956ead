//! Domain model for a supplement definition.

use serde::{Deserialize, Serialize};
use shared::SupplementRoute;
use std::time::{SystemTime, UNIX_EPOCH};

/// Every weekday index, 0 = Sunday. The migration default for definitions
/// persisted before per-day scheduling existed.
pub const ALL_DAYS: [u8; 7] = [0, 1, 2, 3, 4, 5, 6];

/// A supplement the user takes on a schedule.
///
/// Persisted with the legacy camelCase key names (`timeMinutes`,
/// `daysOfWeek`, ...) so pre-migration snapshots parse unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplement {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    pub route: SupplementRoute,
    /// Display time "HH:mm"; derived from `time_minutes` at creation.
    pub time: String,
    /// Minutes since local midnight, 0..=1439. The canonical sort/group key;
    /// `time` is the display value and should stay consistent with it.
    pub time_minutes: u32,
    /// Weekdays this supplement is due, 0 = Sunday.
    pub days_of_week: Vec<u8>,
    /// First day it is taken (YYYY-MM-DD).
    pub start_date: String,
    /// Last day it is taken (YYYY-MM-DD); None means ongoing.
    /// Serialized as an explicit null.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Optional link into the shared catalog; decoration only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
}

impl Supplement {
    /// Generate a unique supplement ID from a creation timestamp.
    /// Format: sup-<timestamp_ms>-<random_suffix>
    /// Example: sup-1625846400123-af3c
    pub fn generate_id(timestamp_ms: u64) -> String {
        format!("sup-{}-{}", timestamp_ms, generate_random_suffix(4))
    }

    /// Generate an ID using the current wall clock.
    pub fn generate_id_now() -> String {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::generate_id(now_ms)
    }

    /// Whether this supplement is due on the given weekday (0 = Sunday).
    pub fn is_due_on(&self, weekday: u8) -> bool {
        self.days_of_week.contains(&weekday)
    }
}

fn generate_random_suffix(len: usize) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos();
    format!("{:x}", now % (16_u128.pow(len as u32)))
        .chars()
        .take(len)
        .collect()
}

/// Parse a display time ("H:MM" or "HH:mm") into minutes since midnight.
/// Unparseable input maps to minute 0, matching the migration rule.
pub fn time_to_minutes(time: &str) -> u32 {
    let mut parts = time.splitn(2, ':');
    let h = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
    let m = parts.next().and_then(|p| p.trim().parse::<u32>().ok());
    match (h, m) {
        (Some(h), Some(m)) => h * 60 + m,
        _ => 0,
    }
}

/// Format minutes since midnight as a zero-padded "HH:mm" label.
pub fn minutes_to_label(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Validation failures for a supplement draft. Raised at the UI boundary
/// (to disable the save action); the store itself never validates.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SupplementValidationError {
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Start date must be YYYY-MM-DD")]
    InvalidStartDate,
    #[error("End date must be YYYY-MM-DD")]
    InvalidEndDate,
    #[error("End date cannot be before start date")]
    EndBeforeStart,
}

/// Whether a string is a valid ISO calendar date (YYYY-MM-DD).
pub fn is_valid_iso_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// Validate the fields the add/edit form gates its save action on: a
/// non-empty trimmed name, well-formed dates, and a chronological range.
pub fn validate_supplement_draft(
    name: &str,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<(), SupplementValidationError> {
    if name.trim().is_empty() {
        return Err(SupplementValidationError::EmptyName);
    }
    if let Some(start) = start_date {
        if !is_valid_iso_date(start) {
            return Err(SupplementValidationError::InvalidStartDate);
        }
    }
    if let Some(end) = end_date {
        if !is_valid_iso_date(end) {
            return Err(SupplementValidationError::InvalidEndDate);
        }
        if let Some(start) = start_date {
            // ISO dates compare correctly as strings.
            if end < start {
                return Err(SupplementValidationError::EndBeforeStart);
            }
        }
    }
    Ok(())
}
