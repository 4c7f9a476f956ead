//! Command inputs for the supplement store.

use shared::SupplementRoute;

use crate::domain::models::supplement::{validate_supplement_draft, SupplementValidationError};

/// Input for adding a supplement definition.
///
/// The caller supplies the `id` (typically `Supplement::generate_id_now()`)
/// and is responsible for its uniqueness; the store performs no check.
/// `validate()` is the UI-boundary gate; the store itself accepts whatever
/// it is given.
#[derive(Debug, Clone)]
pub struct AddSupplementCommand {
    pub id: String,
    pub name: String,
    pub dose: Option<String>,
    pub route: SupplementRoute,
    /// Minutes since midnight; the display `time` is derived from this.
    pub time_minutes: u32,
    /// Weekdays the supplement is due, 0 = Sunday.
    pub days_of_week: Vec<u8>,
    /// Defaults to today when omitted.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub catalog_id: Option<String>,
}

impl AddSupplementCommand {
    /// Validate the fields the add form gates its save action on.
    pub fn validate(&self) -> Result<(), SupplementValidationError> {
        validate_supplement_draft(&self.name, self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// Partial update for an existing definition. `None` leaves a field
/// untouched; the double-`Option` fields distinguish "leave as is"
/// (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct SupplementPatch {
    pub name: Option<String>,
    pub dose: Option<Option<String>>,
    pub route: Option<SupplementRoute>,
    /// Display time. Supplied independently of `time_minutes`; the store
    /// does not force the two to agree.
    pub time: Option<String>,
    pub time_minutes: Option<u32>,
    pub days_of_week: Option<Vec<u8>>,
    pub start_date: Option<String>,
    pub end_date: Option<Option<String>>,
    pub catalog_id: Option<Option<String>>,
}

/// Input for updating a supplement definition in place. The edit form
/// validates its full draft with `validate_supplement_draft` before
/// building a patch; the store applies whatever it receives.
#[derive(Debug, Clone)]
pub struct UpdateSupplementCommand {
    pub id: String,
    pub patch: SupplementPatch,
}
