//! Command structs accepted by the domain services.

pub mod supplements;

pub use supplements::{AddSupplementCommand, SupplementPatch, UpdateSupplementCommand};
