//! Domain models owned by the core services.

pub mod chat;
pub mod health;
pub mod supplement;

pub use chat::{ChatMessage, ChatRole, ChatStatus};
pub use health::{HealthEntry, MetricRegistryItem};
pub use supplement::Supplement;
