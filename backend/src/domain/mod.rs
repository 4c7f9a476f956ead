//! Domain layer: models, commands, and the store services.

pub mod chat_service;
pub mod commands;
pub mod health_service;
pub mod models;
pub mod notify;
pub mod schedule;
pub mod supplement_service;

pub use chat_service::ChatService;
pub use health_service::HealthService;
pub use schedule::ScheduleService;
pub use supplement_service::SupplementService;
