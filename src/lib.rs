// Library crate for the match logging server
// This file exposes the public API for integration tests

pub mod config;
pub mod model;
pub mod report;
pub mod routes;
pub mod shared;
pub mod store;
pub mod wizard;

// Re-export commonly used types for easier access in tests
pub use config::{Config, ConfigError, StoreConfig};
pub use model::{Event, EventKind, Half, Match, Player};
pub use report::MatchReport;
pub use routes::router;
pub use shared::{AppError, AppState};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
pub use wizard::{FinalReport, MatchSession, SessionView, WizardStep};
