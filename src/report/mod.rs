// Public API - what other modules can use
pub use handlers::{list_matches, match_events, match_report};
pub use models::{MatchReport, PlayerTotals};
pub use service::ReportService;

// Internal modules
mod handlers;
mod models;
mod service;
