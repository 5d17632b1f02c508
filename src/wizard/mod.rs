// Public API - what other modules can use
pub use errors::SessionError;
pub use handlers::{
    create_match, finish_match, get_session, list_candidates, list_players, record_half_time,
    register, reset, select_event_type, select_player, select_players, set_half,
};
pub use models::{FinalReport, MatchSession, Registration, WizardStep};
pub use service::WizardService;
pub use tally::{badge, tally};
pub use types::SessionView;

// Internal modules
mod errors;
mod handlers;
mod models;
mod service;
mod tally;
pub mod types;
