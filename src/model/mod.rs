// Pure data model: players, matches and match events
mod event;
mod matches;
mod player;

pub use event::{build_event, meta_event, Event, EventKind, Half, TIMESTAMP_FORMAT};
pub use matches::{create_match, create_match_id, Match, DATE_FORMAT};
pub use player::{primary_positions, Player, RosterFilter};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid half: {0} (expected 1 or 2)")]
    InvalidHalf(u8),

    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),
}
