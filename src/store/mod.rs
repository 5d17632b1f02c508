// Public API - what other modules can use
pub use errors::StoreError;
pub use memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use roster::RosterCache;
pub use sheets::{SheetsConfig, SheetsRecordStore};

// Internal modules
mod errors;
mod memory;
mod postgres;
mod roster;
pub mod rows;
mod sheets;

use async_trait::async_trait;

use crate::model::{Event, Match, Player};

/// The tabular store behind the wizard: roster, match index and event log.
///
/// All tables are append-only. `append_events` writes one batch; a backend that cannot make
/// the batch atomic (the spreadsheet API) may leave some rows written when it fails, so
/// callers must not blindly retry a failed batch against such a backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_players(&self) -> Result<Vec<Player>, StoreError>;
    async fn append_match(&self, record: &Match) -> Result<(), StoreError>;
    async fn append_events(&self, events: &[Event]) -> Result<(), StoreError>;
    async fn list_matches(&self) -> Result<Vec<Match>, StoreError>;
    async fn events_for_match(&self, match_id: &str) -> Result<Vec<Event>, StoreError>;
}
