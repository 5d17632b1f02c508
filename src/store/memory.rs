use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{RecordStore, StoreError};
use crate::model::{Event, Match, Player};

#[derive(Debug, Default)]
struct Tables {
    players: Vec<Player>,
    matches: Vec<Match>,
    events: Vec<Event>,
    event_batches: usize,
}

/// In-memory implementation of RecordStore for development and testing
///
/// Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose roster is pre-populated
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                players,
                ..Tables::default()
            }),
        }
    }

    /// Number of non-empty `append_events` calls received so far
    pub async fn event_batch_count(&self) -> usize {
        self.tables.read().await.event_batches
    }

    /// Every event row written so far, in append order
    pub async fn all_events(&self) -> Vec<Event> {
        self.tables.read().await.events.clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        let tables = self.tables.read().await;
        debug!(player_count = tables.players.len(), "Listing roster from memory");
        Ok(tables.players.clone())
    }

    #[instrument(skip(self, record), fields(match_id = %record.match_id))]
    async fn append_match(&self, record: &Match) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.matches.push(record.clone());
        debug!(match_count = tables.matches.len(), "Match appended in memory");
        Ok(())
    }

    #[instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append_events(&self, events: &[Event]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tables = self.tables.write().await;
        tables.events.extend_from_slice(events);
        tables.event_batches += 1;
        debug!(total_events = tables.events.len(), "Event batch appended in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_matches(&self) -> Result<Vec<Match>, StoreError> {
        Ok(self.tables.read().await.matches.clone())
    }

    #[instrument(skip(self))]
    async fn events_for_match(&self, match_id: &str) -> Result<Vec<Event>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect())
    }
}
