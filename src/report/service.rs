use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::models::MatchReport;
use crate::model::{Event, Match};
use crate::shared::AppError;
use crate::store::RecordStore;

/// Read-side queries over recorded matches
pub struct ReportService {
    store: Arc<dyn RecordStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn list_matches(&self) -> Result<Vec<Match>, AppError> {
        let matches = self.store.list_matches().await?;
        debug!(match_count = matches.len(), "Matches listed");
        Ok(matches)
    }

    #[instrument(skip(self))]
    pub async fn events_for_match(&self, match_id: &str) -> Result<Vec<Event>, AppError> {
        Ok(self.store.events_for_match(match_id).await?)
    }

    /// Summarises one match. Colliding match ids resolve to the latest index row.
    #[instrument(skip(self))]
    pub async fn match_report(&self, match_id: &str) -> Result<MatchReport, AppError> {
        let record = self
            .store
            .list_matches()
            .await?
            .into_iter()
            .rev()
            .find(|m| m.match_id == match_id);
        let events = self.store.events_for_match(match_id).await?;

        if record.is_none() && events.is_empty() {
            return Err(AppError::NotFound(format!("Match '{match_id}' not found")));
        }

        let report = MatchReport::build(match_id, record, &events);
        info!(player_count = report.players.len(), "Match report built");
        Ok(report)
    }
}
