//! Google Sheets backed record store.
//!
//! Roster: a worksheet in its own spreadsheet. Event log: the first worksheet of the stats
//! spreadsheet. Match index: a `Matches` worksheet in the stats spreadsheet, created on first
//! use. Sheets appends are not transactional, so a failed batch may be partially written.

mod auth;
mod client;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use self::auth::{ServiceAccountAuth, ServiceAccountKey};
use self::client::{a1_range, SheetsClient};
use super::rows::{self, EVENT_HEADER, MATCH_HEADER};
use super::{RecordStore, StoreError};
use crate::model::{Event, Match, Player};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const NEW_SHEET_ROWS: u32 = 200;
const NEW_SHEET_COLUMNS: u32 = 10;

fn default_roster_worksheet() -> String {
    "truppen".to_string()
}

fn default_roster_header_rows() -> usize {
    5
}

fn default_matches_worksheet() -> String {
    "Matches".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SheetsConfig {
    #[serde(alias = "truppen_sheet_id")]
    pub roster_spreadsheet_id: String,
    #[serde(default = "default_roster_worksheet")]
    pub roster_worksheet: String,
    #[serde(default = "default_roster_header_rows")]
    pub roster_header_rows: usize,
    #[serde(alias = "stats_sheet_id")]
    pub stats_spreadsheet_id: String,
    #[serde(default = "default_matches_worksheet")]
    pub matches_worksheet: String,
    pub service_account_file: PathBuf,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

pub struct SheetsRecordStore {
    client: SheetsClient,
    config: SheetsConfig,
    event_sheet: OnceCell<String>,
    matches_sheet: OnceCell<()>,
}

impl SheetsRecordStore {
    /// Loads the service-account key and prepares the HTTP client. No request is made yet.
    pub fn from_config(config: SheetsConfig) -> Result<Self, StoreError> {
        let key = ServiceAccountKey::from_file(&config.service_account_file)?;
        let base = Url::parse(&config.api_base)
            .map_err(|e| StoreError::Config(format!("invalid api_base '{}': {e}", config.api_base)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        let auth = ServiceAccountAuth::new(key, http.clone())?;

        Ok(Self {
            client: SheetsClient::new(http, base, auth),
            config,
            event_sheet: OnceCell::new(),
            matches_sheet: OnceCell::new(),
        })
    }

    /// Resolves the event log worksheet and makes sure its header is current
    async fn event_sheet(&self) -> Result<&str, StoreError> {
        let title = self
            .event_sheet
            .get_or_try_init(|| async {
                let spreadsheet = &self.config.stats_spreadsheet_id;
                let title = self
                    .client
                    .sheet_titles(spreadsheet)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| StoreError::Malformed("stats spreadsheet has no worksheets".to_string()))?;

                let header = self
                    .client
                    .get_values(spreadsheet, &a1_range(&title, "1:1"))
                    .await?
                    .into_iter()
                    .next()
                    .unwrap_or_default();

                if rows::event_header_needs_rewrite(&header) {
                    info!(worksheet = %title, "Writing event log header");
                    self.client
                        .update_values(
                            spreadsheet,
                            &a1_range(&title, "A1:I1"),
                            vec![rows::header_row(&EVENT_HEADER)],
                        )
                        .await?;
                }

                Ok::<_, StoreError>(title)
            })
            .await?;

        Ok(title.as_str())
    }

    /// Creates the match index worksheet with its header if it does not exist
    async fn ensure_matches_sheet(&self) -> Result<(), StoreError> {
        self.matches_sheet
            .get_or_try_init(|| async {
                let spreadsheet = &self.config.stats_spreadsheet_id;
                let worksheet = &self.config.matches_worksheet;
                let titles = self.client.sheet_titles(spreadsheet).await?;

                if !titles.iter().any(|t| t == worksheet) {
                    info!(worksheet = %worksheet, "Creating match index worksheet");
                    self.client
                        .add_sheet(spreadsheet, worksheet, NEW_SHEET_ROWS, NEW_SHEET_COLUMNS)
                        .await?;
                    self.client
                        .update_values(
                            spreadsheet,
                            &a1_range(worksheet, "A1:D1"),
                            vec![rows::header_row(&MATCH_HEADER)],
                        )
                        .await?;
                }

                Ok::<_, StoreError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SheetsRecordStore {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        let rows = self
            .client
            .get_values(&self.config.roster_spreadsheet_id, &a1_range(&self.config.roster_worksheet, "A:F"))
            .await?;
        let players = rows::parse_roster(&rows, self.config.roster_header_rows);

        debug!(player_count = players.len(), "Roster read from sheet");
        Ok(players)
    }

    #[instrument(skip(self, record), fields(match_id = %record.match_id))]
    async fn append_match(&self, record: &Match) -> Result<(), StoreError> {
        self.ensure_matches_sheet().await?;
        self.client
            .append_rows(
                &self.config.stats_spreadsheet_id,
                &a1_range(&self.config.matches_worksheet, "A:D"),
                vec![rows::match_to_row(record)],
            )
            .await?;

        info!("Match appended to sheet");
        Ok(())
    }

    #[instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append_events(&self, events: &[Event]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let title = self.event_sheet().await?;
        self.client
            .append_rows(
                &self.config.stats_spreadsheet_id,
                &a1_range(title, "A:I"),
                events.iter().map(rows::event_to_row).collect(),
            )
            .await
            .map_err(|err| {
                warn!(error = %err, "Event batch append failed; the sheet may hold part of the batch");
                err
            })?;

        info!("Event batch appended to sheet");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_matches(&self) -> Result<Vec<Match>, StoreError> {
        self.ensure_matches_sheet().await?;
        let rows = self
            .client
            .get_values(
                &self.config.stats_spreadsheet_id,
                &a1_range(&self.config.matches_worksheet, "A:D"),
            )
            .await?;
        Ok(rows::parse_matches(&rows))
    }

    #[instrument(skip(self))]
    async fn events_for_match(&self, match_id: &str) -> Result<Vec<Event>, StoreError> {
        let title = self.event_sheet().await?;
        let rows = self
            .client
            .get_unformatted_values(&self.config.stats_spreadsheet_id, &a1_range(title, "A:I"))
            .await?;
        Ok(rows::parse_events(&rows, match_id))
    }
}
