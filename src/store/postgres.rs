use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{debug, instrument, warn};

use super::{RecordStore, StoreError};
use crate::model::{Event, EventKind, Half, Match, Player};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS players (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        pos_primary TEXT NOT NULL DEFAULT '',
        pos_secondary TEXT NOT NULL DEFAULT '',
        team_primary TEXT NOT NULL DEFAULT '',
        team_secondary TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS matches (
        id BIGSERIAL PRIMARY KEY,
        match_id TEXT NOT NULL,
        match_date DATE NOT NULL,
        team_number TEXT NOT NULL,
        opponent TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS match_events (
        id BIGSERIAL PRIMARY KEY,
        recorded_at TIMESTAMP NOT NULL,
        match_id TEXT NOT NULL,
        half SMALLINT NOT NULL,
        player TEXT NOT NULL,
        event TEXT NOT NULL,
        pos_primary TEXT NOT NULL,
        team_primary TEXT NOT NULL,
        delta INTEGER NOT NULL,
        meta_value TEXT NOT NULL
    )",
];

/// PostgreSQL implementation of the record store.
///
/// `match_id` is not unique in `matches`; the index is append-only like the
/// spreadsheet it mirrors. Event batches are written in a single transaction.
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url).await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema ready");
        Ok(())
    }
}

fn event_from_row(row: &PgRow) -> Result<Event, StoreError> {
    let half: i16 = row.try_get("half")?;
    let half = u8::try_from(half)
        .map_err(|_| StoreError::Malformed(format!("half {half} out of range")))
        .and_then(|n| Half::try_from(n).map_err(|e| StoreError::Malformed(e.to_string())))?;
    let event: String = row.try_get("event")?;
    let event = EventKind::try_from(event).map_err(|e| StoreError::Malformed(e.to_string()))?;

    Ok(Event {
        timestamp: row.try_get("recorded_at")?,
        match_id: row.try_get("match_id")?,
        half,
        player: row.try_get("player")?,
        event,
        pos_primary: row.try_get("pos_primary")?,
        team_primary: row.try_get("team_primary")?,
        delta: row.try_get("delta")?,
        meta_value: row.try_get("meta_value")?,
    })
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<Player>, StoreError> {
        let rows = sqlx::query(
            "SELECT name, pos_primary, pos_secondary, team_primary, team_secondary FROM players ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to read roster");
            StoreError::from(e)
        })?;

        rows.iter()
            .map(|row| -> Result<Player, StoreError> {
                Ok(Player {
                    name: row.try_get("name")?,
                    pos_primary: row.try_get("pos_primary")?,
                    pos_secondary: row.try_get("pos_secondary")?,
                    team_primary: row.try_get("team_primary")?,
                    team_secondary: row.try_get("team_secondary")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, record), fields(match_id = %record.match_id))]
    async fn append_match(&self, record: &Match) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO matches (match_id, match_date, team_number, opponent) VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.match_id)
        .bind(record.date)
        .bind(&record.team_number)
        .bind(&record.opponent)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to append match");
            StoreError::from(e)
        })?;

        debug!("Match appended in database");
        Ok(())
    }

    #[instrument(skip(self, events), fields(event_count = events.len()))]
    async fn append_events(&self, events: &[Event]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for event in events {
            sqlx::query(
                "INSERT INTO match_events (recorded_at, match_id, half, player, event, pos_primary, team_primary, delta, meta_value)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(event.timestamp)
            .bind(&event.match_id)
            .bind(i16::from(event.half.number()))
            .bind(&event.player)
            .bind(event.event.as_str())
            .bind(&event.pos_primary)
            .bind(&event.team_primary)
            .bind(event.delta)
            .bind(&event.meta_value)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to append event, rolling back batch");
                StoreError::from(e)
            })?;
        }
        tx.commit().await?;

        debug!("Event batch committed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_matches(&self) -> Result<Vec<Match>, StoreError> {
        let rows = sqlx::query(
            "SELECT match_id, match_date, team_number, opponent FROM matches ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Match, StoreError> {
                Ok(Match {
                    match_id: row.try_get("match_id")?,
                    date: row.try_get("match_date")?,
                    team_number: row.try_get("team_number")?,
                    opponent: row.try_get("opponent")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn events_for_match(&self, match_id: &str) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query(
            "SELECT recorded_at, match_id, half, player, event, pos_primary, team_primary, delta, meta_value
             FROM match_events WHERE match_id = $1 ORDER BY id",
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(event_from_row).collect()
    }
}
