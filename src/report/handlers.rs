use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{models::MatchReport, service::ReportService};
use crate::model::{Event, Match};
use crate::shared::{AppError, AppState};

/// GET /matches
#[instrument(name = "list_matches", skip(state))]
pub async fn list_matches(State(state): State<AppState>) -> Result<Json<Vec<Match>>, AppError> {
    let service = ReportService::new(Arc::clone(&state.store));
    let matches = service.list_matches().await?;

    info!(match_count = matches.len(), "Matches listed successfully");
    Ok(Json(matches))
}

/// GET /matches/:match_id/events
#[instrument(name = "match_events", skip(state))]
pub async fn match_events(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Vec<Event>>, AppError> {
    let service = ReportService::new(Arc::clone(&state.store));
    Ok(Json(service.events_for_match(&match_id).await?))
}

/// GET /matches/:match_id/report
#[instrument(name = "match_report", skip(state))]
pub async fn match_report(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchReport>, AppError> {
    let service = ReportService::new(Arc::clone(&state.store));
    Ok(Json(service.match_report(&match_id).await?))
}
