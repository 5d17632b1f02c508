use axum::{
    extract::{Query, State},
    Json,
};
use tracing::{info, instrument};

use super::{
    models::FinalReport,
    service::WizardService,
    types::{
        CandidatesQuery, CandidatesResponse, CreateMatchRequest, EventTypeRequest, FinishResponse,
        HalfRequest, HalfTimeRequest, PlayerRequest, RegisterResponse, SelectPlayersRequest,
        SessionView,
    },
};
use crate::model::Player;
use crate::shared::{AppError, AppState};

/// GET /players
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>, AppError> {
    let players = state.roster.players().await?;
    info!(player_count = players.len(), "Roster served");
    Ok(Json(players.as_ref().clone()))
}

/// GET /session
#[instrument(name = "get_session", skip(state))]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(WizardService::from_state(&state).view().await)
}

/// GET /session/candidates?team=&position=
#[instrument(name = "list_candidates", skip(state))]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<CandidatesResponse>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.candidates(query.into()).await?))
}

/// POST /session/match
///
/// Step 1 → 2. Appends the match to the match index.
#[instrument(name = "create_match", skip(state))]
pub async fn create_match(
    State(state): State<AppState>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<Json<SessionView>, AppError> {
    info!(team = %request.team_number, opponent = %request.opponent, "Creating match");
    let service = WizardService::from_state(&state);
    Ok(Json(service.create_match(request).await?))
}

/// POST /session/players
///
/// Step 2 → 3
#[instrument(name = "select_players", skip(state))]
pub async fn select_players(
    State(state): State<AppState>,
    Json(request): Json<SelectPlayersRequest>,
) -> Result<Json<SessionView>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.select_players(request).await?))
}

/// POST /session/half
#[instrument(name = "set_half", skip(state))]
pub async fn set_half(
    State(state): State<AppState>,
    Json(request): Json<HalfRequest>,
) -> Result<Json<SessionView>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.set_half(request.half).await?))
}

/// POST /session/event-type
#[instrument(name = "select_event_type", skip(state))]
pub async fn select_event_type(
    State(state): State<AppState>,
    Json(request): Json<EventTypeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.select_event_type(request.event_type).await?))
}

/// POST /session/player
#[instrument(name = "select_player", skip(state))]
pub async fn select_player(
    State(state): State<AppState>,
    Json(request): Json<PlayerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.select_player(&request.name).await?))
}

/// POST /session/register
#[instrument(name = "register_event", skip(state))]
pub async fn register(State(state): State<AppState>) -> Result<Json<RegisterResponse>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.register().await?))
}

/// POST /session/half-time
#[instrument(name = "record_half_time", skip(state))]
pub async fn record_half_time(
    State(state): State<AppState>,
    Json(request): Json<HalfTimeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.record_half_time(request.ours, request.theirs).await?))
}

/// POST /session/finish
///
/// Step 3 → 4. Writes the whole match to the event log in one batch.
#[instrument(name = "finish_match", skip(state, report))]
pub async fn finish_match(
    State(state): State<AppState>,
    Json(report): Json<FinalReport>,
) -> Result<Json<FinishResponse>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.finish_match(report).await?))
}

/// POST /session/reset
///
/// Step 4 → 1
#[instrument(name = "reset_session", skip(state))]
pub async fn reset(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    let service = WizardService::from_state(&state);
    Ok(Json(service.reset().await?))
}
