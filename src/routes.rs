use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::report;
use crate::shared::AppState;
use crate::wizard;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/players", get(wizard::list_players))
        .route("/session", get(wizard::get_session))
        .route("/session/candidates", get(wizard::list_candidates))
        .route("/session/match", post(wizard::create_match))
        .route("/session/players", post(wizard::select_players))
        .route("/session/half", post(wizard::set_half))
        .route("/session/event-type", post(wizard::select_event_type))
        .route("/session/player", post(wizard::select_player))
        .route("/session/register", post(wizard::register))
        .route("/session/half-time", post(wizard::record_half_time))
        .route("/session/finish", post(wizard::finish_match))
        .route("/session/reset", post(wizard::reset))
        .route("/matches", get(report::list_matches))
        .route("/matches/:match_id/events", get(report::match_events))
        .route("/matches/:match_id/report", get(report::match_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
