use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::store::{RecordStore, RosterCache, StoreError};
use crate::wizard::{MatchSession, SessionError};

/// The one wizard session this process serves
pub type SharedSession = Arc<Mutex<MatchSession>>;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub roster: RosterCache,
    pub session: SharedSession,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, roster_ttl: Duration) -> Self {
        Self {
            roster: RosterCache::new(Arc::clone(&store), roster_ttl),
            store,
            session: Arc::new(Mutex::new(MatchSession::new())),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Record store did not confirm {events} events: {source}")]
    UnconfirmedWrite { events: usize, source: StoreError },
}

/// Sent with a failed end-of-match write, which the store may have partly applied
pub const UNCONFIRMED_WRITE_WARNING: &str = "Some of these events may already be stored. \
Retrying sends the whole batch again and can duplicate rows; check the event log first.";

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(msg) => AppError::BadRequest(msg),
            SessionError::Store(store) => AppError::Store(store),
            SessionError::FlushUnconfirmed { events, source } => {
                AppError::UnconfirmedWrite { events, source }
            }
            other @ (SessionError::WrongStep { .. } | SessionError::SelectionIncomplete) => {
                AppError::Conflict(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Store(err) => (
                StatusCode::BAD_GATEWAY,
                format!("Record store error: {}", err),
            ),
            AppError::UnconfirmedWrite { events, source } => {
                let body = Json(json!({
                    "error": format!("Record store error while writing {events} events: {source}"),
                    "warning": UNCONFIRMED_WRITE_WARNING,
                }));
                return (StatusCode::BAD_GATEWAY, body).into_response();
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
