use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{FinalReport, Registration, WizardStep},
    types::{
        CandidatesResponse, CreateMatchRequest, FinishResponse, RegisterResponse,
        SelectPlayersRequest, SessionView,
    },
};
use crate::model::{primary_positions, EventKind, Half, RosterFilter};
use crate::shared::{AppError, AppState, SharedSession};
use crate::store::{RecordStore, RosterCache};

/// Service for driving the match wizard
///
/// Every call takes the session lock for its whole duration, store writes included, so
/// transitions are strictly sequential.
pub struct WizardService {
    session: SharedSession,
    store: Arc<dyn RecordStore>,
    roster: RosterCache,
}

impl WizardService {
    pub fn new(session: SharedSession, store: Arc<dyn RecordStore>, roster: RosterCache) -> Self {
        Self {
            session,
            store,
            roster,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.session),
            Arc::clone(&state.store),
            state.roster.clone(),
        )
    }

    pub async fn view(&self) -> SessionView {
        SessionView::from(&*self.session.lock().await)
    }

    /// Players available for selection in step 2, plus the position filter options
    #[instrument(skip(self))]
    pub async fn candidates(&self, filter: RosterFilter) -> Result<CandidatesResponse, AppError> {
        let roster = self.roster.players().await?;
        let players: Vec<_> = filter.apply(&roster).into_iter().cloned().collect();

        debug!(candidate_count = players.len(), "Candidates filtered");
        Ok(CandidatesResponse {
            positions: primary_positions(&roster),
            players,
        })
    }

    #[instrument(skip(self))]
    pub async fn create_match(&self, request: CreateMatchRequest) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session
            .create_match(
                self.store.as_ref(),
                request.date,
                &request.team_number,
                &request.opponent,
            )
            .await?;
        Ok(SessionView::from(&*session))
    }

    #[instrument(skip(self))]
    pub async fn select_players(&self, request: SelectPlayersRequest) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session.require_step("select players", WizardStep::SelectPlayers)?;

        let roster = self.roster.players().await?;
        session.select_players(&roster, &request.players)?;
        Ok(SessionView::from(&*session))
    }

    pub async fn set_half(&self, half: Half) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session.set_half(half)?;
        Ok(SessionView::from(&*session))
    }

    pub async fn select_event_type(&self, kind: EventKind) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session.select_event_type(kind)?;
        Ok(SessionView::from(&*session))
    }

    pub async fn select_player(&self, name: &str) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session.select_player(name)?;
        Ok(SessionView::from(&*session))
    }

    #[instrument(skip(self))]
    pub async fn register(&self) -> Result<RegisterResponse, AppError> {
        let mut session = self.session.lock().await;
        let (recorded, warning) = match session.register()? {
            Registration::Recorded(event) => (Some(event), None),
            Registration::PlayerMissing { name } => {
                warn!(player = %name, "Registration dropped, player must be selected again");
                (None, Some(format!("'{name}' is not in this match; select the player again")))
            }
        };

        Ok(RegisterResponse {
            recorded,
            warning,
            session: SessionView::from(&*session),
        })
    }

    #[instrument(skip(self))]
    pub async fn record_half_time(&self, ours: u32, theirs: u32) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session.record_half_time(ours, theirs)?;
        Ok(SessionView::from(&*session))
    }

    #[instrument(skip(self, report))]
    pub async fn finish_match(&self, report: FinalReport) -> Result<FinishResponse, AppError> {
        let mut session = self.session.lock().await;
        let events_written = session.finish_match(self.store.as_ref(), report).await?;

        info!(events_written, "Match flushed to record store");
        Ok(FinishResponse {
            events_written,
            session: SessionView::from(&*session),
        })
    }

    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<SessionView, AppError> {
        let mut session = self.session.lock().await;
        session.reset()?;
        // Roster edits made during the match show up in the next squad selection
        self.roster.invalidate().await;
        Ok(SessionView::from(&*session))
    }
}
