use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument, warn};

use super::errors::SessionError;
use crate::model::{build_event, create_match, meta_event, Event, EventKind, Half, Match, Player};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    CreateMatch,
    SelectPlayers,
    Record,
    Summary,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            Self::CreateMatch => 1,
            Self::SelectPlayers => 2,
            Self::Record => 3,
            Self::Summary => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::CreateMatch => "create match",
            Self::SelectPlayers => "select players",
            Self::Record => "record",
            Self::Summary => "summary",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

/// What the end-of-match dialog collects
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FinalReport {
    pub ours: u32,
    pub theirs: u32,
    pub mvp: String,
    #[serde(default)]
    pub comment: String,
}

/// Outcome of pressing "register"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Recorded(Event),
    /// The armed player is no longer part of the match; nothing was recorded
    PlayerMissing { name: String },
}

/// The wizard's state for the one match in progress.
///
/// Events only ever grow until the end-of-match flush, and every transition that talks to
/// the store mutates the session only after the store call has succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSession {
    step: WizardStep,
    current_match: Option<Match>,
    match_players: Vec<Player>,
    events: Vec<Event>,
    selected_event_type: Option<EventKind>,
    selected_player: Option<String>,
    current_half: Half,
}

impl MatchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.current_match.as_ref()
    }

    pub fn match_players(&self) -> &[Player] {
        &self.match_players
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn selected_event_type(&self) -> Option<EventKind> {
        self.selected_event_type
    }

    pub fn selected_player(&self) -> Option<&str> {
        self.selected_player.as_deref()
    }

    pub fn current_half(&self) -> Half {
        self.current_half
    }

    pub fn can_register(&self) -> bool {
        self.selected_event_type.is_some() && self.selected_player.is_some()
    }

    pub(super) fn require_step(&self, operation: &'static str, expected: WizardStep) -> Result<(), SessionError> {
        if self.step != expected {
            warn!(operation, expected = %expected, actual = %self.step, "Transition rejected");
            return Err(SessionError::WrongStep {
                operation,
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn match_id(&self) -> Result<String, SessionError> {
        self.current_match
            .as_ref()
            .map(|m| m.match_id.clone())
            .ok_or_else(|| SessionError::Validation("No match in progress".to_string()))
    }

    /// Step 1 → 2: records the match in the index, then arms a fresh recording session
    #[instrument(skip(self, store))]
    pub async fn create_match(
        &mut self,
        store: &dyn RecordStore,
        date: NaiveDate,
        team_number: &str,
        opponent: &str,
    ) -> Result<&Match, SessionError> {
        self.require_step("create a match", WizardStep::CreateMatch)?;

        if team_number.trim().is_empty() {
            return Err(SessionError::Validation("Team is required".to_string()));
        }
        if opponent.trim().is_empty() {
            return Err(SessionError::Validation("Opponent is required".to_string()));
        }

        let record = create_match(date, team_number, opponent);
        store.append_match(&record).await?;

        info!(match_id = %record.match_id, "Match created");
        self.events.clear();
        self.selected_event_type = None;
        self.selected_player = None;
        self.current_half = Half::First;
        self.step = WizardStep::SelectPlayers;
        Ok(self.current_match.insert(record))
    }

    /// Step 2 → 3: the chosen names become the match squad, in roster order
    #[instrument(skip(self, roster))]
    pub fn select_players(&mut self, roster: &[Player], names: &[String]) -> Result<(), SessionError> {
        self.require_step("select players", WizardStep::SelectPlayers)?;

        if names.is_empty() {
            warn!("Empty player selection rejected");
            return Err(SessionError::Validation("Select at least one player".to_string()));
        }
        if let Some(unknown) = names.iter().find(|n| !roster.iter().any(|p| &p.name == *n)) {
            return Err(SessionError::Validation(format!("'{unknown}' is not in the roster")));
        }

        self.match_players = roster
            .iter()
            .filter(|p| names.contains(&p.name))
            .cloned()
            .collect();
        self.step = WizardStep::Record;

        info!(player_count = self.match_players.len(), "Squad selected, recording started");
        Ok(())
    }

    pub fn set_half(&mut self, half: Half) -> Result<(), SessionError> {
        self.require_step("change half", WizardStep::Record)?;
        self.current_half = half;
        Ok(())
    }

    pub fn select_event_type(&mut self, kind: EventKind) -> Result<(), SessionError> {
        self.require_step("select an event type", WizardStep::Record)?;
        if kind.is_meta() {
            return Err(SessionError::Validation(format!(
                "'{kind}' cannot be registered against a player"
            )));
        }
        self.selected_event_type = Some(kind);
        Ok(())
    }

    pub fn select_player(&mut self, name: &str) -> Result<(), SessionError> {
        self.require_step("select a player", WizardStep::Record)?;
        self.selected_player = Some(name.to_string());
        Ok(())
    }

    /// Records the armed (event type, player) pair.
    ///
    /// Both slots are cleared afterwards whether or not the player was found, so every
    /// registration needs a fresh selection.
    #[instrument(skip(self))]
    pub fn register(&mut self) -> Result<Registration, SessionError> {
        self.require_step("register an event", WizardStep::Record)?;
        let match_id = self.match_id()?;

        let (Some(kind), Some(name)) = (self.selected_event_type, self.selected_player.clone()) else {
            return Err(SessionError::SelectionIncomplete);
        };

        self.selected_event_type = None;
        self.selected_player = None;

        let Some(player) = self.match_players.iter().find(|p| p.name == name) else {
            warn!(player = %name, "Selected player is not in the match squad");
            return Ok(Registration::PlayerMissing { name });
        };

        let event = build_event(player, kind, &match_id, self.current_half);
        self.events.push(event.clone());

        info!(player = %name, event = %kind, half = %self.current_half, "Event registered");
        Ok(Registration::Recorded(event))
    }

    /// Side dialog during recording: appends the half-time score as a meta event
    #[instrument(skip(self))]
    pub fn record_half_time(&mut self, ours: u32, theirs: u32) -> Result<&Event, SessionError> {
        self.require_step("record the half-time score", WizardStep::Record)?;
        let match_id = self.match_id()?;

        let event = meta_event(
            EventKind::HalfTimeScore,
            &match_id,
            self.current_half,
            format!("{ours}-{theirs}"),
        );
        self.events.push(event);

        info!(score = %format!("{ours}-{theirs}"), "Half-time score recorded");
        Ok(&self.events[self.events.len() - 1])
    }

    /// Step 3 → 4: adds the final score, MVP and comment, then writes every event of the
    /// match in one batch. Nothing changes in the session unless that write succeeds.
    #[instrument(skip(self, store, report), fields(mvp = %report.mvp))]
    pub async fn finish_match(
        &mut self,
        store: &dyn RecordStore,
        report: FinalReport,
    ) -> Result<usize, SessionError> {
        self.require_step("finish the match", WizardStep::Record)?;
        let match_id = self.match_id()?;

        if !self.match_players.iter().any(|p| p.name == report.mvp) {
            return Err(SessionError::Validation(format!(
                "'{}' did not play in this match",
                report.mvp
            )));
        }

        let half = self.current_half;
        let mut batch = self.events.clone();
        batch.extend([
            meta_event(
                EventKind::FinalScore,
                &match_id,
                half,
                format!("{}-{}", report.ours, report.theirs),
            ),
            meta_event(EventKind::MostValuablePlayer, &match_id, half, report.mvp),
            meta_event(EventKind::Comment, &match_id, half, report.comment.trim()),
        ]);

        if let Err(source) = store.append_events(&batch).await {
            warn!(
                match_id = %match_id,
                event_count = batch.len(),
                error = %source,
                "Event batch not confirmed; rows may be partly written and a retry can duplicate them"
            );
            return Err(SessionError::FlushUnconfirmed {
                events: batch.len(),
                source,
            });
        }

        let written = batch.len();
        self.events = batch;
        self.step = WizardStep::Summary;

        info!(match_id = %match_id, event_count = written, "Match finished and flushed");
        Ok(written)
    }

    /// Step 4 → 1: back to a blank session
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.require_step("start a new match", WizardStep::Summary)?;
        *self = Self::default();
        info!("Session reset for a new match");
        Ok(())
    }
}
