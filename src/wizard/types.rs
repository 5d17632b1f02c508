use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{MatchSession, WizardStep};
use super::tally::{badge, tally};
use crate::model::{Event, EventKind, Half, Match, Player, RosterFilter};

/// Request payload for step 1
#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub team_number: String,
    pub date: NaiveDate,
    pub opponent: String,
}

/// Request payload for step 2
#[derive(Debug, Deserialize)]
pub struct SelectPlayersRequest {
    pub players: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HalfRequest {
    pub half: Half,
}

#[derive(Debug, Deserialize)]
pub struct EventTypeRequest {
    pub event_type: EventKind,
}

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct HalfTimeRequest {
    pub ours: u32,
    pub theirs: u32,
}

/// Query for the step-2 candidate list. Absent or "all" means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct CandidatesQuery {
    pub team: Option<String>,
    pub position: Option<String>,
}

impl From<CandidatesQuery> for RosterFilter {
    fn from(query: CandidatesQuery) -> Self {
        fn narrow(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all") && !v.eq_ignore_ascii_case("alle"))
        }

        RosterFilter {
            team: narrow(query.team),
            position: narrow(query.position),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CandidatesResponse {
    pub positions: Vec<String>,
    pub players: Vec<Player>,
}

/// A squad member with the counters shown next to their button
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PlayerCard {
    pub player: Player,
    pub counts: BTreeMap<EventKind, u32>,
    pub badge: String,
}

/// Everything the presentation layer needs to render the current step
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionView {
    pub step: WizardStep,
    pub step_number: u8,
    pub current_match: Option<Match>,
    pub players: Vec<PlayerCard>,
    pub events: Vec<Event>,
    pub selected_event_type: Option<EventKind>,
    pub selected_player: Option<String>,
    pub current_half: Half,
    pub can_register: bool,
    pub event_types: Vec<EventKind>,
}

impl From<&MatchSession> for SessionView {
    fn from(session: &MatchSession) -> Self {
        let counts = tally(session.events());
        let players = session
            .match_players()
            .iter()
            .map(|player| PlayerCard {
                counts: counts
                    .iter()
                    .filter(|((name, _), _)| *name == player.name)
                    .map(|((_, kind), count)| (*kind, *count))
                    .collect(),
                badge: badge(&player.name, &counts),
                player: player.clone(),
            })
            .collect();

        Self {
            step: session.step(),
            step_number: session.step().number(),
            current_match: session.current_match().cloned(),
            players,
            events: session.events().to_vec(),
            selected_event_type: session.selected_event_type(),
            selected_player: session.selected_player().map(str::to_string),
            current_half: session.current_half(),
            can_register: session.can_register(),
            event_types: EventKind::stat_kinds().collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisterResponse {
    pub recorded: Option<Event>,
    pub warning: Option<String>,
    pub session: SessionView,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FinishResponse {
    pub events_written: usize,
    pub session: SessionView,
}
