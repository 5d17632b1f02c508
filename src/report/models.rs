use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Event, EventKind, Match};

/// Summed deltas for one player in one match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTotals {
    pub player: String,
    pub pos_primary: String,
    pub team_primary: String,
    pub totals: BTreeMap<EventKind, i32>,
}

/// Read-side summary of a recorded match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    pub match_id: String,
    pub record: Option<Match>,
    pub half_time_score: Option<String>,
    pub final_score: Option<String>,
    pub most_valuable_player: Option<String>,
    pub comment: Option<String>,
    pub players: Vec<PlayerTotals>,
}

impl MatchReport {
    /// Players appear in order of their first event; a repeated meta event keeps the last value
    pub fn build(match_id: &str, record: Option<Match>, events: &[Event]) -> Self {
        let mut report = Self {
            match_id: match_id.to_string(),
            record,
            ..Self::default()
        };

        for event in events {
            match event.event {
                EventKind::HalfTimeScore => report.half_time_score = Some(event.meta_value.clone()),
                EventKind::FinalScore => report.final_score = Some(event.meta_value.clone()),
                EventKind::MostValuablePlayer => {
                    report.most_valuable_player = Some(event.meta_value.clone())
                }
                EventKind::Comment => report.comment = Some(event.meta_value.clone()),
                kind if !event.player.is_empty() => {
                    let index = match report.players.iter().position(|p| p.player == event.player) {
                        Some(index) => index,
                        None => {
                            report.players.push(PlayerTotals {
                                player: event.player.clone(),
                                pos_primary: event.pos_primary.clone(),
                                team_primary: event.team_primary.clone(),
                                totals: BTreeMap::new(),
                            });
                            report.players.len() - 1
                        }
                    };
                    *report.players[index].totals.entry(kind).or_insert(0) += event.delta;
                }
                _ => {}
            }
        }

        report
    }
}
