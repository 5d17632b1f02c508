use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A squad member as listed in the roster table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub pos_primary: String,
    #[serde(default)]
    pub pos_secondary: String,
    #[serde(default)]
    pub team_primary: String,
    #[serde(default)]
    pub team_secondary: String,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        pos_primary: impl Into<String>,
        team_primary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pos_primary: pos_primary.into(),
            team_primary: team_primary.into(),
            ..Self::default()
        }
    }
}

/// Candidate filter used when picking players for a match.
///
/// `None` means "all". Matching is exact on the primary team and primary position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RosterFilter {
    pub team: Option<String>,
    pub position: Option<String>,
}

impl RosterFilter {
    pub fn matches(&self, player: &Player) -> bool {
        let team_ok = self
            .team
            .as_deref()
            .is_none_or(|team| player.team_primary == team);
        let position_ok = self
            .position
            .as_deref()
            .is_none_or(|position| player.pos_primary == position);
        team_ok && position_ok
    }

    pub fn apply<'a>(&self, players: &'a [Player]) -> Vec<&'a Player> {
        players.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Sorted, de-duplicated, non-empty primary positions of the roster
pub fn primary_positions(players: &[Player]) -> Vec<String> {
    players
        .iter()
        .filter(|p| !p.pos_primary.is_empty())
        .map(|p| p.pos_primary.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
