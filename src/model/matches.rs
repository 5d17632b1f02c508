use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used in match identifiers and the match index
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A row of the match index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: String,
    pub date: NaiveDate,
    pub team_number: String,
    pub opponent: String,
}

/// Builds `<date>_H<team>_<opponent>`.
///
/// The opponent is trimmed and every single space becomes an underscore. Runs of spaces are
/// not collapsed, and identical inputs always produce the same id, so two matches against the
/// same opponent on the same day for the same team share an id.
pub fn create_match_id(date: NaiveDate, team_number: &str, opponent: &str) -> String {
    let opponent = opponent.trim().replace(' ', "_");
    format!("{}_H{}_{}", date.format(DATE_FORMAT), team_number, opponent)
}

pub fn create_match(date: NaiveDate, team_number: &str, opponent: &str) -> Match {
    Match {
        match_id: create_match_id(date, team_number, opponent),
        date,
        team_number: team_number.to_string(),
        opponent: opponent.trim().to_string(),
    }
}
