use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use super::{ModelError, Player};

/// Timestamp format written to the event log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Event vocabulary. The strum names are the values stored in the event log.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum EventKind {
    #[strum(serialize = "Mål")]
    Goal,
    #[strum(serialize = "Assist")]
    Assist,
    #[strum(serialize = "Frikast")]
    FreeThrow,
    #[strum(serialize = "Redning")]
    Save,
    #[strum(serialize = "Gult kort")]
    YellowCard,
    #[strum(serialize = "2 min")]
    TwoMinutes,
    #[strum(serialize = "Rødt kort")]
    RedCard,

    #[strum(serialize = "HALVLEG_RESULTAT")]
    HalfTimeScore,
    #[strum(serialize = "SLUT_RESULTAT")]
    FinalScore,
    #[strum(serialize = "KAMPENS_SPILLER")]
    MostValuablePlayer,
    #[strum(serialize = "KOMMENTAR")]
    Comment,
}

impl EventKind {
    /// Meta kinds carry a match-level payload instead of a player
    pub fn is_meta(self) -> bool {
        matches!(
            self,
            Self::HalfTimeScore | Self::FinalScore | Self::MostValuablePlayer | Self::Comment
        )
    }

    /// How much one occurrence counts towards a player's tally
    pub fn delta(self) -> i32 {
        if self.is_meta() {
            0
        } else {
            1
        }
    }

    /// Single-character badge shown next to a player, `None` for meta kinds
    pub fn code(self) -> Option<char> {
        match self {
            Self::Goal => Some('M'),
            Self::Assist => Some('A'),
            Self::FreeThrow => Some('F'),
            Self::Save => Some('R'),
            Self::YellowCard => Some('G'),
            Self::TwoMinutes => Some('2'),
            Self::RedCard => Some('X'),
            _ => None,
        }
    }

    /// The kinds a user can register against a player, in display order
    pub fn stat_kinds() -> impl Iterator<Item = EventKind> {
        Self::iter().filter(|kind| !kind.is_meta())
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for EventKind {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ModelError::UnknownEventKind(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Half {
    #[default]
    First,
    Second,
}

impl Half {
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
        }
    }
}

impl From<Half> for u8 {
    fn from(half: Half) -> Self {
        half.number()
    }
}

impl TryFrom<u8> for Half {
    type Error = ModelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            other => Err(ModelError::InvalidHalf(other)),
        }
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One row of the event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub match_id: String,
    pub half: Half,
    /// Empty for meta events
    pub player: String,
    pub event: EventKind,
    pub pos_primary: String,
    pub team_primary: String,
    pub delta: i32,
    pub meta_value: String,
}

impl Event {
    pub fn is_meta(&self) -> bool {
        self.event.is_meta()
    }
}

/// Builds a player event stamped with the current local time.
///
/// `delta` follows the kind, so a stat registration always counts as one.
pub fn build_event(player: &Player, kind: EventKind, match_id: &str, half: Half) -> Event {
    Event {
        timestamp: now(),
        match_id: match_id.to_string(),
        half,
        player: player.name.clone(),
        event: kind,
        pos_primary: player.pos_primary.clone(),
        team_primary: player.team_primary.clone(),
        delta: kind.delta(),
        meta_value: String::new(),
    }
}

/// Builds a match-level event with no player attached
pub fn meta_event(kind: EventKind, match_id: &str, half: Half, value: impl Into<String>) -> Event {
    Event {
        timestamp: now(),
        match_id: match_id.to_string(),
        half,
        player: String::new(),
        event: kind,
        pos_primary: String::new(),
        team_primary: String::new(),
        delta: kind.delta(),
        meta_value: value.into(),
    }
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
