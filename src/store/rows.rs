//! Row codec for the spreadsheet tables.
//!
//! Cells come back from the sheet as strings with trailing empty cells dropped, so every
//! reader treats a missing cell as an empty one.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use tracing::warn;

use crate::model::{Event, EventKind, Half, Match, Player, DATE_FORMAT, TIMESTAMP_FORMAT};

pub const EVENT_HEADER: [&str; 9] = [
    "Timestamp",
    "MatchID",
    "Half",
    "Player",
    "Event",
    "Position",
    "Team",
    "Delta",
    "MetaValue",
];

pub const MATCH_HEADER: [&str; 4] = ["MatchID", "Date", "Team", "Opponent"];

const TIMESTAMP_FALLBACKS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H.%M.%S",
];
const SECONDS_PER_DAY: f64 = 86_400.0;
const DATE_FALLBACKS: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Whether the event log header must be (re)written before appending
pub fn event_header_needs_rewrite(header: &[String]) -> bool {
    let starts_right = header.len() >= 2 && header[0] == EVENT_HEADER[0] && header[1] == EVENT_HEADER[1];
    !starts_right || header.len() < EVENT_HEADER.len()
}

pub fn header_row(header: &[&str]) -> Vec<Value> {
    header.iter().map(|h| json!(h)).collect()
}

pub fn event_to_row(event: &Event) -> Vec<Value> {
    vec![
        json!(event.timestamp.format(TIMESTAMP_FORMAT).to_string()),
        json!(event.match_id),
        json!(event.half.number()),
        json!(event.player),
        json!(event.event.as_str()),
        json!(event.pos_primary),
        json!(event.team_primary),
        json!(event.delta),
        json!(event.meta_value),
    ]
}

pub fn match_to_row(record: &Match) -> Vec<Value> {
    vec![
        json!(record.match_id),
        json!(record.date.format(DATE_FORMAT).to_string()),
        json!(record.team_number),
        json!(record.opponent),
    ]
}

/// Parses the roster worksheet. The first `header_rows` rows are headers; name is column B.
pub fn parse_roster(rows: &[Vec<String>], header_rows: usize) -> Vec<Player> {
    rows.iter()
        .skip(header_rows)
        .filter(|row| !cell(row, 1).is_empty())
        .map(|row| Player {
            name: cell(row, 1).to_string(),
            pos_primary: cell(row, 2).to_string(),
            pos_secondary: cell(row, 3).to_string(),
            team_primary: cell(row, 4).to_string(),
            team_secondary: cell(row, 5).to_string(),
        })
        .collect()
}

/// Parses the match index, skipping the header row and rows without an id
pub fn parse_matches(rows: &[Vec<String>]) -> Vec<Match> {
    rows.iter()
        .skip(1)
        .filter(|row| !cell(row, 0).is_empty())
        .filter_map(|row| {
            let Some(date) = parse_date(cell(row, 1)) else {
                warn!(match_id = %cell(row, 0), raw_date = %cell(row, 1), "Skipping match row with unreadable date");
                return None;
            };
            Some(Match {
                match_id: cell(row, 0).to_string(),
                date,
                team_number: cell(row, 2).to_string(),
                opponent: cell(row, 3).to_string(),
            })
        })
        .collect()
}

/// Parses the event log rows belonging to `match_id`
pub fn parse_events(rows: &[Vec<String>], match_id: &str) -> Vec<Event> {
    rows.iter()
        .skip(1)
        .filter(|row| cell(row, 1) == match_id)
        .filter_map(|row| match parse_event_row(row) {
            Ok(event) => Some(event),
            Err(reason) => {
                warn!(match_id = %match_id, reason = %reason, "Skipping unreadable event row");
                None
            }
        })
        .collect()
}

fn parse_event_row(row: &[String]) -> Result<Event, String> {
    let timestamp = parse_timestamp(cell(row, 0))
        .ok_or_else(|| format!("bad timestamp '{}'", cell(row, 0)))?;
    let half = parse_whole(cell(row, 2))
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| format!("bad half '{}'", cell(row, 2)))
        .and_then(|n| Half::try_from(n).map_err(|e| e.to_string()))?;
    let event = EventKind::try_from(cell(row, 4).to_string()).map_err(|e| e.to_string())?;

    Ok(Event {
        timestamp,
        match_id: cell(row, 1).to_string(),
        half,
        player: cell(row, 3).to_string(),
        event,
        pos_primary: cell(row, 5).to_string(),
        team_primary: cell(row, 6).to_string(),
        delta: parse_delta(cell(row, 7)),
        meta_value: cell(row, 8).to_string(),
    })
}

/// Empty or unreadable deltas count as one
fn parse_delta(raw: &str) -> i32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 1;
    }
    raw.parse::<f64>().map(|d| d as i32).unwrap_or(1)
}

/// `"2"` and `"2.0"` both read as 2
fn parse_whole(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.fract() == 0.0).then_some(value as i64)
}

/// Spreadsheet serial date-time: days since 1899-12-30, time of day as the fraction
fn from_serial(raw: &str) -> Option<NaiveDateTime> {
    let serial = raw.parse::<f64>().ok().filter(|s| s.is_finite() && *s >= 0.0)?;
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    std::iter::once(TIMESTAMP_FORMAT)
        .chain(TIMESTAMP_FALLBACKS)
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| from_serial(raw))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    std::iter::once(DATE_FORMAT)
        .chain(DATE_FALLBACKS)
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| from_serial(raw).map(|t| t.date()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build_event, create_match, meta_event};
    use rstest::rstest;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_parse_roster_skips_headers_and_nameless_rows() {
        let mut rows: Vec<Vec<String>> = (0..5).map(|i| row(&["", &format!("header {i}")])).collect();
        rows.push(row(&["1", "Anna", "Back", "", "1", "2"]));
        rows.push(row(&["2", "", "Keeper", "", "1"]));
        rows.push(row(&["3", "Bo", "Keeper"]));

        let players = parse_roster(&rows, 5);

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Anna");
        assert_eq!(players[0].team_primary, "1");
        assert_eq!(players[0].team_secondary, "2");
        assert_eq!(players[1].name, "Bo");
        assert_eq!(players[1].pos_primary, "Keeper");
        assert!(players[1].team_primary.is_empty());
    }

    #[test]
    fn test_parse_matches_skips_header_and_empty_ids() {
        let rows = vec![
            row(&MATCH_HEADER),
            row(&["2024-03-01_H1_FC_Falcon", "2024-03-01", "1", "FC Falcon"]),
            row(&["", "2024-03-02", "1", "Nobody"]),
            row(&["2024-03-09_H2_Ry", "09-03-2024", "2"]),
        ];

        let matches = parse_matches(&rows);

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].opponent, "FC Falcon");
        assert_eq!(matches[1].date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert!(matches[1].opponent.is_empty());
    }

    #[test]
    fn test_event_row_layout() {
        let anna = Player::new("Anna", "Back", "1");
        let event = build_event(&anna, EventKind::Goal, "m1", Half::Second);

        let cells = event_to_row(&event);

        assert_eq!(cells.len(), EVENT_HEADER.len());
        assert_eq!(cells[1], json!("m1"));
        assert_eq!(cells[2], json!(2));
        assert_eq!(cells[4], json!("Mål"));
        assert_eq!(cells[7], json!(1));
    }

    #[test]
    fn test_match_row_layout() {
        let record = create_match(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), "1", "FC Falcon");
        assert_eq!(
            match_to_row(&record),
            vec![json!("2024-03-01_H1_FC_Falcon"), json!("2024-03-01"), json!("1"), json!("FC Falcon")]
        );
    }

    #[test]
    fn test_parse_events_filters_by_match_and_reads_meta() {
        let final_score = meta_event(EventKind::FinalScore, "m1", Half::Second, "20-18");
        let final_cells: Vec<String> = event_to_row(&final_score)
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        let rows = vec![
            row(&EVENT_HEADER),
            row(&["2024-03-01 10:00:00", "m1", "1", "Anna", "Mål", "Back", "1"]),
            row(&["2024-03-01 10:05:00", "m2", "1", "Bo", "Redning", "Keeper", "1", "1"]),
            final_cells,
        ];

        let events = parse_events(&rows, "m1");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].player, "Anna");
        assert_eq!(events[0].delta, 1);
        assert_eq!(events[1].event, EventKind::FinalScore);
        assert_eq!(events[1].delta, 0);
        assert_eq!(events[1].meta_value, "20-18");
    }

    #[test]
    fn test_parse_events_skips_unreadable_rows() {
        let rows = vec![
            row(&EVENT_HEADER),
            row(&["not a time", "m1", "1", "Anna", "Mål"]),
            row(&["2024-03-01 10:00:00", "m1", "3", "Anna", "Mål"]),
            row(&["2024-03-01 10:00:00", "m1", "1", "Anna", "Straffe"]),
            row(&["2024-03-01 10:00:00", "m1", "2", "Anna", "Assist"]),
        ];

        let events = parse_events(&rows, "m1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, EventKind::Assist);
    }

    #[test]
    fn test_parse_events_reads_locale_and_serial_timestamps() {
        let rows = vec![
            row(&EVENT_HEADER),
            row(&["01.03.2024 10.00.00", "m1", "1", "Anna", "Mål", "Back", "1", "1"]),
            row(&["45352.416666666664", "m1", "2.0", "Bo", "Redning", "Keeper", "1", "1"]),
        ];

        let events = parse_events(&rows, "m1");

        let ten_o_clock = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, ten_o_clock);
        assert_eq!(events[1].timestamp, ten_o_clock);
        assert_eq!(events[1].half, Half::Second);
    }

    #[rstest]
    #[case("2024-03-01", Some((2024, 3, 1)))]
    #[case("01.03.2024", Some((2024, 3, 1)))]
    #[case("45352", Some((2024, 3, 1)))]
    #[case("soon", None)]
    fn test_parse_date(#[case] raw: &str, #[case] expected: Option<(i32, u32, u32)>) {
        let expected = expected.map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap());
        assert_eq!(parse_date(raw), expected);
    }

    #[rstest]
    #[case("", 1)]
    #[case("0", 0)]
    #[case("2.0", 2)]
    #[case("abc", 1)]
    fn test_parse_delta(#[case] raw: &str, #[case] expected: i32) {
        assert_eq!(parse_delta(raw), expected);
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&["Timestamp", "MatchID", "Player", "Event", "Position", "Team", "Delta"], true)]
    #[case(&["Time", "Match", "Half", "Player", "Event", "Position", "Team", "Delta", "MetaValue"], true)]
    #[case(&EVENT_HEADER, false)]
    fn test_event_header_needs_rewrite(#[case] header: &[&str], #[case] expected: bool) {
        assert_eq!(event_header_needs_rewrite(&row(header)), expected);
    }
}
