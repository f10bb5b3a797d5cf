use std::collections::HashSet;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};

use crate::state::MatchDictionary;
use crate::time_convert::{self, PLACEHOLDER, ViewerZone};

/// Market label a record must carry to be shown at all.
pub const MARKET_SENTINEL: &str = "Over";
pub const STALE_AFTER_MINUTES: i64 = 45;

pub const LEAGUE_INDEX: usize = 2;
pub const START_TIME_INDEX: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEntry {
    pub id: String,
    pub home: String,
    pub away: String,
    pub league: String,
    pub start_time: String,
}

/// Inputs for one render pass that depend on the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderClock {
    pub now: NaiveDateTime,
    pub viewer: ViewerZone,
    pub stale_after_minutes: i64,
}

impl RenderClock {
    pub fn now(viewer: ViewerZone, stale_after_minutes: i64) -> Self {
        Self {
            now: Local::now().naive_local(),
            viewer,
            stale_after_minutes,
        }
    }
}

/// Records present in `reference` whose market label is [`MARKET_SENTINEL`],
/// in records order.
pub fn base_filter(records: &MatchDictionary, reference: &MatchDictionary) -> MatchDictionary {
    records
        .iter()
        .filter(|(key, values)| {
            reference.contains_key(key)
                && values.first().map(String::as_str) == Some(MARKET_SENTINEL)
        })
        .map(|(key, values)| (key.to_string(), values.to_vec()))
        .collect()
}

/// Distinct non-empty league names of the filtered records, first-seen order.
pub fn league_options(filtered: &MatchDictionary, reference: &MatchDictionary) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();
    for key in filtered.keys() {
        let Some(league) = reference_field(reference, key, LEAGUE_INDEX) else {
            continue;
        };
        if seen.insert(league) {
            options.push(league.to_string());
        }
    }
    options
}

/// True when `start_time`, read as a same-day naive local wall clock, is more
/// than `stale_after_minutes` behind `now`. Unparseable times are never stale.
pub fn is_stale(start_time: &str, now: NaiveDateTime, stale_after_minutes: i64) -> bool {
    let Some(kickoff) = time_convert::parse_clock(start_time).and_then(|c| c.on(now.date())) else {
        return false;
    };
    now - kickoff > ChronoDuration::minutes(stale_after_minutes)
}

/// Joins, filters and projects the two feeds using the current wall clock.
pub fn build_filtered_view(
    records: &MatchDictionary,
    reference: &MatchDictionary,
    selected_league: &str,
    hide_old_games: bool,
) -> Vec<BoardEntry> {
    let clock = RenderClock::now(ViewerZone::detect(None), STALE_AFTER_MINUTES);
    build_filtered_view_at(records, reference, selected_league, hide_old_games, &clock)
}

pub fn build_filtered_view_at(
    records: &MatchDictionary,
    reference: &MatchDictionary,
    selected_league: &str,
    hide_old_games: bool,
    clock: &RenderClock,
) -> Vec<BoardEntry> {
    let filtered = base_filter(records, reference);
    display_entries(&filtered, reference, selected_league, hide_old_games, clock)
}

/// Display filter over an already base-filtered set.
pub fn display_entries(
    filtered: &MatchDictionary,
    reference: &MatchDictionary,
    selected_league: &str,
    hide_old_games: bool,
    clock: &RenderClock,
) -> Vec<BoardEntry> {
    let today = clock.now.date();
    filtered
        .iter()
        .filter(|(key, _)| {
            let league = reference_field(reference, key, LEAGUE_INDEX);
            if !selected_league.is_empty() && league != Some(selected_league) {
                return false;
            }
            if hide_old_games
                && let Some(start) = reference_field(reference, key, START_TIME_INDEX)
                && is_stale(start, clock.now, clock.stale_after_minutes)
            {
                return false;
            }
            true
        })
        .map(|(key, values)| {
            let start = reference
                .get(key)
                .and_then(|row| row.get(START_TIME_INDEX))
                .map(String::as_str)
                .unwrap_or_default();
            BoardEntry {
                id: key.to_string(),
                home: nth_from_end(values, 2),
                away: nth_from_end(values, 1),
                league: reference_field(reference, key, LEAGUE_INDEX)
                    .unwrap_or(PLACEHOLDER)
                    .to_string(),
                start_time: time_convert::convert_at(start, today, clock.viewer),
            }
        })
        .collect()
}

fn reference_field<'a>(reference: &'a MatchDictionary, key: &str, index: usize) -> Option<&'a str> {
    reference
        .get(key)
        .and_then(|row| row.get(index))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn nth_from_end(values: &[String], n: usize) -> String {
    values
        .len()
        .checked_sub(n)
        .and_then(|idx| values.get(idx))
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
