use std::collections::VecDeque;

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::board::{self, BoardEntry, RenderClock, STALE_AFTER_MINUTES};
use crate::config::Config;
use crate::time_convert::ViewerZone;

pub const ALL_LEAGUES: &str = "All Leagues";

/// Id-to-fields mapping that keeps the key order of the source document.
/// A repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct MatchDictionary(IndexMap<String, Vec<String>>);

impl MatchDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    pub fn insert(&mut self, key: String, values: Vec<String>) {
        self.0.insert(key, values);
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Vec<String>)> for MatchDictionary {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Both documents from one successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feeds {
    pub records: MatchDictionary,
    pub reference: MatchDictionary,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Records that passed the base filter.
    pub records: MatchDictionary,
    pub reference: MatchDictionary,
    pub league_options: Vec<String>,
    /// Empty means all leagues.
    pub selected_league: String,
    pub hide_old_games: bool,
    pub scroll: usize,
    /// Rows the game list showed on the last render.
    pub page_rows: usize,
    pub loading: bool,
    pub loaded_at: Option<DateTime<Local>>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub viewer: ViewerZone,
    pub stale_after_minutes: i64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            records: MatchDictionary::new(),
            reference: MatchDictionary::new(),
            league_options: Vec::new(),
            selected_league: String::new(),
            hide_old_games: true,
            scroll: 0,
            page_rows: 1,
            loading: false,
            loaded_at: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            viewer: ViewerZone::SystemLocal,
            stale_after_minutes: STALE_AFTER_MINUTES,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self {
            viewer: ViewerZone::detect(config.viewer_tz.as_deref()),
            stale_after_minutes: config.stale_after_minutes,
            ..Self::new()
        }
    }

    /// Replaces both feeds at once and rederives the league list.
    pub fn set_feeds(&mut self, feeds: Feeds) {
        let Feeds { records, reference } = feeds;
        self.records = board::base_filter(&records, &reference);
        self.league_options = board::league_options(&self.records, &reference);
        self.reference = reference;
        if !self.selected_league.is_empty()
            && !self.league_options.contains(&self.selected_league)
        {
            self.selected_league.clear();
        }
        self.scroll = 0;
    }

    pub fn league_label(&self) -> &str {
        if self.selected_league.is_empty() {
            ALL_LEAGUES
        } else {
            &self.selected_league
        }
    }

    /// Steps through "All Leagues" followed by each option, wrapping around.
    pub fn cycle_league_next(&mut self) {
        let total = self.league_options.len() + 1;
        let next = (self.league_position() + 1) % total;
        self.select_league_position(next);
    }

    pub fn cycle_league_prev(&mut self) {
        let total = self.league_options.len() + 1;
        let prev = (self.league_position() + total - 1) % total;
        self.select_league_position(prev);
    }

    fn league_position(&self) -> usize {
        if self.selected_league.is_empty() {
            return 0;
        }
        self.league_options
            .iter()
            .position(|league| *league == self.selected_league)
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    fn select_league_position(&mut self, position: usize) {
        self.selected_league = match position {
            0 => String::new(),
            n => self
                .league_options
                .get(n - 1)
                .cloned()
                .unwrap_or_default(),
        };
        self.scroll = 0;
    }

    pub fn toggle_hide_old_games(&mut self) {
        self.hide_old_games = !self.hide_old_games;
        self.scroll = 0;
    }

    pub fn visible_entries(&self) -> Vec<BoardEntry> {
        self.visible_entries_at(&RenderClock::now(self.viewer, self.stale_after_minutes))
    }

    pub fn visible_entries_at(&self, clock: &RenderClock) -> Vec<BoardEntry> {
        board::display_entries(
            &self.records,
            &self.reference,
            &self.selected_league,
            self.hide_old_games,
            clock,
        )
    }

    /// Scroll stops once the last row is on screen.
    pub fn scroll_down(&mut self, total: usize) {
        if self.scroll < self.max_scroll(total) {
            self.scroll += 1;
        }
    }

    /// Records the list height from a render and pulls `scroll` back into range.
    pub fn set_page_rows(&mut self, rows: usize, total: usize) {
        self.page_rows = rows.max(1);
        self.scroll = self.scroll.min(self.max_scroll(total));
    }

    fn max_scroll(&self, total: usize) -> usize {
        total.saturating_sub(self.page_rows.max(1))
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetFeeds(Feeds),
    LoadFailed(String),
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    LoadFeeds,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetFeeds(feeds) => {
            let total = feeds.records.len();
            let reference = feeds.reference.len();
            state.set_feeds(feeds);
            state.loading = false;
            state.loaded_at = Some(Local::now());
            state.push_log(format!(
                "[INFO] Loaded {total} records, {reference} reference rows, {} shown after base filter",
                state.records.len()
            ));
        }
        Delta::LoadFailed(err) => {
            // Last good feeds stay on screen.
            state.loading = false;
            state.push_log(format!("[WARN] Feed load error: {err}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
