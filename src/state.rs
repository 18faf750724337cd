use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

use crate::heat::{HeatRanges, HeatTint, cell_tint};
use crate::pagination::PaginationCursor;
use crate::pipeline::Pipeline;
use crate::rankings::{Era, RankedRow, RowFilter, SortDirection};
use crate::registry::{self, ColumnSpec, Tab};
use crate::source::{RowCollection, SeasonType};

const MAX_LOGS: usize = 200;

/// What the presentation layer renders for the current selection.
#[derive(Debug, Clone)]
pub struct TableView {
    pub tab: &'static Tab,
    pub season_type: SeasonType,
    pub sort_key: String,
    pub direction: SortDirection,
    /// Full ranked sequence; only `window()` is meant to be shown.
    pub rows: Arc<Vec<RankedRow>>,
    pub heat: Arc<HeatRanges>,
    pub cursor: PaginationCursor,
}

impl TableView {
    pub fn window(&self) -> &[RankedRow] {
        self.cursor.window(&self.rows)
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    pub fn tint(&self, column: &ColumnSpec, row: &RankedRow) -> Option<HeatTint> {
        cell_tint(&self.heat, column, &row.row)
    }
}

/// One consumer's selection, cursor and memo.
///
/// Any change to the tab, sort or a filter predicate puts the cursor back on the first
/// page; revealing more is the only way the cursor grows.
#[derive(Debug)]
pub struct BrowserState {
    tab: &'static Tab,
    season_type: SeasonType,
    filter: RowFilter,
    sort_key: String,
    sort_dir: SortDirection,
    cursor: PaginationCursor,
    pipeline: Pipeline,
    pub logs: VecDeque<String>,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new(registry::default_tab())
    }
}

impl BrowserState {
    pub fn new(tab: &'static Tab) -> Self {
        Self {
            tab,
            season_type: SeasonType::default(),
            filter: RowFilter::default(),
            sort_key: tab.default_sort.to_string(),
            sort_dir: SortDirection::Desc,
            cursor: PaginationCursor::default(),
            pipeline: Pipeline::new(),
            logs: VecDeque::with_capacity(MAX_LOGS),
        }
    }

    pub fn tab(&self) -> &'static Tab {
        self.tab
    }

    pub fn season_type(&self) -> SeasonType {
        self.season_type
    }

    pub fn filter(&self) -> &RowFilter {
        &self.filter
    }

    pub fn sort(&self) -> (&str, SortDirection) {
        (&self.sort_key, self.sort_dir)
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Switch tab; sort goes back to the tab's default, descending.
    pub fn set_tab(&mut self, tab: &'static Tab) -> bool {
        if self.tab.key == tab.key {
            return false;
        }
        self.tab = tab;
        self.sort_key = tab.default_sort.to_string();
        self.sort_dir = SortDirection::Desc;
        self.reset_cursor(format!("tab -> {}", tab.key));
        true
    }

    /// Same column flips direction; a new column starts descending.
    pub fn toggle_sort(&mut self, key: &str) {
        if self.sort_key == key {
            self.sort_dir = self.sort_dir.toggled();
        } else {
            self.sort_key = key.to_string();
            self.sort_dir = SortDirection::Desc;
        }
        self.reset_cursor(format!("sort -> {} {:?}", self.sort_key, self.sort_dir));
    }

    pub fn set_sort(&mut self, key: &str, direction: SortDirection) -> bool {
        if self.sort_key == key && self.sort_dir == direction {
            return false;
        }
        self.sort_key = key.to_string();
        self.sort_dir = direction;
        self.reset_cursor(format!("sort -> {key} {direction:?}"));
        true
    }

    pub fn set_era(&mut self, era: Era) -> bool {
        if self.filter.era == era {
            return false;
        }
        self.filter.era = era;
        self.reset_cursor(format!("era -> {era:?}"));
        true
    }

    pub fn set_min_games(&mut self, min_games: u32) -> bool {
        if self.filter.min_games == min_games {
            return false;
        }
        self.filter.min_games = min_games;
        self.reset_cursor(format!("min games -> {min_games}"));
        true
    }

    pub fn set_season_type(&mut self, season_type: SeasonType) -> bool {
        if self.season_type == season_type {
            return false;
        }
        self.season_type = season_type;
        self.reset_cursor(format!("season type -> {}", season_type.key()));
        true
    }

    pub fn set_search(&mut self, search: &str) -> bool {
        if self.filter.search == search {
            return false;
        }
        self.filter.search = search.to_string();
        self.reset_cursor(format!("search -> {search:?}"));
        true
    }

    pub fn set_position(&mut self, position: Option<&str>) -> bool {
        let position = position
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        if self.filter.position == position {
            return false;
        }
        self.filter.position = position;
        self.reset_cursor(format!("position -> {:?}", self.filter.position));
        true
    }

    pub fn reveal_more(&mut self) -> usize {
        self.cursor.reveal_more()
    }

    pub fn reveal_all(&mut self) -> usize {
        self.cursor.reveal_all()
    }

    /// Run (or reuse) the pipeline for the current selection over `collection`.
    ///
    /// `collection` should be the one resolved for `season_type()`.
    pub fn view(&mut self, collection: &RowCollection) -> TableView {
        let ranked = self.pipeline.run(
            collection,
            self.tab,
            &self.filter,
            &self.sort_key,
            self.sort_dir,
        );
        self.cursor.sync_total(ranked.rows.len());
        TableView {
            tab: self.tab,
            season_type: self.season_type,
            sort_key: self.sort_key.clone(),
            direction: self.sort_dir,
            rows: ranked.rows,
            heat: ranked.heat,
            cursor: self.cursor,
        }
    }

    fn reset_cursor(&mut self, reason: String) {
        // The next view() supplies the real total.
        self.cursor.reset_unsized();
        debug!("cursor reset: {reason}");
        self.push_log(format!("[INFO] {reason}"));
    }
}
