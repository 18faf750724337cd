use std::sync::Arc;

use tracing::debug;

use crate::flatten::flatten_seasons;
use crate::heat::{HeatRanges, compute_heat_ranges};
use crate::rankings::{Era, RankedRow, RowFilter, SortDirection, filter_rows, sort_and_rank};
use crate::registry::Tab;
use crate::row::StatRow;
use crate::source::{RowCollection, SeasonType};

/// Everything that decides which rows survive filtering, and therefore the heat ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey {
    pub tab: &'static str,
    pub season_type: SeasonType,
    pub era: Era,
    pub min_games: u32,
    pub search: String,
    pub position: Option<String>,
    pub source_version: u64,
}

impl FilterKey {
    pub fn new(
        tab: &Tab,
        season_type: SeasonType,
        filter: &RowFilter,
        source_version: u64,
    ) -> Self {
        Self {
            tab: tab.key,
            season_type,
            era: filter.era,
            min_games: filter.min_games,
            search: filter.search.trim().to_lowercase(),
            position: filter.position.clone(),
            source_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub filter: FilterKey,
    pub sort_key: String,
    pub direction: SortDirection,
}

/// Filtered rows and the heat ranges computed over them, before any sort.
#[derive(Debug, Clone)]
pub struct FilteredSet {
    pub rows: Arc<Vec<Arc<StatRow>>>,
    pub heat: Arc<HeatRanges>,
}

#[derive(Debug, Clone)]
pub struct RankedSet {
    pub rows: Arc<Vec<RankedRow>>,
    pub heat: Arc<HeatRanges>,
}

/// Single-slot memo for the filter/heat pass and for the sort/rank pass.
///
/// A sort-only change reuses the filter slot, so heat is never recomputed for it.
#[derive(Debug, Default)]
pub struct Pipeline {
    filtered: Option<(FilterKey, FilteredSet)>,
    ranked: Option<(ViewKey, Arc<Vec<RankedRow>>)>,
    filter_runs: u64,
    sort_runs: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_runs(&self) -> u64 {
        self.filter_runs
    }

    pub fn sort_runs(&self) -> u64 {
        self.sort_runs
    }

    pub fn run(
        &mut self,
        collection: &RowCollection,
        tab: &Tab,
        filter: &RowFilter,
        sort_key: &str,
        direction: SortDirection,
    ) -> RankedSet {
        let filter_key = FilterKey::new(tab, collection.season_type, filter, collection.version);
        let filtered = self.filtered(collection, tab, filter, &filter_key);

        let view_key = ViewKey {
            filter: filter_key,
            sort_key: sort_key.to_string(),
            direction,
        };
        if let Some((key, rows)) = &self.ranked
            && *key == view_key
        {
            return RankedSet {
                rows: Arc::clone(rows),
                heat: filtered.heat,
            };
        }

        self.sort_runs += 1;
        debug!(
            "ranking {} rows of {} by {sort_key} {direction:?}",
            filtered.rows.len(),
            tab.key
        );
        let rows = Arc::new(sort_and_rank(&filtered.rows, sort_key, direction));
        self.ranked = Some((view_key, Arc::clone(&rows)));
        RankedSet {
            rows,
            heat: filtered.heat,
        }
    }

    fn filtered(
        &mut self,
        collection: &RowCollection,
        tab: &Tab,
        filter: &RowFilter,
        key: &FilterKey,
    ) -> FilteredSet {
        if let Some((cached, set)) = &self.filtered
            && cached == key
        {
            return set.clone();
        }

        self.filter_runs += 1;
        let source_rows = source_rows(collection, tab);
        let rows = filter_rows(&source_rows, tab, filter);
        let heat = compute_heat_ranges(&rows, tab);
        debug!(
            "filtered {} -> {} rows for {}, {} heat columns",
            source_rows.len(),
            rows.len(),
            tab.key,
            heat.len()
        );
        let set = FilteredSet {
            rows: Arc::new(rows),
            heat: Arc::new(heat),
        };
        self.filtered = Some((key.clone(), set.clone()));
        // The ranked slot was derived from the previous filtered set.
        self.ranked = None;
        set
    }
}

/// Entity rows as-is, or one row per season for season-granular tabs.
pub fn source_rows(collection: &RowCollection, tab: &Tab) -> Vec<Arc<StatRow>> {
    if !tab.is_season_granular() {
        return collection.entities.clone();
    }
    let flattened = flatten_seasons(
        collection.entities.iter().map(|row| &row.identity),
        &collection.seasons,
    );
    if flattened.orphaned > 0 {
        debug!("{} season sequences had no matching entity", flattened.orphaned);
    }
    flattened.rows.into_iter().map(Arc::new).collect()
}
