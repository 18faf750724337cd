use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::Tab;
use crate::row::{FieldValue, StatRow, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Era {
    #[default]
    All,
    Active,
    Retired,
}

impl Era {
    pub fn admits(self, active: bool) -> bool {
        match self {
            Era::All => true,
            Era::Active => active,
            Era::Retired => !active,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Era::All),
            "active" => Some(Era::Active),
            "retired" => Some(Era::Retired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Row predicates applied before sorting. The tab's own predicate comes from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowFilter {
    pub era: Era,
    /// Minimum games played; ignored on season-granular tabs.
    pub min_games: u32,
    /// Case-insensitive substring on the display name. Empty matches everything.
    pub search: String,
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub rank: usize,
    pub row: Arc<StatRow>,
}

/// Filter, stably sort and rank rows for one tab.
///
/// The result is the full sequence; pagination only ever takes a prefix of it.
pub fn rank_rows(
    rows: &[Arc<StatRow>],
    tab: &Tab,
    filter: &RowFilter,
    sort_key: &str,
    direction: SortDirection,
) -> Vec<RankedRow> {
    let filtered = filter_rows(rows, tab, filter);
    sort_and_rank(&filtered, sort_key, direction)
}

pub fn filter_rows(rows: &[Arc<StatRow>], tab: &Tab, filter: &RowFilter) -> Vec<Arc<StatRow>> {
    let query = filter.search.trim().to_lowercase();
    let position = filter
        .position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case("all"));
    let min_games = if tab.is_season_granular() {
        0.0
    } else {
        f64::from(filter.min_games)
    };

    rows.iter()
        .filter(|row| filter.era.admits(row.identity.active))
        .filter(|row| min_games <= 0.0 || row.number(keys::GAMES).unwrap_or(0.0) >= min_games)
        .filter(|row| tab.requires.is_none_or(|key| is_present(row, key)))
        .filter(|row| query.is_empty() || row.identity.name.to_lowercase().contains(&query))
        .filter(|row| {
            position.is_none_or(|p| {
                row.text(keys::POSITION)
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case(p))
            })
        })
        .cloned()
        .collect()
}

/// Stable sort with absent values last in either direction, then dense 1-based ranks.
pub fn sort_and_rank(
    rows: &[Arc<StatRow>],
    sort_key: &str,
    direction: SortDirection,
) -> Vec<RankedRow> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    match sort_column(rows, sort_key) {
        SortColumn::Text(values) => order.sort_by(|&a, &b| {
            missing_last(values[a], values[b], direction, |x, y| x.cmp(y))
        }),
        SortColumn::Number(values) => order.sort_by(|&a, &b| {
            missing_last(values[a], values[b], direction, |x, y| x.total_cmp(y))
        }),
    }

    order
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| RankedRow {
            rank: pos + 1,
            row: Arc::clone(&rows[idx]),
        })
        .collect()
}

/// One column's sort values, all of a single kind.
enum SortColumn<'a> {
    Text(Vec<Option<&'a str>>),
    Number(Vec<Option<f64>>),
}

// A column whose present values are all strings sorts lexically; anything else is
// coerced to numbers, and values that do not coerce sort with the missing ones.
fn sort_column<'a>(rows: &'a [Arc<StatRow>], key: &str) -> SortColumn<'a> {
    let all_text = rows
        .iter()
        .filter_map(|r| r.get(key))
        .all(|v| matches!(v, FieldValue::Text(_)));

    if all_text {
        SortColumn::Text(rows.iter().map(|row| row.text(key)).collect())
    } else {
        SortColumn::Number(
            rows.iter()
                .map(|row| row.get(key).and_then(|v| v.as_number()))
                .collect(),
        )
    }
}

fn missing_last<T>(
    a: Option<T>,
    b: Option<T>,
    direction: SortDirection,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => direction.apply(cmp(&x, &y)),
    }
}

fn is_present(row: &StatRow, key: &str) -> bool {
    match row.get(key) {
        Some(FieldValue::Text(_)) => true,
        Some(v) => v.as_number().is_some(),
        None => false,
    }
}

/// Default and maximum size of a leaders list.
pub const LEADERS_DEFAULT: usize = 5;
pub const LEADERS_MAX: usize = 20;

/// Top rows for one stat, highest first. Rows without the stat are left out.
pub fn leaders(rows: &[Arc<StatRow>], stat: &str, limit: usize) -> Vec<RankedRow> {
    let present: Vec<Arc<StatRow>> = rows
        .iter()
        .filter(|row| is_present(row, stat))
        .cloned()
        .collect();
    let mut ranked = sort_and_rank(&present, stat, SortDirection::Desc);
    ranked.truncate(limit.clamp(1, LEADERS_MAX));
    ranked
}
