use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::row::keys;

use self::FormatKind as F;
use self::HeatKind as H;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Integer,
    OneDecimal,
    TwoDecimal,
    PercentOneDecimal,
    SignedPercentage,
    SignedRating,
    ThousandsGrouped,
    CumulativeOneDecimal,
    Verbatim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatKind {
    Percentile,
    /// Lower is better.
    InvertedPercentile,
    /// Signed metrics anchored at zero.
    ZeroCentered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Entity,
    Season,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub format: FormatKind,
    pub heat: Option<HeatKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnGroup {
    pub label: &'static str,
    pub columns: &'static [ColumnSpec],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub key: &'static str,
    pub label: &'static str,
    pub granularity: Granularity,
    pub groups: &'static [ColumnGroup],
    pub default_sort: &'static str,
    /// Rows lacking this field are excluded from the tab.
    pub requires: Option<&'static str>,
}

impl Tab {
    pub fn columns(&self) -> impl Iterator<Item = &'static ColumnSpec> {
        self.groups.iter().flat_map(|g| g.columns.iter())
    }

    pub fn heat_columns(&self) -> impl Iterator<Item = (&'static ColumnSpec, HeatKind)> {
        self.columns().filter_map(|c| c.heat.map(|h| (c, h)))
    }

    pub fn column(&self, key: &str) -> Option<&'static ColumnSpec> {
        self.columns().find(|c| c.key == key)
    }

    pub fn is_season_granular(&self) -> bool {
        self.granularity == Granularity::Season
    }
}

const fn col(
    key: &'static str,
    label: &'static str,
    format: FormatKind,
    heat: Option<HeatKind>,
) -> ColumnSpec {
    ColumnSpec {
        key,
        label,
        format,
        heat,
    }
}

const PLAYER: ColumnSpec = col(keys::NAME, "Player", F::Verbatim, None);
const YEARS: ColumnSpec = col("years", "Years", F::Verbatim, None);
const GAMES: ColumnSpec = col(keys::GAMES, "GP", F::Integer, None);
const SEASONS: ColumnSpec = col("seasons", "Szn", F::Integer, None);

const PMI: ColumnSpec = col(keys::RATING, "PMI", F::SignedRating, Some(H::ZeroCentered));
const OPMI: ColumnSpec =
    col(keys::OFFENSIVE_RATING, "oPMI", F::SignedRating, Some(H::ZeroCentered));
const DPMI: ColumnSpec =
    col(keys::DEFENSIVE_RATING, "dPMI", F::SignedRating, Some(H::ZeroCentered));
const AWC: ColumnSpec =
    col(keys::CUMULATIVE, "AWC", F::CumulativeOneDecimal, Some(H::Percentile));

static PER_GAME_GROUPS: &[ColumnGroup] = &[
    ColumnGroup {
        label: "Player",
        columns: &[PLAYER, YEARS, GAMES],
    },
    ColumnGroup {
        label: "Box",
        columns: &[
            col("ppg", "PTS", F::OneDecimal, Some(H::Percentile)),
            col("rpg", "REB", F::OneDecimal, Some(H::Percentile)),
            col("apg", "AST", F::OneDecimal, Some(H::Percentile)),
            col("spg", "STL", F::OneDecimal, Some(H::Percentile)),
            col("bpg", "BLK", F::OneDecimal, Some(H::Percentile)),
        ],
    },
    ColumnGroup {
        label: "Efficiency",
        columns: &[
            col("fg_pct", "FG%", F::PercentOneDecimal, Some(H::Percentile)),
            col("ts_pct", "TS%", F::PercentOneDecimal, Some(H::Percentile)),
            col("rts_pct", "rTS%", F::SignedPercentage, Some(H::ZeroCentered)),
        ],
    },
    ColumnGroup {
        label: "Impact",
        columns: &[PMI, OPMI, DPMI],
    },
];

static TOTALS_GROUPS: &[ColumnGroup] = &[
    ColumnGroup {
        label: "Player",
        columns: &[PLAYER, YEARS, SEASONS, GAMES],
    },
    ColumnGroup {
        label: "Totals",
        columns: &[
            col("min", "MIN", F::ThousandsGrouped, Some(H::Percentile)),
            col("pts", "PTS", F::ThousandsGrouped, Some(H::Percentile)),
            col("reb", "REB", F::ThousandsGrouped, Some(H::Percentile)),
            col("ast", "AST", F::ThousandsGrouped, Some(H::Percentile)),
            col("stl", "STL", F::ThousandsGrouped, Some(H::Percentile)),
            col("blk", "BLK", F::ThousandsGrouped, Some(H::Percentile)),
            col("total_tov", "TOV", F::ThousandsGrouped, Some(H::InvertedPercentile)),
        ],
    },
    ColumnGroup {
        label: "Value",
        columns: &[
            AWC,
            col("oawc", "oAWC", F::CumulativeOneDecimal, Some(H::Percentile)),
            col("dawc", "dAWC", F::CumulativeOneDecimal, Some(H::Percentile)),
        ],
    },
];

static CLUTCH_GROUPS: &[ColumnGroup] = &[
    ColumnGroup {
        label: "Player",
        columns: &[PLAYER, YEARS, col("clutch_gp", "Clutch GP", F::Integer, None)],
    },
    ColumnGroup {
        label: "Clutch",
        columns: &[
            col("clutch_pts", "PTS", F::OneDecimal, Some(H::Percentile)),
            col("clutch_reb", "REB", F::OneDecimal, Some(H::Percentile)),
            col("clutch_ast", "AST", F::OneDecimal, Some(H::Percentile)),
            col("clutch_stl", "STL", F::OneDecimal, Some(H::Percentile)),
            col("clutch_blk", "BLK", F::OneDecimal, Some(H::Percentile)),
            col("clutch_fg_pct", "FG%", F::PercentOneDecimal, Some(H::Percentile)),
            col("clutch_plus_minus", "+/-", F::SignedRating, Some(H::ZeroCentered)),
            col("clutch_w_pct", "W%", F::PercentOneDecimal, Some(H::Percentile)),
        ],
    },
    ColumnGroup {
        label: "Rating",
        columns: &[
            col(keys::CLUTCH_RATING, "cPMI", F::SignedRating, Some(H::ZeroCentered)),
            PMI,
        ],
    },
];

static BEST_SEASON_GROUPS: &[ColumnGroup] = &[
    ColumnGroup {
        label: "Player",
        columns: &[
            PLAYER,
            col(keys::BEST_SEASON, "Season", F::Verbatim, None),
            GAMES,
        ],
    },
    ColumnGroup {
        label: "Season line",
        columns: &[
            col("mpg", "MIN", F::OneDecimal, None),
            col("ppg", "PTS", F::OneDecimal, Some(H::Percentile)),
            col("rpg", "REB", F::OneDecimal, Some(H::Percentile)),
            col("apg", "AST", F::OneDecimal, Some(H::Percentile)),
            col("spg", "STL", F::OneDecimal, Some(H::Percentile)),
            col("bpg", "BLK", F::OneDecimal, Some(H::Percentile)),
            col("ts_pct", "TS%", F::PercentOneDecimal, Some(H::Percentile)),
        ],
    },
    ColumnGroup {
        label: "Rating",
        columns: &[
            col(keys::BEST_RATING, "PMI", F::SignedRating, Some(H::ZeroCentered)),
            col(keys::BEST_OFFENSIVE_RATING, "oPMI", F::SignedRating, Some(H::ZeroCentered)),
            DPMI,
            col(keys::BEST_CUMULATIVE, "AWC", F::CumulativeOneDecimal, Some(H::Percentile)),
        ],
    },
];

static CAREER_VALUE_GROUPS: &[ColumnGroup] = &[
    ColumnGroup {
        label: "Player",
        columns: &[PLAYER, YEARS, SEASONS],
    },
    ColumnGroup {
        label: "Career value",
        columns: &[
            AWC,
            col("oawc", "oAWC", F::CumulativeOneDecimal, Some(H::Percentile)),
            col("dawc", "dAWC", F::CumulativeOneDecimal, Some(H::Percentile)),
        ],
    },
    ColumnGroup {
        label: "Peak",
        columns: &[
            PMI,
            col(keys::BEST_RATING, "Peak PMI", F::TwoDecimal, Some(H::Percentile)),
            col(keys::BEST_SEASON, "Peak Season", F::Verbatim, None),
        ],
    },
];

/// Every browsable view, in display order. Adding a view only needs a new entry here.
pub static TABS: &[Tab] = &[
    Tab {
        key: "per_game",
        label: "Per Game",
        granularity: Granularity::Entity,
        groups: PER_GAME_GROUPS,
        default_sort: keys::RATING,
        requires: None,
    },
    Tab {
        key: "totals",
        label: "Totals",
        granularity: Granularity::Entity,
        groups: TOTALS_GROUPS,
        default_sort: "pts",
        requires: None,
    },
    Tab {
        key: "clutch",
        label: "Clutch",
        granularity: Granularity::Entity,
        groups: CLUTCH_GROUPS,
        default_sort: keys::CLUTCH_RATING,
        requires: Some(keys::CLUTCH_RATING),
    },
    Tab {
        key: "best_seasons",
        label: "Best Seasons",
        granularity: Granularity::Season,
        groups: BEST_SEASON_GROUPS,
        default_sort: keys::BEST_RATING,
        requires: None,
    },
    Tab {
        key: "career_value",
        label: "Career Value",
        granularity: Granularity::Entity,
        groups: CAREER_VALUE_GROUPS,
        default_sort: keys::CUMULATIVE,
        requires: None,
    },
];

static TAB_INDEX: Lazy<HashMap<&'static str, &'static Tab>> =
    Lazy::new(|| TABS.iter().map(|t| (t.key, t)).collect());

pub fn tab(key: &str) -> Option<&'static Tab> {
    TAB_INDEX.get(key).copied()
}

pub fn default_tab() -> &'static Tab {
    &TABS[0]
}
