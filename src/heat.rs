use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::registry::{ColumnSpec, HeatKind, Tab};
use crate::row::StatRow;

/// Opacity of a fully saturated cell.
pub const MAX_HEAT_ALPHA: f64 = 0.28;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatRange {
    pub min: f64,
    pub max: f64,
    pub max_abs: f64,
}

impl HeatRange {
    /// Bounds over the finite values; `None` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut range: Option<HeatRange> = None;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            let r = range.get_or_insert(HeatRange {
                min: v,
                max: v,
                max_abs: v.abs(),
            });
            r.min = r.min.min(v);
            r.max = r.max.max(v);
            r.max_abs = r.max_abs.max(v.abs());
        }
        range
    }
}

/// Per-column bounds keyed by column key. Columns without finite values are absent.
pub type HeatRanges = HashMap<&'static str, HeatRange>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatHue {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatTint {
    pub hue: HeatHue,
    /// 0..=1 distance from the neutral midpoint.
    pub intensity: f64,
    pub alpha: f64,
}

/// Scan the filtered (unsorted) rows once per heat column of the tab.
pub fn compute_heat_ranges(rows: &[Arc<StatRow>], tab: &Tab) -> HeatRanges {
    let mut ranges = HeatRanges::new();
    for (column, _) in tab.heat_columns() {
        if ranges.contains_key(column.key) {
            continue;
        }
        let values = rows.iter().filter_map(|row| row.number(column.key));
        if let Some(range) = HeatRange::from_values(values) {
            ranges.insert(column.key, range);
        }
    }
    ranges
}

/// Map a value onto [0, 1] for the given policy. `None` means "no tint".
pub fn normalize(kind: HeatKind, range: &HeatRange, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let n = match kind {
        HeatKind::Percentile | HeatKind::InvertedPercentile => {
            let span = range.max - range.min;
            if span == 0.0 || !span.is_finite() {
                return None;
            }
            let p = (value - range.min) / span;
            if kind == HeatKind::InvertedPercentile {
                1.0 - p
            } else {
                p
            }
        }
        HeatKind::ZeroCentered => {
            if range.max_abs == 0.0 || !range.max_abs.is_finite() {
                return None;
            }
            (value / range.max_abs + 1.0) / 2.0
        }
    };
    Some(n.clamp(0.0, 1.0))
}

/// Split a normalized value around the midpoint into a hue family and opacity.
pub fn tint_for(normalized: f64) -> HeatTint {
    let n = normalized.clamp(0.0, 1.0);
    let (hue, intensity) = if n >= 0.5 {
        (HeatHue::Positive, (n - 0.5) * 2.0)
    } else {
        (HeatHue::Negative, (0.5 - n) * 2.0)
    };
    HeatTint {
        hue,
        intensity,
        alpha: intensity * MAX_HEAT_ALPHA,
    }
}

pub fn heat_tint(kind: HeatKind, range: &HeatRange, value: f64) -> Option<HeatTint> {
    normalize(kind, range, value).map(tint_for)
}

/// Tint for one cell, or `None` if the column has no heat, no range, or the cell is absent.
pub fn cell_tint(ranges: &HeatRanges, column: &ColumnSpec, row: &StatRow) -> Option<HeatTint> {
    let kind = column.heat?;
    let range = ranges.get(column.key)?;
    let value = row.number(column.key)?;
    heat_tint(kind, range, value)
}
