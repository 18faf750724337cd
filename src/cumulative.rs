use serde::Serialize;

use crate::row::SeasonRecord;

/// One career-stage step across several entities; `None` once an entity ran out of seasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CumulativePoint {
    /// 1-based season index within each career.
    pub season_index: usize,
    pub values: Vec<Option<f64>>,
}

/// Running total of `field` by season index. A missing value contributes 0.
pub fn running_totals(seasons: &[SeasonRecord], field: &str) -> Vec<f64> {
    let mut total = 0.0;
    seasons
        .iter()
        .map(|season| {
            total += season.number(field).unwrap_or(0.0);
            round1(total)
        })
        .collect()
}

/// Align several running-total series on season index.
///
/// The output is as long as the longest series; shorter series are padded with `None`,
/// never with their last value or zero.
pub fn align_series(series: &[Vec<f64>]) -> Vec<CumulativePoint> {
    let len = series.iter().map(Vec::len).max().unwrap_or(0);
    (0..len)
        .map(|idx| CumulativePoint {
            season_index: idx + 1,
            values: series.iter().map(|s| s.get(idx).copied()).collect(),
        })
        .collect()
}

pub fn aligned_running_totals(careers: &[&[SeasonRecord]], field: &str) -> Vec<CumulativePoint> {
    let series: Vec<Vec<f64>> = careers
        .iter()
        .map(|seasons| running_totals(seasons, field))
        .collect();
    align_series(&series)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
