use serde::Serialize;

use crate::row::SeasonRecord;

/// Number of consecutive seasons that make up a prime.
pub const PRIME_WINDOW: usize = 5;

pub const PLACEHOLDER_YEARS: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimeWindow {
    /// `"first–last"` season labels.
    pub years: String,
    pub mean_rating: f64,
    #[serde(skip)]
    pub seasons: Vec<SeasonRecord>,
}

impl PrimeWindow {
    fn empty() -> Self {
        Self {
            years: PLACEHOLDER_YEARS.to_string(),
            mean_rating: 0.0,
            seasons: Vec::new(),
        }
    }
}

pub fn find_prime(seasons: &[SeasonRecord]) -> PrimeWindow {
    find_prime_with_window(seasons, PRIME_WINDOW)
}

/// Best contiguous run of `window` seasons by mean rating.
///
/// `seasons` must be in ascending year order. A missing rating counts as 0 but still
/// occupies a slot in the denominator. Ties keep the earliest window.
pub fn find_prime_with_window(seasons: &[SeasonRecord], window: usize) -> PrimeWindow {
    let window = window.max(1);
    if seasons.is_empty() {
        return PrimeWindow::empty();
    }
    if seasons.len() <= window {
        return build_window(seasons);
    }

    let mut best_start = 0usize;
    let mut best_mean = mean_rating(&seasons[..window]);
    for start in 1..=(seasons.len() - window) {
        let mean = mean_rating(&seasons[start..start + window]);
        if mean > best_mean {
            best_mean = mean;
            best_start = start;
        }
    }
    build_window(&seasons[best_start..best_start + window])
}

fn build_window(members: &[SeasonRecord]) -> PrimeWindow {
    let (Some(first), Some(last)) = (members.first(), members.last()) else {
        return PrimeWindow::empty();
    };
    PrimeWindow {
        years: format!("{}–{}", first.season, last.season),
        mean_rating: mean_rating(members),
        seasons: members.to_vec(),
    }
}

fn mean_rating(members: &[SeasonRecord]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let sum: f64 = members.iter().map(|s| s.rating().unwrap_or(0.0)).sum();
    sum / members.len() as f64
}
