use std::collections::HashMap;

use courtside::cumulative::{align_series, aligned_running_totals, running_totals};
use courtside::flatten::flatten_seasons;
use courtside::prime::{PLACEHOLDER_YEARS, find_prime, find_prime_with_window};
use courtside::row::{EntityIdentity, SeasonRecord, keys};

fn seasons(ratings: &[Option<f64>]) -> Vec<SeasonRecord> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, rating)| {
            let record = SeasonRecord::new(2000 + i as i32);
            match rating {
                Some(r) => record.with_field(keys::RATING, *r),
                None => record,
            }
        })
        .collect()
}

fn awc(values: &[Option<f64>]) -> Vec<SeasonRecord> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let record = SeasonRecord::new(1990 + i as i32);
            match v {
                Some(v) => record.with_field(keys::CUMULATIVE, *v),
                None => record,
            }
        })
        .collect()
}

#[test]
fn prime_keeps_earliest_best_window() {
    let career = seasons(&[2.0, 3.0, 9.0, 9.0, 9.0, 1.0, 1.0].map(Some));
    let prime = find_prime(&career);
    assert_eq!(prime.years, "2000-01–2004-05");
    assert!((prime.mean_rating - 6.4).abs() < 1e-9);
    assert_eq!(prime.seasons.len(), 5);
    assert_eq!(prime.seasons[0].year, 2000);
}

#[test]
fn prime_prefers_earlier_window_on_ties() {
    let career = seasons(&[5.0, 1.0, 1.0, 5.0].map(Some));
    let prime = find_prime_with_window(&career, 2);
    assert_eq!(prime.seasons[0].year, 2000);
    assert!((prime.mean_rating - 3.0).abs() < 1e-9);
}

#[test]
fn short_careers_use_every_season() {
    let career = seasons(&[Some(4.0), None, Some(2.0)]);
    let prime = find_prime(&career);
    assert_eq!(prime.years, "2000-01–2002-03");
    // The missing rating counts as zero but still takes a slot.
    assert!((prime.mean_rating - 2.0).abs() < 1e-9);
}

#[test]
fn empty_career_has_placeholder_prime() {
    let prime = find_prime(&[]);
    assert_eq!(prime.years, PLACEHOLDER_YEARS);
    assert_eq!(prime.mean_rating, 0.0);
    assert!(prime.seasons.is_empty());
}

#[test]
fn running_totals_round_each_step() {
    let career = awc(&[Some(0.04), Some(0.04), None, Some(1.26)]);
    let totals = running_totals(&career, keys::CUMULATIVE);
    assert_eq!(totals, vec![0.0, 0.1, 0.1, 1.3]);
}

#[test]
fn cumulative_alignment_pads_shorter_careers() {
    let a = awc(&[Some(10.0), Some(20.0), Some(5.0)]);
    let b = awc(&[Some(7.0), Some(7.0)]);
    let points = aligned_running_totals(&[a.as_slice(), b.as_slice()], keys::CUMULATIVE);
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].season_index, 1);
    assert_eq!(points[0].values, vec![Some(10.0), Some(7.0)]);
    assert_eq!(points[1].values, vec![Some(30.0), Some(14.0)]);
    assert_eq!(points[2].values, vec![Some(35.0), None]);
}

#[test]
fn aligning_nothing_yields_nothing() {
    assert!(align_series(&[]).is_empty());
    assert!(align_series(&[Vec::new(), Vec::new()]).is_empty());
}

#[test]
fn flattening_emits_one_row_per_season() {
    let with_seasons = EntityIdentity::new("a01", "Alpha", "1", false);
    let without = EntityIdentity::new("b01", "Beta", "2", true);
    let mut map = HashMap::new();
    map.insert(
        "a01".to_string(),
        vec![
            SeasonRecord::new(2002)
                .with_field(keys::RATING, 4.0)
                .with_field(keys::CUMULATIVE, 9.5),
            SeasonRecord::new(2000).with_field(keys::RATING, 1.0),
            SeasonRecord::new(2001),
        ],
    );
    map.insert("zz99".to_string(), vec![SeasonRecord::new(1999)]);

    let flat = flatten_seasons([&with_seasons, &without], &map);
    assert_eq!(flat.rows.len(), 3);
    assert_eq!(flat.orphaned, 1);

    let years: Vec<f64> = flat.rows.iter().filter_map(|r| r.number(keys::YEAR)).collect();
    assert_eq!(years, vec![2000.0, 2001.0, 2002.0]);

    let last = &flat.rows[2];
    assert_eq!(last.identity.name, "Alpha");
    assert_eq!(last.text(keys::BEST_SEASON), Some("2002-03"));
    assert_eq!(last.number(keys::BEST_RATING), Some(4.0));
    assert_eq!(last.number(keys::BEST_CUMULATIVE), Some(9.5));
    assert_eq!(last.row_key(), "a01:2002-03");
    assert!(flat.rows[1].number(keys::BEST_RATING).is_none());
}
