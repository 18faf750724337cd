use std::sync::Arc;

use courtside::heat::{
    HeatHue, HeatRange, MAX_HEAT_ALPHA, cell_tint, compute_heat_ranges, heat_tint, normalize,
    tint_for,
};
use courtside::registry::{self, HeatKind};
use courtside::row::{EntityIdentity, StatRow};

fn player(id: &str) -> StatRow {
    StatRow::new(EntityIdentity::new(id, id, "0", true))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn ranges_cover_only_finite_values() {
    let range = HeatRange::from_values([3.0, f64::NAN, -4.0, 1.0, f64::INFINITY])
        .expect("finite values present");
    assert_eq!(range.min, -4.0);
    assert_eq!(range.max, 3.0);
    assert_eq!(range.max_abs, 4.0);
    assert!(HeatRange::from_values([f64::NAN]).is_none());
}

#[test]
fn normalized_values_stay_in_unit_interval() {
    let range = HeatRange::from_values([-2.0, 0.5, 6.0]).expect("range");
    for kind in [
        HeatKind::Percentile,
        HeatKind::InvertedPercentile,
        HeatKind::ZeroCentered,
    ] {
        for v in [-10.0, -2.0, 0.0, 0.5, 6.0, 40.0] {
            let n = normalize(kind, &range, v).expect("non-degenerate range");
            assert!((0.0..=1.0).contains(&n), "{kind:?} {v} -> {n}");
        }
    }
}

#[test]
fn percentile_kinds_mirror_each_other() {
    let range = HeatRange::from_values([10.0, 30.0]).expect("range");
    let p = normalize(HeatKind::Percentile, &range, 15.0).expect("tint");
    let inv = normalize(HeatKind::InvertedPercentile, &range, 15.0).expect("tint");
    assert!(close(p, 0.25));
    assert!(close(inv, 0.75));
}

#[test]
fn zero_centered_anchors_zero_at_midpoint() {
    let range = HeatRange::from_values([-2.0, 8.0]).expect("range");
    assert!(close(
        normalize(HeatKind::ZeroCentered, &range, 0.0).expect("tint"),
        0.5
    ));
    assert!(close(
        normalize(HeatKind::ZeroCentered, &range, 8.0).expect("tint"),
        1.0
    ));
    assert!(close(
        normalize(HeatKind::ZeroCentered, &range, -4.0).expect("tint"),
        0.25
    ));
}

#[test]
fn degenerate_ranges_produce_no_tint() {
    let flat = HeatRange::from_values([3.0, 3.0, 3.0]).expect("range");
    assert!(normalize(HeatKind::Percentile, &flat, 3.0).is_none());
    assert!(normalize(HeatKind::InvertedPercentile, &flat, 3.0).is_none());
    assert!(normalize(HeatKind::ZeroCentered, &flat, 3.0).is_some());

    let zeros = HeatRange::from_values([0.0, 0.0]).expect("range");
    assert!(heat_tint(HeatKind::ZeroCentered, &zeros, 0.0).is_none());
    assert!(normalize(HeatKind::Percentile, &flat, f64::NAN).is_none());
}

#[test]
fn tint_splits_around_midpoint() {
    let top = tint_for(1.0);
    assert_eq!(top.hue, HeatHue::Positive);
    assert!(close(top.alpha, MAX_HEAT_ALPHA));

    let bottom = tint_for(0.0);
    assert_eq!(bottom.hue, HeatHue::Negative);
    assert!(close(bottom.alpha, MAX_HEAT_ALPHA));

    let mid = tint_for(0.5);
    assert_eq!(mid.alpha, 0.0);

    let quarter = tint_for(0.25);
    assert_eq!(quarter.hue, HeatHue::Negative);
    assert!(close(quarter.intensity, 0.5));
}

#[test]
fn ranges_are_computed_per_heat_column_of_the_tab() {
    let tab = registry::tab("totals").expect("totals tab");
    let rows: Vec<Arc<StatRow>> = vec![
        player("a").with_field("pts", 100.0).with_field("total_tov", 10.0),
        player("b").with_field("pts", 300.0).with_field("total_tov", 50.0),
        player("c").with_field("pts", 200.0),
    ]
    .into_iter()
    .map(Arc::new)
    .collect();

    let ranges = compute_heat_ranges(&rows, tab);
    assert_eq!(ranges["pts"].min, 100.0);
    assert_eq!(ranges["pts"].max, 300.0);
    assert!(!ranges.contains_key("blk"));
    assert!(!ranges.contains_key("gp"), "gp carries no heat in totals");

    let tov = tab.column("total_tov").expect("tov column");
    let careful = cell_tint(&ranges, tov, &rows[0]).expect("tint");
    assert_eq!(careful.hue, HeatHue::Positive, "fewer turnovers read as good");
    assert!(cell_tint(&ranges, tov, &rows[2]).is_none());
}
