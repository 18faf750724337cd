use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Result, bail};

use courtside::compare::{compare_cumulative, compare_entities};
use courtside::fake_source::FakeRowSource;
use courtside::flatten::flatten_seasons;
use courtside::row::{StatRow, keys};
use courtside::source::{
    FileRowSource, ResolvedSource, RowCollection, RowSource, SeasonType, parse_entity_rows_json,
    parse_season_map_json,
};

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("fixture file should be readable")
}

/// Counts calls and fails on demand.
struct ScriptedSource {
    label: &'static str,
    fail: Rc<Cell<bool>>,
    calls: Rc<Cell<usize>>,
}

impl RowSource for ScriptedSource {
    fn name(&self) -> &str {
        self.label
    }

    fn load(&self, season_type: SeasonType) -> Result<RowCollection> {
        self.calls.set(self.calls.get() + 1);
        if self.fail.get() {
            bail!("{} is down", self.label);
        }
        let mut collection = RowCollection::empty(season_type);
        collection.origin = self.label.to_string();
        Ok(collection)
    }
}

fn scripted(label: &'static str, fail: bool) -> (ScriptedSource, Rc<Cell<bool>>, Rc<Cell<usize>>) {
    let fail = Rc::new(Cell::new(fail));
    let calls = Rc::new(Cell::new(0));
    let source = ScriptedSource {
        label,
        fail: Rc::clone(&fail),
        calls: Rc::clone(&calls),
    };
    (source, fail, calls)
}

#[test]
fn parses_entity_fixture_and_skips_rows_without_identity() {
    let raw = read_fixture("players_regular.json");
    let (rows, skipped) = parse_entity_rows_json(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 4);
    assert_eq!(skipped, 1);

    let jordan = &rows[0];
    assert_eq!(jordan.identity.id, "jordami01");
    assert_eq!(jordan.identity.avatar_ref, "893");
    assert!(!jordan.identity.active);
    assert_eq!(jordan.number(keys::GAMES), Some(1072.0));
    assert_eq!(jordan.text(keys::POSITION), Some("SG"));

    let lebron = &rows[1];
    assert_eq!(lebron.identity.avatar_ref, "2544");
    assert_eq!(lebron.number(keys::ACTIVE), Some(1.0));

    // `cpmi: null` is absent, not zero.
    assert!(rows[2].get(keys::CLUTCH_RATING).is_none());
    // The display name may arrive under the short key.
    assert_eq!(rows[3].identity.name, "Stephen Curry");
}

#[test]
fn rejects_incomplete_identity() {
    let row = serde_json::json!({ "bbref_id": "x", "full_name": "X", "nba_api_id": 1 });
    assert!(StatRow::from_json(&row).is_none());
    let row = serde_json::json!({
        "bbref_id": "",
        "full_name": "X",
        "nba_api_id": 1,
        "is_active": true
    });
    assert!(StatRow::from_json(&row).is_none());
    assert!(parse_entity_rows_json("{\"not\": \"a list\"}").is_err());
    assert_eq!(parse_entity_rows_json("null").expect("null is empty").0.len(), 0);
}

#[test]
fn parses_season_fixture_in_year_order() {
    let (seasons, skipped) =
        parse_season_map_json(&read_fixture("seasons_regular.json")).expect("fixture should parse");
    assert_eq!(skipped, 1);
    let jordan = &seasons["jordami01"];
    let years: Vec<i32> = jordan.iter().map(|s| s.year).collect();
    assert_eq!(years, vec![1984, 1985, 1986]);
    assert_eq!(jordan[0].season, "1984-85");
    assert_eq!(jordan[2].season, "1986-87");
}

#[test]
fn out_of_range_years_are_skipped() {
    let raw = r#"{"x": [{"year": 3e9, "pmi": 1}, {"year": -4, "pmi": 2}, {"year": 1999, "pmi": 3}]}"#;
    let (seasons, skipped) = parse_season_map_json(raw).expect("season json parses");
    assert_eq!(skipped, 2);
    assert_eq!(seasons["x"].len(), 1);
    assert_eq!(seasons["x"][0].season, "1999-00");

    assert_eq!(courtside::row::season_label(i32::MAX), "2147483647-48");
}

#[test]
fn file_source_loads_both_files() {
    let source = FileRowSource::new(fixtures_dir());
    let collection = source.load(SeasonType::Regular).expect("fixtures load");
    assert_eq!(collection.entities.len(), 4);
    assert_eq!(collection.season_row_count(), 7);
    assert_eq!(collection.skipped, 2);
    assert_ne!(collection.version, 0);

    let again = source.load(SeasonType::Regular).expect("fixtures load");
    assert_eq!(collection.version, again.version);

    let flat = flatten_seasons(
        collection.entities.iter().map(|r| &r.identity),
        &collection.seasons,
    );
    // Duncan has no seasons; the ghost has no entity.
    assert_eq!(flat.rows.len(), 6);
    assert_eq!(flat.orphaned, 1);
}

#[test]
fn file_source_fails_without_entity_file() {
    let source = FileRowSource::new(fixtures_dir());
    let err = source
        .load(SeasonType::Playoffs)
        .expect_err("no playoff fixtures");
    assert!(format!("{err:#}").contains("players_playoffs.json"));
}

#[test]
fn resolved_source_falls_back_and_caches() {
    let (primary, _, primary_calls) = scripted("primary", true);
    let (fallback, _, fallback_calls) = scripted("fallback", false);
    let mut source = ResolvedSource::new(Box::new(primary), Box::new(fallback));

    let first = source.resolve(SeasonType::Regular);
    assert_eq!(first.origin, "fallback");
    assert!(!source.availability().is_available());

    // Unavailable primary is not retried, and results are cached per season type.
    source.resolve(SeasonType::Regular);
    source.resolve(SeasonType::Playoffs);
    assert_eq!(primary_calls.get(), 1);
    assert_eq!(fallback_calls.get(), 2);
}

#[test]
fn reset_retries_the_primary() {
    let (primary, primary_fails, primary_calls) = scripted("primary", true);
    let (fallback, _, _) = scripted("fallback", false);
    let mut source = ResolvedSource::new(Box::new(primary), Box::new(fallback));
    assert_eq!(source.resolve(SeasonType::Regular).origin, "fallback");

    primary_fails.set(false);
    source.reset();
    assert!(source.availability().is_available());
    assert_eq!(source.resolve(SeasonType::Regular).origin, "primary");
    assert_eq!(primary_calls.get(), 2);
}

#[test]
fn double_failure_serves_an_empty_collection() {
    let (primary, _, _) = scripted("primary", true);
    let (fallback, _, _) = scripted("fallback", true);
    let mut source = ResolvedSource::new(Box::new(primary), Box::new(fallback));
    let collection = source.resolve(SeasonType::Playoffs);
    assert!(collection.entities.is_empty());
    assert_eq!(collection.season_type, SeasonType::Playoffs);
    assert_eq!(collection.origin, "empty");
}

#[test]
fn fake_league_is_deterministic() {
    let a = FakeRowSource::new(11, 60).load(SeasonType::Regular).expect("loads");
    let b = FakeRowSource::new(11, 60).load(SeasonType::Regular).expect("loads");
    assert_eq!(a.entities.len(), 60);
    assert_eq!(a.version, b.version);
    for (x, y) in a.entities.iter().zip(&b.entities) {
        assert_eq!(x, y);
    }

    let playoffs = FakeRowSource::new(11, 60).load(SeasonType::Playoffs).expect("loads");
    assert!(playoffs.entities.len() <= 60);
    assert_ne!(a.version, playoffs.version);
    assert!(playoffs.entities.iter().all(|r| r.get(keys::CLUTCH_RATING).is_none()));
    for row in &a.entities {
        let seasons = a.seasons_for(&row.identity.id);
        assert!(!seasons.is_empty());
        assert!(seasons.windows(2).all(|w| w[0].year < w[1].year));
    }
}

#[test]
fn compares_two_careers_from_fixtures() {
    let collection = FileRowSource::new(fixtures_dir())
        .load(SeasonType::Regular)
        .expect("fixtures load");
    let cmp = compare_cumulative(&collection, "jordami01", "jamesle01").expect("both known");
    assert_eq!(cmp.left.name, "Michael Jordan");
    assert_eq!(cmp.left.seasons, 3);
    assert_eq!(cmp.left.prime.years, "1984-85–1986-87");
    assert!((cmp.left.prime.mean_rating - 15.5 / 3.0).abs() < 1e-9);
    assert_eq!(cmp.cumulative.len(), 3);
    assert_eq!(cmp.cumulative[2].values, vec![Some(35.0), None]);
    assert_eq!(cmp.cumulative[1].values, vec![Some(30.0), Some(14.0)]);

    let no_seasons = compare_entities(&collection, "duncati01", "curryst01", keys::RATING)
        .expect("both known");
    assert_eq!(no_seasons.left.seasons, 0);
    assert_eq!(no_seasons.cumulative.len(), 1);
    assert_eq!(no_seasons.cumulative[0].values, vec![None, Some(1.2)]);

    assert!(compare_cumulative(&collection, "jordami01", "nobody").is_err());
}
