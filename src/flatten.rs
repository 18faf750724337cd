use std::collections::{HashMap, HashSet};

use crate::row::{EntityIdentity, SeasonRecord, StatRow, StatValue, keys};

/// Season-granular rows, plus how many season sequences could not be joined to an entity.
#[derive(Debug, Clone, Default)]
pub struct FlattenedSeasons {
    pub rows: Vec<StatRow>,
    pub orphaned: usize,
}

/// Expand per-entity season sequences into one row per (entity, season).
///
/// Rows follow the order of `identities`, then ascending year within an entity.
/// Each row carries the season's own fields, the entity identity, and copies of the
/// season label / rating / offensive rating / cumulative value under the best-season
/// keys so season-granular tabs can share the entity-level columns.
pub fn flatten_seasons<'a>(
    identities: impl IntoIterator<Item = &'a EntityIdentity>,
    seasons: &HashMap<String, Vec<SeasonRecord>>,
) -> FlattenedSeasons {
    let mut out = FlattenedSeasons::default();
    let mut joined: HashSet<&str> = HashSet::new();

    for identity in identities {
        let Some(records) = seasons.get(&identity.id) else {
            continue;
        };
        if !joined.insert(identity.id.as_str()) {
            continue;
        }
        let mut ordered: Vec<&SeasonRecord> = records.iter().collect();
        ordered.sort_by_key(|s| s.year);
        for record in ordered {
            out.rows.push(season_row(identity, record));
        }
    }

    out.orphaned = seasons
        .keys()
        .filter(|id| !joined.contains(id.as_str()))
        .count();
    out
}

fn season_row(identity: &EntityIdentity, record: &SeasonRecord) -> StatRow {
    let mut row = StatRow::new(identity.clone());
    for (key, value) in record.fields() {
        row.insert(key, value.clone());
    }
    row.insert(keys::SEASON, record.season.as_str());
    row.insert(keys::YEAR, i64::from(record.year));
    row.insert(keys::BEST_SEASON, record.season.as_str());

    for (alias, source) in [
        (keys::BEST_RATING, keys::RATING),
        (keys::BEST_OFFENSIVE_RATING, keys::OFFENSIVE_RATING),
        (keys::BEST_CUMULATIVE, keys::CUMULATIVE),
    ] {
        if let Some(v) = record.number(source) {
            row.insert(alias, StatValue::Number(v));
        }
    }
    row
}
