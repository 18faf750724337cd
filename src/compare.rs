use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::cumulative::{CumulativePoint, aligned_running_totals};
use crate::prime::{PrimeWindow, find_prime};
use crate::row::{EntityIdentity, keys};
use crate::source::RowCollection;

#[derive(Debug, Clone, Serialize)]
pub struct CareerSide {
    pub id: String,
    pub name: String,
    pub seasons: usize,
    pub prime: PrimeWindow,
}

/// Two careers side by side: each prime plus aligned running totals of one field.
#[derive(Debug, Clone, Serialize)]
pub struct CareerComparison {
    pub field: String,
    pub left: CareerSide,
    pub right: CareerSide,
    pub cumulative: Vec<CumulativePoint>,
}

/// Compare two entities of `collection` on `field` (usually the cumulative rating).
///
/// Fails only when an id is unknown; an entity without seasons gets a placeholder prime.
pub fn compare_entities(
    collection: &RowCollection,
    left_id: &str,
    right_id: &str,
    field: &str,
) -> Result<CareerComparison> {
    let left = identity(collection, left_id)?;
    let right = identity(collection, right_id)?;
    let left_seasons = collection.seasons_for(left_id);
    let right_seasons = collection.seasons_for(right_id);

    let careers = [left_seasons.as_slice(), right_seasons.as_slice()];
    let cumulative = aligned_running_totals(&careers, field);
    Ok(CareerComparison {
        field: field.to_string(),
        left: CareerSide {
            id: left.id.clone(),
            name: left.name.clone(),
            seasons: left_seasons.len(),
            prime: find_prime(&left_seasons),
        },
        right: CareerSide {
            id: right.id.clone(),
            name: right.name.clone(),
            seasons: right_seasons.len(),
            prime: find_prime(&right_seasons),
        },
        cumulative,
    })
}

pub fn compare_cumulative(
    collection: &RowCollection,
    left_id: &str,
    right_id: &str,
) -> Result<CareerComparison> {
    compare_entities(collection, left_id, right_id, keys::CUMULATIVE)
}

fn identity<'a>(collection: &'a RowCollection, id: &str) -> Result<&'a EntityIdentity> {
    collection
        .entity(id)
        .map(|row| &row.identity)
        .ok_or_else(|| anyhow!("unknown entity id {id:?} in {} data", collection.season_type.key()))
}
