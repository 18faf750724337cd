use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::row::{SeasonRecord, StatRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonType {
    #[default]
    Regular,
    Playoffs,
}

impl SeasonType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "regular" | "rs" => Some(SeasonType::Regular),
            "playoffs" | "playoff" | "po" => Some(SeasonType::Playoffs),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SeasonType::Regular => "regular",
            SeasonType::Playoffs => "playoffs",
        }
    }
}

/// A fully resolved query result: entity rows plus each entity's season history.
#[derive(Debug, Clone)]
pub struct RowCollection {
    pub season_type: SeasonType,
    pub entities: Vec<Arc<StatRow>>,
    pub seasons: HashMap<String, Vec<SeasonRecord>>,
    /// Changes whenever the underlying data changes; part of the pipeline memo key.
    pub version: u64,
    pub origin: String,
    pub loaded_at: DateTime<Utc>,
    /// Rows dropped for missing identity or year.
    pub skipped: usize,
}

impl RowCollection {
    pub fn empty(season_type: SeasonType) -> Self {
        Self {
            season_type,
            entities: Vec::new(),
            seasons: HashMap::new(),
            version: 0,
            origin: "empty".to_string(),
            loaded_at: Utc::now(),
            skipped: 0,
        }
    }

    pub fn entity(&self, id: &str) -> Option<&Arc<StatRow>> {
        self.entities.iter().find(|row| row.identity.id == id)
    }

    /// Seasons for one entity in ascending year order.
    pub fn seasons_for(&self, id: &str) -> Vec<SeasonRecord> {
        let mut seasons = self.seasons.get(id).cloned().unwrap_or_default();
        seasons.sort_by_key(|s| s.year);
        seasons
    }

    pub fn season_row_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }
}

/// Supplies row collections for a season type. Implementations may fail; callers go
/// through [`ResolvedSource`] so the pipeline only ever sees a resolved collection.
pub trait RowSource {
    fn name(&self) -> &str;
    fn load(&self, season_type: SeasonType) -> Result<RowCollection>;
}

/// Reads the backend's precomputed `players_*.json` / `seasons_*.json` files.
#[derive(Debug, Clone)]
pub struct FileRowSource {
    data_dir: PathBuf,
}

impl FileRowSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn players_path(&self, season_type: SeasonType) -> PathBuf {
        self.data_dir
            .join(format!("players_{}.json", season_type.key()))
    }

    fn seasons_path(&self, season_type: SeasonType) -> PathBuf {
        self.data_dir
            .join(format!("seasons_{}.json", season_type.key()))
    }
}

impl RowSource for FileRowSource {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self, season_type: SeasonType) -> Result<RowCollection> {
        let players_path = self.players_path(season_type);
        let seasons_path = self.seasons_path(season_type);
        let (players_raw, seasons_raw) =
            rayon::join(|| fs::read(&players_path), || fs::read(&seasons_path));

        let players_raw = players_raw
            .with_context(|| format!("read {}", players_path.display()))?;
        // Season history is optional; entity tabs still work without it.
        let seasons_raw = match seasons_raw {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!("no season file at {}: {err}", seasons_path.display());
                b"{}".to_vec()
            }
        };

        let players_text = std::str::from_utf8(&players_raw)
            .with_context(|| format!("decode {}", players_path.display()))?;
        let seasons_text = std::str::from_utf8(&seasons_raw)
            .with_context(|| format!("decode {}", seasons_path.display()))?;

        let (entities, skipped_entities) = parse_entity_rows_json(players_text)
            .with_context(|| format!("parse {}", players_path.display()))?;
        let (seasons, skipped_seasons) = parse_season_map_json(seasons_text)
            .with_context(|| format!("parse {}", seasons_path.display()))?;

        Ok(RowCollection {
            season_type,
            entities: entities.into_iter().map(Arc::new).collect(),
            seasons,
            version: fingerprint(&[players_raw.as_slice(), seasons_raw.as_slice()]),
            origin: format!("file:{}", self.data_dir.display()),
            loaded_at: Utc::now(),
            skipped: skipped_entities + skipped_seasons,
        })
    }
}

/// Parse a JSON array of entity rows. Returns the rows and how many were skipped.
pub fn parse_entity_rows_json(raw: &str) -> Result<(Vec<StatRow>, usize)> {
    let value: Value = serde_json::from_str(raw).context("invalid entity json")?;
    let items = match value {
        Value::Null => return Ok((Vec::new(), 0)),
        Value::Array(items) => items,
        _ => return Err(anyhow!("expected an array of entity rows")),
    };
    let total = items.len();
    let rows: Vec<StatRow> = items.iter().filter_map(StatRow::from_json).collect();
    let skipped = total - rows.len();
    Ok((rows, skipped))
}

/// Parse a JSON object of `{ entity_id: [season, ...] }`.
pub fn parse_season_map_json(raw: &str) -> Result<(HashMap<String, Vec<SeasonRecord>>, usize)> {
    let value: Value = serde_json::from_str(raw).context("invalid season json")?;
    let obj = match value {
        Value::Null => return Ok((HashMap::new(), 0)),
        Value::Object(obj) => obj,
        _ => return Err(anyhow!("expected an object keyed by entity id")),
    };
    let mut skipped = 0usize;
    let mut out = HashMap::with_capacity(obj.len());
    for (id, seasons) in obj {
        let Some(items) = seasons.as_array() else {
            skipped += 1;
            continue;
        };
        let mut records: Vec<SeasonRecord> = Vec::with_capacity(items.len());
        for item in items {
            match SeasonRecord::from_json(item) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }
        records.sort_by_key(|s| s.year);
        out.insert(id, records);
    }
    Ok((out, skipped))
}

fn fingerprint(parts: &[&[u8]]) -> u64 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Whether the primary source is worth asking. Scoped to one [`ResolvedSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendAvailability {
    available: bool,
}

impl Default for BackendAvailability {
    fn default() -> Self {
        Self { available: true }
    }
}

impl BackendAvailability {
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn mark_unavailable(&mut self) {
        self.available = false;
    }

    pub fn reset(&mut self) {
        self.available = true;
    }
}

/// Primary source with a fallback. Never fails: the worst case is an empty collection.
pub struct ResolvedSource {
    primary: Box<dyn RowSource>,
    fallback: Box<dyn RowSource>,
    availability: BackendAvailability,
    cache: HashMap<SeasonType, Arc<RowCollection>>,
}

impl ResolvedSource {
    pub fn new(primary: Box<dyn RowSource>, fallback: Box<dyn RowSource>) -> Self {
        Self {
            primary,
            fallback,
            availability: BackendAvailability::default(),
            cache: HashMap::new(),
        }
    }

    pub fn availability(&self) -> BackendAvailability {
        self.availability
    }

    /// Re-enable the primary source and drop cached collections.
    pub fn reset(&mut self) {
        self.availability.reset();
        self.cache.clear();
    }

    pub fn resolve(&mut self, season_type: SeasonType) -> Arc<RowCollection> {
        if let Some(hit) = self.cache.get(&season_type) {
            return Arc::clone(hit);
        }
        let collection = Arc::new(self.load_uncached(season_type));
        self.cache.insert(season_type, Arc::clone(&collection));
        collection
    }

    fn load_uncached(&mut self, season_type: SeasonType) -> RowCollection {
        if self.availability.is_available() {
            match self.primary.load(season_type) {
                Ok(collection) => {
                    log_loaded(&collection);
                    return collection;
                }
                Err(err) => {
                    warn!(
                        "{} source unavailable, using {}: {err:#}",
                        self.primary.name(),
                        self.fallback.name()
                    );
                    self.availability.mark_unavailable();
                }
            }
        }
        match self.fallback.load(season_type) {
            Ok(collection) => {
                log_loaded(&collection);
                collection
            }
            Err(err) => {
                warn!("{} source failed, serving no rows: {err:#}", self.fallback.name());
                RowCollection::empty(season_type)
            }
        }
    }
}

fn log_loaded(collection: &RowCollection) {
    info!(
        "loaded {} {} entities, {} season rows from {}",
        collection.entities.len(),
        collection.season_type.key(),
        collection.season_row_count(),
        collection.origin
    );
    if collection.skipped > 0 {
        warn!(
            "skipped {} rows without identity or year in {}",
            collection.skipped, collection.origin
        );
    }
}
