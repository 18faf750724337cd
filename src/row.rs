use std::collections::HashMap;

use serde_json::{Map, Value};

/// Field names shared by entity rows, season records and the tab registry.
pub mod keys {
    pub const ID: &str = "bbref_id";
    pub const NAME: &str = "full_name";
    pub const NAME_ALIAS: &str = "name";
    pub const AVATAR: &str = "nba_api_id";
    pub const ACTIVE: &str = "is_active";

    pub const POSITION: &str = "position";
    pub const GAMES: &str = "gp";
    pub const SEASON: &str = "season";
    pub const YEAR: &str = "year";

    pub const RATING: &str = "pmi";
    pub const OFFENSIVE_RATING: &str = "opmi";
    pub const DEFENSIVE_RATING: &str = "dpmi";
    pub const CUMULATIVE: &str = "awc";
    pub const CLUTCH_RATING: &str = "cpmi";

    // Season-granular rows reuse the career "best season" columns.
    pub const BEST_SEASON: &str = "peak_season";
    pub const BEST_RATING: &str = "peak_pmi";
    pub const BEST_OFFENSIVE_RATING: &str = "peak_opmi";
    pub const BEST_CUMULATIVE: &str = "peak_awc";
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Number(v)
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Number(v as f64)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

/// Borrowed view of a single cell. Absent cells are `None` at the accessor level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> FieldValue<'a> {
    /// Numeric coercion. Non-finite numbers and unparseable text are absent.
    pub fn as_number(&self) -> Option<f64> {
        let v = match self {
            FieldValue::Number(v) => *v,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            FieldValue::Text(s) => Some(*s),
            FieldValue::Number(_) => None,
        }
    }
}

impl<'a> From<&'a StatValue> for FieldValue<'a> {
    fn from(v: &'a StatValue) -> Self {
        match v {
            StatValue::Number(n) => FieldValue::Number(*n),
            StatValue::Text(s) => FieldValue::Text(s.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityIdentity {
    pub id: String,
    pub name: String,
    pub avatar_ref: String,
    pub active: bool,
}

impl EntityIdentity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        avatar_ref: impl Into<String>,
        active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar_ref: avatar_ref.into(),
            active,
        }
    }

    fn from_json(obj: &Map<String, Value>) -> Option<Self> {
        let id = non_empty_str(obj.get(keys::ID))?;
        let name = non_empty_str(obj.get(keys::NAME))
            .or_else(|| non_empty_str(obj.get(keys::NAME_ALIAS)))?;
        let avatar_ref = match obj.get(keys::AVATAR)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return None,
        };
        let active = obj.get(keys::ACTIVE)?.as_bool()?;
        Some(Self {
            id: id.to_string(),
            name: name.to_string(),
            avatar_ref,
            active,
        })
    }
}

/// One entity-level (or flattened season-level) row: identity plus a flat field map.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub identity: EntityIdentity,
    fields: HashMap<String, StatValue>,
}

impl StatRow {
    pub fn new(identity: EntityIdentity) -> Self {
        Self {
            identity,
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<StatValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get-or-absent accessor. Identity fields resolve like any other field.
    pub fn get(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            keys::ID => Some(FieldValue::Text(&self.identity.id)),
            keys::NAME | keys::NAME_ALIAS => Some(FieldValue::Text(&self.identity.name)),
            keys::AVATAR => Some(FieldValue::Text(&self.identity.avatar_ref)),
            keys::ACTIVE => Some(FieldValue::Number(f64::from(u8::from(self.identity.active)))),
            _ => self.fields.get(key).map(FieldValue::from),
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_number())
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_text())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Unique per row: the entity id, suffixed with the season label for flattened rows.
    pub fn row_key(&self) -> String {
        match self.text(keys::SEASON) {
            Some(season) => format!("{}:{}", self.identity.id, season),
            None => self.identity.id.clone(),
        }
    }

    /// Parse one row object. Rows missing any identity field yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let identity = EntityIdentity::from_json(obj)?;
        let mut row = StatRow::new(identity);
        for (key, raw) in obj {
            if matches!(
                key.as_str(),
                keys::ID | keys::NAME | keys::NAME_ALIAS | keys::AVATAR | keys::ACTIVE
            ) {
                continue;
            }
            if let Some(v) = stat_value_from_json(raw) {
                row.fields.insert(key.clone(), v);
            }
        }
        Some(row)
    }
}

/// One (entity, season) observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonRecord {
    pub year: i32,
    pub season: String,
    fields: HashMap<String, StatValue>,
}

impl SeasonRecord {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            season: season_label(year),
            fields: HashMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<StatValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<FieldValue<'_>> {
        match key {
            keys::SEASON => Some(FieldValue::Text(&self.season)),
            keys::YEAR => Some(FieldValue::Number(self.year as f64)),
            _ => self.fields.get(key).map(FieldValue::from),
        }
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_number())
    }

    pub fn rating(&self) -> Option<f64> {
        self.number(keys::RATING)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse one season object. A record without a usable year cannot be ordered and is dropped.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let year = obj
            .get(keys::YEAR)
            .and_then(Value::as_f64)
            .filter(|y| YEAR_RANGE.contains(y))? as i32;
        let mut record = SeasonRecord::new(year);
        if let Some(label) = non_empty_str(obj.get(keys::SEASON)) {
            record.season = label.to_string();
        }
        for (key, raw) in obj {
            if key == keys::YEAR || key == keys::SEASON {
                continue;
            }
            if let Some(v) = stat_value_from_json(raw) {
                record.fields.insert(key.clone(), v);
            }
        }
        Some(record)
    }
}

/// Season start years accepted from row sources.
const YEAR_RANGE: std::ops::RangeInclusive<f64> = 1.0..=9999.0;

/// `2023` → `"2023-24"`.
pub fn season_label(year: i32) -> String {
    format!("{}-{:02}", year, (i64::from(year) + 1).rem_euclid(100))
}

fn stat_value_from_json(raw: &Value) -> Option<StatValue> {
    match raw {
        Value::Number(n) => n.as_f64().map(StatValue::Number),
        Value::String(s) => Some(StatValue::Text(s.clone())),
        Value::Bool(b) => Some(StatValue::Number(if *b { 1.0 } else { 0.0 })),
        _ => None,
    }
}

fn non_empty_str(raw: Option<&Value>) -> Option<&str> {
    raw.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
