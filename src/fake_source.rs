use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::row::{EntityIdentity, SeasonRecord, StatRow, keys};
use crate::source::{RowCollection, RowSource, SeasonType};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_PLAYERS: usize = 240;

const FIRST_NAMES: &[&str] = &[
    "Marcus", "Darnell", "Tyrese", "Jalen", "Andre", "Kevin", "Luka", "Nikola", "Devin", "Trae",
    "Rasheed", "Kawhi", "Zach", "Malik", "Dejounte", "Shai", "Jaren", "Bam", "Domantas", "Anfernee",
];
const LAST_NAMES: &[&str] = &[
    "Holloway", "Brooks", "Whitfield", "Okafor", "Mercer", "Castellano", "Pruitt", "Vasquez",
    "Lindqvist", "Adebayo", "Ramsey", "Thornton", "Kovac", "Delacroix", "Banks", "Gaines",
    "Ellison", "Marsh", "Petrovic", "Sutton",
];
const POSITIONS: &[&str] = &["PG", "SG", "SF", "PF", "C"];

const LAST_YEAR: i32 = 2024;
// Clutch splits only exist from this season on.
const CLUTCH_FIRST_YEAR: i32 = 1997;
const AWC_PER_MINUTE: f64 = 0.0004;
const LEAGUE_TS: f64 = 0.540;

/// Deterministic synthetic league, used when no backend data is available.
#[derive(Debug, Clone)]
pub struct FakeRowSource {
    seed: u64,
    players: usize,
}

impl Default for FakeRowSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED, DEFAULT_PLAYERS)
    }
}

struct Career {
    identity: EntityIdentity,
    position: &'static str,
    first_year: i32,
    season_count: usize,
    talent: f64,
}

impl FakeRowSource {
    pub fn new(seed: u64, players: usize) -> Self {
        Self { seed, players }
    }

    fn careers(&self) -> Vec<Career> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.players)
            .map(|i| {
                let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
                let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
                let first_year = rng.gen_range(1985..=2020);
                let season_count = rng.gen_range(1..=18usize);
                let last_year = (first_year + season_count as i32 - 1).min(LAST_YEAR);
                let season_count = (last_year - first_year + 1) as usize;
                let identity = EntityIdentity::new(
                    format!("fake{i:04}"),
                    format!("{first} {last}"),
                    (1_600_000 + i).to_string(),
                    last_year >= LAST_YEAR - 1,
                );
                Career {
                    identity,
                    position: POSITIONS[rng.gen_range(0..POSITIONS.len())],
                    first_year,
                    season_count,
                    talent: rng.gen_range(-2.0..5.0),
                }
            })
            .collect()
    }

    fn season_seed(&self, season_type: SeasonType) -> u64 {
        match season_type {
            SeasonType::Regular => self.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15),
            SeasonType::Playoffs => self.seed.wrapping_mul(0xC2B2_AE3D_27D4_EB4F) ^ 1,
        }
    }
}

impl RowSource for FakeRowSource {
    fn name(&self) -> &str {
        "fake"
    }

    fn load(&self, season_type: SeasonType) -> Result<RowCollection> {
        let mut rng = StdRng::seed_from_u64(self.season_seed(season_type));
        let mut entities = Vec::with_capacity(self.players);
        let mut seasons = HashMap::with_capacity(self.players);

        for career in self.careers() {
            let lines: Vec<SeasonRecord> = (0..career.season_count)
                .filter_map(|idx| season_line(&mut rng, &career, idx, season_type))
                .collect();
            if lines.is_empty() {
                continue;
            }
            entities.push(Arc::new(summarize(&mut rng, &career, &lines, season_type)));
            seasons.insert(career.identity.id.clone(), lines);
        }

        Ok(RowCollection {
            season_type,
            entities,
            seasons,
            version: self.season_seed(season_type) ^ self.players as u64,
            origin: format!("fake:{}x{}", self.seed, self.players),
            loaded_at: Utc::now(),
            skipped: 0,
        })
    }
}

fn season_line(
    rng: &mut StdRng,
    career: &Career,
    idx: usize,
    season_type: SeasonType,
) -> Option<SeasonRecord> {
    let playoffs = season_type == SeasonType::Playoffs;
    if playoffs && !rng.gen_bool(0.5) {
        return None;
    }
    let year = career.first_year + idx as i32;

    // Rises to a peak around 40% of the career, then declines.
    let peak = career.season_count as f64 * 0.4;
    let spread = (career.season_count as f64).max(1.0);
    let arc = 1.0 - ((idx as f64 - peak) / spread * 2.0).powi(2) * 0.6;

    let gp: i64 = if playoffs {
        rng.gen_range(4..=24)
    } else {
        rng.gen_range(20..=82)
    };
    let mpg = (rng.gen_range(12.0..36.0) * arc.max(0.4)).clamp(6.0, 42.0);
    let pmi = career.talent * arc + rng.gen_range(-0.8..0.8);
    let opmi = pmi * rng.gen_range(0.4..0.8);
    let fg_pct = rng.gen_range(0.40..0.55);
    let ts_pct = fg_pct + rng.gen_range(0.04..0.10);
    let awc = pmi * gp as f64 * mpg * AWC_PER_MINUTE;

    Some(
        SeasonRecord::new(year)
            .with_field(keys::GAMES, gp)
            .with_field("mpg", round_to(mpg, 1))
            .with_field("ppg", round_to(mpg * rng.gen_range(0.3..0.8), 1))
            .with_field("rpg", round_to(mpg * rng.gen_range(0.1..0.35), 1))
            .with_field("apg", round_to(mpg * rng.gen_range(0.05..0.3), 1))
            .with_field("spg", round_to(rng.gen_range(0.3..2.0), 1))
            .with_field("bpg", round_to(rng.gen_range(0.1..2.2), 1))
            .with_field("tov", round_to(rng.gen_range(0.5..3.5), 1))
            .with_field("fg_pct", round_to(fg_pct, 4))
            .with_field("ts_pct", round_to(ts_pct, 4))
            .with_field(keys::RATING, round_to(pmi, 2))
            .with_field(keys::OFFENSIVE_RATING, round_to(opmi, 2))
            .with_field(keys::DEFENSIVE_RATING, round_to(pmi - opmi, 2))
            .with_field(keys::CUMULATIVE, round_to(awc, 1)),
    )
}

fn summarize(
    rng: &mut StdRng,
    career: &Career,
    lines: &[SeasonRecord],
    season_type: SeasonType,
) -> StatRow {
    let games = |s: &SeasonRecord| s.number(keys::GAMES).unwrap_or(0.0);
    let total_games: f64 = lines.iter().map(games).sum();
    let weighted = |key: &str| -> f64 {
        if total_games <= 0.0 {
            return 0.0;
        }
        lines
            .iter()
            .map(|s| s.number(key).unwrap_or(0.0) * games(s))
            .sum::<f64>()
            / total_games
    };
    let total = |key: &str| -> f64 {
        lines
            .iter()
            .map(|s| (s.number(key).unwrap_or(0.0) * games(s)).round())
            .sum()
    };
    let minutes = total("mpg");

    let pmi = weighted(keys::RATING);
    let opmi = weighted(keys::OFFENSIVE_RATING);
    let dpmi = weighted(keys::DEFENSIVE_RATING);
    let ts = weighted("ts_pct");

    let first = lines.first().map_or(career.first_year, |s| s.year);
    let last = lines.last().map_or(career.first_year, |s| s.year);
    let years = if career.identity.active {
        format!("{first}-pres.")
    } else {
        format!("{first}-{}", last + 1)
    };

    let mut row = StatRow::new(career.identity.clone())
        .with_field(keys::POSITION, career.position)
        .with_field("years", years)
        .with_field(keys::GAMES, total_games)
        .with_field("seasons", lines.len() as i64)
        .with_field("ppg", round_to(weighted("ppg"), 1))
        .with_field("rpg", round_to(weighted("rpg"), 1))
        .with_field("apg", round_to(weighted("apg"), 1))
        .with_field("spg", round_to(weighted("spg"), 1))
        .with_field("bpg", round_to(weighted("bpg"), 1))
        .with_field("fg_pct", round_to(weighted("fg_pct"), 4))
        .with_field("ts_pct", round_to(ts, 4))
        .with_field("rts_pct", round_to(ts - LEAGUE_TS, 4))
        .with_field(keys::RATING, round_to(pmi, 2))
        .with_field(keys::OFFENSIVE_RATING, round_to(opmi, 2))
        .with_field(keys::DEFENSIVE_RATING, round_to(dpmi, 2))
        .with_field(keys::CUMULATIVE, round_to(pmi * minutes * AWC_PER_MINUTE, 1))
        .with_field("oawc", round_to(opmi * minutes * AWC_PER_MINUTE, 1))
        .with_field("dawc", round_to(dpmi * minutes * AWC_PER_MINUTE, 1))
        .with_field("min", minutes)
        .with_field("pts", total("ppg"))
        .with_field("reb", total("rpg"))
        .with_field("ast", total("apg"))
        .with_field("stl", total("spg"))
        .with_field("blk", total("bpg"))
        .with_field("total_tov", total("tov"));

    let peak = lines.iter().fold(None::<&SeasonRecord>, |best, s| match best {
        Some(b) if b.rating().unwrap_or(f64::MIN) >= s.rating().unwrap_or(f64::MIN) => Some(b),
        _ => Some(s),
    });
    if let Some(peak) = peak {
        row.insert(keys::BEST_SEASON, peak.season.clone());
        if let Some(rating) = peak.rating() {
            row.insert(keys::BEST_RATING, rating);
        }
    }

    if season_type == SeasonType::Regular && last >= CLUTCH_FIRST_YEAR {
        row.insert(keys::CLUTCH_RATING, round_to(pmi + rng.gen_range(-1.5..1.5), 2));
        row.insert("clutch_gp", rng.gen_range(5..=(total_games as i64).max(5)));
        row.insert("clutch_pts", round_to(rng.gen_range(0.5..6.0), 1));
        row.insert("clutch_reb", round_to(rng.gen_range(0.2..2.5), 1));
        row.insert("clutch_ast", round_to(rng.gen_range(0.1..2.0), 1));
        row.insert("clutch_stl", round_to(rng.gen_range(0.0..0.6), 1));
        row.insert("clutch_blk", round_to(rng.gen_range(0.0..0.6), 1));
        row.insert("clutch_fg_pct", round_to(rng.gen_range(0.35..0.52), 4));
        row.insert("clutch_plus_minus", round_to(rng.gen_range(-2.0..2.0), 2));
        row.insert("clutch_w_pct", round_to(rng.gen_range(0.3..0.7), 4));
    }
    row
}

fn round_to(v: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (v * scale).round() / scale
}
