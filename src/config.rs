use std::env;
use std::path::PathBuf;

use crate::fake_source::{DEFAULT_PLAYERS, DEFAULT_SEED};
use crate::rankings::Era;
use crate::registry::{self, Tab};
use crate::source::SeasonType;

/// Runtime settings read from `COURTSIDE_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `players_*.json` / `seasons_*.json`. `None` serves the fake league.
    pub data_dir: Option<PathBuf>,
    pub season_type: SeasonType,
    pub tab: &'static Tab,
    pub era: Era,
    pub min_games: u32,
    pub log_level: String,
    pub fake_seed: u64,
    pub fake_players: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            season_type: SeasonType::Regular,
            tab: registry::default_tab(),
            era: Era::All,
            min_games: 0,
            log_level: "warn".to_string(),
            fake_seed: DEFAULT_SEED,
            fake_players: DEFAULT_PLAYERS,
        }
    }
}

impl AppConfig {
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_dir: env::var("COURTSIDE_DATA_DIR")
                .ok()
                .map(|val| val.trim().to_string())
                .filter(|val| !val.is_empty())
                .map(PathBuf::from),
            season_type: env::var("COURTSIDE_SEASON_TYPE")
                .ok()
                .and_then(|val| SeasonType::parse(&val))
                .unwrap_or(defaults.season_type),
            tab: env::var("COURTSIDE_TAB")
                .ok()
                .and_then(|val| registry::tab(val.trim()))
                .unwrap_or(defaults.tab),
            era: env::var("COURTSIDE_ERA")
                .ok()
                .and_then(|val| Era::parse(&val))
                .unwrap_or(defaults.era),
            min_games: env::var("COURTSIDE_MIN_GP")
                .ok()
                .and_then(|val| val.trim().parse::<u32>().ok())
                .unwrap_or(defaults.min_games)
                .min(2000),
            log_level: env::var("COURTSIDE_LOG")
                .ok()
                .filter(|val| !val.trim().is_empty())
                .unwrap_or(defaults.log_level),
            fake_seed: env::var("COURTSIDE_FAKE_SEED")
                .ok()
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(defaults.fake_seed),
            fake_players: env::var("COURTSIDE_FAKE_PLAYERS")
                .ok()
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(defaults.fake_players)
                .clamp(1, 20_000),
        }
    }
}
