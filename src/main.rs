use anyhow::{Context, Result, anyhow, bail};

use courtside::compare::compare_entities;
use courtside::config::AppConfig;
use courtside::fake_source::FakeRowSource;
use courtside::format::format_value;
use courtside::heat::HeatHue;
use courtside::logging::init_logging;
use courtside::rankings::{Era, LEADERS_DEFAULT, SortDirection, leaders};
use courtside::registry::{self, Granularity, TABS};
use courtside::row::keys;
use courtside::source::{FileRowSource, ResolvedSource, SeasonType};
use courtside::state::{BrowserState, TableView};

const USAGE: &str = "usage: courtside <command> [options]

commands:
  tabs                                  list views and their columns
  leaderboard [--tab K] [--season regular|playoffs] [--era all|active|retired]
              [--min-gp N] [--sort KEY] [--asc] [--search Q] [--position P]
              [--more N] [--all]
  compare <id> <id> [--season S] [--field KEY]
  leaders <stat> [--limit N] [--season S]
  status";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    init_logging(&config.log_level)?;

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];
    let mut source = build_source(&config);

    match command.as_str() {
        "tabs" => print_tabs(),
        "leaderboard" => run_leaderboard(&config, &mut source, rest)?,
        "compare" => run_compare(&config, &mut source, rest)?,
        "leaders" => run_leaders(&config, &mut source, rest)?,
        "status" => run_status(&mut source),
        "help" | "--help" | "-h" => println!("{USAGE}"),
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    }
    Ok(())
}

fn build_source(config: &AppConfig) -> ResolvedSource {
    let fake = FakeRowSource::new(config.fake_seed, config.fake_players);
    match &config.data_dir {
        Some(dir) => ResolvedSource::new(Box::new(FileRowSource::new(dir)), Box::new(fake)),
        None => ResolvedSource::new(Box::new(fake.clone()), Box::new(fake)),
    }
}

fn print_tabs() {
    for tab in TABS {
        let granularity = match tab.granularity {
            Granularity::Entity => "per player",
            Granularity::Season => "per season",
        };
        println!(
            "{:<14} {:<14} {granularity}, sorted by {}",
            tab.key, tab.label, tab.default_sort
        );
        for group in tab.groups {
            let keys = group.columns.iter().map(|c| c.key).collect::<Vec<_>>();
            println!("    {:<14} {}", group.label, keys.join(", "));
        }
    }
}

fn run_leaderboard(
    config: &AppConfig,
    source: &mut ResolvedSource,
    args: &[String],
) -> Result<()> {
    let mut state = BrowserState::new(config.tab);
    state.set_season_type(config.season_type);
    state.set_era(config.era);
    state.set_min_games(config.min_games);

    if let Some(key) = flag_value(args, "--tab") {
        let tab = registry::tab(key).ok_or_else(|| anyhow!("unknown tab {key:?}"))?;
        state.set_tab(tab);
    }
    if let Some(raw) = flag_value(args, "--season") {
        state.set_season_type(parse_season(raw)?);
    }
    if let Some(raw) = flag_value(args, "--era") {
        let era = Era::parse(raw).ok_or_else(|| anyhow!("unknown era {raw:?}"))?;
        state.set_era(era);
    }
    if let Some(raw) = flag_value(args, "--min-gp") {
        let min_games = raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("invalid --min-gp {raw:?}"))?;
        state.set_min_games(min_games);
    }
    let sort_key = flag_value(args, "--sort")
        .map(str::to_string)
        .unwrap_or_else(|| state.tab().default_sort.to_string());
    let direction = if has_flag(args, "--asc") {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    };
    state.set_sort(&sort_key, direction);
    if let Some(query) = flag_value(args, "--search") {
        state.set_search(query);
    }
    state.set_position(flag_value(args, "--position"));

    let collection = source.resolve(state.season_type());
    let mut view = state.view(&collection);
    let more = match flag_value(args, "--more") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("invalid --more {raw:?}"))?,
        None => 0,
    };
    if has_flag(args, "--all") {
        state.reveal_all();
    } else {
        for _ in 0..more {
            state.reveal_more();
        }
    }
    if has_flag(args, "--all") || more > 0 {
        view = state.view(&collection);
    }

    print_table(&view);
    Ok(())
}

fn print_table(view: &TableView) {
    let columns = view.tab.columns().collect::<Vec<_>>();
    let mut header = format!("{:>5}", "#");
    for column in &columns {
        header.push_str(&format!("  {:>10}", column.label));
    }
    println!("{} ({}, {})", view.tab.label, view.season_type.key(), view.sort_key);
    println!("{header}");
    for ranked in view.window() {
        let mut line = format!("{:>5}", ranked.rank);
        for column in &columns {
            let cell = format_value(column.format, ranked.row.get(column.key));
            // Strong heat reads as a marker; the presentation layer owns real colour.
            let marker = match view.tint(column, ranked) {
                Some(tint) if tint.intensity >= 0.75 => match tint.hue {
                    HeatHue::Positive => '+',
                    HeatHue::Negative => '-',
                },
                _ => ' ',
            };
            line.push_str(&format!("  {cell:>10}{marker}"));
        }
        println!("{line}");
    }
    let shown = view.window().len();
    println!(
        "showing {shown} of {}{}",
        view.total(),
        if view.has_more() { " (use --more N or --all)" } else { "" }
    );
}

fn run_compare(config: &AppConfig, source: &mut ResolvedSource, args: &[String]) -> Result<()> {
    let ids = positional(args);
    let (Some(left), Some(right)) = (ids.first(), ids.get(1)) else {
        bail!("compare needs two entity ids\n\n{USAGE}");
    };
    let season_type = match flag_value(args, "--season") {
        Some(raw) => parse_season(raw)?,
        None => config.season_type,
    };
    let field = flag_value(args, "--field").unwrap_or(keys::CUMULATIVE);
    let collection = source.resolve(season_type);
    let comparison = compare_entities(&collection, left, right, field)?;

    for side in [&comparison.left, &comparison.right] {
        println!(
            "{} ({}): {} seasons, prime {} at {:+.2}",
            side.name, side.id, side.seasons, side.prime.years, side.prime.mean_rating
        );
    }
    println!("{:>6}  {:>10}  {:>10}", "season", comparison.left.id, comparison.right.id);
    for point in &comparison.cumulative {
        let cell = |idx: usize| {
            point
                .values
                .get(idx)
                .copied()
                .flatten()
                .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
        };
        println!("{:>6}  {:>10}  {:>10}", point.season_index, cell(0), cell(1));
    }
    Ok(())
}

fn run_leaders(config: &AppConfig, source: &mut ResolvedSource, args: &[String]) -> Result<()> {
    let Some(stat) = positional(args).first().copied() else {
        bail!("leaders needs a stat key\n\n{USAGE}");
    };
    let limit = match flag_value(args, "--limit") {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .with_context(|| format!("invalid --limit {raw:?}"))?,
        None => LEADERS_DEFAULT,
    };
    let season_type = match flag_value(args, "--season") {
        Some(raw) => parse_season(raw)?,
        None => config.season_type,
    };
    let collection = source.resolve(season_type);
    let format = TABS
        .iter()
        .find_map(|tab| tab.column(stat))
        .map_or(registry::FormatKind::Verbatim, |c| c.format);
    for ranked in leaders(&collection.entities, stat, limit) {
        println!(
            "{:>3}. {:<28} {}",
            ranked.rank,
            ranked.row.identity.name,
            format_value(format, ranked.row.get(stat))
        );
    }
    Ok(())
}

fn run_status(source: &mut ResolvedSource) {
    for season_type in [SeasonType::Regular, SeasonType::Playoffs] {
        let collection = source.resolve(season_type);
        println!(
            "{:<9} {:>6} players {:>7} seasons  skipped {:<4} {} (loaded {})",
            season_type.key(),
            collection.entities.len(),
            collection.season_row_count(),
            collection.skipped,
            collection.origin,
            collection.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    let availability = source.availability();
    println!(
        "backend {}",
        if availability.is_available() { "available" } else { "unavailable" }
    );
}

fn parse_season(raw: &str) -> Result<SeasonType> {
    SeasonType::parse(raw).ok_or_else(|| anyhow!("unknown season type {raw:?}"))
}

const VALUE_FLAGS: &[&str] = &[
    "--tab", "--season", "--era", "--min-gp", "--sort", "--search", "--position", "--more",
    "--limit", "--field",
];

/// Accepts both `--flag value` and `--flag=value`.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(name).and_then(|r| r.strip_prefix('=')) {
            return Some(value);
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
        {
            return Some(next);
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        out.push(arg.as_str());
    }
    out
}
