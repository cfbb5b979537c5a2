//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::replay_history::ReplayHistory;
use crate::domain::config_validation::{
    validate_screener_config, validate_strategy_config, SCREENER, STRATEGY,
};
use crate::domain::error::LevelsError;
use crate::domain::level::LevelFilterSettings;
use crate::domain::position::Side;
use crate::domain::position_manager::{PositionManager, PositionSettings};
use crate::domain::price_window::Frequency;
use crate::domain::screener::{Screener, ScreenerOutput, ScreenerSettings, SkipReason};
use crate::domain::security::{join_symbols, Security};
use crate::domain::strategy::{IntradayLevels, StrategySettings};
use crate::domain::trend::TrendStrength;
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "intraday-levels", about = "Quarter-dollar level scanner")]
pub struct Cli {
    /// Log at DEBUG instead of INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Run the daily screen and list long/short candidates
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Replay one security's minute bars and report level matches
    Levels {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        code: String,
        #[arg(long, value_enum, default_value_t = SideArg::Both)]
        side: SideArg,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideArg {
    Long,
    Short,
    Both,
}

impl SideArg {
    pub fn sides(self) -> &'static [Side] {
        match self {
            SideArg::Long => &[Side::Long],
            SideArg::Short => &[Side::Short],
            SideArg::Both => &[Side::Long, Side::Short],
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);
    match cli.command {
        Command::Validate { config } => run_validate(&config),
        Command::Scan { config, data_dir } => run_scan(&config, data_dir.as_deref()),
        Command::Levels {
            config,
            data_dir,
            code,
            side,
        } => run_levels(&config, data_dir.as_deref(), &code, side),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(
            Targets::new()
                .with_target("intraday_levels", level)
                .with_default(tracing::Level::WARN),
        );
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

pub fn build_strategy_settings(config: &dyn ConfigPort) -> Result<StrategySettings, LevelsError> {
    validate_strategy_config(config)?;
    let defaults = StrategySettings::default();
    let level = LevelFilterSettings::default();
    let position = PositionSettings::default();

    Ok(StrategySettings {
        level: LevelFilterSettings {
            fast_window: config.get_int(STRATEGY, "intraday_trend_fast", level.fast_window as i64)
                as usize,
            slow_window: config.get_int(STRATEGY, "intraday_trend_slow", level.slow_window as i64)
                as usize,
            cents_to_level: config.get_double(
                STRATEGY,
                "intraday_cents_to_level",
                level.cents_to_level,
            ),
        },
        position: PositionSettings {
            position_amount: config.get_int(STRATEGY, "position_amount", position.position_amount),
            market_offset: config.get_double(STRATEGY, "cents_to_market", position.market_offset),
            stop_size: config.get_double(STRATEGY, "stop_size", position.stop_size),
            target_profit: config.get_double(STRATEGY, "target_profit", position.target_profit),
        },
        daily_risk: config.get_double(STRATEGY, "daily_risk", defaults.daily_risk),
        daily_trend_strength: config.get_int(
            SCREENER,
            "daily_trend_strength",
            defaults.daily_trend_strength as i64,
        ) as u32,
        intraday_frequency: Frequency::Minute,
    })
}

pub fn build_screener_settings(config: &dyn ConfigPort) -> Result<ScreenerSettings, LevelsError> {
    validate_screener_config(config)?;
    let defaults = ScreenerSettings::default();

    Ok(ScreenerSettings {
        average_window: config.get_int(SCREENER, "average_window", defaults.average_window as i64)
            as usize,
        trend_window: config.get_int(SCREENER, "trend_window", defaults.trend_window as i64)
            as usize,
        daily_trend_strength: config.get_int(
            SCREENER,
            "daily_trend_strength",
            defaults.daily_trend_strength as i64,
        ) as u32,
        minimum_daily_volume: config.get_double(
            SCREENER,
            "minimum_daily_volume",
            defaults.minimum_daily_volume,
        ),
        min_price: config.get_double(SCREENER, "min_price", defaults.min_price),
        max_price: config.get_double(SCREENER, "max_price", defaults.max_price),
        minimum_atr: config.get_double(SCREENER, "minimum_atr", defaults.minimum_atr),
    })
}

/// `--data-dir` wins over `[data] dir`.
pub fn resolve_data_dir(
    override_dir: Option<&Path>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, LevelsError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    config
        .get_string("data", "dir")
        .map(PathBuf::from)
        .ok_or_else(|| LevelsError::ConfigMissing {
            section: "data".into(),
            key: "dir".into(),
        })
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match build_strategy_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let screener = match build_screener_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nStrategy:");
    eprintln!("  position_amount: {}", strategy.position.position_amount);
    eprintln!("  stop_size:       {:.2}", strategy.position.stop_size);
    eprintln!("  target_profit:   {:.2}", strategy.position.target_profit);
    eprintln!("  cents_to_market: {:.2}", strategy.position.market_offset);
    eprintln!("  daily_risk:      {:.2}", strategy.daily_risk);
    eprintln!(
        "  windows:         fast {} / slow {} bars",
        strategy.level.fast_window, strategy.level.slow_window
    );
    eprintln!("  cents_to_level:  {}", strategy.level.cents_to_level);

    eprintln!("\nScreener:");
    eprintln!("  average_window:  {}", screener.average_window);
    eprintln!("  trend_window:    {}", screener.trend_window);
    eprintln!("  trend_strength:  {}", screener.daily_trend_strength);
    eprintln!("  min volume:      {:.0}", screener.minimum_daily_volume);
    eprintln!(
        "  price band:      {:.2} - {:.2}",
        screener.min_price, screener.max_price
    );
    eprintln!("  minimum_atr:     {:.2}", screener.minimum_atr);

    eprintln!("\nConfig validated successfully");
    ExitCode::SUCCESS
}

/// Screen every security with daily data under `data_dir`.
pub fn scan_directory(
    data_dir: &Path,
    settings: ScreenerSettings,
) -> Result<ScreenerOutput, LevelsError> {
    let adapter = CsvAdapter::new(data_dir.to_path_buf());
    let securities = adapter.securities()?;
    if securities.is_empty() {
        return Err(LevelsError::Data {
            reason: format!("no daily CSV files in {}", data_dir.display()),
        });
    }
    Screener::new(settings).run(&adapter, &securities)
}

fn run_scan(config_path: &Path, data_dir: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let result = build_screener_settings(&adapter).and_then(|settings| {
        let dir = resolve_data_dir(data_dir, &adapter)?;
        eprintln!("Screening {}", dir.display());
        scan_directory(&dir, settings).map(|output| (settings, output))
    });
    let (settings, output) = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    for skipped in &output.skipped {
        match skipped.reason {
            SkipReason::NoData => eprintln!("warning: skipping {} (no data)", skipped.security),
            SkipReason::InsufficientBars { bars } => eprintln!(
                "warning: skipping {} ({} bars, need {})",
                skipped.security,
                bars,
                settings.required_bars()
            ),
        }
    }

    println!(
        "{:<8} {:>14} {:>10} {:>10} {:>6} {:>6}",
        "symbol", "avg_volume", "sma_close", "avg_range", "long", "short"
    );
    for row in &output.rows {
        println!(
            "{:<8} {:>14.0} {:>10.2} {:>10.2} {:>6} {:>6}",
            row.security.symbol,
            row.average_volume,
            row.sma_close,
            row.average_range,
            row.trend.long_streak,
            row.trend.short_streak
        );
    }

    let strength = settings.daily_trend_strength;
    let longs = output.long_candidates(strength);
    let shorts = output.short_candidates(strength);
    println!();
    println!("longs:  {}", join_symbols(&longs));
    println!("shorts: {}", join_symbols(&shorts));

    eprintln!(
        "\n{} passed, {} rejected, {} skipped",
        output.rows.len(),
        output.rejected.len(),
        output.skipped.len()
    );
    ExitCode::SUCCESS
}

/// One bar at which the level filter passed.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelHit {
    pub timestamp: chrono::NaiveDateTime,
    pub side: Side,
    pub extreme: f64,
    pub cents_to_level: f64,
    pub entry_price: f64,
}

/// Walk the minute timeline of `security` and collect every bar where the
/// level filter passes once both windows are full.
pub fn replay_levels(
    history: &mut ReplayHistory,
    security: &Security,
    settings: StrategySettings,
    sides: &[Side],
) -> Vec<LevelHit> {
    let strategy = IntradayLevels::new(settings);
    let positions = PositionManager::new(settings.position);
    let warm_up = settings.level.slow_window.max(settings.level.fast_window);
    let mut hits = Vec::new();

    for timestamp in history.timeline(Frequency::Minute).into_iter().skip(warm_up.saturating_sub(1)) {
        history.set_cursor(Some(timestamp));
        for &side in sides {
            if let Ok(found) = strategy.scan(side, security, &*history) {
                hits.push(LevelHit {
                    timestamp,
                    side,
                    extreme: found.extreme,
                    cents_to_level: found.cents_to_level,
                    entry_price: positions.entry_price(side, found.extreme),
                });
            }
        }
    }
    history.set_cursor(None);
    hits
}

fn run_levels(config_path: &Path, data_dir: Option<&Path>, code: &str, side: SideArg) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(exit) => return exit,
    };
    let settings = match build_strategy_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let screener = match build_screener_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let dir = match resolve_data_dir(data_dir, &adapter) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let csv = CsvAdapter::new(dir);
    let security = Security::new(0, code);
    let minute = match csv.fetch_bars(code, Frequency::Minute) {
        Ok(bars) if !bars.is_empty() => bars,
        Ok(_) => {
            let err = LevelsError::NoData { code: code.into() };
            eprintln!("error: {err}");
            return (&err).into();
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match csv.fetch_bars(code, Frequency::Daily) {
        Ok(daily) => {
            let trend = TrendStrength::new(screener.trend_window).compute_bars(&daily);
            eprintln!(
                "{}: daily streaks long {} / short {}",
                code, trend.long_streak, trend.short_streak
            );
        }
        Err(e) => eprintln!("warning: no daily trend for {} ({})", code, e),
    }

    let total = minute.len();
    let mut history = ReplayHistory::new().with_bars(security.clone(), Frequency::Minute, minute);
    let hits = replay_levels(&mut history, &security, settings, side.sides());

    for hit in &hits {
        println!(
            "{} {:<5} extreme {:.2} ({:.1}c from level) entry {:.2}",
            hit.timestamp.format("%Y-%m-%d %H:%M"),
            hit.side,
            hit.extreme,
            hit.cents_to_level,
            hit.entry_price
        );
    }
    eprintln!("\n{} level matches over {} minute bars", hits.len(), total);
    ExitCode::SUCCESS
}
