//! CLI definition and dispatch.

use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::adapters::console_report::{ConsoleReportAdapter, Sections};
use crate::adapters::csv_adapter::{CsvPriceAdapter, CsvTradeLogAdapter, CsvWatchlistAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::config_validation::{validate_dashboard_config, validate_data_config};
use crate::domain::cycle::{CycleSettings, DEFAULT_HISTORY_BARS, DashboardSnapshot, Sources, run_cycle};
use crate::domain::error::SentinelError;
use crate::domain::refresh::{
    DEFAULT_REFRESH_SECS, MAX_REFRESH_SECS, MIN_REFRESH_SECS, RefreshDecision, RefreshDriver,
    RefreshSettings,
};
use crate::domain::rsi::DEFAULT_RSI_PERIOD;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sentinel", about = "Trading watchlist dashboard")]
pub struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Refresh once and print the dashboard
    Snapshot {
        #[arg(short, long)]
        config: PathBuf,
        /// Also write a Typst report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Keep refreshing the dashboard on an interval
    Watch {
        #[arg(short, long)]
        config: PathBuf,
        /// Seconds between refreshes, overriding `[dashboard] refresh_interval`
        #[arg(long)]
        interval: Option<i64>,
        /// Stop after this many refreshes
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// Print watchlist signals only
    Signals {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print positions and PnL only
    Positions {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Snapshot { config, output } => run_snapshot(&config, output.as_deref()),
        Command::Watch {
            config,
            interval,
            cycles,
        } => run_watch(&config, interval, cycles),
        Command::Signals { config } => run_sections(&config, Sections::Signals),
        Command::Positions { config } => run_sections(&config, Sections::Positions),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SentinelError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn validate(config: &dyn ConfigPort) -> Result<(), SentinelError> {
    validate_data_config(config)?;
    validate_dashboard_config(config)?;
    Ok(())
}

/// Values are validated beforehand; the clamps only guard direct callers.
pub fn build_cycle_settings(config: &dyn ConfigPort) -> CycleSettings {
    let history_bars = config.get_int("dashboard", "history_bars", DEFAULT_HISTORY_BARS as i64);
    let rsi_period = config.get_int("dashboard", "rsi_period", DEFAULT_RSI_PERIOD as i64);
    CycleSettings {
        history_bars: history_bars.max(1) as usize,
        rsi_period: rsi_period.max(1) as usize,
    }
}

pub fn build_refresh_settings(config: &dyn ConfigPort) -> RefreshSettings {
    let secs = config
        .get_int("dashboard", "refresh_interval", DEFAULT_REFRESH_SECS)
        .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
    RefreshSettings {
        auto_refresh: config.get_bool("dashboard", "auto_refresh", false),
        interval: TimeDelta::seconds(secs),
    }
}

/// Relative paths in the config are taken relative to the config file.
fn resolve_path(base_dir: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw.trim());
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Adapters for one configuration, owned so [`Sources`] can borrow them.
pub struct DataSources {
    pub watchlist: CsvWatchlistAdapter,
    pub trade_log: CsvTradeLogAdapter,
    pub prices: Box<dyn PricePort>,
}

impl DataSources {
    pub fn sources(&self) -> Sources<'_> {
        Sources {
            watchlist: &self.watchlist,
            trade_log: &self.trade_log,
            prices: self.prices.as_ref(),
        }
    }
}

fn build_price_port(
    config: &dyn ConfigPort,
    base_dir: &Path,
) -> Result<Box<dyn PricePort>, SentinelError> {
    let source = config
        .get_string("data", "price_source")
        .unwrap_or_else(|| "csv".to_string())
        .trim()
        .to_lowercase();

    match source.as_str() {
        "sqlite" => {
            #[cfg(feature = "sqlite")]
            {
                use crate::adapters::sqlite_adapter::SqlitePriceAdapter;

                let adapter = SqlitePriceAdapter::from_config(config, base_dir)?;
                adapter.initialize_schema()?;
                Ok(Box::new(adapter))
            }

            #[cfg(not(feature = "sqlite"))]
            {
                Err(SentinelError::ConfigInvalid {
                    section: "data".into(),
                    key: "price_source".into(),
                    reason: "sqlite feature is required for price_source = sqlite".into(),
                })
            }
        }
        _ => {
            let dir = config
                .get_string("data", "prices_dir")
                .unwrap_or_else(|| "prices".to_string());
            Ok(Box::new(CsvPriceAdapter::new(resolve_path(base_dir, &dir))))
        }
    }
}

pub fn build_data_sources(
    config: &dyn ConfigPort,
    base_dir: &Path,
) -> Result<DataSources, SentinelError> {
    let watchlist = config
        .get_string("data", "watchlist")
        .unwrap_or_else(|| "watchlist.csv".to_string());
    let trade_log = config
        .get_string("data", "trade_log")
        .unwrap_or_else(|| "trade_log.txt".to_string());

    Ok(DataSources {
        watchlist: CsvWatchlistAdapter::new(resolve_path(base_dir, &watchlist)),
        trade_log: CsvTradeLogAdapter::new(resolve_path(base_dir, &trade_log)),
        prices: build_price_port(config, base_dir)?,
    })
}

fn config_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

/// Load, validate, and wire up everything a refresh needs.
fn prepare(config_path: &Path) -> Result<(FileConfigAdapter, DataSources), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;

    if let Err(e) = validate(&config) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }

    match build_data_sources(&config, &config_dir(config_path)) {
        Ok(sources) => Ok((config, sources)),
        Err(e) => {
            eprintln!("error: {e}");
            Err((&e).into())
        }
    }
}

fn refresh(sources: &DataSources, settings: &CycleSettings) -> DashboardSnapshot {
    run_cycle(&sources.sources(), settings, Utc::now())
}

fn run_snapshot(config_path: &Path, output_path: Option<&Path>) -> ExitCode {
    let (config, sources) = match prepare(config_path) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let snapshot = refresh(&sources, &build_cycle_settings(&config));
    print!("{}", ConsoleReportAdapter::default().render(&snapshot));

    let Some(output) = output_path else {
        return ExitCode::SUCCESS;
    };

    let report = match TypstReportAdapter::from_config(&config, &config_dir(config_path)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    match report.write(&snapshot, output) {
        Ok(()) => {
            eprintln!("\nReport written to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write report: {e}");
            (&e).into()
        }
    }
}

fn run_sections(config_path: &Path, sections: Sections) -> ExitCode {
    let (config, sources) = match prepare(config_path) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let snapshot = refresh(&sources, &build_cycle_settings(&config));
    print!("{}", ConsoleReportAdapter::new(sections).render(&snapshot));
    ExitCode::SUCCESS
}

fn run_watch(config_path: &Path, interval: Option<i64>, cycles: Option<usize>) -> ExitCode {
    let (config, sources) = match prepare(config_path) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let mut refresh_settings = build_refresh_settings(&config);
    if let Some(secs) = interval {
        if !(MIN_REFRESH_SECS..=MAX_REFRESH_SECS).contains(&secs) {
            let err = SentinelError::ConfigInvalid {
                section: "dashboard".into(),
                key: "refresh_interval".into(),
                reason: format!(
                    "--interval must be between {} and {} seconds",
                    MIN_REFRESH_SECS, MAX_REFRESH_SECS
                ),
            };
            eprintln!("error: {err}");
            return (&err).into();
        }
        refresh_settings.interval = TimeDelta::seconds(secs);
    }
    // watching implies scheduled refreshes
    refresh_settings.auto_refresh = true;

    let cycle_settings = build_cycle_settings(&config);
    let mut driver = RefreshDriver::new(refresh_settings);
    let report = ConsoleReportAdapter::default();
    let mut completed = 0usize;

    info!(
        interval_secs = refresh_settings.interval.num_seconds(),
        cycles = ?cycles,
        "watching dashboard"
    );

    loop {
        match driver.tick(Utc::now()) {
            RefreshDecision::Refresh => {
                let snapshot = refresh(&sources, &cycle_settings);
                println!(
                    "--- {} ---",
                    snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                print!("{}", report.render(&snapshot));
                println!();

                completed += 1;
                if cycles.is_some_and(|n| completed >= n) {
                    return ExitCode::SUCCESS;
                }
            }
            RefreshDecision::Wait(remaining) => {
                let pause = remaining
                    .and_then(|d| d.to_std().ok())
                    .unwrap_or(Duration::from_secs(1));
                debug!(secs = pause.as_secs_f64(), "waiting for next refresh");
                thread::sleep(pause);
            }
        }
    }
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let cycle = build_cycle_settings(&config);
    let refresh = build_refresh_settings(&config);
    let source = config
        .get_string("data", "price_source")
        .unwrap_or_else(|| "csv".to_string());

    eprintln!("Config is valid");
    eprintln!("  Price source:     {}", source.trim().to_lowercase());
    eprintln!(
        "  Auto refresh:     {} (every {}s)",
        refresh.auto_refresh,
        refresh.interval.num_seconds()
    );
    eprintln!("  History bars:     {}", cycle.history_bars);
    eprintln!("  RSI period:       {}", cycle.rsi_period);
    ExitCode::SUCCESS
}
