//! GaleLab CLI — run pattern backtests and inspect match data.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML run file and save artifacts
//! - `pairs`: list the pattern → entry pairs a run file resolves to
//! - `dates`: list the distinct match dates in a data file
//! - `synth`: write a deterministic synthetic match history as CSV

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use galelab_core::engine::resolve_pairs;
use galelab_core::GaleLevel;
use galelab_runner::{
    available_dates, generate_synthetic_matches, load_matches, run_from_config, save_artifacts,
    write_matches_csv, BacktestConfig, RunOptions, RunReport,
};

#[derive(Parser)]
#[command(
    name = "galelab",
    about = "GaleLab CLI — pattern/entry backtesting over match histories"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML run file.
    Run {
        /// Path to the run file.
        #[arg(long)]
        config: PathBuf,

        /// Match file (.csv or .json). Overrides [data].path.
        #[arg(long)]
        matches: Option<PathBuf>,

        /// First date to include (YYYY-MM-DD).
        #[arg(long)]
        start: Option<String>,

        /// Last date to include (YYYY-MM-DD).
        #[arg(long)]
        end: Option<String>,

        /// Single day to run (YYYY-MM-DD). Excludes --start/--end.
        #[arg(long)]
        date: Option<String>,

        /// Evaluate pairs on the rayon thread pool.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// List the pattern → entry pairs a run file resolves to.
    Pairs {
        /// Path to the run file.
        #[arg(long)]
        config: PathBuf,
    },
    /// List the distinct dates in a match file.
    Dates {
        /// Match file (.csv or .json).
        #[arg(long)]
        matches: PathBuf,
    },
    /// Write a synthetic match history as CSV.
    Synth {
        /// First day (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-01")]
        start: String,

        /// Number of days.
        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Matches per day.
        #[arg(long, default_value_t = 12)]
        per_day: u8,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            matches,
            start,
            end,
            date,
            parallel,
            output_dir,
        } => run_backtest_cmd(config, matches, start, end, date, parallel, output_dir),
        Commands::Pairs { config } => run_pairs(config),
        Commands::Dates { matches } => run_dates(matches),
        Commands::Synth {
            start,
            days,
            per_day,
            seed,
            output,
        } => run_synth(&start, days, per_day, seed, output),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "galelab=debug" } else { "galelab=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn run_backtest_cmd(
    config_path: PathBuf,
    matches: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    date: Option<String>,
    parallel: bool,
    output_dir: PathBuf,
) -> Result<()> {
    if date.is_some() && (start.is_some() || end.is_some()) {
        bail!("--date and --start/--end are mutually exclusive");
    }

    let mut config = BacktestConfig::from_file(&config_path)
        .with_context(|| format!("failed to load run file {}", config_path.display()))?;

    // Flags replace the run file's date selection wholesale
    if let Some(day) = date.as_deref() {
        config.data.date = Some(parse_date(day)?);
        config.data.start_date = None;
        config.data.end_date = None;
    } else if start.is_some() || end.is_some() {
        config.data.date = None;
        config.data.start_date = start.as_deref().map(parse_date).transpose()?;
        config.data.end_date = end.as_deref().map(parse_date).transpose()?;
    }
    config.validate()?;
    tracing::debug!(config = %config_path.display(), cells = config.cells.len(), "run file loaded");

    let report = run_from_config(&config, matches, RunOptions { parallel })?;

    print_summary(&report);

    let run_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_pairs(config_path: PathBuf) -> Result<()> {
    let config = BacktestConfig::from_file(&config_path)
        .with_context(|| format!("failed to load run file {}", config_path.display()))?;
    let grid = config.to_grid()?;
    let pairs = resolve_pairs(&grid);

    println!(
        "Cells: {} patterns, {} entries",
        grid.patterns().len(),
        grid.entries().len()
    );
    if pairs.is_empty() {
        println!("No related pairs (an entry must sit below a pattern in the same column).");
        return Ok(());
    }

    println!();
    println!("{:<8} {:<20} {:<8} {:<20}", "Pattern", "Markets", "Entry", "Markets");
    println!("{}", "-".repeat(58));
    for pair in &pairs {
        println!(
            "{:<8} {:<20} {:<8} {:<20}",
            pair.pattern.position.to_string(),
            pair.pattern.config.label(),
            pair.entry.position.to_string(),
            pair.entry.config.label()
        );
    }
    Ok(())
}

fn run_dates(path: PathBuf) -> Result<()> {
    let matches = load_matches(&path)?;
    let dates = available_dates(&matches);
    if dates.is_empty() {
        println!("No matches in {}", path.display());
        return Ok(());
    }

    println!("{} matches on {} dates", matches.len(), dates.len());
    for day in dates {
        let count = matches.iter().filter(|m| m.date == day).count();
        println!("{day}  {count:>4}");
    }
    Ok(())
}

fn run_synth(start: &str, days: u32, per_day: u8, seed: u64, output: PathBuf) -> Result<()> {
    if days == 0 || per_day == 0 {
        bail!("--days and --per-day must be positive");
    }
    let start = parse_date(start)?;
    let matches = generate_synthetic_matches(start, days, per_day, seed);

    let file = std::fs::File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_matches_csv(file, &matches)?;

    println!(
        "Wrote {} synthetic matches ({} days from {}) to {}",
        matches.len(),
        days,
        start,
        output.display()
    );
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("=== Backtest Result ===");
    println!(
        "Period:         {} to {}",
        report.first_date.as_deref().unwrap_or("-"),
        report.last_date.as_deref().unwrap_or("-")
    );
    println!("Matches:        {}", report.match_count);
    println!(
        "Cells:          {} patterns, {} entries",
        report.trace.patterns, report.trace.entries
    );
    println!("Pairs:          {}", report.pairs.len());
    println!();

    if report.pairs.is_empty() {
        println!("No related pairs (an entry must sit below a pattern in the same column).");
        println!();
        return;
    }

    print!("{:<16} {:>5}", "Pair", "Occ");
    for level in GaleLevel::ALL {
        print!(" {:>7}", level.to_string());
    }
    println!(" {:>7} {:>8}  Grade", "Total", "ROI");
    println!("{}", "-".repeat(96));

    for p in &report.pairs {
        let r = &p.result;
        let label = format!("{} -> {}", r.pattern_position, r.entry_position);
        print!("{:<16} {:>5}", label, r.total_occurrences);
        for level in GaleLevel::ALL {
            print!(" {:>6.1}%", r.percentage(level));
        }
        println!(
            " {:>6.1}% {:>7.1}%  {}",
            r.assertiveness.total.percentage,
            p.metrics.roi.roi,
            p.metrics.total_grade.as_str()
        );
    }
    println!();
}
