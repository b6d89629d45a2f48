//! ADX Lab CLI — compute, run, verify and synthetic data commands.
//!
//! Commands:
//! - `compute` — compute the derived columns for one price table and save artifacts
//! - `run` — execute a run described by a TOML config file
//! - `verify` — compare computed output against a reference table
//! - `synth` — write a deterministic synthetic price table

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adxlab_core::data::FileFormat;
use adxlab_core::{OutputColumn, DEFAULT_PERIOD};
use adxlab_runner::config::parse_columns;
use adxlab_runner::export::{write_csv, write_parquet};
use adxlab_runner::verify::write_mismatch_csv;
use adxlab_runner::{
    run_from_config, save_artifacts, synthetic_frame, verify_file, OutputFormat, RunConfig,
    RunResult, VerifyReport, DEFAULT_LABEL, DEFAULT_TOLERANCE,
};

/// Mismatches printed before the listing is cut short.
const MAX_PRINTED_MISMATCHES: usize = 50;

#[derive(Parser)]
#[command(
    name = "adxlab",
    about = "ADX Lab CLI — Wilder directional movement and ADX for OHLC tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute TR, ±DM, smoothed sums, ±DI, DX and ADX for a price table.
    Compute {
        /// CSV or Parquet file with High, Low and Close columns.
        #[arg(long)]
        input: PathBuf,

        /// Wilder smoothing period.
        #[arg(long, default_value_t = DEFAULT_PERIOD, value_parser = parse_period)]
        period: usize,

        /// Output directory for the artifact set.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Artifact formats: csv, parquet, json (repeat or comma-separate).
        #[arg(long = "format", value_delimiter = ',', default_value = "csv", value_parser = parse_format)]
        formats: Vec<OutputFormat>,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Execute a run from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Print the run summary as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compare computed output against a reference table.
    Verify {
        /// CSV or Parquet price table.
        #[arg(long)]
        input: PathBuf,

        /// Reference table holding the expected derived columns.
        #[arg(long)]
        reference: PathBuf,

        /// Wilder smoothing period.
        #[arg(long, default_value_t = DEFAULT_PERIOD, value_parser = parse_period)]
        period: usize,

        /// Absolute tolerance per cell.
        #[arg(long, default_value_t = DEFAULT_TOLERANCE, value_parser = parse_tolerance)]
        tolerance: f64,

        /// Columns to compare. Defaults to all ten derived columns.
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Also write every mismatch to this CSV file.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Write a deterministic synthetic OHLCV table.
    Synth {
        /// Number of bars (weekdays) to generate.
        #[arg(long)]
        bars: usize,

        /// Seed label; the same label always yields the same table.
        #[arg(long, default_value = DEFAULT_LABEL)]
        seed: String,

        /// First date (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-01")]
        start: String,

        /// Output file; `.parquet` writes Parquet, anything else CSV.
        #[arg(long)]
        output: PathBuf,
    },
}

fn parse_period(s: &str) -> Result<usize, String> {
    let period: usize = s.parse().map_err(|e| format!("invalid period '{s}': {e}"))?;
    if period == 0 {
        return Err("period must be >= 1".to_string());
    }
    Ok(period)
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tolerance: f64 = s.parse().map_err(|e| format!("invalid tolerance '{s}': {e}"))?;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err("tolerance must be a non-negative number".to_string());
    }
    Ok(tolerance)
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compute {
            input,
            period,
            output_dir,
            formats,
            json,
        } => {
            let config = RunConfig::new(input, period).with_output(output_dir, formats);
            run_config(&config, json)
        }
        Commands::Run { config, json } => {
            let config = RunConfig::from_file(&config)
                .with_context(|| format!("failed to load config {}", config.display()))?;
            run_config(&config, json)
        }
        Commands::Verify {
            input,
            reference,
            period,
            tolerance,
            columns,
            report,
        } => run_verify(&input, &reference, period, tolerance, &columns, report.as_deref()),
        Commands::Synth {
            bars,
            seed,
            start,
            output,
        } => run_synth(bars, &seed, &start, &output),
    }
}

fn run_config(config: &RunConfig, json: bool) -> Result<()> {
    let result = run_from_config(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result.summary)?);
    } else {
        print_summary(&result);
    }

    let run_dir = save_artifacts(&result, &config.output.dir, &config.output.formats)?;
    println!("Artifacts saved to: {}", run_dir.display());

    if let Some(report) = &result.verify {
        print_report(report);
        if !report.is_success() {
            bail!("output does not match reference");
        }
    }
    Ok(())
}

fn run_verify(
    input: &Path,
    reference: &Path,
    period: usize,
    tolerance: f64,
    columns: &[String],
    report_path: Option<&Path>,
) -> Result<()> {
    let columns = if columns.is_empty() {
        OutputColumn::ALL.to_vec()
    } else {
        parse_columns(columns)?
    };

    let report = verify_file(input, reference, period, &columns, tolerance)?;
    print_report(&report);

    if let Some(path) = report_path {
        write_mismatch_csv(&report, path)?;
        println!("Mismatch report saved to: {}", path.display());
    }

    if !report.is_success() {
        bail!("output does not match reference");
    }
    Ok(())
}

fn run_synth(bars: usize, seed: &str, start: &str, output: &Path) -> Result<()> {
    if bars == 0 {
        bail!("--bars must be >= 1");
    }
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid start date '{start}' (expected YYYY-MM-DD)"))?;

    let df = synthetic_frame(seed, start, bars)?;
    match FileFormat::from_path(output) {
        FileFormat::Parquet => write_parquet(&df, output)?,
        FileFormat::Csv => write_csv(&df, output)?,
    }
    println!("Wrote {bars} synthetic bars to {}", output.display());
    Ok(())
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "undefined".to_string())
}

/// Full precision, for values that may differ only in late digits.
fn fmt_exact(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "undefined".to_string())
}

fn fmt_index(i: Option<usize>) -> String {
    i.map(|i| i.to_string()).unwrap_or_else(|| "never".to_string())
}

fn print_summary(result: &RunResult) {
    let s = &result.summary;
    println!();
    println!("=== ADX Result ===");
    println!("Input:          {}", result.input.display());
    println!("Rows:           {}", result.rows.len());
    println!("Period:         {}", result.period);
    println!("TR14 from row:  {}", fmt_index(s.onset.tr14));
    println!("ADX from row:   {}", fmt_index(s.onset.adx));
    println!();
    println!("--- Latest ---");
    println!("ADX:            {}", fmt_value(s.latest.adx));
    println!("+DI14:          {}", fmt_value(s.latest.plus_di14));
    println!("-DI14:          {}", fmt_value(s.latest.minus_di14));
    if let Some(strength) = s.strength {
        println!("Trend strength: {strength}");
    }
    if let Some(bias) = s.bias {
        println!("Bias:           {bias}");
    }
    if s.onset.adx.is_none() {
        println!();
        println!(
            "WARNING: ADX needs at least {} rows; got {}",
            2 * result.period,
            result.rows.len()
        );
    }
    println!();
}

fn print_report(report: &VerifyReport) {
    println!("=== Verification ===");
    println!("Rows compared:  {}", report.compared_rows);
    let checked: Vec<&str> = report.checked_columns.iter().map(|c| c.name()).collect();
    println!("Columns:        {}", checked.join(", "));
    if !report.missing_columns.is_empty() {
        let missing: Vec<&str> = report.missing_columns.iter().map(|c| c.name()).collect();
        println!("Not compared:   {}", missing.join(", "));
    }

    if report.is_success() {
        println!("All compared values match.");
        return;
    }
    if report.checked_columns.is_empty() {
        println!("No requested column is present in both tables.");
        return;
    }
    println!("Mismatches:     {}", report.mismatches.len());
    println!("{:<8} {:>6} {:>24} {:>24}", "Column", "Row", "Got", "Expected");
    println!("{}", "-".repeat(65));
    for m in report.mismatches.iter().take(MAX_PRINTED_MISMATCHES) {
        println!(
            "{:<8} {:>6} {:>24} {:>24}",
            m.column.name(),
            m.row,
            fmt_exact(m.got),
            fmt_exact(m.expected)
        );
    }
    if report.mismatches.len() > MAX_PRINTED_MISMATCHES {
        println!(
            "... {} more",
            report.mismatches.len() - MAX_PRINTED_MISMATCHES
        );
    }
}
