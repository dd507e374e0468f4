//! dive-sim - simulated dive computer
//!
//! Feeds a depth profile through a dive session once per tick and prints
//! depth, dive time, PO2, NDL, CNS% and safe-stop time for every sample.

#![deny(clippy::unwrap_used)]

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dive_session::{
    parse_profile, run_profile, Clock, ClockPacer, DiveSession, DiveSummary, DriverConfig,
    JsonLinesSink, ManualClock, Pacer, ProfileStep, ReportSink, SleepPacer, SystemClock, TextSink,
    TracingSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable block per sample
    Text,
    /// One JSON object per line
    Json,
    /// Structured log events
    Log,
}

#[derive(Parser)]
#[command(name = "dive-sim")]
#[command(about = "Simulated dive computer: PO2, NDL, CNS% and safe-stop time per sample")]
#[command(version)]
struct Cli {
    /// Oxygen fraction of the breathing gas, in (0, 1]
    #[arg(long, env = "DIVE_SIM_FO2", default_value_t = 0.32)]
    fo2: f64,

    /// Depth profile, e.g. "1..10" or "5, 12@9, 30..5:5"
    #[arg(long, env = "DIVE_SIM_PROFILE", default_value = "1..10")]
    profile: String,

    /// Ascent rate (m/min) for samples that do not set one
    #[arg(long, env = "DIVE_SIM_ASCENT_RATE", default_value_t = 9.0)]
    ascent_rate: f64,

    /// Time between samples in milliseconds
    #[arg(long, env = "DIVE_SIM_INTERVAL_MS", default_value_t = 1000)]
    interval_ms: u64,

    /// Advance a simulated clock instead of sleeping between samples
    #[arg(long, env = "DIVE_SIM_FAST")]
    fast: bool,

    /// Output format
    #[arg(long, value_enum, env = "DIVE_SIM_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 if cli.format == OutputFormat::Log => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("dive_sim={log_level},dive_session={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let steps = parse_profile(&cli.profile).context("invalid depth profile")?;
    let config = DriverConfig {
        interval: Duration::from_millis(cli.interval_ms),
        default_ascent_rate: cli.ascent_rate,
    };

    let mut sink: Box<dyn ReportSink> = match cli.format {
        OutputFormat::Text => Box::new(TextSink::new(io::stdout().lock())),
        OutputFormat::Json => Box::new(JsonLinesSink::new(io::stdout().lock())),
        OutputFormat::Log => Box::new(TracingSink),
    };

    info!(fo2 = cli.fo2, samples = steps.len(), fast = cli.fast, "starting dive");

    let summary = if cli.fast {
        let clock = ManualClock::new();
        let mut session = DiveSession::with_clock(cli.fo2, clock.clone())?;
        run(&mut session, &steps, &config, &mut ClockPacer::new(clock), &mut sink)?
    } else {
        let mut session = DiveSession::with_clock(cli.fo2, SystemClock::new())?;
        run(&mut session, &steps, &config, &mut SleepPacer, &mut sink)?
    };

    info!(
        ticks = summary.ticks,
        max_depth_m = summary.max_depth_m,
        dive_time_min = summary.dive_time_min,
        peak_cns_percent = summary.peak_cns_percent,
        "dive finished"
    );
    Ok(())
}

fn run<C, P>(
    session: &mut DiveSession<C>,
    steps: &[ProfileStep],
    config: &DriverConfig,
    pacer: &mut P,
    sink: &mut Box<dyn ReportSink>,
) -> Result<DiveSummary>
where
    C: Clock,
    P: Pacer,
{
    run_profile(session, steps, config, pacer, sink).context("dive simulation failed")
}
