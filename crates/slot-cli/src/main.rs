//! `slots` CLI: check bookability and suggest meeting slots from a schedule snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Can expert 1 take 11:00-11:30 local time?
//! slots --data schedule.json check --expert 1 --start 2026-03-16T11:00 --end 2026-03-16T11:30
//!
//! # Next three 30-minute slots from Saturday morning
//! slots --data schedule.json suggest --expert 1 --from 2026-03-21T09:00
//!
//! # Free time over the next week, as JSON
//! slots --data schedule.json availability --expert 1 --from 2026-03-16 --days 7 --free --json
//! ```
//!
//! Naive times are read in `--tz` (default: the configured default timezone).
//! "Not bookable" is an answer, not an error, and exits 0.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use slot_engine::boundary::{format_window, parse_instant, parse_timezone};
use slot_engine::{
    BookingDecision, EngineConfig, ExpertId, ScheduleSnapshot, Scheduler, TimeWindow,
    UnavailableReason,
};

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Expert availability checks and slot suggestions"
)]
struct Cli {
    /// Schedule snapshot (experts, availability, unavailability, appointments) as JSON
    #[arg(long, global = true)]
    data: Option<String>,

    /// Engine configuration as JSON (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<String>,

    /// IANA timezone for reading and printing times
    #[arg(long, global = true)]
    tz: Option<String>,

    /// Log to stderr: -v for info, -vv for debug
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a window can be booked
    Check {
        #[arg(long)]
        expert: ExpertId,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest the next available slots
    Suggest {
        #[arg(long)]
        expert: ExpertId,
        #[arg(long)]
        from: String,
        /// Slot length in minutes (default from config)
        #[arg(long)]
        duration: Option<i64>,
        /// Number of slots (default from config)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show effective availability over a range
    Availability {
        #[arg(long)]
        expert: ExpertId,
        #[arg(long)]
        from: String,
        /// Range length in days (default from config)
        #[arg(long)]
        days: Option<i64>,
        /// Subtract booked appointments
        #[arg(long)]
        free: bool,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let data_path = cli
        .data
        .as_deref()
        .context("--data <snapshot.json> is required")?;
    let snapshot = ScheduleSnapshot::from_json(&read_file(data_path)?)
        .with_context(|| format!("Failed to load schedule snapshot: {}", data_path))?;

    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::from_json(&read_file(path)?)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };
    let tz = match cli.tz.as_deref() {
        Some(name) => parse_timezone(name)?,
        None => config.timezone()?,
    };
    let scheduler = Scheduler::new(snapshot, config).context("Invalid engine configuration")?;

    match cli.command {
        Commands::Check {
            expert,
            start,
            end,
            json,
        } => {
            let start = parse_time(&start, &tz)?;
            let end = parse_time(&end, &tz)?;
            let decision = scheduler.check_booking(expert, start, end)?;
            if json {
                print_json(&decision)?;
            } else {
                print_decision(&decision, &TimeWindow::new(start, end)?, &tz);
            }
        }
        Commands::Suggest {
            expert,
            from,
            duration,
            limit,
            json,
        } => {
            let from = parse_time(&from, &tz)?;
            let duration = duration.unwrap_or(scheduler.config().default_duration_minutes);
            let limit = limit.unwrap_or(scheduler.config().default_suggestion_limit);
            let slots = scheduler.suggest_next_available_slots(expert, from, duration, limit)?;
            if json {
                print_json(&slots)?;
            } else if slots.is_empty() {
                println!(
                    "No available slots within {} days.",
                    scheduler.config().max_lookahead_days
                );
            } else {
                print_windows(&slots, &tz);
            }
        }
        Commands::Availability {
            expert,
            from,
            days,
            free,
            json,
        } => {
            let from = parse_time(&from, &tz)?;
            let days = days.unwrap_or(scheduler.config().default_horizon_days);
            let to = Duration::try_days(days)
                .and_then(|span| from.checked_add_signed(span))
                .with_context(|| format!("--days {} is out of range", days))?;
            let windows = if free {
                scheduler.free_windows(expert, from, to)?
            } else {
                scheduler.resolve(expert, from, to)?.clipped()
            };
            if json {
                print_json(&windows)?;
            } else if windows.is_empty() {
                println!("No availability.");
            } else {
                print_windows(&windows, &tz);
            }
        }
    }

    Ok(())
}

fn parse_time(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    parse_instant(input, tz).with_context(|| format!("Failed to parse time: '{}'", input))
}

fn print_decision(decision: &BookingDecision, request: &TimeWindow, tz: &Tz) {
    match decision {
        BookingDecision::Bookable => {
            println!("Bookable: {}", format_window(request, tz));
        }
        BookingDecision::Unavailable {
            reason,
            alternatives,
        } => {
            let why = match reason {
                UnavailableReason::OutsideAvailability => "outside availability",
                UnavailableReason::Conflict => "conflicts with an existing appointment",
            };
            println!("Not bookable ({}): {}", why, format_window(request, tz));
            if alternatives.is_empty() {
                println!("No alternatives found.");
            } else {
                println!("Alternatives:");
                print_windows(alternatives, tz);
            }
        }
    }
}

fn print_windows(windows: &[TimeWindow], tz: &Tz) {
    for (i, window) in windows.iter().enumerate() {
        println!("  {}. {}", i + 1, format_window(window, tz));
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
}
