//! `caltile` CLI — lay out calendar events on day, week, group and month grids.
//!
//! ## Usage
//!
//! ```sh
//! # Day view (events JSON on stdin, layout JSON on stdout)
//! cat events.json | caltile day --date 2026-03-16
//!
//! # Week view with a config file, written to a file
//! caltile week --date 2026-03-16 -i events.json -c calendar.json -o week.json
//!
//! # One time grid per room (views.group.groupBy = "room")
//! caltile group --date 2026-03-16 -i events.json -c calendar.json
//!
//! # Month view with drop diagnostics
//! caltile -vv month --month 2026-03 -i events.json
//! ```

use anyhow::{Context, Result};
use cal_tiler::{order_groups, CalendarConfig, DayTiler, Event, MonthTiler};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{info, LevelFilter};
use std::io::{self, Read};

#[derive(Parser)]
#[command(
    name = "caltile",
    version,
    about = "Lay out calendar events on day, week, group and month grids"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct IoArgs {
    /// Events JSON file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Calendar config JSON file (built-in defaults if omitted)
    #[arg(short, long)]
    config: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a single day's time grid
    Day {
        /// Date to render (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Lay out every visible day of the week containing a date
    Week {
        /// Any date within the week to render (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Lay out a day with each group of events on its own time grid
    Group {
        /// Date to render (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Lay out the month grid covering a calendar month
    Month {
        /// Month to render (YYYY-MM)
        #[arg(long, value_parser = parse_month)]
        month: (i32, u32),
        #[command(flatten)]
        io: IoArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Day { date, io } => {
            let config = read_config(io.config.as_deref())?;
            let events = read_events(io.input.as_deref())?;
            let view = config.day();
            info!(
                "day {}: {} events, {}-minute slots",
                date,
                events.len(),
                view.slot_duration.minutes()
            );

            let tiler = DayTiler::new(view.tiler_config(), config.time_utils());
            let tiles = tiler
                .layout(&events, date)
                .context("Failed to lay out day")?;
            write_json(io.output.as_deref(), &tiles)?;
        }
        Commands::Week { date, io } => {
            let config = read_config(io.config.as_deref())?;
            let events = read_events(io.input.as_deref())?;
            let view = config.week();
            info!(
                "week of {}: {} events on {} visible days",
                date,
                events.len(),
                view.show_days.len()
            );

            let tiler = DayTiler::new(view.tiler_config(), config.time_utils());
            let days = tiler
                .layout_week(&events, date, &view.show_days)
                .context("Failed to lay out week")?;
            write_json(io.output.as_deref(), &days)?;
        }
        Commands::Group { date, io } => {
            let config = read_config(io.config.as_deref())?;
            let events = read_events(io.input.as_deref())?;
            let view = config.group();
            info!(
                "group day {}: {} events grouped by {}",
                date,
                events.len(),
                view.group_by.as_deref().unwrap_or("nothing")
            );

            let tiler = DayTiler::new(view.tiler_config(), config.time_utils());
            let mut groups = tiler
                .layout_groups(&events, date, |e| e.group_key(view.group_by.as_deref()))
                .context("Failed to lay out groups")?;
            order_groups(&mut groups, &view.group_order);
            write_json(io.output.as_deref(), &groups)?;
        }
        Commands::Month {
            month: (year, month),
            io,
        } => {
            let config = read_config(io.config.as_deref())?;
            let events = read_events(io.input.as_deref())?;
            let view = config.month();
            info!(
                "month {}-{:02}: {} events, at most {} per date",
                year,
                month,
                events.len(),
                view.max_events_per_slot.get()
            );

            let tiler = MonthTiler::new(view.tiler_config(), config.time_utils());
            let weeks = tiler
                .layout_month(
                    &events,
                    year,
                    month,
                    view.show_sibling_month_dates_events,
                )
                .context("Failed to lay out month")?;
            write_json(io.output.as_deref(), &weeks)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` still wins over the `-v` count when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Parse `YYYY-MM` into a year and a 1-based month.
fn parse_month(s: &str) -> std::result::Result<(i32, u32), String> {
    let (year, month) = s
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("invalid year in '{}'", s))?;
    let month: u32 = month
        .parse()
        .map_err(|_| format!("invalid month in '{}'", s))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month must be 1-12, got {}", month));
    }
    Ok((year, month))
}

fn read_config(path: Option<&str>) -> Result<CalendarConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            CalendarConfig::from_json(&json)
                .with_context(|| format!("Invalid calendar config: {}", path))
        }
        None => Ok(CalendarConfig::default()),
    }
}

/// Read and validate the events array.
fn read_events(path: Option<&str>) -> Result<Vec<Event>> {
    let json = read_input(path)?;
    let events: Vec<Event> =
        serde_json::from_str(&json).context("Failed to parse events JSON")?;
    for event in &events {
        event.validate()?;
    }
    Ok(events)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: serde::Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
