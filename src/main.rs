use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use rusqlite::Connection;

use vigil::cli::args::{Cli, Commands};
use vigil::cli::handlers;
use vigil::config::AppConfig;
use vigil::db::migrations::run_migrations;
use vigil::progress::{CalendarDate, Clock, FixedClock};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    let clock: Box<dyn Clock> = match &cli.today {
        Some(day) => {
            let date: CalendarDate = day.parse().context("Parsing --today")?;
            Box::new(FixedClock::new(date))
        }
        None => Box::new(config.clock.system_clock()?),
    };
    let clock = clock.as_ref();
    debug!("today is {}", clock.today());

    let db_path = AppConfig::ensure_db_dir()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    run_migrations(&conn)?;

    match &cli.command {
        Commands::Challenge { action } => {
            handlers::handle_challenge(&conn, clock, &config, action)?;
        }
        Commands::Checkin { id, reflection } => {
            handlers::handle_checkin(&conn, clock, *id, reflection.as_deref())?;
        }
        Commands::Streak => {
            handlers::handle_streak(&conn, clock, cli.json)?;
        }
        Commands::Progress => {
            handlers::handle_progress(&conn, clock, &config, cli.json)?;
        }
        Commands::Journey { id, day: None } => {
            handlers::handle_journey(&conn, clock, *id, cli.json)?;
        }
        Commands::Journey { id, day: Some(day) } => {
            handlers::handle_journey_day(&conn, clock, *id, *day, cli.json)?;
        }
        Commands::Chapter {
            id,
            day,
            title,
            focus,
        } => {
            handlers::handle_chapter(&conn, *id, *day, title, focus.as_deref())?;
        }
        Commands::Trophies => {
            handlers::handle_trophies(&conn, cli.json)?;
        }
        Commands::Trophy { id } => {
            handlers::handle_trophy(&conn, *id, cli.json)?;
        }
    }

    Ok(())
}
