use anyhow::{Result, anyhow, bail};
use chrono::{SecondsFormat, Utc};
use log::{debug, info};
use rusqlite::Connection;
use serde_json::json;

use crate::cli::args::ChallengeCommands;
use crate::config::AppConfig;
use crate::db::repository::{ChallengeRepo, ChapterRepo, CheckinRepo, ParticipantRepo, TrophyRepo};
use crate::models::{Challenge, ChallengeKind, ChallengeStatus, JourneyChapter, ParticipantStatus};
use crate::progress::{
    CalendarDate, Clock, JourneyProgress, JourneyProgressCalculator, StreakCalculator, TrailStatus,
    summarize,
};
use crate::utils::format::{format_days, pad_to_width, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

const TITLE_WIDTH: usize = 28;

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_challenge(conn: &Connection, id: i64) -> Result<Challenge> {
    ChallengeRepo::get(conn, id)?.ok_or_else(|| anyhow!("No challenge with id {}", id))
}

fn journey_progress(clock: &dyn Clock, challenge: &Challenge) -> Result<JourneyProgress> {
    let calc = JourneyProgressCalculator::new(clock);
    Ok(calc.compute(challenge.start_date, challenge.duration_days)?)
}

// ─── Challenges ──────────────────────────────────────────────────────────────

pub fn handle_challenge(
    conn: &Connection,
    clock: &dyn Clock,
    config: &AppConfig,
    action: &ChallengeCommands,
) -> Result<()> {
    match action {
        ChallengeCommands::Add {
            title,
            kind,
            days,
            start,
        } => {
            let kind = match kind {
                Some(k) => k.parse::<ChallengeKind>()?,
                None => config.journey.kind()?,
            };
            let days = days.unwrap_or(config.journey.default_days as i64);
            let start = match start {
                Some(s) => s.parse::<CalendarDate>()?,
                None => clock.today(),
            };
            let now = now_timestamp();
            let id = ChallengeRepo::create(conn, title, kind, days, start, &now)?;
            ParticipantRepo::join(conn, id, &now)?;
            info!("joined challenge {}", id);
            println_colored!(
                GREEN,
                "  ✓ Created #{} {} ({}, {} from {})",
                id,
                title,
                kind,
                format_days(days as u32),
                start
            );
        }
        ChallengeCommands::List => {
            let challenges = ChallengeRepo::list(conn)?;
            println!();
            if challenges.is_empty() {
                println_colored!(DIM, "  No challenges yet. Create one with `vigil challenge add`.");
            }
            for c in &challenges {
                let progress = journey_progress(clock, c)?;
                let state = if c.status == ChallengeStatus::Canceled {
                    "canceled".to_string()
                } else if progress.is_completed {
                    "finished".to_string()
                } else {
                    format!("day {}/{}", progress.day_index, progress.total_days)
                };
                println!(
                    "  #{:<4} {}  {:<11} {}",
                    c.id,
                    pad_to_width(&c.title, TITLE_WIDTH),
                    c.kind.display_name(),
                    state
                );
            }
            println!();
        }
        ChallengeCommands::Complete { id } => {
            let challenge = require_challenge(conn, *id)?;
            if !ParticipantRepo::set_status(conn, *id, ParticipantStatus::Completed)? {
                bail!("You have not joined challenge #{}", id);
            }
            println_colored!(GOLD, "  🏆 {} completed", challenge.title);
        }
        ChallengeCommands::Cancel { id } => {
            let challenge = require_challenge(conn, *id)?;
            ChallengeRepo::set_status(conn, *id, ChallengeStatus::Canceled)?;
            println_colored!(AMBER, "  {} canceled", challenge.title);
        }
        ChallengeCommands::Leave { id } => {
            let challenge = require_challenge(conn, *id)?;
            if !ParticipantRepo::set_status(conn, *id, ParticipantStatus::Quit)? {
                bail!("You have not joined challenge #{}", id);
            }
            info!("left challenge {}", id);
            println_colored!(AMBER, "  You left {}", challenge.title);
        }
    }
    Ok(())
}

// ─── Check-in ────────────────────────────────────────────────────────────────

pub fn handle_checkin(
    conn: &Connection,
    clock: &dyn Clock,
    id: i64,
    reflection: Option<&str>,
) -> Result<()> {
    let challenge = require_challenge(conn, id)?;
    if challenge.status == ChallengeStatus::Canceled {
        bail!("Challenge #{} was canceled", id);
    }
    let participation = ParticipantRepo::get(conn, id)?
        .ok_or_else(|| anyhow!("You have not joined challenge #{}", id))?;
    if participation.status == ParticipantStatus::Quit {
        bail!("You left challenge #{}", id);
    }

    let today = clock.today();
    if today < challenge.start_date {
        bail!("Challenge #{} starts on {}", id, challenge.start_date);
    }
    let progress = journey_progress(clock, &challenge)?;
    if progress.is_completed {
        bail!(
            "Challenge #{} ended after {}",
            id,
            format_days(progress.total_days)
        );
    }

    let inserted = CheckinRepo::check_in(
        conn,
        id,
        today,
        Some(progress.day_index),
        reflection,
        &now_timestamp(),
    )?;

    if inserted {
        println_colored!(
            GREEN,
            "  ✓ {} — day {} of {} checked in",
            challenge.title,
            progress.day_index,
            progress.total_days
        );
    } else if reflection.is_some() {
        println_colored!(GREEN, "  ✓ Reflection updated for day {}", progress.day_index);
    } else {
        println_colored!(DIM, "  Already checked in today");
    }

    let distinct = CheckinRepo::dates_for_challenge(conn, id)?.len() as i64;
    if distinct >= challenge.duration_days && participation.status == ParticipantStatus::Active {
        ParticipantRepo::set_status(conn, id, ParticipantStatus::Completed)?;
        println_colored!(GOLD, "  🏆 Every day done — {} completed", challenge.title);
    }

    let streak = StreakCalculator::new(clock).compute(CheckinRepo::distinct_dates(conn)?)?;
    println_colored!(
        BOLD,
        "  Streak: {} (best {})",
        format_days(streak.current),
        format_days(streak.best)
    );
    Ok(())
}

// ─── Streak ──────────────────────────────────────────────────────────────────

pub fn handle_streak(conn: &Connection, clock: &dyn Clock, json: bool) -> Result<()> {
    let dates = CheckinRepo::distinct_dates(conn)?;
    let streak = StreakCalculator::new(clock).compute(&dates)?;
    debug!("streak from {} dates: {:?}", dates.len(), streak);

    if json {
        return print_json(&serde_json::to_value(streak)?);
    }

    println!();
    println_colored!(
        BOLD,
        "  Streak:      {} current  |  {} best",
        format_days(streak.current),
        format_days(streak.best)
    );
    println!("  Active days: {}", streak.active_days);
    println!();
    Ok(())
}

// ─── Profile progress ────────────────────────────────────────────────────────

pub fn handle_progress(
    conn: &Connection,
    clock: &dyn Clock,
    config: &AppConfig,
    json: bool,
) -> Result<()> {
    let dates = CheckinRepo::distinct_dates(conn)?;
    let trophies = TrophyRepo::load(conn)?;
    let progress = summarize(&dates, trophies, clock.today(), config.profile.trophies_preview)?;

    if json {
        return print_json(&serde_json::to_value(&progress)?);
    }

    println!();
    println_colored!(GOLD, "  Consistency");
    println!();
    println!("  Active days:  {}", progress.active_days_total);
    println_colored!(
        BOLD,
        "  Streak:       {} current  |  {} best",
        format_days(progress.streak_current),
        format_days(progress.streak_best)
    );
    println!("  Completed:    {}", progress.challenges_completed_total);

    if !progress.trophies_preview.is_empty() {
        println!();
        println_colored!(GOLD, "  Recent trophies");
        for t in &progress.trophies_preview {
            println!(
                "  🏆 {}  {:<11} {}",
                pad_to_width(&t.title, TITLE_WIDTH),
                t.kind.display_name(),
                format_days(t.duration_days as u32)
            );
        }
    }
    println!();
    Ok(())
}

// ─── Journey ─────────────────────────────────────────────────────────────────

pub fn handle_journey(conn: &Connection, clock: &dyn Clock, id: i64, json: bool) -> Result<()> {
    let challenge = require_challenge(conn, id)?;
    let progress = journey_progress(clock, &challenge)?;
    let completed_days = CheckinRepo::completed_day_indices(conn, id)?;
    let chapters = ChapterRepo::list(conn, id, None)?;
    let title_for = |day: u32| chapters.iter().find(|c| c.day_index == day);
    let trail = progress.trail(&completed_days);

    if json {
        let days: Vec<_> = trail
            .iter()
            .map(|(day, status)| {
                json!({
                    "day": day,
                    "status": status,
                    "title": title_for(*day).map(|c| c.title.as_str()),
                })
            })
            .collect();
        return print_json(&json!({
            "challenge": challenge,
            "progress": progress,
            "trail": days,
        }));
    }

    println!();
    println_colored!(GOLD, "  {} ({})", challenge.title, challenge.kind);
    if progress.is_completed {
        println_colored!(GREEN, "  Completed — {}", format_days(progress.total_days));
    } else {
        println_colored!(
            BOLD,
            "  Day {} of {}  {}",
            progress.day_index,
            progress.total_days,
            progress_bar(progress.day_index, progress.total_days, 14)
        );
        println_colored!(DIM, "  {} to go", format_days(progress.days_remaining()));
    }
    println!();

    for (day, status) in &trail {
        let title = title_for(*day).map(|c| c.title.as_str()).unwrap_or("");
        let line = format!("  Day {:>3}  {}  {}", day, pad_to_width(title, TITLE_WIDTH), status.as_str());
        match status {
            TrailStatus::Completed => println_colored!(GREEN, "{}", line),
            TrailStatus::Available => println_colored!(BOLD, "{}", line),
            TrailStatus::Missed => println_colored!(RED, "{}", line),
            TrailStatus::Locked => println_colored!(DIM, "{}", line),
        }
        if *day % 7 == 0 && *day != progress.total_days {
            println_colored!(AMBER, "  ── week {} ──", day / 7);
        }
    }
    println!();
    Ok(())
}

pub fn handle_journey_day(
    conn: &Connection,
    clock: &dyn Clock,
    id: i64,
    day: u32,
    json: bool,
) -> Result<()> {
    let challenge = require_challenge(conn, id)?;
    let progress = journey_progress(clock, &challenge)?;
    if day == 0 || day > progress.total_days {
        bail!("Day {} is outside {} (1..={})", day, challenge.title, progress.total_days);
    }
    let chapter = ChapterRepo::list(conn, id, Some(day))?
        .into_iter()
        .find(|c| c.day_index == day);
    let checkin = CheckinRepo::for_day(conn, id, day)?;
    let completed: Vec<u32> = checkin.iter().filter_map(|c| c.day_index).collect();
    let status = progress.trail_status(day, &completed);

    if json {
        return print_json(&json!({
            "day": day,
            "status": status,
            "chapter": chapter,
            "checkin": checkin,
        }));
    }

    println!();
    println_colored!(GOLD, "  {}: day {} of {}", challenge.title, day, progress.total_days);
    if let Some(c) = &chapter {
        println_colored!(BOLD, "  {}", c.title);
        if let Some(focus) = &c.focus {
            println_colored!(DIM, "  {}", focus);
        }
    }
    match &checkin {
        Some(c) => {
            println_colored!(GREEN, "  ✓ Checked in {}", c.date_key);
            if let Some(text) = &c.reflection {
                println!("  \"{}\"", text);
            }
        }
        None => println_colored!(DIM, "  {}", status.as_str()),
    }
    println!();
    Ok(())
}

// ─── Chapters ────────────────────────────────────────────────────────────────

pub fn handle_chapter(
    conn: &Connection,
    id: i64,
    day: u32,
    title: &str,
    focus: Option<&str>,
) -> Result<()> {
    let challenge = require_challenge(conn, id)?;
    if day == 0 || i64::from(day) > challenge.duration_days {
        bail!(
            "Day {} is outside {} (1..={})",
            day,
            challenge.title,
            challenge.duration_days
        );
    }
    ChapterRepo::upsert(
        conn,
        &JourneyChapter {
            challenge_id: id,
            day_index: day,
            title: title.to_string(),
            focus: focus.map(str::to_string),
        },
    )?;
    println_colored!(GREEN, "  ✓ Day {} of {}: {}", day, challenge.title, title);
    Ok(())
}

// ─── Trophies ────────────────────────────────────────────────────────────────

pub fn handle_trophies(conn: &Connection, json: bool) -> Result<()> {
    let trophies = TrophyRepo::load(conn)?;
    if json {
        return print_json(&serde_json::to_value(&trophies)?);
    }

    println!();
    if trophies.is_empty() {
        println_colored!(DIM, "  No trophies yet");
    }
    for t in &trophies {
        println!(
            "  🏆 {}  {:<11} {:<8} {}",
            pad_to_width(&t.title, TITLE_WIDTH),
            t.kind.display_name(),
            format_days(t.duration_days as u32),
            t.completed_at
        );
    }
    println!();
    Ok(())
}

pub fn handle_trophy(conn: &Connection, id: i64, json: bool) -> Result<()> {
    let challenge = require_challenge(conn, id)?;
    let checkins = CheckinRepo::for_challenge(conn, id)?;
    let done = u32::try_from(checkins.len()).unwrap_or(u32::MAX);
    let total = u32::try_from(challenge.duration_days).unwrap_or(u32::MAX);

    if json {
        return print_json(&json!({
            "challenge": challenge,
            "completed": checkins.len(),
            "checkins": checkins,
        }));
    }

    println!();
    println_colored!(GOLD, "  🏆 {} ({})", challenge.title, challenge.kind);
    println_colored!(DIM, "  {} → {}", challenge.start_date, challenge.end_date);
    println_colored!(BOLD, "  {}/{}  {}", done, total, progress_bar(done, total, 14));
    println!();
    if checkins.is_empty() {
        println_colored!(DIM, "  No check-ins yet");
    }
    for c in &checkins {
        let day = c.day_index.map(|d| format!("day {}", d)).unwrap_or_default();
        println_colored!(GREEN, "  ✓ {}  {:<8}", c.date_key, day);
        if let Some(text) = &c.reflection {
            println_colored!(DIM, "      {}", text);
        }
    }
    println!();
    Ok(())
}
