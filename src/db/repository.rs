use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;

use crate::models::{
    Challenge, ChallengeKind, ChallengeStatus, Checkin, JourneyChapter, ParticipantStatus,
    Participation,
};
use crate::progress::{CalendarDate, ProgressError, Trophy, derive_trophies};

// ─── Row decoding ────────────────────────────────────────────────────────────

const CHALLENGE_COLUMNS: &str =
    "c.id, c.title, c.kind, c.duration_days, c.start_date, c.end_date, c.status, c.created_at";

struct ChallengeRow {
    id: i64,
    title: String,
    kind: String,
    duration_days: i64,
    start_date: String,
    end_date: String,
    status: String,
    created_at: String,
}

impl ChallengeRow {
    /// Reads the eight `CHALLENGE_COLUMNS` starting at `offset`.
    fn read(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(offset)?,
            title: row.get(offset + 1)?,
            kind: row.get(offset + 2)?,
            duration_days: row.get(offset + 3)?,
            start_date: row.get(offset + 4)?,
            end_date: row.get(offset + 5)?,
            status: row.get(offset + 6)?,
            created_at: row.get(offset + 7)?,
        })
    }

    fn into_challenge(self) -> Result<Challenge> {
        Ok(Challenge {
            id: self.id,
            kind: ChallengeKind::from_str(&self.kind)?,
            duration_days: self.duration_days,
            start_date: parse_date(&self.start_date)?,
            end_date: parse_date(&self.end_date)?,
            status: ChallengeStatus::from_str(&self.status)?,
            title: self.title,
            created_at: self.created_at,
        })
    }
}

fn parse_date(s: &str) -> Result<CalendarDate> {
    s.parse::<CalendarDate>()
        .with_context(|| format!("Stored date '{}' is not a calendar day", s))
}

// ─── Challenge repo ──────────────────────────────────────────────────────────

pub struct ChallengeRepo;

impl ChallengeRepo {
    pub fn create(
        conn: &Connection,
        title: &str,
        kind: ChallengeKind,
        duration_days: i64,
        start_date: CalendarDate,
        created_at: &str,
    ) -> Result<i64> {
        if duration_days <= 0 {
            return Err(ProgressError::NonPositiveDuration {
                days: duration_days,
            }
            .into());
        }
        let end_date = start_date
            .add_days(duration_days)
            .ok_or_else(|| anyhow!("Duration too large: {} days from {}", duration_days, start_date))?;
        conn.execute(
            "INSERT INTO challenges
                (title, kind, duration_days, start_date, end_date, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'active', ?6)",
            params![
                title,
                kind.as_str(),
                duration_days,
                start_date.to_string(),
                end_date.to_string(),
                created_at
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("created challenge {} '{}' ({} days from {})", id, title, duration_days, start_date);
        Ok(id)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Challenge>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM challenges c WHERE c.id = ?1", CHALLENGE_COLUMNS),
                params![id],
                |row| ChallengeRow::read(row, 0),
            )
            .optional()?;
        row.map(ChallengeRow::into_challenge).transpose()
    }

    pub fn list(conn: &Connection) -> Result<Vec<Challenge>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM challenges c ORDER BY c.start_date DESC, c.id DESC",
            CHALLENGE_COLUMNS
        ))?;
        let rows = stmt.query_map([], |row| ChallengeRow::read(row, 0))?;

        let mut result = Vec::new();
        for r in rows {
            result.push(r?.into_challenge()?);
        }
        Ok(result)
    }

    pub fn set_status(conn: &Connection, id: i64, status: ChallengeStatus) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE challenges SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(changed > 0)
    }
}

// ─── Participant repo ────────────────────────────────────────────────────────

pub struct ParticipantRepo;

impl ParticipantRepo {
    /// Joins the challenge unless already a participant. Returns whether a row was added.
    pub fn join(conn: &Connection, challenge_id: i64, joined_at: &str) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO challenge_participants (challenge_id, status, joined_at, progress)
             VALUES (?1, 'active', ?2, 0)",
            params![challenge_id, joined_at],
        )?;
        Ok(inserted > 0)
    }

    pub fn get(conn: &Connection, challenge_id: i64) -> Result<Option<Participation>> {
        Ok(Self::query(conn, "WHERE p.challenge_id = ?1", params![challenge_id])?
            .into_iter()
            .next())
    }

    pub fn set_status(conn: &Connection, challenge_id: i64, status: ParticipantStatus) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE challenge_participants SET status = ?1 WHERE challenge_id = ?2",
            params![status.as_str(), challenge_id],
        )?;
        Ok(changed > 0)
    }

    pub fn increment_progress(conn: &Connection, challenge_id: i64) -> Result<()> {
        conn.execute(
            "UPDATE challenge_participants SET progress = progress + 1 WHERE challenge_id = ?1",
            params![challenge_id],
        )?;
        Ok(())
    }

    pub fn completed(conn: &Connection) -> Result<Vec<Participation>> {
        Self::query(conn, "WHERE p.status = 'completed'", [])
    }

    pub fn all(conn: &Connection) -> Result<Vec<Participation>> {
        Self::query(conn, "", [])
    }

    fn query<P: rusqlite::Params>(
        conn: &Connection,
        filter: &str,
        params: P,
    ) -> Result<Vec<Participation>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, p.status, p.joined_at, p.progress
             FROM challenge_participants p
             JOIN challenges c ON c.id = p.challenge_id
             {}
             ORDER BY p.joined_at, c.id",
            CHALLENGE_COLUMNS, filter
        ))?;

        let rows = stmt.query_map(params, |row| {
            Ok((
                ChallengeRow::read(row, 0)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, i64>(10)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (challenge, status, joined_at, progress) = r?;
            result.push(Participation {
                challenge: challenge.into_challenge()?,
                status: ParticipantStatus::from_str(&status)?,
                joined_at,
                progress,
            });
        }
        Ok(result)
    }
}

// ─── Check-in repo ───────────────────────────────────────────────────────────

pub struct CheckinRepo;

impl CheckinRepo {
    /// Records a check-in for `date` unless one already exists for that challenge
    /// and day. A repeat with a reflection only replaces the reflection.
    ///
    /// Returns `true` when a new check-in was stored.
    pub fn check_in(
        conn: &Connection,
        challenge_id: i64,
        date: CalendarDate,
        day_index: Option<u32>,
        reflection: Option<&str>,
        now: &str,
    ) -> Result<bool> {
        let tx = conn.unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO daily_checkins
                (challenge_id, date_key, completed_at, day_index, reflection)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![challenge_id, date.to_string(), now, day_index, reflection],
        )? > 0;

        if inserted {
            ParticipantRepo::increment_progress(&tx, challenge_id)?;
            debug!("check-in stored for challenge {} on {}", challenge_id, date);
        } else if let Some(text) = reflection {
            tx.execute(
                "UPDATE daily_checkins SET reflection = ?1
                 WHERE challenge_id = ?2 AND date_key = ?3",
                params![text, challenge_id, date.to_string()],
            )?;
            debug!("reflection updated for challenge {} on {}", challenge_id, date);
        } else {
            warn!("challenge {} already checked in on {}", challenge_id, date);
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// Every calendar day with at least one check-in, newest first.
    pub fn distinct_dates(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt =
            conn.prepare("SELECT DISTINCT date_key FROM daily_checkins ORDER BY date_key DESC")?;
        stmt.query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn dates_for_challenge(conn: &Connection, challenge_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT date_key FROM daily_checkins WHERE challenge_id = ?1 ORDER BY date_key DESC",
        )?;
        stmt.query_map(params![challenge_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn completed_day_indices(conn: &Connection, challenge_id: i64) -> Result<Vec<u32>> {
        let mut stmt = conn.prepare(
            "SELECT day_index FROM daily_checkins
             WHERE challenge_id = ?1 AND day_index IS NOT NULL
             ORDER BY day_index",
        )?;
        stmt.query_map(params![challenge_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<u32>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn all(conn: &Connection) -> Result<Vec<Checkin>> {
        Self::query(conn, "", [])
    }

    /// One challenge's check-ins, oldest day first.
    pub fn for_challenge(conn: &Connection, challenge_id: i64) -> Result<Vec<Checkin>> {
        Self::query(conn, "WHERE challenge_id = ?1", params![challenge_id])
    }

    pub fn for_day(conn: &Connection, challenge_id: i64, day_index: u32) -> Result<Option<Checkin>> {
        let mut found = Self::query(
            conn,
            "WHERE challenge_id = ?1 AND day_index = ?2",
            params![challenge_id, day_index],
        )?;
        Ok(if found.is_empty() { None } else { Some(found.remove(0)) })
    }

    fn query<P: rusqlite::Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<Checkin>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT id, challenge_id, date_key, completed_at, day_index, reflection
             FROM daily_checkins
             {}
             ORDER BY date_key, id",
            filter
        ))?;

        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<u32>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, challenge_id, date_key, completed_at, day_index, reflection) = r?;
            result.push(Checkin {
                id: Some(id),
                challenge_id,
                date_key: parse_date(&date_key)?,
                completed_at,
                day_index,
                reflection,
            });
        }
        Ok(result)
    }
}

// ─── Chapter repo ────────────────────────────────────────────────────────────

pub struct ChapterRepo;

impl ChapterRepo {
    pub fn upsert(conn: &Connection, chapter: &JourneyChapter) -> Result<()> {
        conn.execute(
            "INSERT INTO journey_chapters (challenge_id, day_index, title, focus)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(challenge_id, day_index) DO UPDATE SET title = ?3, focus = ?4",
            params![chapter.challenge_id, chapter.day_index, chapter.title, chapter.focus],
        )?;
        Ok(())
    }

    /// Chapters of a journey in day order, optionally only up to `limit_day`.
    pub fn list(
        conn: &Connection,
        challenge_id: i64,
        limit_day: Option<u32>,
    ) -> Result<Vec<JourneyChapter>> {
        let mut stmt = conn.prepare(
            "SELECT challenge_id, day_index, title, focus FROM journey_chapters
             WHERE challenge_id = ?1 AND (?2 IS NULL OR day_index <= ?2)
             ORDER BY day_index",
        )?;

        let rows = stmt.query_map(params![challenge_id, limit_day], |row| {
            Ok(JourneyChapter {
                challenge_id: row.get(0)?,
                day_index: row.get(1)?,
                title: row.get(2)?,
                focus: row.get(3)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── Trophies ────────────────────────────────────────────────────────────────

pub struct TrophyRepo;

impl TrophyRepo {
    /// Completed challenges, newest first.
    ///
    /// Participations explicitly marked completed win. When there are none,
    /// completion is inferred from check-in counts.
    pub fn load(conn: &Connection) -> Result<Vec<Trophy>> {
        let completed = ParticipantRepo::completed(conn)?;
        let mut trophies: Vec<Trophy> = completed
            .iter()
            .map(|p| Trophy::from_participation(p, p.challenge.end_date.to_string()))
            .collect();

        if trophies.is_empty() {
            let participations = ParticipantRepo::all(conn)?;
            let checkins = CheckinRepo::all(conn)?;
            trophies = derive_trophies(&participations, &checkins);
            if !trophies.is_empty() {
                warn!(
                    "no challenge marked completed; inferred {} from check-ins",
                    trophies.len()
                );
            }
        }

        trophies.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(trophies)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}
