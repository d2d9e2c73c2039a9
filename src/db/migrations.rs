use anyhow::Result;
use log::debug;
use rusqlite::Connection;

use super::repository::MetaRepo;

pub const SCHEMA_VERSION: &str = "1";

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS challenges (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            title          TEXT NOT NULL,
            kind           TEXT NOT NULL
                           CHECK(kind IN ('reading','meditation','fasting','communion')),
            duration_days  INTEGER NOT NULL CHECK(duration_days > 0),
            start_date     TEXT NOT NULL,
            end_date       TEXT NOT NULL,
            status         TEXT NOT NULL DEFAULT 'active'
                           CHECK(status IN ('active','completed','canceled')),
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS challenge_participants (
            challenge_id  INTEGER PRIMARY KEY REFERENCES challenges(id),
            status        TEXT NOT NULL DEFAULT 'active'
                          CHECK(status IN ('active','quit','completed')),
            joined_at     TEXT NOT NULL,
            progress      INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS daily_checkins (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            challenge_id  INTEGER NOT NULL REFERENCES challenges(id),
            date_key      TEXT NOT NULL,
            completed_at  TEXT NOT NULL,
            day_index     INTEGER,
            reflection    TEXT,
            UNIQUE(challenge_id, date_key)
        );

        CREATE INDEX IF NOT EXISTS idx_checkins_date ON daily_checkins(date_key);

        CREATE TABLE IF NOT EXISTS journey_chapters (
            challenge_id  INTEGER NOT NULL REFERENCES challenges(id),
            day_index     INTEGER NOT NULL CHECK(day_index > 0),
            title         TEXT NOT NULL,
            focus         TEXT,
            PRIMARY KEY (challenge_id, day_index)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;

    MetaRepo::set(conn, "schema_version", SCHEMA_VERSION)?;
    debug!("schema at version {}", SCHEMA_VERSION);
    Ok(())
}
