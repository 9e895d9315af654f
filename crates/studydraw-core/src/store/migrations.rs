//! Database schema migrations for studydraw.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use indoc::indoc;
use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations.
///
/// # Errors
/// Returns an error if a migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version, 0 for a fresh database.
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: baseline schema.
///
/// One table per collection. `prize_entries` carries the
/// UNIQUE(student_id, source_id) index that backs award idempotency;
/// `daily_quest_completions` models the grow-only completion set so that
/// adding a completion is a single `INSERT OR IGNORE`.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(indoc! {"
        CREATE TABLE IF NOT EXISTS students (
            uid                  TEXT PRIMARY KEY,
            display_name         TEXT NOT NULL,
            avatar               TEXT NOT NULL,
            total_entries        INTEGER NOT NULL DEFAULT 0,
            current_week_entries INTEGER NOT NULL DEFAULT 0,
            current_streak       INTEGER NOT NULL DEFAULT 0,
            longest_streak       INTEGER NOT NULL DEFAULT 0,
            total_focus_minutes  INTEGER NOT NULL DEFAULT 0,
            grace_used_this_week INTEGER NOT NULL DEFAULT 0,
            last_active_date     TEXT,
            week                 TEXT NOT NULL,
            parent_uid           TEXT,
            created_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS parents (
            uid                   TEXT PRIMARY KEY,
            display_name          TEXT NOT NULL,
            plan                  TEXT NOT NULL DEFAULT 'explorer',
            notifications_enabled INTEGER NOT NULL DEFAULT 1,
            weekly_report_enabled INTEGER NOT NULL DEFAULT 1,
            created_at            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS parent_links (
            parent_uid         TEXT NOT NULL,
            child_uid          TEXT NOT NULL,
            child_display_name TEXT NOT NULL,
            child_avatar       TEXT NOT NULL,
            linked_at          TEXT NOT NULL,
            PRIMARY KEY (parent_uid, child_uid)
        );

        CREATE TABLE IF NOT EXISTS focus_sessions (
            id               TEXT PRIMARY KEY,
            student_id       TEXT NOT NULL,
            quest_id         TEXT,
            quest_title      TEXT,
            duration_minutes INTEGER NOT NULL,
            quality          TEXT NOT NULL,
            date             TEXT NOT NULL,
            started_at       TEXT NOT NULL,
            completed_at     TEXT NOT NULL,
            entries_earned   INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS prize_entries (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            count      INTEGER NOT NULL,
            reason     TEXT NOT NULL,
            source_id  TEXT NOT NULL,
            date       TEXT NOT NULL,
            week       TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (student_id, source_id)
        );

        CREATE TABLE IF NOT EXISTS daily_quests (
            key        TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            date       TEXT NOT NULL,
            quest_ids  TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_quest_completions (
            key      TEXT NOT NULL,
            quest_id TEXT NOT NULL,
            PRIMARY KEY (key, quest_id)
        );

        CREATE TABLE IF NOT EXISTS check_ins (
            key        TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            date       TEXT NOT NULL,
            mood       INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS quests (
            id               TEXT PRIMARY KEY,
            title            TEXT NOT NULL,
            description      TEXT NOT NULL,
            category         TEXT NOT NULL,
            duration_minutes INTEGER NOT NULL,
            entries_reward   INTEGER NOT NULL,
            emoji            TEXT NOT NULL,
            is_default       INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS parent_boosts (
            id         TEXT PRIMARY KEY,
            parent_uid TEXT NOT NULL,
            child_uid  TEXT NOT NULL,
            count      INTEGER NOT NULL,
            note       TEXT NOT NULL DEFAULT '',
            date       TEXT NOT NULL,
            week       TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS invite_codes (
            code       TEXT PRIMARY KEY,
            parent_uid TEXT NOT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            used_by    TEXT,
            used_at    TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_student_date
            ON focus_sessions(student_id, date);
        CREATE INDEX IF NOT EXISTS idx_entries_student_created
            ON prize_entries(student_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_entries_student_week
            ON prize_entries(student_id, week);
        CREATE INDEX IF NOT EXISTS idx_boosts_pair_week
            ON parent_boosts(parent_uid, child_uid, week);
    "})?;

    set_schema_version(conn, 1)?;
    Ok(())
}
