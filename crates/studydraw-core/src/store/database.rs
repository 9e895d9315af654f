//! SQLite-backed document store for the reward core.
//!
//! Each method is one atomic statement against one table. The components
//! build their guarantees out of exactly these primitives:
//! - `insert_*_if_absent` -- atomic create-if-absent, reports whether the
//!   row was actually written
//! - `increment_*` / `apply_streak` / `consume_grace` -- field-level atomic
//!   updates, never whole-row rewrites
//! - `mark_code_used` / `rollover_week` -- conditional single-row updates
//!   that close check-then-write races

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::model::{
    Avatar, DailyCheckIn, DailyQuestAssignment, EntryReason, FocusQuality, FocusSession,
    InviteCode, ParentBoost, ParentChildLink, ParentProfile, PlanTier, PrizeEntry, Quest,
    QuestCategory, QuestRef, StudentProfile,
};

use super::{data_dir, migrations};

// === Helper functions ===

/// Parse datetime from RFC3339 text with fallback to the current instant.
fn parse_datetime(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a calendar date from `YYYY-MM-DD` text with fallback to today.
fn parse_date(value: &str) -> NaiveDate {
    value.parse().unwrap_or_else(|_| Utc::now().date_naive())
}

fn row_to_student(row: &rusqlite::Row) -> Result<StudentProfile, rusqlite::Error> {
    let avatar: String = row.get(2)?;
    let last_active: Option<String> = row.get(9)?;
    let created_at: String = row.get(12)?;
    Ok(StudentProfile {
        uid: row.get(0)?,
        display_name: row.get(1)?,
        avatar: Avatar::parse(&avatar),
        total_entries: row.get(3)?,
        current_week_entries: row.get(4)?,
        current_streak: row.get(5)?,
        longest_streak: row.get(6)?,
        total_focus_minutes: row.get(7)?,
        grace_used_this_week: row.get(8)?,
        last_active_date: last_active.map(|d| parse_date(&d)),
        week: row.get(10)?,
        parent_uid: row.get(11)?,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_parent(row: &rusqlite::Row) -> Result<ParentProfile, rusqlite::Error> {
    let plan: String = row.get(2)?;
    let created_at: String = row.get(5)?;
    Ok(ParentProfile {
        uid: row.get(0)?,
        display_name: row.get(1)?,
        plan: PlanTier::parse(&plan),
        notifications_enabled: row.get(3)?,
        weekly_report_enabled: row.get(4)?,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_link(row: &rusqlite::Row) -> Result<ParentChildLink, rusqlite::Error> {
    let avatar: String = row.get(3)?;
    let linked_at: String = row.get(4)?;
    Ok(ParentChildLink {
        parent_uid: row.get(0)?,
        child_uid: row.get(1)?,
        child_display_name: row.get(2)?,
        child_avatar: Avatar::parse(&avatar),
        linked_at: parse_datetime(&linked_at),
    })
}

fn row_to_session(row: &rusqlite::Row) -> Result<FocusSession, rusqlite::Error> {
    let quest_id: Option<String> = row.get(2)?;
    let quest_title: Option<String> = row.get(3)?;
    let quality: String = row.get(5)?;
    let date: String = row.get(6)?;
    let started_at: String = row.get(7)?;
    let completed_at: String = row.get(8)?;
    Ok(FocusSession {
        id: row.get(0)?,
        student_id: row.get(1)?,
        quest: quest_id.map(|id| QuestRef {
            quest_id: id,
            quest_title: quest_title.unwrap_or_default(),
        }),
        duration_minutes: row.get(4)?,
        quality: FocusQuality::parse(&quality),
        date: parse_date(&date),
        started_at: parse_datetime(&started_at),
        completed_at: parse_datetime(&completed_at),
        entries_earned: row.get(9)?,
    })
}

fn row_to_entry(row: &rusqlite::Row) -> Result<PrizeEntry, rusqlite::Error> {
    let reason: String = row.get(2)?;
    let date: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(PrizeEntry {
        student_id: row.get(0)?,
        count: row.get(1)?,
        reason: EntryReason::parse(&reason),
        source_id: row.get(3)?,
        date: parse_date(&date),
        week: row.get(5)?,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_boost(row: &rusqlite::Row) -> Result<ParentBoost, rusqlite::Error> {
    let date: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    Ok(ParentBoost {
        id: row.get(0)?,
        parent_uid: row.get(1)?,
        child_uid: row.get(2)?,
        count: row.get(3)?,
        note: row.get(4)?,
        date: parse_date(&date),
        week: row.get(6)?,
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_code(row: &rusqlite::Row) -> Result<InviteCode, rusqlite::Error> {
    let created_at: String = row.get(2)?;
    let expires_at: String = row.get(3)?;
    let used_at: Option<String> = row.get(5)?;
    Ok(InviteCode {
        code: row.get(0)?,
        parent_uid: row.get(1)?,
        created_at: parse_datetime(&created_at),
        expires_at: parse_datetime(&expires_at),
        used_by: row.get(4)?,
        used_at: used_at.map(|t| parse_datetime(&t)),
    })
}

fn row_to_quest(row: &rusqlite::Row) -> Result<Quest, rusqlite::Error> {
    let category: String = row.get(3)?;
    Ok(Quest {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: QuestCategory::parse(&category),
        duration_minutes: row.get(4)?,
        entries_reward: row.get(5)?,
        emoji: row.get(6)?,
        is_default: row.get(7)?,
    })
}

fn row_to_check_in(row: &rusqlite::Row) -> Result<DailyCheckIn, rusqlite::Error> {
    let date: String = row.get(1)?;
    let created_at: String = row.get(3)?;
    Ok(DailyCheckIn {
        student_id: row.get(0)?,
        date: parse_date(&date),
        mood: row.get(2)?,
        created_at: parse_datetime(&created_at),
    })
}

const STUDENT_COLUMNS: &str = "uid, display_name, avatar, total_entries, current_week_entries, \
     current_streak, longest_streak, total_focus_minutes, grace_used_this_week, \
     last_active_date, week, parent_uid, created_at";

const SESSION_COLUMNS: &str = "id, student_id, quest_id, quest_title, duration_minutes, quality, \
     date, started_at, completed_at, entries_earned";

/// SQLite database for the reward core.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/studydraw/studydraw.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("studydraw.db");
        let conn = Connection::open(path)?;
        migrations::migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Open a database at an explicit path (tooling and tests).
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        migrations::migrate(&conn)
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests and tooling).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        migrations::migrate(&conn)
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Students ===

    /// Create a student profile unless one exists. Returns whether a row
    /// was written.
    pub fn insert_student_if_absent(
        &self,
        profile: &StudentProfile,
    ) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO students (uid, display_name, avatar, total_entries, \
             current_week_entries, current_streak, longest_streak, total_focus_minutes, \
             grace_used_this_week, last_active_date, week, parent_uid, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                profile.uid,
                profile.display_name,
                profile.avatar.as_str(),
                profile.total_entries,
                profile.current_week_entries,
                profile.current_streak,
                profile.longest_streak,
                profile.total_focus_minutes,
                profile.grace_used_this_week,
                profile.last_active_date.map(|d| d.to_string()),
                profile.week,
                profile.parent_uid,
                profile.created_at.to_rfc3339(),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn student(&self, uid: &str) -> Result<Option<StudentProfile>, StorageError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE uid = ?1");
        let profile = self
            .conn
            .query_row(&sql, params![uid], row_to_student)
            .optional()?;
        Ok(profile)
    }

    /// Reset the weekly fields iff the stored week key differs from
    /// `week`. One conditional statement, so concurrent callers cannot
    /// interleave a partial reset. Returns whether a rollover happened.
    pub fn rollover_week(&self, uid: &str, week: &str) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "UPDATE students SET current_week_entries = 0, grace_used_this_week = 0, \
             week = ?2 WHERE uid = ?1 AND week <> ?2",
            params![uid, week],
        )?;
        Ok(rows > 0)
    }

    /// Atomically add `count` to both entry counters.
    pub fn increment_entry_counters(&self, uid: &str, count: u32) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE students SET total_entries = total_entries + ?2, \
             current_week_entries = current_week_entries + ?2 WHERE uid = ?1",
            params![uid, count],
        )?;
        Ok(())
    }

    /// Overwrite the cached entry counters (reconciliation only).
    pub fn set_entry_counters(
        &self,
        uid: &str,
        total: u32,
        weekly: u32,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE students SET total_entries = ?2, current_week_entries = ?3 WHERE uid = ?1",
            params![uid, total, weekly],
        )?;
        Ok(())
    }

    pub fn increment_focus_minutes(&self, uid: &str, minutes: u32) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE students SET total_focus_minutes = total_focus_minutes + ?2 WHERE uid = ?1",
            params![uid, minutes],
        )?;
        Ok(())
    }

    /// Apply a streak advance: sets the new current streak, raises the
    /// longest-streak watermark in the same statement and stamps the
    /// active date.
    pub fn apply_streak(
        &self,
        uid: &str,
        current_streak: u32,
        last_active_date: NaiveDate,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE students SET current_streak = ?2, \
             longest_streak = MAX(longest_streak, ?2), last_active_date = ?3 WHERE uid = ?1",
            params![uid, current_streak, last_active_date.to_string()],
        )?;
        Ok(())
    }

    /// Consume one grace day, saturating at `max`.
    pub fn consume_grace(&self, uid: &str, max: u32) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE students SET grace_used_this_week = \
             MIN(grace_used_this_week + 1, ?2) WHERE uid = ?1",
            params![uid, max],
        )?;
        Ok(())
    }

    /// Set or clear the student's parent back-reference.
    pub fn set_parent_uid(&self, uid: &str, parent_uid: Option<&str>) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE students SET parent_uid = ?2 WHERE uid = ?1",
            params![uid, parent_uid],
        )?;
        Ok(())
    }

    // === Parents ===

    pub fn insert_parent_if_absent(&self, profile: &ParentProfile) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO parents (uid, display_name, plan, notifications_enabled, \
             weekly_report_enabled, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                profile.uid,
                profile.display_name,
                profile.plan.as_str(),
                profile.notifications_enabled,
                profile.weekly_report_enabled,
                profile.created_at.to_rfc3339(),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn parent(&self, uid: &str) -> Result<Option<ParentProfile>, StorageError> {
        let profile = self
            .conn
            .query_row(
                "SELECT uid, display_name, plan, notifications_enabled, weekly_report_enabled, \
                 created_at FROM parents WHERE uid = ?1",
                params![uid],
                row_to_parent,
            )
            .optional()?;
        Ok(profile)
    }

    // === Parent-child links ===

    pub fn insert_link_if_absent(&self, link: &ParentChildLink) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO parent_links (parent_uid, child_uid, child_display_name, \
             child_avatar, linked_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                link.parent_uid,
                link.child_uid,
                link.child_display_name,
                link.child_avatar.as_str(),
                link.linked_at.to_rfc3339(),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn delete_link(&self, parent_uid: &str, child_uid: &str) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "DELETE FROM parent_links WHERE parent_uid = ?1 AND child_uid = ?2",
            params![parent_uid, child_uid],
        )?;
        Ok(rows > 0)
    }

    pub fn links_for_parent(&self, parent_uid: &str) -> Result<Vec<ParentChildLink>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT parent_uid, child_uid, child_display_name, child_avatar, linked_at \
             FROM parent_links WHERE parent_uid = ?1 ORDER BY linked_at",
        )?;
        let rows = stmt.query_map(params![parent_uid], row_to_link)?;
        let mut links = Vec::new();
        for link in rows {
            links.push(link?);
        }
        Ok(links)
    }

    // === Focus sessions ===

    pub fn insert_session(&self, session: &FocusSession) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO focus_sessions (id, student_id, quest_id, quest_title, \
             duration_minutes, quality, date, started_at, completed_at, entries_earned) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                session.id,
                session.student_id,
                session.quest.as_ref().map(|q| q.quest_id.as_str()),
                session.quest.as_ref().map(|q| q.quest_title.as_str()),
                session.duration_minutes,
                session.quality.as_str(),
                session.date.to_string(),
                session.started_at.to_rfc3339(),
                session.completed_at.to_rfc3339(),
                session.entries_earned,
            ],
        )?;
        Ok(())
    }

    pub fn count_sessions_on(&self, student_id: &str, date: NaiveDate) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM focus_sessions WHERE student_id = ?1 AND date = ?2",
            params![student_id, date.to_string()],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    pub fn sessions_on(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<FocusSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM focus_sessions \
             WHERE student_id = ?1 AND date = ?2 ORDER BY completed_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![student_id, date.to_string()], row_to_session)?;
        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    pub fn recent_sessions(
        &self,
        student_id: &str,
        max: u32,
    ) -> Result<Vec<FocusSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM focus_sessions \
             WHERE student_id = ?1 ORDER BY completed_at DESC LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![student_id, max], row_to_session)?;
        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    /// Sessions on or after `from`, oldest first.
    pub fn sessions_since(
        &self,
        student_id: &str,
        from: NaiveDate,
    ) -> Result<Vec<FocusSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM focus_sessions \
             WHERE student_id = ?1 AND date >= ?2 ORDER BY date ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![student_id, from.to_string()], row_to_session)?;
        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session?);
        }
        Ok(sessions)
    }

    // === Prize entries ===

    /// Append a ledger line unless one already exists for this
    /// (student, source) pair. Returns whether the line was written; the
    /// caller must gate the counter increments on the result.
    pub fn insert_entry_if_absent(&self, entry: &PrizeEntry) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO prize_entries (student_id, count, reason, source_id, \
             date, week, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.student_id,
                entry.count,
                entry.reason.as_str(),
                entry.source_id,
                entry.date.to_string(),
                entry.week,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn entries_for(&self, student_id: &str, max: u32) -> Result<Vec<PrizeEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, count, reason, source_id, date, week, created_at \
             FROM prize_entries WHERE student_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![student_id, max], row_to_entry)?;
        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }

    pub fn sum_entries(&self, student_id: &str) -> Result<u32, StorageError> {
        let sum = self.conn.query_row(
            "SELECT COALESCE(SUM(count), 0) FROM prize_entries WHERE student_id = ?1",
            params![student_id],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(sum)
    }

    pub fn sum_entries_in_week(&self, student_id: &str, week: &str) -> Result<u32, StorageError> {
        let sum = self.conn.query_row(
            "SELECT COALESCE(SUM(count), 0) FROM prize_entries \
             WHERE student_id = ?1 AND week = ?2",
            params![student_id, week],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(sum)
    }

    // === Daily quest assignments ===

    /// Create the day's assignment unless one exists (lock-in). The chosen
    /// quest ids are stored as a JSON array and never rewritten.
    pub fn insert_assignment_if_absent(
        &self,
        assignment: &DailyQuestAssignment,
    ) -> Result<bool, StorageError> {
        let key = DailyQuestAssignment::key(&assignment.student_id, assignment.date);
        let quest_ids = serde_json::to_string(&assignment.quest_ids)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO daily_quests (key, student_id, date, quest_ids, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key,
                assignment.student_id,
                assignment.date.to_string(),
                quest_ids,
                assignment.created_at.to_rfc3339(),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn assignment(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyQuestAssignment>, StorageError> {
        let key = DailyQuestAssignment::key(student_id, date);
        let row = self
            .conn
            .query_row(
                "SELECT student_id, date, quest_ids, created_at FROM daily_quests WHERE key = ?1",
                params![key],
                |row| {
                    let date: String = row.get(1)?;
                    let quest_ids: String = row.get(2)?;
                    let created_at: String = row.get(3)?;
                    Ok(DailyQuestAssignment {
                        student_id: row.get(0)?,
                        date: parse_date(&date),
                        quest_ids: serde_json::from_str(&quest_ids).unwrap_or_default(),
                        completed_quest_ids: Vec::new(),
                        created_at: parse_datetime(&created_at),
                    })
                },
            )
            .optional()?;

        let Some(mut assignment) = row else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT quest_id FROM daily_quest_completions WHERE key = ?1 ORDER BY quest_id",
        )?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        for quest_id in rows {
            assignment.completed_quest_ids.push(quest_id?);
        }
        Ok(Some(assignment))
    }

    /// Add a quest id to the completion set. Returns false when it was
    /// already present (set semantics).
    pub fn insert_completion_if_absent(
        &self,
        key: &str,
        quest_id: &str,
    ) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO daily_quest_completions (key, quest_id) VALUES (?1, ?2)",
            params![key, quest_id],
        )?;
        Ok(rows > 0)
    }

    // === Check-ins ===

    /// Keyed upsert; a second check-in the same day overwrites the mood.
    pub fn upsert_check_in(&self, check_in: &DailyCheckIn) -> Result<(), StorageError> {
        let key = DailyCheckIn::key(&check_in.student_id, check_in.date);
        self.conn.execute(
            "INSERT OR REPLACE INTO check_ins (key, student_id, date, mood, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                key,
                check_in.student_id,
                check_in.date.to_string(),
                check_in.mood,
                check_in.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn check_in(
        &self,
        student_id: &str,
        date: NaiveDate,
    ) -> Result<Option<DailyCheckIn>, StorageError> {
        let key = DailyCheckIn::key(student_id, date);
        let check_in = self
            .conn
            .query_row(
                "SELECT student_id, date, mood, created_at FROM check_ins WHERE key = ?1",
                params![key],
                row_to_check_in,
            )
            .optional()?;
        Ok(check_in)
    }

    // === Quest catalog ===

    pub fn upsert_quest(&self, quest: &Quest) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO quests (id, title, description, category, \
             duration_minutes, entries_reward, emoji, is_default) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                quest.id,
                quest.title,
                quest.description,
                quest.category.as_str(),
                quest.duration_minutes,
                quest.entries_reward,
                quest.emoji,
                quest.is_default,
            ],
        )?;
        Ok(())
    }

    pub fn quest(&self, id: &str) -> Result<Option<Quest>, StorageError> {
        let quest = self
            .conn
            .query_row(
                "SELECT id, title, description, category, duration_minutes, entries_reward, \
                 emoji, is_default FROM quests WHERE id = ?1",
                params![id],
                row_to_quest,
            )
            .optional()?;
        Ok(quest)
    }

    pub fn default_quests(&self) -> Result<Vec<Quest>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, category, duration_minutes, entries_reward, \
             emoji, is_default FROM quests WHERE is_default = 1 ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_quest)?;
        let mut quests = Vec::new();
        for quest in rows {
            quests.push(quest?);
        }
        Ok(quests)
    }

    // === Parent boosts ===

    pub fn insert_boost(&self, boost: &ParentBoost) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO parent_boosts (id, parent_uid, child_uid, count, note, date, week, \
             created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                boost.id,
                boost.parent_uid,
                boost.child_uid,
                boost.count,
                boost.note,
                boost.date.to_string(),
                boost.week,
                boost.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn count_boosts_in_week(
        &self,
        parent_uid: &str,
        child_uid: &str,
        week: &str,
    ) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM parent_boosts \
             WHERE parent_uid = ?1 AND child_uid = ?2 AND week = ?3",
            params![parent_uid, child_uid, week],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    pub fn boosts_for_pair(
        &self,
        parent_uid: &str,
        child_uid: &str,
        max: u32,
    ) -> Result<Vec<ParentBoost>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, parent_uid, child_uid, count, note, date, week, created_at \
             FROM parent_boosts WHERE parent_uid = ?1 AND child_uid = ?2 \
             ORDER BY created_at DESC LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![parent_uid, child_uid, max], row_to_boost)?;
        let mut boosts = Vec::new();
        for boost in rows {
            boosts.push(boost?);
        }
        Ok(boosts)
    }

    // === Invite codes ===

    pub fn insert_code_if_absent(&self, code: &InviteCode) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO invite_codes (code, parent_uid, created_at, expires_at, \
             used_by, used_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                code.code,
                code.parent_uid,
                code.created_at.to_rfc3339(),
                code.expires_at.to_rfc3339(),
                code.used_by,
                code.used_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(rows > 0)
    }

    pub fn invite_code(&self, code: &str) -> Result<Option<InviteCode>, StorageError> {
        let invite = self
            .conn
            .query_row(
                "SELECT code, parent_uid, created_at, expires_at, used_by, used_at \
                 FROM invite_codes WHERE code = ?1",
                params![code],
                row_to_code,
            )
            .optional()?;
        Ok(invite)
    }

    /// Mark a code used, conditionally on it still being unused. Returns
    /// false when another redemption won the race.
    pub fn mark_code_used(
        &self,
        code: &str,
        child_uid: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "UPDATE invite_codes SET used_by = ?2, used_at = ?3 \
             WHERE code = ?1 AND used_by IS NULL",
            params![code, child_uid, used_at.to_rfc3339()],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Avatar;

    fn student(uid: &str) -> StudentProfile {
        StudentProfile::new(uid, "Student", Avatar::Owl, Utc::now(), "2026-W32")
    }

    #[test]
    fn test_student_create_if_absent() {
        let db = Database::open_memory().unwrap();
        assert!(db.insert_student_if_absent(&student("alice")).unwrap());
        assert!(!db.insert_student_if_absent(&student("alice")).unwrap());
        assert_eq!(db.student("alice").unwrap().unwrap().display_name, "Student");
        assert!(db.student("nobody").unwrap().is_none());
    }

    #[test]
    fn test_entry_insert_is_idempotent_by_source() {
        let db = Database::open_memory().unwrap();
        let entry = PrizeEntry {
            student_id: "alice".into(),
            count: 2,
            reason: EntryReason::FocusSession,
            source_id: "session_alice_1".into(),
            date: Utc::now().date_naive(),
            week: "2026-W32".into(),
            created_at: Utc::now(),
        };
        assert!(db.insert_entry_if_absent(&entry).unwrap());
        assert!(!db.insert_entry_if_absent(&entry).unwrap());
        assert_eq!(db.sum_entries("alice").unwrap(), 2);
    }

    #[test]
    fn test_week_rollover_is_conditional() {
        let db = Database::open_memory().unwrap();
        db.insert_student_if_absent(&student("alice")).unwrap();
        db.increment_entry_counters("alice", 5).unwrap();

        // Same week: no-op.
        assert!(!db.rollover_week("alice", "2026-W32").unwrap());
        assert_eq!(db.student("alice").unwrap().unwrap().current_week_entries, 5);

        // New week: weekly fields reset, totals untouched.
        assert!(db.rollover_week("alice", "2026-W33").unwrap());
        let profile = db.student("alice").unwrap().unwrap();
        assert_eq!(profile.current_week_entries, 0);
        assert_eq!(profile.grace_used_this_week, 0);
        assert_eq!(profile.total_entries, 5);
        assert_eq!(profile.week, "2026-W33");
    }

    #[test]
    fn test_mark_code_used_wins_once() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        let code = InviteCode {
            code: "ABC234".into(),
            parent_uid: "p1".into(),
            created_at: now,
            expires_at: now + chrono::Duration::hours(48),
            used_by: None,
            used_at: None,
        };
        db.insert_code_if_absent(&code).unwrap();
        assert!(db.mark_code_used("ABC234", "alice", now).unwrap());
        assert!(!db.mark_code_used("ABC234", "bob", now).unwrap());
        assert_eq!(
            db.invite_code("ABC234").unwrap().unwrap().used_by.as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn test_completion_set_semantics() {
        let db = Database::open_memory().unwrap();
        assert!(db.insert_completion_if_absent("alice_2026-08-06", "q1").unwrap());
        assert!(!db.insert_completion_if_absent("alice_2026-08-06", "q1").unwrap());
    }

    #[test]
    fn test_grace_saturates_at_max() {
        let db = Database::open_memory().unwrap();
        db.insert_student_if_absent(&student("alice")).unwrap();
        for _ in 0..5 {
            db.consume_grace("alice", 2).unwrap();
        }
        assert_eq!(db.student("alice").unwrap().unwrap().grace_used_this_week, 2);
    }

    #[test]
    fn test_longest_streak_watermark() {
        let db = Database::open_memory().unwrap();
        db.insert_student_if_absent(&student("alice")).unwrap();
        let today = Utc::now().date_naive();
        db.apply_streak("alice", 4, today).unwrap();
        db.apply_streak("alice", 1, today).unwrap();
        let profile = db.student("alice").unwrap().unwrap();
        assert_eq!(profile.current_streak, 1);
        assert_eq!(profile.longest_streak, 4);
    }
}
