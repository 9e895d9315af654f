//! Focus session recording: validation, daily cap, award and streak wiring.
//!
//! A recorded session is the single engagement event the rest of the core
//! reacts to: it earns ledger entries, bumps the focus-minute counter and
//! touches the streak. The daily cap is a count-then-insert check; with the
//! store's single writer that is effectively serialized, and the policy is
//! deliberately best-effort (see the cap tests).

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::Clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::ledger::EntryLedger;
use crate::model::{EntryReason, FocusQuality, FocusSession, QuestRef};
use crate::store::Database;
use crate::streak::{StreakTracker, StreakUpdate};

/// Hard cap on recorded sessions per student per calendar day.
pub const MAX_SESSIONS_PER_DAY: u32 = 4;

/// Allowed session lengths in minutes.
pub const SHORT_SESSION_MINUTES: u32 = 25;
pub const LONG_SESSION_MINUTES: u32 = 50;

/// Entries earned for a session of the given duration.
pub fn entries_for_duration(duration_minutes: u32) -> u32 {
    if duration_minutes == LONG_SESSION_MINUTES {
        2
    } else {
        1
    }
}

/// Result of a successful `record` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    pub session: FocusSession,
    pub entries_earned: u32,
    pub streak: StreakUpdate,
}

/// Validates and records completed focus sessions.
pub struct SessionRecorder<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> SessionRecorder<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Record a completed focus session.
    ///
    /// Each call is a distinct real-world event: the award sourceId embeds
    /// a fresh session id, so a client retry of a *failed* call is safe to
    /// re-run end to end, while a double-submit of a *successful* call
    /// counts as a second session (and is what the daily cap bounds).
    ///
    /// # Errors
    /// - [`CoreError::Validation`] for a duration outside {25, 50}
    /// - [`CoreError::ProfileNotFound`] for an unknown student
    /// - [`CoreError::DailyLimitReached`] once today has 4 sessions
    pub fn record(
        &self,
        student_id: &str,
        duration_minutes: u32,
        quality: FocusQuality,
        quest: Option<QuestRef>,
    ) -> Result<RecordedSession> {
        if duration_minutes != SHORT_SESSION_MINUTES && duration_minutes != LONG_SESSION_MINUTES {
            return Err(ValidationError::InvalidDuration {
                minutes: duration_minutes,
            }
            .into());
        }
        if self.db.student(student_id)?.is_none() {
            return Err(CoreError::ProfileNotFound {
                uid: student_id.to_string(),
            });
        }

        let today = self.clock.today();
        let existing = self.db.count_sessions_on(student_id, today)?;
        if existing >= MAX_SESSIONS_PER_DAY {
            return Err(CoreError::DailyLimitReached {
                max: MAX_SESSIONS_PER_DAY,
            });
        }

        let entries_earned = entries_for_duration(duration_minutes);
        let now = self.clock.now();
        let session = FocusSession {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            quest,
            duration_minutes,
            quality,
            date: today,
            started_at: now - Duration::minutes(i64::from(duration_minutes)),
            completed_at: now,
            entries_earned,
        };
        self.db.insert_session(&session)?;

        let ledger = EntryLedger::new(self.db, self.clock);
        let source_id = format!("session_{student_id}_{}", session.id);
        ledger.award(student_id, entries_earned, EntryReason::FocusSession, &source_id)?;

        self.db.increment_focus_minutes(student_id, duration_minutes)?;

        let tracker = StreakTracker::new(self.db, self.clock);
        let streak = tracker.touch(student_id)?;

        Ok(RecordedSession {
            session,
            entries_earned,
            streak,
        })
    }

    /// Today's sessions, newest first.
    pub fn today_sessions(&self, student_id: &str) -> Result<Vec<FocusSession>> {
        Ok(self.db.sessions_on(student_id, self.clock.today())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{week_key, FixedClock};
    use crate::model::{Avatar, StudentProfile};
    use chrono::NaiveDate;

    fn setup() -> (Database, FixedClock) {
        let db = Database::open_memory().unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let clock = FixedClock::at_date(today);
        let profile =
            StudentProfile::new("alice", "Alice", Avatar::Robot, clock.now(), week_key(today));
        db.insert_student_if_absent(&profile).unwrap();
        (db, clock)
    }

    #[test]
    fn test_short_session_earns_one_entry() {
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        let result = recorder
            .record("alice", 25, FocusQuality::FullyFocused, None)
            .unwrap();
        assert_eq!(result.entries_earned, 1);

        let profile = db.student("alice").unwrap().unwrap();
        assert_eq!(profile.total_entries, 1);
        assert_eq!(profile.total_focus_minutes, 25);
        assert_eq!(profile.current_streak, 1);
    }

    #[test]
    fn test_long_session_earns_two_entries() {
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        let result = recorder
            .record("alice", 50, FocusQuality::Struggled, None)
            .unwrap();
        assert_eq!(result.entries_earned, 2);
        assert_eq!(db.student("alice").unwrap().unwrap().total_entries, 2);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        let err = recorder
            .record("alice", 30, FocusQuality::MostlyFocused, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(recorder.today_sessions("alice").unwrap().is_empty());
    }

    #[test]
    fn test_daily_cap_rejects_fifth_session() {
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        for _ in 0..MAX_SESSIONS_PER_DAY {
            recorder
                .record("alice", 25, FocusQuality::MostlyFocused, None)
                .unwrap();
        }

        let err = recorder
            .record("alice", 25, FocusQuality::MostlyFocused, None)
            .unwrap_err();
        assert!(matches!(err, CoreError::DailyLimitReached { max: 4 }));

        // The rejected call produced no session and no entries.
        assert_eq!(recorder.today_sessions("alice").unwrap().len(), 4);
        assert_eq!(db.student("alice").unwrap().unwrap().total_entries, 4);
        assert_eq!(db.student("alice").unwrap().unwrap().total_focus_minutes, 100);
    }

    #[test]
    fn test_cap_resets_next_day() {
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        for _ in 0..MAX_SESSIONS_PER_DAY {
            recorder
                .record("alice", 25, FocusQuality::MostlyFocused, None)
                .unwrap();
        }
        clock.advance_days(1);
        let result = recorder
            .record("alice", 25, FocusQuality::FullyFocused, None)
            .unwrap();
        assert_eq!(result.streak.current_streak, 2);
        assert_eq!(recorder.today_sessions("alice").unwrap().len(), 1);
    }

    #[test]
    fn test_each_record_is_a_distinct_event() {
        // Two identical submissions are two sessions with two ledger lines;
        // dedup of client double-taps is not this path's job.
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        recorder
            .record("alice", 25, FocusQuality::MostlyFocused, None)
            .unwrap();
        recorder
            .record("alice", 25, FocusQuality::MostlyFocused, None)
            .unwrap();
        assert_eq!(db.student("alice").unwrap().unwrap().total_entries, 2);

        let ledger = EntryLedger::new(&db, &clock);
        assert_eq!(ledger.history_of("alice", 10).unwrap().len(), 2);
    }

    #[test]
    fn test_session_with_quest_reference() {
        let (db, clock) = setup();
        let recorder = SessionRecorder::new(&db, &clock);
        let quest = QuestRef {
            quest_id: "reading-quest".to_string(),
            quest_title: "Reading Quest".to_string(),
        };
        let result = recorder
            .record("alice", 25, FocusQuality::FullyFocused, Some(quest))
            .unwrap();
        assert_eq!(
            result.session.quest.as_ref().unwrap().quest_id,
            "reading-quest"
        );

        let stored = &recorder.today_sessions("alice").unwrap()[0];
        assert_eq!(stored.quest.as_ref().unwrap().quest_title, "Reading Quest");
    }
}
