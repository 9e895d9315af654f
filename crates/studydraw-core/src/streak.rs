//! Consecutive-day streak tracking with weekly grace days.
//!
//! A streak counts calendar days with at least one qualifying engagement
//! event. Missing a single stretch of days can be forgiven up to twice per
//! ISO week ("grace days"); once grace is exhausted the streak resets.
//! Every 7th consecutive day triggers a bonus award through the ledger,
//! keyed so a given milestone pays out at most once.

use serde::{Deserialize, Serialize};

use crate::calendar::{day_before, week_key, Clock};
use crate::error::{CoreError, Result};
use crate::ledger::EntryLedger;
use crate::model::EntryReason;
use crate::store::Database;

/// Streak bonuses trigger at positive multiples of this many days.
pub const STREAK_BONUS_INTERVAL: u32 = 7;

/// Entries granted per streak bonus.
pub const STREAK_BONUS_ENTRIES: u32 = 3;

/// Grace days available per ISO week.
pub const MAX_GRACE_PER_WEEK: u32 = 2;

/// What a `touch` call did to the streak.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Whether this call consumed a grace day.
    pub grace_used: bool,
    /// Whether this call triggered a streak bonus award.
    pub bonus_awarded: bool,
    /// Whether anything changed (false when today was already counted).
    pub advanced: bool,
}

/// Computes and mutates a student's consecutive-day streak.
pub struct StreakTracker<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> StreakTracker<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Record that a streak-qualifying event happened today.
    ///
    /// Called once per engagement event; subsequent calls on the same
    /// calendar day are no-ops. Grace accounting rolls over with the ISO
    /// week before the gap is classified.
    ///
    /// # Errors
    /// Returns [`CoreError::ProfileNotFound`] for an unknown student.
    pub fn touch(&self, student_id: &str) -> Result<StreakUpdate> {
        let today = self.clock.today();
        self.db.rollover_week(student_id, &week_key(today))?;

        let profile = self
            .db
            .student(student_id)?
            .ok_or_else(|| CoreError::ProfileNotFound {
                uid: student_id.to_string(),
            })?;

        if profile.last_active_date == Some(today) {
            return Ok(StreakUpdate {
                current_streak: profile.current_streak,
                longest_streak: profile.longest_streak,
                grace_used: false,
                bonus_awarded: false,
                advanced: false,
            });
        }

        let mut grace_used = false;
        let new_streak = match profile.last_active_date {
            Some(last) if last == day_before(today) => profile.current_streak + 1,
            None => 1,
            Some(_) => {
                // Gap of two or more days: spend a grace day if one is left.
                if profile.grace_used_this_week < MAX_GRACE_PER_WEEK {
                    grace_used = true;
                    profile.current_streak + 1
                } else {
                    1
                }
            }
        };

        if grace_used {
            self.db.consume_grace(student_id, MAX_GRACE_PER_WEEK)?;
        }
        self.db.apply_streak(student_id, new_streak, today)?;

        let mut bonus_awarded = false;
        if new_streak % STREAK_BONUS_INTERVAL == 0 {
            let source_id = format!("streak_{new_streak}_{today}");
            let ledger = EntryLedger::new(self.db, self.clock);
            bonus_awarded = ledger
                .award(
                    student_id,
                    STREAK_BONUS_ENTRIES,
                    EntryReason::StreakBonus,
                    &source_id,
                )?
                .is_granted();
        }

        Ok(StreakUpdate {
            current_streak: new_streak,
            longest_streak: profile.longest_streak.max(new_streak),
            grace_used,
            bonus_awarded,
            advanced: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::model::{Avatar, StudentProfile};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(today: NaiveDate) -> (Database, FixedClock) {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::at_date(today);
        let profile =
            StudentProfile::new("alice", "Alice", Avatar::Owl, clock.now(), week_key(today));
        db.insert_student_if_absent(&profile).unwrap();
        (db, clock)
    }

    /// Put the profile into a known streak state without going through touch.
    fn prime(db: &Database, streak: u32, last_active: NaiveDate, grace: u32) {
        db.apply_streak("alice", streak, last_active).unwrap();
        for _ in 0..grace {
            db.consume_grace("alice", MAX_GRACE_PER_WEEK).unwrap();
        }
    }

    #[test]
    fn test_first_activity_starts_streak_at_one() {
        let (db, clock) = setup(date(2026, 8, 6));
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 1);
        assert!(update.advanced);
        assert!(!update.grace_used);
    }

    #[test]
    fn test_same_day_touch_is_noop() {
        let (db, clock) = setup(date(2026, 8, 6));
        let tracker = StreakTracker::new(&db, &clock);
        tracker.touch("alice").unwrap();
        let update = tracker.touch("alice").unwrap();
        assert!(!update.advanced);
        assert_eq!(update.current_streak, 1);
    }

    #[test]
    fn test_yesterday_continues_streak() {
        let (db, clock) = setup(date(2026, 8, 6));
        prime(&db, 3, date(2026, 8, 5), 0);
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 4);
        assert!(update.longest_streak >= 4);
        assert!(!update.grace_used);
    }

    #[test]
    fn test_gap_with_grace_available_continues() {
        let (db, clock) = setup(date(2026, 8, 6));
        prime(&db, 5, date(2026, 8, 3), 0);
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 6);
        assert!(update.grace_used);
        assert_eq!(
            db.student("alice").unwrap().unwrap().grace_used_this_week,
            1
        );
    }

    #[test]
    fn test_gap_with_grace_exhausted_resets() {
        let (db, clock) = setup(date(2026, 8, 6));
        prime(&db, 9, date(2026, 8, 3), MAX_GRACE_PER_WEEK);
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 1);
        assert!(!update.grace_used);
        // The watermark survives the reset.
        assert_eq!(db.student("alice").unwrap().unwrap().longest_streak, 9);
    }

    #[test]
    fn test_week_rollover_restores_grace() {
        // Grace exhausted during week 32, last active on its Thursday; the
        // next touch lands in week 33, so the grace budget is fresh again.
        let db = Database::open_memory().unwrap();
        let week32_day = date(2026, 8, 6);
        let clock = FixedClock::at_date(week32_day);
        let profile = StudentProfile::new(
            "alice",
            "Alice",
            Avatar::Owl,
            clock.now(),
            week_key(week32_day),
        );
        db.insert_student_if_absent(&profile).unwrap();
        prime(&db, 4, week32_day, MAX_GRACE_PER_WEEK);

        clock.set(
            date(2026, 8, 10)
                .and_hms_opt(0, 0, 0)
                .unwrap()
                .and_utc(),
        );
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 5);
        assert!(update.grace_used);
        assert_eq!(
            db.student("alice").unwrap().unwrap().grace_used_this_week,
            1
        );
    }

    #[test]
    fn test_streak_bonus_at_seven() {
        let (db, clock) = setup(date(2026, 8, 6));
        prime(&db, 6, date(2026, 8, 5), 0);
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 7);
        assert!(update.bonus_awarded);

        let ledger = EntryLedger::new(&db, &clock);
        let history = ledger.history_of("alice", 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].count, STREAK_BONUS_ENTRIES);
        assert_eq!(history[0].reason, EntryReason::StreakBonus);
        assert_eq!(history[0].source_id, "streak_7_2026-08-06");
    }

    #[test]
    fn test_no_bonus_at_eight() {
        let (db, clock) = setup(date(2026, 8, 6));
        prime(&db, 7, date(2026, 8, 5), 0);
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 8);
        assert!(!update.bonus_awarded);
        assert_eq!(db.student("alice").unwrap().unwrap().total_entries, 0);
    }

    #[test]
    fn test_bonus_at_fourteen() {
        let (db, clock) = setup(date(2026, 8, 6));
        prime(&db, 13, date(2026, 8, 5), 0);
        let tracker = StreakTracker::new(&db, &clock);
        let update = tracker.touch("alice").unwrap();
        assert_eq!(update.current_streak, 14);
        assert!(update.bonus_awarded);
    }
}
