//! Prize-entry ledger: idempotent awards and entry aggregation.
//!
//! The append-only `prize_entries` collection is the source of truth for a
//! student's entry totals; the counters cached on the profile are a
//! materialized view maintained by atomic increments. `reconcile` recomputes
//! the view from the ledger for tests and repair.

use serde::{Deserialize, Serialize};

use crate::calendar::{week_key, Clock};
use crate::error::{CoreError, Result, ValidationError};
use crate::model::{EntryReason, PrizeEntry};
use crate::store::Database;

/// Outcome of an award call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AwardOutcome {
    /// A new ledger line was written and the counters were bumped.
    Granted { entry: PrizeEntry },
    /// An entry with this sourceId already existed; nothing changed.
    Duplicate,
}

impl AwardOutcome {
    /// Whether the call actually granted entries.
    pub fn is_granted(&self) -> bool {
        matches!(self, AwardOutcome::Granted { .. })
    }
}

/// Result of a counter reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub student_id: String,
    pub total_entries: u32,
    pub current_week_entries: u32,
    /// Whether the cached counters had drifted from the ledger.
    pub adjusted: bool,
}

/// Append-only record of entry grants plus running totals on the profile.
pub struct EntryLedger<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> EntryLedger<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Grant `count` entries to a student for one real-world event.
    ///
    /// The `source_id` ties the event to at most one ledger line: a retry
    /// with the same sourceId is a safe no-op ([`AwardOutcome::Duplicate`]).
    /// The counter increments are gated on the create-if-absent insert, so
    /// a lost race cannot double-count.
    ///
    /// # Errors
    /// Rejects a zero count and unknown students; storage failures are
    /// retryable because the whole sequence is idempotent per sourceId.
    pub fn award(
        &self,
        student_id: &str,
        count: u32,
        reason: EntryReason,
        source_id: &str,
    ) -> Result<AwardOutcome> {
        if count == 0 {
            return Err(ValidationError::InvalidEntryCount.into());
        }
        if self.db.student(student_id)?.is_none() {
            return Err(CoreError::ProfileNotFound {
                uid: student_id.to_string(),
            });
        }

        let today = self.clock.today();
        let week = week_key(today);
        self.db.rollover_week(student_id, &week)?;

        let entry = PrizeEntry {
            student_id: student_id.to_string(),
            count,
            reason,
            source_id: source_id.to_string(),
            date: today,
            week,
            created_at: self.clock.now(),
        };

        if !self.db.insert_entry_if_absent(&entry)? {
            tracing::debug!(student_id, source_id, "duplicate award deduplicated");
            return Ok(AwardOutcome::Duplicate);
        }

        self.db.increment_entry_counters(student_id, count)?;
        Ok(AwardOutcome::Granted { entry })
    }

    /// Entry history, newest first.
    pub fn history_of(&self, student_id: &str, max: u32) -> Result<Vec<PrizeEntry>> {
        Ok(self.db.entries_for(student_id, max)?)
    }

    /// Sum of ledger entries in the current ISO week, recomputed from the
    /// ledger rather than read from the cached counter.
    pub fn weekly_total(&self, student_id: &str) -> Result<u32> {
        let week = week_key(self.clock.today());
        Ok(self.db.sum_entries_in_week(student_id, &week)?)
    }

    /// Recompute both counters from the ledger and rewrite the cached view.
    pub fn reconcile(&self, student_id: &str) -> Result<ReconcileReport> {
        let week = week_key(self.clock.today());
        self.db.rollover_week(student_id, &week)?;

        let profile = self
            .db
            .student(student_id)?
            .ok_or_else(|| CoreError::ProfileNotFound {
                uid: student_id.to_string(),
            })?;

        let total = self.db.sum_entries(student_id)?;
        let weekly = self.db.sum_entries_in_week(student_id, &week)?;
        let adjusted =
            profile.total_entries != total || profile.current_week_entries != weekly;

        if adjusted {
            tracing::warn!(
                student_id,
                cached_total = profile.total_entries,
                ledger_total = total,
                "entry counters drifted from ledger, repairing"
            );
            self.db.set_entry_counters(student_id, total, weekly)?;
        }

        Ok(ReconcileReport {
            student_id: student_id.to_string(),
            total_entries: total,
            current_week_entries: weekly,
            adjusted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::model::{Avatar, StudentProfile};
    use chrono::NaiveDate;

    fn setup(date: NaiveDate) -> (Database, FixedClock) {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::at_date(date);
        let profile =
            StudentProfile::new("alice", "Alice", Avatar::Fox, clock.now(), week_key(date));
        db.insert_student_if_absent(&profile).unwrap();
        (db, clock)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_award_writes_entry_and_counters() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);

        let outcome = ledger
            .award("alice", 2, EntryReason::FocusSession, "session_alice_1")
            .unwrap();
        assert!(outcome.is_granted());

        let profile = db.student("alice").unwrap().unwrap();
        assert_eq!(profile.total_entries, 2);
        assert_eq!(profile.current_week_entries, 2);
    }

    #[test]
    fn test_award_same_source_id_is_noop() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);

        ledger
            .award("alice", 3, EntryReason::StreakBonus, "streak_7_2026-08-06")
            .unwrap();
        let second = ledger
            .award("alice", 3, EntryReason::StreakBonus, "streak_7_2026-08-06")
            .unwrap();
        assert!(!second.is_granted());

        assert_eq!(ledger.history_of("alice", 10).unwrap().len(), 1);
        assert_eq!(db.student("alice").unwrap().unwrap().total_entries, 3);
    }

    #[test]
    fn test_award_rejects_zero_count() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);
        let err = ledger
            .award("alice", 0, EntryReason::ParentBoost, "boost_p1_2026-08-06")
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_award_unknown_student() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);
        let err = ledger
            .award("ghost", 1, EntryReason::FocusSession, "s1")
            .unwrap_err();
        assert!(matches!(err, CoreError::ProfileNotFound { .. }));
    }

    #[test]
    fn test_weekly_total_tracks_current_week_only() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);
        ledger
            .award("alice", 2, EntryReason::FocusSession, "s1")
            .unwrap();

        // Next ISO week: the old entry no longer counts.
        clock.advance_days(7);
        assert_eq!(ledger.weekly_total("alice").unwrap(), 0);
        ledger
            .award("alice", 1, EntryReason::FocusSession, "s2")
            .unwrap();
        assert_eq!(ledger.weekly_total("alice").unwrap(), 1);
    }

    #[test]
    fn test_week_rollover_resets_cached_weekly_counter() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);
        ledger
            .award("alice", 2, EntryReason::FocusSession, "s1")
            .unwrap();
        assert_eq!(db.student("alice").unwrap().unwrap().current_week_entries, 2);

        clock.advance_days(7);
        ledger
            .award("alice", 1, EntryReason::FocusSession, "s2")
            .unwrap();
        let profile = db.student("alice").unwrap().unwrap();
        assert_eq!(profile.current_week_entries, 1);
        assert_eq!(profile.total_entries, 3);
    }

    #[test]
    fn test_reconcile_repairs_drifted_counters() {
        let (db, clock) = setup(date(2026, 8, 6));
        let ledger = EntryLedger::new(&db, &clock);
        ledger
            .award("alice", 2, EntryReason::FocusSession, "s1")
            .unwrap();
        ledger
            .award("alice", 3, EntryReason::StreakBonus, "s2")
            .unwrap();

        // Simulate counter drift.
        db.set_entry_counters("alice", 99, 1).unwrap();

        let report = ledger.reconcile("alice").unwrap();
        assert!(report.adjusted);
        assert_eq!(report.total_entries, 5);
        assert_eq!(report.current_week_entries, 5);

        let clean = ledger.reconcile("alice").unwrap();
        assert!(!clean.adjusted);
    }
}
