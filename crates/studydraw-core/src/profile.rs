//! Student and parent profile lifecycle plus parent-view read queries.
//!
//! Profile creation is create-if-absent keyed on the authenticated subject
//! id, so a retried first sign-in is harmless. The welcome bonus rides on
//! the ledger's idempotency: its sourceId is the constant `"welcome"`,
//! unique per student.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::calendar::{week_key, Clock};
use crate::error::{CoreError, Result};
use crate::ledger::EntryLedger;
use crate::model::{
    Avatar, EntryReason, FocusSession, ParentProfile, PlanTier, PrizeEntry, StudentProfile,
};
use crate::store::Database;

/// Entries granted once on student profile creation.
pub const WELCOME_BONUS_ENTRIES: u32 = 5;

/// One day of a child's trailing-week activity summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayActivity {
    pub date: chrono::NaiveDate,
    pub minutes: u32,
    pub sessions: u32,
}

/// Profile creation and parent-view reads.
pub struct ProfileService<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> ProfileService<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Create a student profile on first sign-in and grant the welcome
    /// bonus. Re-running for an existing student changes nothing.
    pub fn create_student(
        &self,
        uid: &str,
        display_name: &str,
        avatar: Avatar,
    ) -> Result<StudentProfile> {
        let today = self.clock.today();
        let profile = StudentProfile::new(
            uid,
            display_name,
            avatar,
            self.clock.now(),
            week_key(today),
        );
        self.db.insert_student_if_absent(&profile)?;

        let ledger = EntryLedger::new(self.db, self.clock);
        ledger.award(uid, WELCOME_BONUS_ENTRIES, EntryReason::WelcomeBonus, "welcome")?;

        self.db
            .student(uid)?
            .ok_or_else(|| CoreError::ProfileNotFound {
                uid: uid.to_string(),
            })
    }

    /// Create a parent profile on first sign-in (explorer tier).
    pub fn create_parent(&self, uid: &str, display_name: &str) -> Result<ParentProfile> {
        let profile = ParentProfile {
            uid: uid.to_string(),
            display_name: display_name.to_string(),
            plan: PlanTier::Explorer,
            notifications_enabled: true,
            weekly_report_enabled: true,
            created_at: self.clock.now(),
        };
        self.db.insert_parent_if_absent(&profile)?;
        self.db
            .parent(uid)?
            .ok_or_else(|| CoreError::ProfileNotFound {
                uid: uid.to_string(),
            })
    }

    pub fn student(&self, uid: &str) -> Result<Option<StudentProfile>> {
        Ok(self.db.student(uid)?)
    }

    pub fn parent(&self, uid: &str) -> Result<Option<ParentProfile>> {
        Ok(self.db.parent(uid)?)
    }

    /// Profiles of every child linked to a parent.
    pub fn children_of(&self, parent_uid: &str) -> Result<Vec<StudentProfile>> {
        let links = self.db.links_for_parent(parent_uid)?;
        let mut profiles = Vec::with_capacity(links.len());
        for link in links {
            if let Some(profile) = self.db.student(&link.child_uid)? {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    /// A child's most recent sessions, newest first.
    pub fn child_sessions(&self, child_uid: &str, max: u32) -> Result<Vec<FocusSession>> {
        Ok(self.db.recent_sessions(child_uid, max)?)
    }

    /// A child's most recent ledger entries, newest first.
    pub fn child_entries(&self, child_uid: &str, max: u32) -> Result<Vec<PrizeEntry>> {
        Ok(self.db.entries_for(child_uid, max)?)
    }

    /// Per-day minutes and session counts for the trailing 7 days
    /// (oldest first, today last). Days without sessions appear as zeros.
    pub fn weekly_activity(&self, child_uid: &str) -> Result<Vec<DayActivity>> {
        let today = self.clock.today();
        let from = today - Duration::days(6);
        let sessions = self.db.sessions_since(child_uid, from)?;

        let mut days: Vec<DayActivity> = (0..7)
            .map(|i| DayActivity {
                date: from + Duration::days(i),
                minutes: 0,
                sessions: 0,
            })
            .collect();
        for session in &sessions {
            if let Some(day) = days.iter_mut().find(|d| d.date == session.date) {
                day.minutes += session.duration_minutes;
                day.sessions += 1;
            }
        }
        Ok(days)
    }
}
