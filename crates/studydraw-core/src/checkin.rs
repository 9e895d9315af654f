//! Daily mood check-in, one record per (student, date).
//!
//! Check-ins are a lightweight signal shown next to the day's sessions.
//! They do not earn entries and do not touch the streak.

use crate::calendar::Clock;
use crate::error::{Result, ValidationError};
use crate::model::DailyCheckIn;
use crate::store::Database;

/// Records and reads daily mood check-ins.
pub struct CheckInService<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> CheckInService<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Save today's mood. A second check-in the same day overwrites the
    /// first (keyed upsert, last write wins).
    ///
    /// # Errors
    /// Rejects moods outside 1-5.
    pub fn save(&self, student_id: &str, mood: u8) -> Result<DailyCheckIn> {
        if !(1..=5).contains(&mood) {
            return Err(ValidationError::InvalidMood { value: mood }.into());
        }
        let check_in = DailyCheckIn {
            student_id: student_id.to_string(),
            date: self.clock.today(),
            mood,
            created_at: self.clock.now(),
        };
        self.db.upsert_check_in(&check_in)?;
        Ok(check_in)
    }

    /// Today's check-in, if any.
    pub fn today(&self, student_id: &str) -> Result<Option<DailyCheckIn>> {
        Ok(self.db.check_in(student_id, self.clock.today())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use chrono::NaiveDate;

    fn setup() -> (Database, FixedClock) {
        let db = Database::open_memory().unwrap();
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        (db, clock)
    }

    #[test]
    fn test_save_and_read_today() {
        let (db, clock) = setup();
        let service = CheckInService::new(&db, &clock);
        assert!(service.today("alice").unwrap().is_none());

        service.save("alice", 4).unwrap();
        assert_eq!(service.today("alice").unwrap().unwrap().mood, 4);
    }

    #[test]
    fn test_second_save_overwrites() {
        let (db, clock) = setup();
        let service = CheckInService::new(&db, &clock);
        service.save("alice", 2).unwrap();
        service.save("alice", 5).unwrap();
        assert_eq!(service.today("alice").unwrap().unwrap().mood, 5);
    }

    #[test]
    fn test_mood_out_of_range_rejected() {
        let (db, clock) = setup();
        let service = CheckInService::new(&db, &clock);
        assert!(service.save("alice", 0).is_err());
        assert!(service.save("alice", 6).is_err());
    }

    #[test]
    fn test_check_ins_are_per_day() {
        let (db, clock) = setup();
        let service = CheckInService::new(&db, &clock);
        service.save("alice", 3).unwrap();
        clock.advance_days(1);
        assert!(service.today("alice").unwrap().is_none());
    }
}
