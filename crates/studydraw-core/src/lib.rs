//! # Studydraw Core Library
//!
//! This library provides the reward accounting core for Studydraw, a
//! gamified habit tracker: students log timed focus sessions and earn
//! prize entries redeemable in periodic draws, with streak bonuses and
//! parent-granted boosts under strict caps. All operations are available
//! via a standalone CLI binary, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Ledger**: append-only prize-entry records with idempotent awards;
//!   the profile counters are a materialized view over the ledger
//! - **Streaks**: consecutive-day tracking with a 2-per-week grace
//!   allowance and 7-day bonus milestones
//! - **Storage**: SQLite tables exposing per-row atomic primitives
//!   (create-if-absent, field increments, conditional updates) -- no
//!   multi-row transactions are needed or used by the components
//! - **Caps**: 4 sessions per day, 2 parent boosts per (parent, child)
//!   per ISO week, 3 quests per day
//!
//! ## Key Components
//!
//! - [`EntryLedger`]: idempotent entry awards and aggregation
//! - [`StreakTracker`]: the streak state machine
//! - [`SessionRecorder`]: focus session validation and recording
//! - [`QuestAssignmentManager`]: daily quest lock-in and completion
//! - [`BoostRateLimiter`]: weekly parent-boost rate limiting
//! - [`InviteCodeRegistry`]: parent-child linking codes

pub mod boost;
pub mod calendar;
pub mod checkin;
pub mod config;
pub mod error;
pub mod invite;
pub mod ledger;
pub mod model;
pub mod profile;
pub mod quests;
pub mod session;
pub mod store;
pub mod streak;

pub use boost::{BoostGrant, BoostRateLimiter, MAX_BOOSTS_PER_WEEK};
pub use calendar::{week_key, Clock, FixedClock, SystemClock};
pub use checkin::CheckInService;
pub use config::Config;
pub use error::{CoreError, Result, StorageError, ValidationError};
pub use invite::{InviteCodeRegistry, RedeemedLink};
pub use ledger::{AwardOutcome, EntryLedger, ReconcileReport};
pub use model::{
    Avatar, DailyCheckIn, DailyQuestAssignment, EntryReason, FocusQuality, FocusSession,
    InviteCode, ParentBoost, ParentChildLink, ParentProfile, PlanTier, PrizeEntry, Quest,
    QuestCategory, QuestRef, StudentProfile,
};
pub use profile::{DayActivity, ProfileService, WELCOME_BONUS_ENTRIES};
pub use quests::{CompletionOutcome, QuestAssignmentManager, MAX_DAILY_QUESTS};
pub use session::{RecordedSession, SessionRecorder, MAX_SESSIONS_PER_DAY};
pub use store::Database;
pub use streak::{StreakTracker, StreakUpdate, MAX_GRACE_PER_WEEK};
