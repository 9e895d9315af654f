//! Entity types shared across the reward accounting core.
//!
//! These mirror the persisted collections one-to-one: profiles, focus
//! sessions, prize entries, quest assignments, check-ins, boosts and invite
//! codes. Records that the store treats as immutable (sessions, entries,
//! boosts) carry no setters here; mutation happens through the field-level
//! atomic operations on `store::Database`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Avatar a student picks at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Avatar {
    Owl,
    Fox,
    Dragon,
    Cat,
    Robot,
    Astronaut,
}

impl Avatar {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Avatar::Owl => "owl",
            Avatar::Fox => "fox",
            Avatar::Dragon => "dragon",
            Avatar::Cat => "cat",
            Avatar::Robot => "robot",
            Avatar::Astronaut => "astronaut",
        }
    }

    /// Parse the storage string form; unknown values fall back to the owl.
    pub fn parse(value: &str) -> Self {
        match value {
            "fox" => Avatar::Fox,
            "dragon" => Avatar::Dragon,
            "cat" => Avatar::Cat,
            "robot" => Avatar::Robot,
            "astronaut" => Avatar::Astronaut,
            _ => Avatar::Owl,
        }
    }
}

/// A student's profile document.
///
/// `total_entries`, `current_week_entries`, `current_streak`,
/// `longest_streak`, `total_focus_minutes` and `grace_used_this_week` are
/// cached aggregates maintained by atomic increments; the prize-entry
/// ledger is the source of truth for the entry counters
/// (see `EntryLedger::reconcile`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Opaque, already-authenticated subject identifier
    pub uid: String,

    /// Display name
    pub display_name: String,

    /// Chosen avatar
    pub avatar: Avatar,

    /// All-time prize entries (monotonic)
    pub total_entries: u32,

    /// Prize entries within the week named by `week`
    pub current_week_entries: u32,

    /// Consecutive-day streak
    pub current_streak: u32,

    /// All-time longest streak; never less than `current_streak`
    pub longest_streak: u32,

    /// All-time focus minutes (monotonic)
    pub total_focus_minutes: u32,

    /// Grace days consumed within the week named by `week` (0-2)
    pub grace_used_this_week: u32,

    /// Last date a streak-affecting action occurred
    pub last_active_date: Option<NaiveDate>,

    /// ISO week key the weekly fields above belong to; the store rolls the
    /// weekly fields to zero when an operation arrives in a later week
    pub week: String,

    /// Weak back-reference to a linked parent, if any
    pub parent_uid: Option<String>,

    /// Profile creation instant
    pub created_at: DateTime<Utc>,
}

impl StudentProfile {
    /// A fresh profile with zeroed counters.
    pub fn new(
        uid: impl Into<String>,
        display_name: impl Into<String>,
        avatar: Avatar,
        created_at: DateTime<Utc>,
        week: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            avatar,
            total_entries: 0,
            current_week_entries: 0,
            current_streak: 0,
            longest_streak: 0,
            total_focus_minutes: 0,
            grace_used_this_week: 0,
            last_active_date: None,
            week: week.into(),
            parent_uid: None,
            created_at,
        }
    }
}

/// Parent subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Explorer,
    Scholar,
}

impl PlanTier {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanTier::Explorer => "explorer",
            PlanTier::Scholar => "scholar",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "scholar" => PlanTier::Scholar,
            _ => PlanTier::Explorer,
        }
    }
}

/// A parent's profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentProfile {
    pub uid: String,
    pub display_name: String,
    pub plan: PlanTier,
    pub notifications_enabled: bool,
    pub weekly_report_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// A parent-child link row, with denormalized child display fields for the
/// parent view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentChildLink {
    pub parent_uid: String,
    pub child_uid: String,
    pub child_display_name: String,
    pub child_avatar: Avatar,
    pub linked_at: DateTime<Utc>,
}

/// Self-reported focus quality for a completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusQuality {
    FullyFocused,
    MostlyFocused,
    Struggled,
}

impl FocusQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            FocusQuality::FullyFocused => "fully_focused",
            FocusQuality::MostlyFocused => "mostly_focused",
            FocusQuality::Struggled => "struggled",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "fully_focused" => FocusQuality::FullyFocused,
            "struggled" => FocusQuality::Struggled,
            _ => FocusQuality::MostlyFocused,
        }
    }
}

/// Reference to the quest a session was logged against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestRef {
    pub quest_id: String,
    pub quest_title: String,
}

/// An immutable completed focus session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub student_id: String,
    pub quest: Option<QuestRef>,
    pub duration_minutes: u32,
    pub quality: FocusQuality,
    pub date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub entries_earned: u32,
}

/// Why a prize entry was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryReason {
    FocusSession,
    StreakBonus,
    MonthlyStreak,
    ParentBoost,
    WelcomeBonus,
}

impl EntryReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryReason::FocusSession => "focus_session",
            EntryReason::StreakBonus => "streak_bonus",
            EntryReason::MonthlyStreak => "monthly_streak",
            EntryReason::ParentBoost => "parent_boost",
            EntryReason::WelcomeBonus => "welcome_bonus",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "streak_bonus" => EntryReason::StreakBonus,
            "monthly_streak" => EntryReason::MonthlyStreak,
            "parent_boost" => EntryReason::ParentBoost,
            "welcome_bonus" => EntryReason::WelcomeBonus,
            _ => EntryReason::FocusSession,
        }
    }
}

/// An immutable prize-entry ledger line.
///
/// `(student_id, source_id)` is unique: replaying the same real-world event
/// produces at most one ledger line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeEntry {
    pub student_id: String,
    pub count: u32,
    pub reason: EntryReason,
    pub source_id: String,
    pub date: NaiveDate,
    pub week: String,
    pub created_at: DateTime<Utc>,
}

/// Quest category in the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestCategory {
    Focus,
    School,
    Reading,
    ScreenFree,
    Skill,
    Routine,
}

impl QuestCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestCategory::Focus => "focus",
            QuestCategory::School => "school",
            QuestCategory::Reading => "reading",
            QuestCategory::ScreenFree => "screen_free",
            QuestCategory::Skill => "skill",
            QuestCategory::Routine => "routine",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "school" => QuestCategory::School,
            "reading" => QuestCategory::Reading,
            "screen_free" => QuestCategory::ScreenFree,
            "skill" => QuestCategory::Skill,
            "routine" => QuestCategory::Routine,
            _ => QuestCategory::Focus,
        }
    }
}

/// A quest in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: QuestCategory,
    pub duration_minutes: u32,
    pub entries_reward: u32,
    pub emoji: String,
    pub is_default: bool,
}

/// The daily quest selection for one (student, date).
///
/// `quest_ids` is locked at creation; `completed_quest_ids` only grows and
/// stays a subset of `quest_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuestAssignment {
    pub student_id: String,
    pub date: NaiveDate,
    pub quest_ids: Vec<String>,
    pub completed_quest_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DailyQuestAssignment {
    /// Deterministic document key, e.g. `alice_2026-08-06`.
    pub fn key(student_id: &str, date: NaiveDate) -> String {
        format!("{student_id}_{date}")
    }
}

/// A daily mood check-in, one per (student, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCheckIn {
    pub student_id: String,
    pub date: NaiveDate,
    /// 1 (rough) to 5 (great)
    pub mood: u8,
    pub created_at: DateTime<Utc>,
}

impl DailyCheckIn {
    /// Deterministic document key, e.g. `alice_2026-08-06`.
    pub fn key(student_id: &str, date: NaiveDate) -> String {
        format!("{student_id}_{date}")
    }
}

/// An immutable parent effort boost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentBoost {
    pub id: String,
    pub parent_uid: String,
    pub child_uid: String,
    pub count: u32,
    pub note: String,
    pub date: NaiveDate,
    pub week: String,
    pub created_at: DateTime<Utc>,
}

/// A parent-child invite code.
///
/// Mutates exactly once, from unused to used, then is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCode {
    pub code: String,
    pub parent_uid: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used_by: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
}

impl InviteCode {
    /// Whether the code is past its expiry at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
