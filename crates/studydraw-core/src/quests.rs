//! Daily quest selection and completion state machine.
//!
//! A student picks up to 3 quests per day; the selection is locked the
//! moment it is created (keyed create-if-absent on `{student}_{date}`).
//! Completion is a grow-only set bounded by the chosen set. No entries are
//! granted for quest completion here; reward wiring is an extension point.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::calendar::Clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::model::{DailyQuestAssignment, Quest, QuestCategory};
use crate::store::Database;

/// Maximum quests a student may select per day.
pub const MAX_DAILY_QUESTS: usize = 3;

/// Built-in quest catalog seeded into the store on first open.
pub struct DefaultQuest {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: QuestCategory,
    pub duration_minutes: u32,
    pub entries_reward: u32,
    pub emoji: &'static str,
}

pub const DEFAULT_QUESTS: &[DefaultQuest] = &[
    DefaultQuest {
        id: "deep-focus-block",
        title: "Deep Focus Block",
        description: "Complete a full 50-min session with zero distractions.",
        category: QuestCategory::Focus,
        duration_minutes: 50,
        entries_reward: 2,
        emoji: "🎯",
    },
    DefaultQuest {
        id: "homework-sprint",
        title: "Homework Sprint",
        description: "Finish a specific homework assignment in one session.",
        category: QuestCategory::School,
        duration_minutes: 25,
        entries_reward: 1,
        emoji: "📚",
    },
    DefaultQuest {
        id: "reading-quest",
        title: "Reading Quest",
        description: "Read for 25 minutes — any book, any topic.",
        category: QuestCategory::Reading,
        duration_minutes: 25,
        entries_reward: 1,
        emoji: "📖",
    },
    DefaultQuest {
        id: "screen-free-morning",
        title: "Screen-Free Morning",
        description: "Complete a focus session with all social apps closed.",
        category: QuestCategory::ScreenFree,
        duration_minutes: 50,
        entries_reward: 2,
        emoji: "🌅",
    },
    DefaultQuest {
        id: "practice-a-skill",
        title: "Practice a Skill",
        description: "Spend 25 min on a skill: music, art, coding, or sport.",
        category: QuestCategory::Skill,
        duration_minutes: 25,
        entries_reward: 1,
        emoji: "🎸",
    },
    DefaultQuest {
        id: "morning-routine",
        title: "Morning Routine",
        description: "Complete your morning routine before 9am.",
        category: QuestCategory::Routine,
        duration_minutes: 25,
        entries_reward: 1,
        emoji: "☀️",
    },
    DefaultQuest {
        id: "study-group",
        title: "Study Group",
        description: "Study with a friend or group for 50 minutes.",
        category: QuestCategory::School,
        duration_minutes: 50,
        entries_reward: 2,
        emoji: "👥",
    },
    DefaultQuest {
        id: "flashcard-blitz",
        title: "Flashcard Blitz",
        description: "Review 25 flashcards in a focused sprint.",
        category: QuestCategory::School,
        duration_minutes: 25,
        entries_reward: 1,
        emoji: "🃏",
    },
];

/// Write the built-in catalog into the quests table (idempotent).
pub fn seed_default_quests(db: &Database) -> Result<()> {
    for quest in DEFAULT_QUESTS {
        db.upsert_quest(&Quest {
            id: quest.id.to_string(),
            title: quest.title.to_string(),
            description: quest.description.to_string(),
            category: quest.category,
            duration_minutes: quest.duration_minutes,
            entries_reward: quest.entries_reward,
            emoji: quest.emoji.to_string(),
            is_default: true,
        })?;
    }
    Ok(())
}

/// Outcome of a quest completion attempt. Every variant is a success; the
/// state machine treats out-of-band completions as no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionOutcome {
    /// Added to the completed set.
    Completed,
    /// Already in the completed set; unchanged.
    AlreadyCompleted,
    /// Not part of today's selection; ignored.
    NotChosen,
    /// No assignment exists for today; ignored.
    NoAssignment,
}

/// Manages the per-day quest selection and completion sets.
pub struct QuestAssignmentManager<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> QuestAssignmentManager<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Lock in today's quest selection.
    ///
    /// Duplicate ids collapse before the size check (set semantics).
    ///
    /// # Errors
    /// - [`CoreError::Validation`] for an empty or oversized selection
    /// - [`CoreError::QuestsLocked`] when today already has a selection
    pub fn choose(&self, student_id: &str, quest_ids: &[String]) -> Result<DailyQuestAssignment> {
        let unique: BTreeSet<&String> = quest_ids.iter().collect();
        if unique.is_empty() {
            return Err(ValidationError::EmptyQuestSelection.into());
        }
        if unique.len() > MAX_DAILY_QUESTS {
            return Err(ValidationError::TooManyQuests {
                count: unique.len(),
                max: MAX_DAILY_QUESTS,
            }
            .into());
        }

        let date = self.clock.today();
        let assignment = DailyQuestAssignment {
            student_id: student_id.to_string(),
            date,
            quest_ids: unique.into_iter().cloned().collect(),
            completed_quest_ids: Vec::new(),
            created_at: self.clock.now(),
        };

        if !self.db.insert_assignment_if_absent(&assignment)? {
            return Err(CoreError::QuestsLocked { date });
        }
        Ok(assignment)
    }

    /// Mark one of today's chosen quests completed.
    ///
    /// Safe to reapply: completing an already-completed quest, a quest that
    /// was never chosen, or completing before any selection exists all
    /// return their no-op outcome without touching state.
    pub fn complete(&self, student_id: &str, quest_id: &str) -> Result<CompletionOutcome> {
        let date = self.clock.today();
        let Some(assignment) = self.db.assignment(student_id, date)? else {
            return Ok(CompletionOutcome::NoAssignment);
        };
        if !assignment.quest_ids.iter().any(|id| id == quest_id) {
            return Ok(CompletionOutcome::NotChosen);
        }

        let key = DailyQuestAssignment::key(student_id, date);
        if self.db.insert_completion_if_absent(&key, quest_id)? {
            Ok(CompletionOutcome::Completed)
        } else {
            Ok(CompletionOutcome::AlreadyCompleted)
        }
    }

    /// Today's assignment, if one was locked in.
    pub fn today_assignment(&self, student_id: &str) -> Result<Option<DailyQuestAssignment>> {
        Ok(self.db.assignment(student_id, self.clock.today())?)
    }
}
