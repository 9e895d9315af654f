//! Core error types for studydraw-core.
//!
//! All rejections surface as typed variants on [`CoreError`] rather than
//! panics; display strings double as the user-facing messages. A duplicate
//! award sourceId is deliberately NOT an error -- the ledger resolves it as
//! a no-op (see `ledger::AwardOutcome`).

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for studydraw-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors (transient; reads and idempotent writes are
    /// safe to retry)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Malformed input outside the closed value sets
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The per-day focus session cap was hit
    #[error("Daily session limit reached ({max} sessions max today)")]
    DailyLimitReached { max: u32 },

    /// The per-week parent boost cap was hit
    #[error("You've already given {max} boosts this week")]
    WeeklyBoostLimit { max: u32 },

    /// A quest selection already exists for the day and cannot be replaced
    #[error("Quests for {date} are already locked in")]
    QuestsLocked { date: NaiveDate },

    /// No profile exists for the given subject identifier
    #[error("Profile not found for '{uid}'")]
    ProfileNotFound { uid: String },

    /// Invite code does not exist
    #[error("Code not found. Check for typos.")]
    CodeNotFound,

    /// Invite code was already redeemed
    #[error("This code has already been used.")]
    CodeAlreadyUsed,

    /// Invite code is past its 48-hour expiry
    #[error("This code has expired. Ask your parent for a new one.")]
    CodeExpired,

    /// Code generation kept colliding with existing codes
    #[error("Could not generate an unused invite code, try again")]
    CodeSpaceExhausted,
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked by another writer
    #[error("Database is locked")]
    Locked,
}

/// Validation errors for inputs outside the closed value sets.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Session duration must be 25 or 50 minutes
    #[error("Invalid session duration: {minutes} minutes (must be 25 or 50)")]
    InvalidDuration { minutes: u32 },

    /// Boost count must be 1, 2 or 3
    #[error("Invalid boost count: {count} (must be 1-3)")]
    InvalidBoostCount { count: u32 },

    /// Award count must be positive
    #[error("Entry count must be positive")]
    InvalidEntryCount,

    /// Mood must be 1-5
    #[error("Invalid mood value: {value} (must be 1-5)")]
    InvalidMood { value: u8 },

    /// Daily quest selection is bounded
    #[error("Too many quests selected: {count} (max {max})")]
    TooManyQuests { count: usize, max: usize },

    /// A quest selection must name at least one quest
    #[error("Quest selection is empty")]
    EmptyQuestSelection,
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
