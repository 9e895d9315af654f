//! Parent-child invite codes: issuance and single-use redemption.
//!
//! Codes are 6 characters over a 32-symbol alphabet with the visually
//! ambiguous characters (0/O, 1/I) removed, and expire after 48 hours.
//! Issuance is create-if-absent with bounded regeneration on collision;
//! redemption marks the code used with a conditional update so concurrent
//! redeems resolve to exactly one winner.

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::calendar::Clock;
use crate::error::{CoreError, Result};
use crate::model::{InviteCode, ParentChildLink};
use crate::store::Database;

/// Code length in characters.
pub const CODE_LENGTH: usize = 6;

/// Code alphabet; 32 symbols, ambiguous glyphs excluded.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Hours until an issued code expires.
pub const CODE_TTL_HOURS: i64 = 48;

/// Regeneration attempts before giving up on a free code.
const MAX_ISSUE_ATTEMPTS: u32 = 8;

/// Result of a successful redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemedLink {
    pub parent_uid: String,
    pub child_uid: String,
}

/// Issues and redeems time-limited, single-use linking codes.
pub struct InviteCodeRegistry<'a> {
    db: &'a Database,
    clock: &'a dyn Clock,
}

impl<'a> InviteCodeRegistry<'a> {
    pub fn new(db: &'a Database, clock: &'a dyn Clock) -> Self {
        Self { db, clock }
    }

    /// Issue a fresh code for a parent.
    ///
    /// # Errors
    /// - [`CoreError::ProfileNotFound`] for an unknown parent
    /// - [`CoreError::CodeSpaceExhausted`] if every generated code collided
    pub fn issue(&self, parent_uid: &str) -> Result<InviteCode> {
        if self.db.parent(parent_uid)?.is_none() {
            return Err(CoreError::ProfileNotFound {
                uid: parent_uid.to_string(),
            });
        }

        let now = self.clock.now();
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let code = InviteCode {
                code: generate_code(),
                parent_uid: parent_uid.to_string(),
                created_at: now,
                expires_at: now + Duration::hours(CODE_TTL_HOURS),
                used_by: None,
                used_at: None,
            };
            if self.db.insert_code_if_absent(&code)? {
                return Ok(code);
            }
        }
        Err(CoreError::CodeSpaceExhausted)
    }

    /// Redeem a code on behalf of a child.
    ///
    /// On success the child's profile points at the issuing parent
    /// (replacing any existing link -- switching parents is intended), the
    /// parent's child set gains the child and the code becomes terminal.
    ///
    /// # Errors
    /// - [`CoreError::CodeNotFound`] / [`CoreError::CodeAlreadyUsed`] /
    ///   [`CoreError::CodeExpired`] per the code's state
    /// - [`CoreError::ProfileNotFound`] for an unknown child
    pub fn redeem(&self, code: &str, child_uid: &str) -> Result<RedeemedLink> {
        let normalized = code.trim().to_ascii_uppercase();
        let invite = self
            .db
            .invite_code(&normalized)?
            .ok_or(CoreError::CodeNotFound)?;

        if invite.used_by.is_some() {
            return Err(CoreError::CodeAlreadyUsed);
        }
        let now = self.clock.now();
        if invite.is_expired(now) {
            return Err(CoreError::CodeExpired);
        }

        let child = self
            .db
            .student(child_uid)?
            .ok_or_else(|| CoreError::ProfileNotFound {
                uid: child_uid.to_string(),
            })?;

        // Winning this conditional update is what makes the code single-use;
        // everything after is idempotent.
        if !self.db.mark_code_used(&normalized, child_uid, now)? {
            return Err(CoreError::CodeAlreadyUsed);
        }

        self.db.insert_link_if_absent(&ParentChildLink {
            parent_uid: invite.parent_uid.clone(),
            child_uid: child_uid.to_string(),
            child_display_name: child.display_name,
            child_avatar: child.avatar,
            linked_at: now,
        })?;
        self.db.set_parent_uid(child_uid, Some(&invite.parent_uid))?;

        Ok(RedeemedLink {
            parent_uid: invite.parent_uid,
            child_uid: child_uid.to_string(),
        })
    }

    /// Remove a parent-child link.
    pub fn unlink(&self, parent_uid: &str, child_uid: &str) -> Result<()> {
        self.db.delete_link(parent_uid, child_uid)?;
        self.db.set_parent_uid(child_uid, None)?;
        Ok(())
    }
}

/// Generate one candidate code.
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
