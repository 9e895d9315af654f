//! SQLite persistence for the reward accounting core.
//!
//! Entities map to independent tables and every mutation the components
//! issue is a single-statement, per-row atomic operation: create-if-absent
//! (`INSERT OR IGNORE`), field-level atomic increments, conditional
//! single-row updates and keyed upserts. No mutation path rewrites a whole
//! profile row.

pub mod database;
pub mod migrations;

pub use database::Database;

use std::path::PathBuf;

/// Returns `~/.config/studydraw[-dev]/` based on STUDYDRAW_ENV.
///
/// Set STUDYDRAW_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYDRAW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studydraw-dev")
    } else {
        base_dir.join("studydraw")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
