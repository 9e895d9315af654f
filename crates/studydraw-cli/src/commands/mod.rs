pub mod boost;
pub mod checkin;
pub mod entries;
pub mod invite;
pub mod profile;
pub mod quest;
pub mod session;

use studydraw_core::{quests, Config, Database};

/// Open the database and make sure the built-in quest catalog is present.
pub fn open_db() -> Result<Database, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    quests::seed_default_quests(&db)?;
    Ok(db)
}

/// Resolve a student uid from the flag or the configured default.
pub fn resolve_student(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(uid) = arg {
        return Ok(uid);
    }
    Config::load_or_default()
        .subjects
        .default_student
        .ok_or_else(|| "no --student given and no default_student configured".into())
}

/// Resolve a parent uid from the flag or the configured default.
pub fn resolve_parent(arg: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(uid) = arg {
        return Ok(uid);
    }
    Config::load_or_default()
        .subjects
        .default_parent
        .ok_or_else(|| "no --parent given and no default_parent configured".into())
}
