//! TOML-based application configuration.
//!
//! Stores CLI-facing preferences: default subject ids so commands don't
//! need `--student`/`--parent` every time, and the default session length
//! offered by the timer front-end. Reward caps are product rules, not
//! configuration; they live as constants next to the components that
//! enforce them.
//!
//! Configuration is stored at `~/.config/studydraw/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::data_dir;

/// Session-related preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Duration preselected by the timer front-end (25 or 50).
    #[serde(default = "default_duration")]
    pub default_duration: u32,
}

/// Default subject identifiers for CLI use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectsConfig {
    /// Student uid assumed when a command omits `--student`.
    #[serde(default)]
    pub default_student: Option<String>,
    /// Parent uid assumed when a command omits `--parent`.
    #[serde(default)]
    pub default_parent: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studydraw/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub subjects: SubjectsConfig,
}

fn default_duration() -> u32 {
    25
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_duration_is_short_session() {
        let cfg = Config::default();
        assert_eq!(cfg.session.default_duration, 25);
        assert!(cfg.subjects.default_student.is_none());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut cfg = Config::default();
        cfg.subjects.default_student = Some("alice".to_string());
        cfg.session.default_duration = 50;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.subjects.default_student.as_deref(), Some("alice"));
        assert_eq!(parsed.session.default_duration, 50);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.session.default_duration, 25);
    }
}
