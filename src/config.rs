use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::scoring::SkillMatch;
use crate::store::SqliteStore;

/// Where state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    InMemory,
}

/// Runtime configuration read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreLocation,
    pub catalog_path: Option<PathBuf>,
    pub skill_match: SkillMatch,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("JOBTRACK_DB").filter(|v| !v.trim().is_empty()) {
            Some(v) if v.trim() == ":memory:" => StoreLocation::InMemory,
            Some(v) => StoreLocation::File(expand_home(v.trim())),
            None => StoreLocation::File(SqliteStore::default_path()),
        };

        let catalog_path = lookup("JOBTRACK_CATALOG")
            .filter(|v| !v.trim().is_empty())
            .map(|v| expand_home(v.trim()));

        let skill_match = match lookup("JOBTRACK_SKILL_MATCH") {
            Some(v) if !v.trim().is_empty() => v
                .parse::<SkillMatch>()
                .context("JOBTRACK_SKILL_MATCH must be 'substring' or 'exact'")?,
            _ => SkillMatch::default(),
        };

        Ok(Config {
            store,
            catalog_path,
            skill_match,
            log_filter: lookup("JOBTRACK_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }
}

// Expand ~ in path
fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(raw)
    }
}
