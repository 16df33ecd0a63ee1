use crate::errors::{Result, TrackerError};
use crate::models::Preferences;
use crate::scoring::MAX_SCORE;
use crate::store::{self, KeyValueStore};

pub const PREFERENCES_KEY: &str = "preferences";

/// `None` until the user saves preferences for the first time; matching is
/// disabled while it is absent.
pub fn load(store: &dyn KeyValueStore) -> Result<Option<Preferences>> {
    Ok(store::load(store, PREFERENCES_KEY)?)
}

/// Replaces the stored preferences wholesale.
pub fn save(store: &dyn KeyValueStore, preferences: &Preferences) -> Result<()> {
    if preferences.min_match_score > MAX_SCORE {
        return Err(TrackerError::InvalidPreference(format!(
            "minimum match score must be between 0 and {}, got {}",
            MAX_SCORE, preferences.min_match_score
        )));
    }
    store::save(store, PREFERENCES_KEY, preferences)?;
    Ok(())
}

pub fn clear(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(PREFERENCES_KEY)?;
    Ok(())
}
