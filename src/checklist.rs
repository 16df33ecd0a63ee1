use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Result, TrackerError};
use crate::store::{self, KeyValueStore};

pub const CHECKLIST_KEY: &str = "test_checklist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistItem {
    pub key: &'static str,
    pub title: &'static str,
    pub how_to: &'static str,
}

pub static ITEMS: [ChecklistItem; 10] = [
    ChecklistItem {
        key: "test1",
        title: "Preferences persist after restart",
        how_to: "Set preferences with 'prefs set', run 'prefs show' in a new shell, verify they are still there",
    },
    ChecklistItem {
        key: "test2",
        title: "Match score calculates correctly",
        how_to: "Set preferences, check the listing shows match percentages with the right tiers",
    },
    ChecklistItem {
        key: "test3",
        title: "\"Show only matches\" toggle works",
        how_to: "List with --matches, verify only jobs at or above the threshold show",
    },
    ChecklistItem {
        key: "test4",
        title: "Save job persists after restart",
        how_to: "Save a job, run 'saved' again later, verify it still shows as saved",
    },
    ChecklistItem {
        key: "test5",
        title: "Apply link is shown for every job",
        how_to: "Open a job with 'show', verify the apply URL is present",
    },
    ChecklistItem {
        key: "test6",
        title: "Status update persists after restart",
        how_to: "Change a job status to Applied, list again, verify the status persists",
    },
    ChecklistItem {
        key: "test7",
        title: "Status filter works correctly",
        how_to: "List with --status applied, verify only applied jobs show",
    },
    ChecklistItem {
        key: "test8",
        title: "Digest generates top 10 by score",
        how_to: "Run 'digest generate', verify ten jobs sorted by match score",
    },
    ChecklistItem {
        key: "test9",
        title: "Digest persists for the day",
        how_to: "Generate a digest, run 'digest show', verify the same digest loads",
    },
    ChecklistItem {
        key: "test10",
        title: "No errors on main views",
        how_to: "Run list, saved, digest show, proof show and checklist show, verify none fail",
    },
];

/// Maps `test3`, `3` or ` Test3 ` to the canonical item key.
pub fn resolve_key(raw: &str) -> Result<&'static str> {
    let wanted = raw.trim().to_lowercase();
    let wanted = if wanted.chars().all(|c| c.is_ascii_digit()) {
        format!("test{}", wanted)
    } else {
        wanted
    };
    ITEMS
        .iter()
        .find(|item| item.key == wanted)
        .map(|item| item.key)
        .ok_or_else(|| TrackerError::UnknownChecklistItem(raw.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestChecklist {
    checked: BTreeMap<String, bool>,
}

impl TestChecklist {
    pub fn is_checked(&self, key: &str) -> bool {
        self.checked.get(key).copied().unwrap_or(false)
    }

    /// Items in display order with their state.
    pub fn items(&self) -> impl Iterator<Item = (&'static ChecklistItem, bool)> + '_ {
        ITEMS.iter().map(|item| (item, self.is_checked(item.key)))
    }

    /// `(passed, total)`.
    pub fn passed(&self) -> (usize, usize) {
        let passed = ITEMS.iter().filter(|item| self.is_checked(item.key)).count();
        (passed, ITEMS.len())
    }

    pub fn all_passed(&self) -> bool {
        let (passed, total) = self.passed();
        passed == total
    }
}

/// Current checklist; all unchecked when nothing has been stored yet.
pub fn load(store: &dyn KeyValueStore) -> Result<TestChecklist> {
    Ok(store::load(store, CHECKLIST_KEY)?.unwrap_or_default())
}

pub fn set_item(store: &dyn KeyValueStore, key: &str, checked: bool) -> Result<TestChecklist> {
    let key = resolve_key(key)?;
    let mut checklist = load(store)?;
    checklist.checked.insert(key.to_string(), checked);
    store::save(store, CHECKLIST_KEY, &checklist)?;
    Ok(checklist)
}

pub fn reset(store: &dyn KeyValueStore) -> Result<()> {
    store.remove(CHECKLIST_KEY)?;
    Ok(())
}
