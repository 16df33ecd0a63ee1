use thiserror::Error;

use crate::models::JobId;

/// Errors surfaced by tracker operations.
///
/// Expected, recoverable states (like asking for a digest before any
/// preferences exist) are variants here rather than panics, so the
/// presentation layer can turn them into a notice.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Preferences are required. Set them first with 'jobtrack prefs set'.")]
    PreferencesRequired,

    #[error("Invalid status '{0}' (expected: Not Applied, Applied, Rejected, Selected)")]
    InvalidStatus(String),

    #[error("Job #{0} not found")]
    UnknownJob(JobId),

    #[error("Invalid preference: {0}")]
    InvalidPreference(String),

    #[error("Unknown checklist item '{0}'")]
    UnknownChecklistItem(String),

    #[error("Unknown proof artifact '{0}' (expected: lovable, github, deployed)")]
    UnknownArtifact(String),

    #[error("Unknown sort '{0}' (expected: latest, oldest, score, salary)")]
    UnknownSort(String),

    #[error("Invalid {field} '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
