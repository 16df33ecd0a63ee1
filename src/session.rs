//! Per-view state and the table of user intents.
//!
//! A `Session` belongs to whoever drives the UI (the CLI builds one per
//! invocation, the browser keeps one for its lifetime). Intents are applied
//! through `Tracker::dispatch`, which performs the state change and returns
//! the short notice the UI should show, if any. Rendering is not done here.

use crate::errors::Result;
use crate::filter::{FilterState, SortMode};
use crate::models::{ApplicationStatus, Experience, JobId, Preferences, Source, WorkMode};
use crate::proof::ArtifactKind;
use crate::tracker::Tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    Landing,
    #[default]
    Dashboard,
    Saved,
    Digest,
    Settings,
    Proof,
    TestChecklist,
    Ship,
}

impl Route {
    /// Resolves a navigation key such as `#/digest` or `/saved?x=1`.
    /// Anything unrecognised lands on the dashboard.
    pub fn parse(raw: &str) -> Self {
        let path = raw.trim().trim_start_matches('#');
        let path = path.split('?').next().unwrap_or("");
        match path {
            "" | "/" => Route::Landing,
            "/dashboard" => Route::Dashboard,
            "/saved" => Route::Saved,
            "/digest" => Route::Digest,
            "/settings" => Route::Settings,
            "/proof" => Route::Proof,
            "/jt/07-test" => Route::TestChecklist,
            "/jt/08-ship" => Route::Ship,
            _ => Route::Dashboard,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Dashboard => "/dashboard",
            Route::Saved => "/saved",
            Route::Digest => "/digest",
            Route::Settings => "/settings",
            Route::Proof => "/proof",
            Route::TestChecklist => "/jt/07-test",
            Route::Ship => "/jt/08-ship",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub filters: FilterState,
    pub route: Route,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    Keyword(String),
    Location(Option<String>),
    Mode(Option<WorkMode>),
    Experience(Option<Experience>),
    Source(Option<Source>),
    Status(Option<ApplicationStatus>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Navigate(Route),
    SetFilter(FilterField),
    SetSort(SortMode),
    ShowOnlyMatches(bool),
    ClearFilters,
    ToggleSave(JobId),
    SetStatus(JobId, ApplicationStatus),
    SavePreferences(Preferences),
    GenerateDigest,
    SetChecklistItem { key: String, checked: bool },
    ResetChecklist,
    SetProofArtifact { kind: ArtifactKind, value: String },
}

impl Tracker {
    /// Applies one user intent. Returns the notice to show, `None` for
    /// intents that only change what is displayed.
    pub fn dispatch(&self, session: &mut Session, intent: Intent) -> Result<Option<String>> {
        tracing::debug!(?intent, route = session.route.path(), "dispatch");
        match intent {
            Intent::Navigate(route) => {
                session.route = route;
                Ok(None)
            }
            Intent::SetFilter(field) => {
                let filters = &mut session.filters;
                match field {
                    FilterField::Keyword(keyword) => filters.keyword = keyword,
                    FilterField::Location(location) => filters.location = location,
                    FilterField::Mode(mode) => filters.mode = mode,
                    FilterField::Experience(experience) => filters.experience = experience,
                    FilterField::Source(source) => filters.source = source,
                    FilterField::Status(status) => filters.status = status,
                }
                Ok(None)
            }
            Intent::SetSort(sort) => {
                session.filters.sort = sort;
                Ok(None)
            }
            Intent::ShowOnlyMatches(on) => {
                session.filters.show_only_matches = on;
                Ok(None)
            }
            Intent::ClearFilters => {
                session.filters.clear();
                Ok(None)
            }
            Intent::ToggleSave(id) => {
                let now_saved = self.toggle_saved(id)?;
                Ok(Some(if now_saved { "Job saved" } else { "Job removed from saved" }.to_string()))
            }
            Intent::SetStatus(id, status) => {
                self.set_status(id, status)?;
                Ok(Some(format!("Status updated: {}", status)))
            }
            Intent::SavePreferences(prefs) => {
                self.save_preferences(&prefs)?;
                Ok(Some("Preferences saved".to_string()))
            }
            Intent::GenerateDigest => {
                let digest = self.generate_digest()?;
                Ok(Some(format!(
                    "Digest for {} generated with {} job(s)",
                    digest.date,
                    digest.entries.len()
                )))
            }
            Intent::SetChecklistItem { key, checked } => {
                let checklist = self.set_checklist_item(&key, checked)?;
                let (passed, total) = checklist.passed();
                Ok(Some(format!("Tests Passed: {} / {}", passed, total)))
            }
            Intent::ResetChecklist => {
                self.reset_checklist()?;
                Ok(Some("Test checklist reset".to_string()))
            }
            Intent::SetProofArtifact { kind, value } => {
                self.set_proof_artifact(kind, &value)?;
                Ok(Some(format!("{} updated", kind.label())))
            }
        }
    }
}
