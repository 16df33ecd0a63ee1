//! Submission tracking: the three proof links, their validity, and the
//! overall project status derived from them and the test checklist.

use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::checklist::TestChecklist;
use crate::errors::{Result, TrackerError};
use crate::models::ProofArtifacts;
use crate::store::{self, KeyValueStore};

pub const PROOF_KEY: &str = "proof_artifacts";

const NOT_PROVIDED: &str = "[Not provided]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Lovable,
    GitHub,
    Deployed,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Lovable, ArtifactKind::GitHub, ArtifactKind::Deployed];

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Lovable => "Lovable Project Link",
            ArtifactKind::GitHub => "GitHub Repository Link",
            ArtifactKind::Deployed => "Live Deployment URL",
        }
    }

    pub fn value<'a>(&self, artifacts: &'a ProofArtifacts) -> &'a str {
        match self {
            ArtifactKind::Lovable => &artifacts.lovable_link,
            ArtifactKind::GitHub => &artifacts.github_link,
            ArtifactKind::Deployed => &artifacts.deployed_link,
        }
    }

    fn slot<'a>(&self, artifacts: &'a mut ProofArtifacts) -> &'a mut String {
        match self {
            ArtifactKind::Lovable => &mut artifacts.lovable_link,
            ArtifactKind::GitHub => &mut artifacts.github_link,
            ArtifactKind::Deployed => &mut artifacts.deployed_link,
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = TrackerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lovable" | "lovablelink" => Ok(ArtifactKind::Lovable),
            "github" | "githublink" => Ok(ArtifactKind::GitHub),
            "deployed" | "deployedlink" | "live" => Ok(ArtifactKind::Deployed),
            _ => Err(TrackerError::UnknownArtifact(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Shipped,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Shipped => "Shipped",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepStatus {
    pub step: &'static str,
    pub completed: bool,
}

/// Non-blank and parses as an absolute URL.
pub fn is_valid_url(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    !trimmed.is_empty() && Url::parse(trimmed).is_ok()
}

pub fn load(store: &dyn KeyValueStore) -> Result<ProofArtifacts> {
    Ok(store::load(store, PROOF_KEY)?.unwrap_or_default())
}

/// Stores the link as typed; validity is reported separately, never enforced.
pub fn set_artifact(store: &dyn KeyValueStore, kind: ArtifactKind, value: &str) -> Result<ProofArtifacts> {
    let mut artifacts = load(store)?;
    *kind.slot(&mut artifacts) = value.trim().to_string();
    store::save(store, PROOF_KEY, &artifacts)?;
    Ok(artifacts)
}

pub fn all_provided(artifacts: &ProofArtifacts) -> bool {
    ArtifactKind::ALL.iter().all(|k| is_valid_url(k.value(artifacts)))
}

pub fn project_status(artifacts: &ProofArtifacts, checklist: &TestChecklist) -> ProjectStatus {
    let (passed, _) = checklist.passed();
    if checklist.all_passed() && all_provided(artifacts) {
        ProjectStatus::Shipped
    } else if passed > 0 || ArtifactKind::ALL.iter().any(|k| !k.value(artifacts).is_empty()) {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::NotStarted
    }
}

/// The eight build steps and whether each is done.
pub fn step_completion(
    artifacts: &ProofArtifacts,
    checklist: &TestChecklist,
    has_preferences: bool,
    has_today_digest: bool,
) -> Vec<StepStatus> {
    let (passed, _) = checklist.passed();
    let tests_done = checklist.all_passed();
    let artifacts_done = all_provided(artifacts);

    vec![
        StepStatus { step: "Initialize Project", completed: true },
        StepStatus { step: "Add Job Data", completed: true },
        StepStatus { step: "Implement Preferences & Match Scoring", completed: has_preferences },
        StepStatus { step: "Build Daily Digest Engine", completed: has_today_digest },
        StepStatus { step: "Add Job Status Tracking", completed: passed >= 6 },
        StepStatus { step: "Complete Test Checklist", completed: tests_done },
        StepStatus { step: "Collect Proof Artifacts", completed: artifacts_done },
        StepStatus { step: "Ship Project", completed: tests_done && artifacts_done },
    ]
}

pub fn final_submission(artifacts: &ProofArtifacts) -> String {
    let or_placeholder = |s: &str| if s.is_empty() { NOT_PROVIDED.to_string() } else { s.to_string() };
    format!(
        "Job Notification Tracker — Final Submission\n\n\
         Lovable Project:\n{}\n\n\
         GitHub Repository:\n{}\n\n\
         Live Deployment:\n{}\n\n\
         Core Features:\n\
         - Intelligent match scoring\n\
         - Daily digest simulation\n\
         - Status tracking\n\
         - Test checklist enforced",
        or_placeholder(&artifacts.lovable_link),
        or_placeholder(&artifacts.github_link),
        or_placeholder(&artifacts.deployed_link),
    )
}
