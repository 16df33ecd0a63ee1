use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TrackerError;

pub type JobId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub mode: WorkMode,
    pub experience: Experience,
    pub salary_range: String,
    pub description: String,
    pub skills: Vec<String>,
    pub source: Source,
    pub posted_days_ago: u32,
    pub apply_url: String,
}

impl Job {
    pub fn posted_label(&self) -> String {
        match self.posted_days_ago {
            0 => "Posted today".to_string(),
            1 => "Posted yesterday".to_string(),
            days => format!("Posted {} days ago", days),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkMode {
    pub const ALL: [WorkMode; 3] = [WorkMode::Remote, WorkMode::Hybrid, WorkMode::Onsite];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Hybrid => "Hybrid",
            WorkMode::Onsite => "Onsite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Experience {
    Fresher,
    #[serde(rename = "0-1")]
    ZeroToOne,
    #[serde(rename = "1-3")]
    OneToThree,
    #[serde(rename = "3-5")]
    ThreeToFive,
}

impl Experience {
    pub const ALL: [Experience; 4] = [
        Experience::Fresher,
        Experience::ZeroToOne,
        Experience::OneToThree,
        Experience::ThreeToFive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Experience::Fresher => "Fresher",
            Experience::ZeroToOne => "0-1",
            Experience::OneToThree => "1-3",
            Experience::ThreeToFive => "3-5",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    LinkedIn,
    Naukri,
    Indeed,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::LinkedIn, Source::Naukri, Source::Indeed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::LinkedIn => "LinkedIn",
            Source::Naukri => "Naukri",
            Source::Indeed => "Indeed",
        }
    }
}

/// Where the user is with a given job. Jobs without a recorded status are
/// `NotApplied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    #[serde(rename = "Not Applied")]
    NotApplied,
    Applied,
    Rejected,
    Selected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::NotApplied,
        ApplicationStatus::Applied,
        ApplicationStatus::Rejected,
        ApplicationStatus::Selected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::NotApplied => "Not Applied",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Selected => "Selected",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TrackerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| TrackerError::InvalidValue {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }
    };
}

display_and_parse!(WorkMode, "work mode");
display_and_parse!(Experience, "experience");
display_and_parse!(Source, "source");

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = TrackerError;

    /// Accepts the four status names ignoring case, spaces, dashes and
    /// underscores ("not-applied", "NotApplied", "not applied").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squashed: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match squashed.as_str() {
            "notapplied" => Ok(ApplicationStatus::NotApplied),
            "applied" => Ok(ApplicationStatus::Applied),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "selected" => Ok(ApplicationStatus::Selected),
            _ => Err(TrackerError::InvalidStatus(s.to_string())),
        }
    }
}

pub const DEFAULT_MIN_MATCH_SCORE: u8 = 40;

fn default_min_match_score() -> u8 {
    DEFAULT_MIN_MATCH_SCORE
}

/// Matching criteria entered by the user. Keywords and skills are kept as
/// the comma-separated text the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub role_keywords: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub modes: Vec<WorkMode>,
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub skills: String,
    #[serde(default = "default_min_match_score")]
    pub min_match_score: u8,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            role_keywords: String::new(),
            locations: Vec::new(),
            modes: Vec::new(),
            experience: None,
            skills: String::new(),
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
        }
    }
}

impl Preferences {
    pub fn keywords(&self) -> Vec<String> {
        split_terms(&self.role_keywords)
    }

    pub fn skill_terms(&self) -> Vec<String> {
        split_terms(&self.skills)
    }
}

/// Splits comma-separated user input into trimmed, lower-cased, non-empty terms.
pub fn split_terms(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub job_id: JobId,
    pub title: String,
    pub company: String,
    pub status: ApplicationStatus,
    pub at: DateTime<Utc>,
}

/// A job frozen into a digest together with the score it had at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestEntry {
    pub job: Job,
    pub match_score: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyDigest {
    pub date: NaiveDate,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<DigestEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifacts {
    #[serde(default)]
    pub lovable_link: String,
    #[serde(default)]
    pub github_link: String,
    #[serde(default)]
    pub deployed_link: String,
}
