use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::errors::TrackerError;
use crate::models::{ApplicationStatus, Experience, Job, JobId, Preferences, Source, WorkMode};
use crate::scoring::{match_score, SkillMatch};

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("leading number pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Fewest days since posting first.
    #[default]
    Latest,
    Oldest,
    MatchScore,
    /// Highest leading salary figure first.
    Salary,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Latest,
        SortMode::Oldest,
        SortMode::MatchScore,
        SortMode::Salary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Latest => "latest",
            SortMode::Oldest => "oldest",
            SortMode::MatchScore => "score",
            SortMode::Salary => "salary",
        }
    }

    /// The mode after this one, wrapping around; used to cycle in the browser.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|m| m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "latest" => Ok(SortMode::Latest),
            "oldest" => Ok(SortMode::Oldest),
            "score" | "match" | "matchscore" => Ok(SortMode::MatchScore),
            "salary" => Ok(SortMode::Salary),
            _ => Err(TrackerError::UnknownSort(s.to_string())),
        }
    }
}

/// The dashboard's current filter bar. Owned by the caller's session;
/// every field left at its default is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub keyword: String,
    pub location: Option<String>,
    pub mode: Option<WorkMode>,
    pub experience: Option<Experience>,
    pub source: Option<Source>,
    pub status: Option<ApplicationStatus>,
    pub sort: SortMode,
    pub show_only_matches: bool,
}

impl FilterState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A catalog job paired with its match score under the current preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredJob<'a> {
    pub job: &'a Job,
    pub score: u8,
}

/// First number in a salary string ("3.5–4.5 LPA" → 3.5), 0 when there is none.
pub fn salary_floor(salary_range: &str) -> f64 {
    LEADING_NUMBER
        .find(salary_range)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Runs the dashboard pipeline: score, threshold, keyword, exact-match
/// filters, then a stable sort.
pub fn apply_filters<'a, F>(
    jobs: &'a [Job],
    filters: &FilterState,
    preferences: Option<&Preferences>,
    status_of: F,
    rule: SkillMatch,
) -> Vec<ScoredJob<'a>>
where
    F: Fn(JobId) -> ApplicationStatus,
{
    let mut results: Vec<ScoredJob<'a>> = jobs
        .iter()
        .map(|job| ScoredJob {
            job,
            score: match_score(job, preferences, rule),
        })
        .collect();

    if filters.show_only_matches {
        if let Some(prefs) = preferences {
            results.retain(|s| s.score >= prefs.min_match_score);
        }
    }

    let keyword = filters.keyword.trim().to_lowercase();
    if !keyword.is_empty() {
        results.retain(|s| {
            s.job.title.to_lowercase().contains(&keyword)
                || s.job.company.to_lowercase().contains(&keyword)
                || s.job.skills.iter().any(|sk| sk.to_lowercase().contains(&keyword))
        });
    }

    if let Some(location) = &filters.location {
        results.retain(|s| s.job.location == *location);
    }
    if let Some(mode) = filters.mode {
        results.retain(|s| s.job.mode == mode);
    }
    if let Some(experience) = filters.experience {
        results.retain(|s| s.job.experience == experience);
    }
    if let Some(source) = filters.source {
        results.retain(|s| s.job.source == source);
    }
    if let Some(status) = filters.status {
        results.retain(|s| status_of(s.job.id) == status);
    }

    match filters.sort {
        SortMode::Latest => results.sort_by_key(|s| s.job.posted_days_ago),
        SortMode::Oldest => results.sort_by(|a, b| b.job.posted_days_ago.cmp(&a.job.posted_days_ago)),
        SortMode::MatchScore => results.sort_by(|a, b| b.score.cmp(&a.score)),
        SortMode::Salary => results.sort_by(|a, b| {
            salary_floor(&b.job.salary_range)
                .partial_cmp(&salary_floor(&a.job.salary_range))
                .unwrap_or(Ordering::Equal)
        }),
    }

    results
}
