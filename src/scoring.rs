//! Match score: a 0–100 weighted sum describing how well a job fits the
//! user's preferences.
//!
//! | signal                                   | points |
//! |------------------------------------------|--------|
//! | role keyword in title                    | 25     |
//! | role keyword in description              | 15     |
//! | location in preferred locations          | 15     |
//! | mode in preferred modes                  | 10     |
//! | experience band matches                  | 10     |
//! | any skill overlaps                       | 15     |
//! | posted within the last 2 days            | 5      |
//! | listed on LinkedIn                       | 5      |
//!
//! Blank or missing preference fields contribute nothing. Without
//! preferences at all, every job scores 0.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::TrackerError;
use crate::models::{Job, Preferences, Source};

pub const MAX_SCORE: u8 = 100;

const TITLE_KEYWORD: u32 = 25;
const DESCRIPTION_KEYWORD: u32 = 15;
const LOCATION: u32 = 15;
const MODE: u32 = 10;
const EXPERIENCE: u32 = 10;
const SKILLS: u32 = 15;
const RECENT: u32 = 5;
const LINKEDIN: u32 = 5;

const RECENT_DAYS: u32 = 2;

/// How a user skill is compared against a job skill once both are trimmed
/// and lower-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillMatch {
    /// Either string contains the other ("c" matches "c++").
    #[default]
    Substring,
    /// Strings must be equal.
    Exact,
}

impl SkillMatch {
    fn matches(&self, user: &str, job: &str) -> bool {
        match self {
            SkillMatch::Substring => job.contains(user) || user.contains(job),
            SkillMatch::Exact => user == job,
        }
    }
}

impl FromStr for SkillMatch {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substring" => Ok(SkillMatch::Substring),
            "exact" => Ok(SkillMatch::Exact),
            _ => Err(TrackerError::InvalidValue {
                field: "skill match rule",
                value: s.to_string(),
            }),
        }
    }
}

pub fn match_score(job: &Job, preferences: Option<&Preferences>, rule: SkillMatch) -> u8 {
    let Some(prefs) = preferences else {
        return 0;
    };

    let mut score = 0u32;

    let keywords = prefs.keywords();
    if !keywords.is_empty() {
        let title = job.title.to_lowercase();
        if keywords.iter().any(|kw| title.contains(kw.as_str())) {
            score += TITLE_KEYWORD;
        }
        let description = job.description.to_lowercase();
        if keywords.iter().any(|kw| description.contains(kw.as_str())) {
            score += DESCRIPTION_KEYWORD;
        }
    }

    if !prefs.locations.is_empty() && prefs.locations.iter().any(|l| *l == job.location) {
        score += LOCATION;
    }

    if !prefs.modes.is_empty() && prefs.modes.contains(&job.mode) {
        score += MODE;
    }

    if prefs.experience == Some(job.experience) {
        score += EXPERIENCE;
    }

    let user_skills = prefs.skill_terms();
    if !user_skills.is_empty() {
        let job_skills: Vec<String> = job.skills.iter().map(|s| s.trim().to_lowercase()).collect();
        let overlap = user_skills
            .iter()
            .any(|us| job_skills.iter().any(|js| rule.matches(us, js)));
        if overlap {
            score += SKILLS;
        }
    }

    if job.posted_days_ago <= RECENT_DAYS {
        score += RECENT;
    }

    if job.source == Source::LinkedIn {
        score += LINKEDIN;
    }

    score.min(MAX_SCORE as u32) as u8
}

/// Badge class for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Strong,
    Good,
    Fair,
    Weak,
}

impl MatchTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => MatchTier::Strong,
            60..=79 => MatchTier::Good,
            40..=59 => MatchTier::Fair,
            _ => MatchTier::Weak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Experience, WorkMode};
    use crate::test_support::make_job;

    fn prefs_with_keywords(keywords: &str) -> Preferences {
        Preferences {
            role_keywords: keywords.to_string(),
            ..Preferences::default()
        }
    }

    /// A job that earns no points from recency or source.
    fn quiet_job() -> Job {
        let mut job = make_job(1);
        job.posted_days_ago = 10;
        job.source = Source::Indeed;
        job
    }

    #[test]
    fn test_no_preferences_scores_zero() {
        let mut job = make_job(1);
        job.posted_days_ago = 0;
        job.source = Source::LinkedIn;
        assert_eq!(match_score(&job, None, SkillMatch::Substring), 0);
    }

    #[test]
    fn test_title_keyword_match() {
        let mut job = quiet_job();
        job.title = "React Developer".to_string();
        job.description = "Build user interfaces".to_string();
        let prefs = prefs_with_keywords("react");
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 25);
    }

    #[test]
    fn test_description_keyword_without_title_bonus() {
        let mut job = quiet_job();
        job.title = "UI Engineer".to_string();
        job.description = "You will work mostly in React.".to_string();
        let prefs = prefs_with_keywords("react");
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 15);
    }

    #[test]
    fn test_title_and_description_both_fire() {
        let mut job = quiet_job();
        job.title = "React Developer".to_string();
        job.description = "Ship React components".to_string();
        let prefs = prefs_with_keywords(" React , vue");
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 40);
    }

    #[test]
    fn test_blank_keywords_contribute_nothing() {
        let mut job = quiet_job();
        job.title = "Anything".to_string();
        let prefs = prefs_with_keywords(" , ,");
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 0);
    }

    #[test]
    fn test_location_mode_and_experience() {
        let mut job = quiet_job();
        job.location = "Pune".to_string();
        job.mode = WorkMode::Hybrid;
        job.experience = Experience::OneToThree;
        let prefs = Preferences {
            locations: vec!["Pune".to_string(), "Chennai".to_string()],
            modes: vec![WorkMode::Hybrid],
            experience: Some(Experience::OneToThree),
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 35);

        let other = Preferences {
            locations: vec!["pune".to_string()],
            modes: vec![WorkMode::Remote],
            experience: Some(Experience::Fresher),
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&other), SkillMatch::Substring), 0);
    }

    #[test]
    fn test_skill_overlap_is_bidirectional_substring_by_default() {
        let mut job = quiet_job();
        job.skills = vec!["C++".to_string()];
        let prefs = Preferences {
            skills: "c".to_string(),
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 15);

        job.skills = vec!["React".to_string()];
        let prefs = Preferences {
            skills: "react native".to_string(),
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 15);
    }

    #[test]
    fn test_exact_skill_rule_avoids_partial_hits() {
        let mut job = quiet_job();
        job.skills = vec!["C++".to_string(), " Go ".to_string()];
        let partial = Preferences {
            skills: "c".to_string(),
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&partial), SkillMatch::Exact), 0);

        let exact = Preferences {
            skills: "GO".to_string(),
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&exact), SkillMatch::Exact), 15);
    }

    #[test]
    fn test_recency_and_linkedin_bonuses() {
        let mut job = quiet_job();
        let prefs = Preferences::default();
        job.posted_days_ago = 2;
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 5);
        job.posted_days_ago = 3;
        job.source = Source::LinkedIn;
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 5);
    }

    #[test]
    fn test_every_signal_together_sums_to_100() {
        let mut job = make_job(1);
        job.title = "Frontend Engineer".to_string();
        job.description = "frontend work".to_string();
        job.location = "Bangalore".to_string();
        job.mode = WorkMode::Remote;
        job.experience = Experience::Fresher;
        job.skills = vec!["CSS".to_string()];
        job.posted_days_ago = 0;
        job.source = Source::LinkedIn;
        let prefs = Preferences {
            role_keywords: "frontend".to_string(),
            locations: vec!["Bangalore".to_string()],
            modes: vec![WorkMode::Remote],
            experience: Some(Experience::Fresher),
            skills: "css".to_string(),
            min_match_score: 40,
        };
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 100);
    }

    #[test]
    fn test_frontend_bangalore_scenario_scores_50() {
        let mut job = make_job(1);
        job.title = "Frontend Engineer".to_string();
        job.description = "Build storefront pages".to_string();
        job.location = "Bangalore".to_string();
        job.mode = WorkMode::Remote;
        job.posted_days_ago = 1;
        job.source = Source::LinkedIn;
        job.skills = vec!["CSS".to_string()];
        let prefs = Preferences {
            role_keywords: "frontend".to_string(),
            locations: vec!["Bangalore".to_string()],
            min_match_score: 40,
            ..Preferences::default()
        };
        assert_eq!(match_score(&job, Some(&prefs), SkillMatch::Substring), 50);
    }

    #[test]
    fn test_scores_stay_in_range_across_bundled_catalog() {
        let catalog = crate::catalog::Catalog::bundled().unwrap();
        let prefs = Preferences {
            role_keywords: "engineer, developer, intern, frontend, data".to_string(),
            locations: catalog.locations(),
            modes: WorkMode::ALL.to_vec(),
            experience: Some(Experience::OneToThree),
            skills: "java, react, python, sql, aws".to_string(),
            min_match_score: 0,
        };
        for job in catalog.jobs() {
            for rule in [SkillMatch::Substring, SkillMatch::Exact] {
                let score = match_score(job, Some(&prefs), rule);
                assert!(score <= MAX_SCORE, "job #{} scored {}", job.id, score);
            }
        }
    }

    #[test]
    fn test_match_tiers() {
        assert_eq!(MatchTier::from_score(100), MatchTier::Strong);
        assert_eq!(MatchTier::from_score(80), MatchTier::Strong);
        assert_eq!(MatchTier::from_score(79), MatchTier::Good);
        assert_eq!(MatchTier::from_score(60), MatchTier::Good);
        assert_eq!(MatchTier::from_score(40), MatchTier::Fair);
        assert_eq!(MatchTier::from_score(39), MatchTier::Weak);
        assert_eq!(MatchTier::from_score(0), MatchTier::Weak);
    }

    #[test]
    fn test_skill_match_rule_parse() {
        assert_eq!("Exact".parse::<SkillMatch>().unwrap(), SkillMatch::Exact);
        assert_eq!(" substring ".parse::<SkillMatch>().unwrap(), SkillMatch::Substring);
        assert!("fuzzy".parse::<SkillMatch>().is_err());
    }
}
