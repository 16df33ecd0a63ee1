//! The daily digest: the ten best-scoring jobs, frozen per calendar day.
//!
//! A digest is generated on demand (there is no scheduler) and stored under
//! its date. Reads for a date never generated report `NotGenerated`, which
//! is different from a digest that happens to have no entries.

use chrono::{DateTime, NaiveDate, Utc};
use url::form_urlencoded;

use crate::errors::{Result, TrackerError};
use crate::models::{DailyDigest, DigestEntry, Job, Preferences};
use crate::scoring::{match_score, SkillMatch};
use crate::store::{self, KeyValueStore};

pub const DIGEST_SIZE: usize = 10;

const KEY_PREFIX: &str = "digest:";
const HEADLINE: &str = "TOP 10 JOBS FOR YOU — 9AM DIGEST";
const FOOTER: &str = "This digest was generated based on your preferences.";
const EMAIL_SUBJECT: &str = "My 9AM Job Digest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestLookup {
    NotGenerated,
    Ready(DailyDigest),
}

pub fn digest_key(date: NaiveDate) -> String {
    format!("{}{}", KEY_PREFIX, date.format("%Y-%m-%d"))
}

/// Scores every job and keeps the top ten, best score first and, among
/// equal scores, the most recently posted first.
pub fn build_digest(
    jobs: &[Job],
    preferences: Option<&Preferences>,
    date: NaiveDate,
    now: DateTime<Utc>,
    rule: SkillMatch,
) -> Result<DailyDigest> {
    let prefs = preferences.ok_or(TrackerError::PreferencesRequired)?;

    let mut entries: Vec<DigestEntry> = jobs
        .iter()
        .map(|job| DigestEntry {
            match_score: match_score(job, Some(prefs), rule),
            job: job.clone(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.match_score
            .cmp(&a.match_score)
            .then(a.job.posted_days_ago.cmp(&b.job.posted_days_ago))
    });
    entries.truncate(DIGEST_SIZE);

    Ok(DailyDigest {
        date,
        generated_at: now,
        entries,
    })
}

/// Builds the digest for `date` and stores it, replacing any earlier one
/// for the same day.
pub fn generate(
    store: &dyn KeyValueStore,
    jobs: &[Job],
    preferences: Option<&Preferences>,
    date: NaiveDate,
    now: DateTime<Utc>,
    rule: SkillMatch,
) -> Result<DailyDigest> {
    let digest = build_digest(jobs, preferences, date, now, rule)?;
    store::save(store, &digest_key(date), &digest)?;
    tracing::info!(%date, entries = digest.entries.len(), "digest generated");
    Ok(digest)
}

pub fn digest_for(store: &dyn KeyValueStore, date: NaiveDate) -> Result<DigestLookup> {
    Ok(match store::load(store, &digest_key(date))? {
        Some(digest) => DigestLookup::Ready(digest),
        None => DigestLookup::NotGenerated,
    })
}

/// Plain-text digest suitable for pasting into a message.
pub fn render_text(digest: &DailyDigest) -> String {
    let mut text = String::new();
    text.push_str(HEADLINE);
    text.push('\n');
    text.push_str(&digest.date.format("%A, %B %-d, %Y").to_string());
    text.push_str("\n\n");

    for (i, entry) in digest.entries.iter().enumerate() {
        let job = &entry.job;
        text.push_str(&format!("{}. {} at {}\n", i + 1, job.title, job.company));
        text.push_str(&format!("   Location: {} ({})\n", job.location, job.mode));
        text.push_str(&format!("   Experience: {}\n", job.experience));
        text.push_str(&format!("   Salary: {}\n", job.salary_range));
        text.push_str(&format!("   Match Score: {}%\n", entry.match_score));
        text.push_str(&format!("   Apply: {}\n\n", job.apply_url));
    }

    text.push_str(FOOTER);
    text
}

/// A `mailto:` link with no recipient whose body is the rendered digest.
pub fn mailto_link(digest: &DailyDigest) -> String {
    format!(
        "mailto:?subject={}&body={}",
        percent_encode(EMAIL_SUBJECT),
        percent_encode(&render_text(digest))
    )
}

// form_urlencoded writes spaces as '+', which mail clients show literally.
// A literal '+' in the input is already emitted as %2B, so the swap is safe.
fn percent_encode(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::Source;
    use crate::store::MemoryStore;
    use crate::test_support::make_job;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn frontend_prefs() -> Preferences {
        Preferences {
            role_keywords: "frontend, engineer".to_string(),
            locations: vec!["Bangalore".to_string()],
            skills: "react".to_string(),
            ..Preferences::default()
        }
    }

    #[test]
    fn test_requires_preferences() {
        let store = MemoryStore::new();
        let jobs = vec![make_job(1)];
        let err = generate(&store, &jobs, None, date(2026, 10, 18), Utc::now(), SkillMatch::Substring)
            .unwrap_err();
        assert!(matches!(err, TrackerError::PreferencesRequired));
        assert_eq!(digest_for(&store, date(2026, 10, 18)).unwrap(), DigestLookup::NotGenerated);
    }

    #[test]
    fn test_fifteen_jobs_yield_top_ten_in_order() {
        let jobs: Vec<Job> = (1..=15)
            .map(|id| {
                let mut job = make_job(id);
                job.posted_days_ago = 15 - id;
                if id % 3 == 0 {
                    job.title = format!("Frontend Developer {}", id);
                }
                if id % 5 == 0 {
                    job.source = Source::LinkedIn;
                }
                job
            })
            .collect();
        let prefs = Preferences {
            role_keywords: "frontend".to_string(),
            ..Preferences::default()
        };

        let digest = build_digest(&jobs, Some(&prefs), date(2026, 10, 18), Utc::now(), SkillMatch::Substring)
            .unwrap();
        assert_eq!(digest.entries.len(), DIGEST_SIZE);
        for pair in digest.entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.match_score > b.match_score
                    || (a.match_score == b.match_score && a.job.posted_days_ago <= b.job.posted_days_ago),
                "#{} before #{} is out of order",
                a.job.id,
                b.job.id
            );
        }
        // #15: title (25) + LinkedIn (5) + posted today (5)
        assert_eq!(digest.entries[0].job.id, 15);
        assert_eq!(digest.entries[0].match_score, 35);
    }

    #[test]
    fn test_small_catalog_keeps_every_job() {
        let jobs = vec![make_job(1), make_job(2), make_job(3)];
        let digest = build_digest(&jobs, Some(&Preferences::default()), date(2026, 1, 1), Utc::now(), SkillMatch::Substring)
            .unwrap();
        assert_eq!(digest.entries.len(), 3);
    }

    #[test]
    fn test_generate_persists_and_regenerates_identically() {
        let store = MemoryStore::new();
        let catalog = Catalog::bundled().unwrap();
        let prefs = frontend_prefs();
        let day = date(2026, 10, 18);
        let now = Utc::now();

        let first = generate(&store, catalog.jobs(), Some(&prefs), day, now, SkillMatch::Substring).unwrap();
        let second = generate(&store, catalog.jobs(), Some(&prefs), day, now, SkillMatch::Substring).unwrap();
        assert_eq!(first, second);

        match digest_for(&store, day).unwrap() {
            DigestLookup::Ready(stored) => assert_eq!(stored, first),
            DigestLookup::NotGenerated => panic!("digest should be stored"),
        }
        assert_eq!(digest_for(&store, date(2026, 10, 19)).unwrap(), DigestLookup::NotGenerated);
    }

    #[test]
    fn test_regeneration_overwrites_same_day() {
        let store = MemoryStore::new();
        let day = date(2026, 10, 18);
        let jobs = vec![make_job(1), make_job(2)];

        generate(&store, &jobs, Some(&Preferences::default()), day, Utc::now(), SkillMatch::Substring).unwrap();
        let fewer = vec![make_job(3)];
        generate(&store, &fewer, Some(&Preferences::default()), day, Utc::now(), SkillMatch::Substring).unwrap();

        let DigestLookup::Ready(stored) = digest_for(&store, day).unwrap() else {
            panic!("digest should be stored");
        };
        assert_eq!(stored.entries.len(), 1);
        assert_eq!(stored.entries[0].job.id, 3);
    }

    #[test]
    fn test_stored_scores_are_frozen() {
        let store = MemoryStore::new();
        let day = date(2026, 10, 18);
        let mut job = make_job(1);
        job.title = "Frontend Engineer".to_string();
        let jobs = vec![job];

        generate(&store, &jobs, Some(&frontend_prefs()), day, Utc::now(), SkillMatch::Substring).unwrap();
        let DigestLookup::Ready(stored) = digest_for(&store, day).unwrap() else {
            panic!("digest should be stored");
        };
        assert_eq!(stored.entries[0].match_score, 40);
    }

    #[test]
    fn test_empty_digest_is_not_the_same_as_missing() {
        let store = MemoryStore::new();
        let day = date(2026, 10, 18);
        generate(&store, &[], Some(&Preferences::default()), day, Utc::now(), SkillMatch::Substring).unwrap();
        let DigestLookup::Ready(stored) = digest_for(&store, day).unwrap() else {
            panic!("empty digest should still be stored");
        };
        assert!(stored.entries.is_empty());
    }

    #[test]
    fn test_render_text_layout() {
        let mut job = make_job(4);
        job.title = "UI Engineer".to_string();
        job.company = "PhonePe".to_string();
        let digest = DailyDigest {
            date: date(2026, 10, 18),
            generated_at: Utc::now(),
            entries: vec![DigestEntry { job, match_score: 65 }],
        };
        let text = render_text(&digest);
        assert!(text.starts_with("TOP 10 JOBS FOR YOU — 9AM DIGEST\nSunday, October 18, 2026\n\n"));
        assert!(text.contains("1. UI Engineer at PhonePe\n"));
        assert!(text.contains("   Location: Bangalore (Onsite)\n"));
        assert!(text.contains("   Experience: 1-3\n"));
        assert!(text.contains("   Match Score: 65%\n"));
        assert!(text.contains("   Apply: https://jobs.example.com/4\n"));
        assert!(text.ends_with(FOOTER));
    }

    #[test]
    fn test_mailto_link_encodes_body() {
        let digest = DailyDigest {
            date: date(2026, 10, 18),
            generated_at: Utc::now(),
            entries: vec![DigestEntry { job: make_job(1), match_score: 100 }],
        };
        let link = mailto_link(&digest);
        assert!(link.starts_with("mailto:?subject=My%209AM%20Job%20Digest&body=TOP%2010%20JOBS"));
        assert!(link.contains("%0A"));
        assert!(link.contains("100%25"));
        assert!(!link.contains(' '));
        assert!(!link.contains('+'));
    }
}
