use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::catalog::Catalog;
use crate::checklist::{self, TestChecklist};
use crate::digest::{self, DigestLookup};
use crate::errors::{Result, TrackerError};
use crate::filter::{self, FilterState, ScoredJob};
use crate::models::{ApplicationStatus, DailyDigest, Job, JobId, Preferences, ProofArtifacts, StatusUpdate};
use crate::preferences;
use crate::proof::{self, ArtifactKind, ProjectStatus, StepStatus};
use crate::saved;
use crate::scoring::{self, SkillMatch};
use crate::status;
use crate::store::KeyValueStore;

/// Everything the presentation layer calls. Owns the store and the catalog;
/// holds no per-view state (that lives in `Session`).
pub struct Tracker {
    store: Box<dyn KeyValueStore>,
    catalog: Catalog,
    skill_match: SkillMatch,
    clock: fn() -> DateTime<Local>,
}

impl Tracker {
    pub fn new(store: Box<dyn KeyValueStore>, catalog: Catalog, skill_match: SkillMatch) -> Self {
        Self {
            store,
            catalog,
            skill_match,
            clock: Local::now,
        }
    }

    /// Replaces the wall clock, which decides "today" for digests and the
    /// timestamps of status updates.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)().with_timezone(&Utc)
    }

    pub fn job(&self, id: JobId) -> Result<&Job> {
        self.catalog.get(id).ok_or(TrackerError::UnknownJob(id))
    }

    // --- Preferences & scoring ---

    pub fn preferences(&self) -> Result<Option<Preferences>> {
        preferences::load(self.store.as_ref())
    }

    pub fn save_preferences(&self, prefs: &Preferences) -> Result<()> {
        preferences::save(self.store.as_ref(), prefs)
    }

    pub fn clear_preferences(&self) -> Result<()> {
        preferences::clear(self.store.as_ref())
    }

    pub fn score(&self, job: &Job) -> Result<u8> {
        let prefs = self.preferences()?;
        Ok(scoring::match_score(job, prefs.as_ref(), self.skill_match))
    }

    pub fn apply_filters(&self, filters: &FilterState) -> Result<Vec<ScoredJob<'_>>> {
        let prefs = self.preferences()?;
        let statuses = status::status_map(self.store.as_ref())?;
        Ok(filter::apply_filters(
            self.catalog.jobs(),
            filters,
            prefs.as_ref(),
            |id| statuses.get(&id).copied().unwrap_or_default(),
            self.skill_match,
        ))
    }

    // --- Status ---

    pub fn status_of(&self, id: JobId) -> Result<ApplicationStatus> {
        status::get_status(self.store.as_ref(), id)
    }

    pub fn set_status(&self, id: JobId, new_status: ApplicationStatus) -> Result<()> {
        let job = self.job(id)?;
        status::set_status(self.store.as_ref(), job, new_status, self.now())
    }

    pub fn recent_updates(&self, limit: usize) -> Result<Vec<StatusUpdate>> {
        status::recent_updates(self.store.as_ref(), limit)
    }

    // --- Saved jobs ---

    pub fn save_job(&self, id: JobId) -> Result<()> {
        self.job(id)?;
        saved::save(self.store.as_ref(), id)
    }

    pub fn unsave_job(&self, id: JobId) -> Result<()> {
        saved::unsave(self.store.as_ref(), id)
    }

    pub fn toggle_saved(&self, id: JobId) -> Result<bool> {
        self.job(id)?;
        saved::toggle(self.store.as_ref(), id)
    }

    pub fn is_saved(&self, id: JobId) -> Result<bool> {
        saved::is_saved(self.store.as_ref(), id)
    }

    pub fn saved_jobs(&self) -> Result<Vec<&Job>> {
        saved::saved_jobs(self.store.as_ref(), &self.catalog)
    }

    // --- Digest ---

    /// Generates and stores today's digest. Fails with `PreferencesRequired`
    /// when no preferences have been saved.
    pub fn generate_digest(&self) -> Result<DailyDigest> {
        let prefs = self.preferences()?;
        digest::generate(
            self.store.as_ref(),
            self.catalog.jobs(),
            prefs.as_ref(),
            self.today(),
            self.now(),
            self.skill_match,
        )
    }

    pub fn digest_for(&self, date: NaiveDate) -> Result<DigestLookup> {
        digest::digest_for(self.store.as_ref(), date)
    }

    pub fn today_digest(&self) -> Result<DigestLookup> {
        self.digest_for(self.today())
    }

    // --- Checklist ---

    pub fn checklist(&self) -> Result<TestChecklist> {
        checklist::load(self.store.as_ref())
    }

    pub fn set_checklist_item(&self, key: &str, checked: bool) -> Result<TestChecklist> {
        checklist::set_item(self.store.as_ref(), key, checked)
    }

    pub fn reset_checklist(&self) -> Result<()> {
        checklist::reset(self.store.as_ref())
    }

    // --- Proof & shipping ---

    pub fn proof(&self) -> Result<ProofArtifacts> {
        proof::load(self.store.as_ref())
    }

    pub fn set_proof_artifact(&self, kind: ArtifactKind, value: &str) -> Result<ProofArtifacts> {
        proof::set_artifact(self.store.as_ref(), kind, value)
    }

    pub fn project_status(&self) -> Result<ProjectStatus> {
        Ok(proof::project_status(&self.proof()?, &self.checklist()?))
    }

    pub fn step_completion(&self) -> Result<Vec<StepStatus>> {
        let has_digest = matches!(self.today_digest()?, DigestLookup::Ready(_));
        Ok(proof::step_completion(
            &self.proof()?,
            &self.checklist()?,
            self.preferences()?.is_some(),
            has_digest,
        ))
    }

    pub fn final_submission(&self) -> Result<String> {
        Ok(proof::final_submission(&self.proof()?))
    }

    /// Shipping stays locked until every checklist item passes.
    pub fn ship_unlocked(&self) -> Result<bool> {
        Ok(self.checklist()?.all_passed())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::WorkMode;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn october_18() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
    }

    pub(crate) fn tracker() -> Tracker {
        Tracker::new(
            Box::new(MemoryStore::new()),
            Catalog::bundled().unwrap(),
            SkillMatch::Substring,
        )
        .with_clock(october_18)
    }

    #[test]
    fn test_score_without_preferences_is_zero() {
        let t = tracker();
        for job in t.catalog().jobs() {
            assert_eq!(t.score(job).unwrap(), 0);
        }
    }

    #[test]
    fn test_digest_needs_preferences_then_lands_on_today() {
        let t = tracker();
        assert!(matches!(t.generate_digest(), Err(TrackerError::PreferencesRequired)));
        assert_eq!(t.today_digest().unwrap(), DigestLookup::NotGenerated);

        t.save_preferences(&Preferences {
            role_keywords: "frontend".to_string(),
            modes: vec![WorkMode::Remote],
            ..Preferences::default()
        })
        .unwrap();
        let digest = t.generate_digest().unwrap();
        assert_eq!(digest.date, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(digest.entries.len(), 10);
        assert_eq!(t.today_digest().unwrap(), DigestLookup::Ready(digest));
        assert_eq!(
            t.digest_for(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()).unwrap(),
            DigestLookup::NotGenerated
        );
    }

    #[test]
    fn test_set_status_on_unknown_job_writes_nothing() {
        let t = tracker();
        assert!(matches!(t.set_status(999, ApplicationStatus::Applied), Err(TrackerError::UnknownJob(999))));
        assert!(t.recent_updates(10).unwrap().is_empty());
    }

    #[test]
    fn test_status_filter_through_tracker() {
        let t = tracker();
        t.set_status(2, ApplicationStatus::Applied).unwrap();
        t.set_status(5, ApplicationStatus::Applied).unwrap();
        t.set_status(7, ApplicationStatus::Rejected).unwrap();

        let filters = FilterState {
            status: Some(ApplicationStatus::Applied),
            ..FilterState::default()
        };
        let mut ids: Vec<JobId> = t.apply_filters(&filters).unwrap().iter().map(|s| s.job.id).collect();
        ids.sort();
        assert_eq!(ids, vec![2, 5]);

        let update = &t.recent_updates(1).unwrap()[0];
        assert_eq!(update.job_id, 7);
        assert_eq!(update.at, october_18().with_timezone(&Utc));
    }

    #[test]
    fn test_saving_unknown_job_is_rejected() {
        let t = tracker();
        assert!(matches!(t.save_job(404), Err(TrackerError::UnknownJob(404))));
        t.save_job(3).unwrap();
        t.save_job(3).unwrap();
        assert_eq!(t.saved_jobs().unwrap().len(), 1);
        t.unsave_job(404).unwrap();
        assert!(t.is_saved(3).unwrap());
    }

    #[test]
    fn test_step_completion_tracks_preferences_and_digest() {
        let t = tracker();
        let steps = t.step_completion().unwrap();
        assert!(!steps[2].completed);
        assert!(!steps[3].completed);

        t.save_preferences(&Preferences::default()).unwrap();
        t.generate_digest().unwrap();
        let steps = t.step_completion().unwrap();
        assert!(steps[2].completed);
        assert!(steps[3].completed);
        assert!(!t.ship_unlocked().unwrap());
        assert_eq!(t.project_status().unwrap(), ProjectStatus::NotStarted);
    }
}
