use crate::catalog::Catalog;
use crate::errors::Result;
use crate::models::{Job, JobId};
use crate::store::{self, KeyValueStore};

pub const SAVED_JOBS_KEY: &str = "saved_jobs";

/// Saved ids in the order they were saved.
pub fn saved_ids(store: &dyn KeyValueStore) -> Result<Vec<JobId>> {
    Ok(store::load(store, SAVED_JOBS_KEY)?.unwrap_or_default())
}

pub fn is_saved(store: &dyn KeyValueStore, job_id: JobId) -> Result<bool> {
    Ok(saved_ids(store)?.contains(&job_id))
}

/// Saving an id that is already saved changes nothing.
pub fn save(store: &dyn KeyValueStore, job_id: JobId) -> Result<()> {
    let mut ids = saved_ids(store)?;
    if !ids.contains(&job_id) {
        ids.push(job_id);
        store::save(store, SAVED_JOBS_KEY, &ids)?;
    }
    Ok(())
}

pub fn unsave(store: &dyn KeyValueStore, job_id: JobId) -> Result<()> {
    let mut ids = saved_ids(store)?;
    let before = ids.len();
    ids.retain(|id| *id != job_id);
    if ids.len() != before {
        store::save(store, SAVED_JOBS_KEY, &ids)?;
    }
    Ok(())
}

/// Flips membership and returns whether the job is saved afterwards.
pub fn toggle(store: &dyn KeyValueStore, job_id: JobId) -> Result<bool> {
    if is_saved(store, job_id)? {
        unsave(store, job_id)?;
        Ok(false)
    } else {
        save(store, job_id)?;
        Ok(true)
    }
}

/// Saved jobs that exist in the catalog, in catalog order.
pub fn saved_jobs<'a>(store: &dyn KeyValueStore, catalog: &'a Catalog) -> Result<Vec<&'a Job>> {
    let ids = saved_ids(store)?;
    Ok(catalog.jobs().iter().filter(|j| ids.contains(&j.id)).collect())
}
