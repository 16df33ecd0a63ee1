use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::errors::Result;
use crate::models::{ApplicationStatus, Job, JobId, StatusUpdate};
use crate::store::{self, KeyValueStore};

pub const STATUS_MAP_KEY: &str = "status_map";
pub const STATUS_LOG_KEY: &str = "status_updates";

/// Oldest entries beyond this are dropped from the update log.
pub const LOG_CAPACITY: usize = 20;

pub type StatusMap = BTreeMap<JobId, ApplicationStatus>;

pub fn status_map(store: &dyn KeyValueStore) -> Result<StatusMap> {
    Ok(store::load(store, STATUS_MAP_KEY)?.unwrap_or_default())
}

pub fn get_status(store: &dyn KeyValueStore, job_id: JobId) -> Result<ApplicationStatus> {
    Ok(status_map(store)?.get(&job_id).copied().unwrap_or_default())
}

/// Records `status` for `job`. Anything other than Not Applied is also
/// pushed onto the front of the update log.
pub fn set_status(
    store: &dyn KeyValueStore,
    job: &Job,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut map = status_map(store)?;
    let previous = map.insert(job.id, status).unwrap_or_default();
    store::save(store, STATUS_MAP_KEY, &map)?;

    tracing::info!(job_id = job.id, from = %previous, to = %status, "status changed");

    if status != ApplicationStatus::NotApplied {
        let mut log = updates(store)?;
        log.insert(
            0,
            StatusUpdate {
                job_id: job.id,
                title: job.title.clone(),
                company: job.company.clone(),
                status,
                at: now,
            },
        );
        log.truncate(LOG_CAPACITY);
        store::save(store, STATUS_LOG_KEY, &log)?;
    }

    Ok(())
}

fn updates(store: &dyn KeyValueStore) -> Result<Vec<StatusUpdate>> {
    Ok(store::load(store, STATUS_LOG_KEY)?.unwrap_or_default())
}

/// Most recent status changes first, at most `limit` of them.
pub fn recent_updates(store: &dyn KeyValueStore, limit: usize) -> Result<Vec<StatusUpdate>> {
    let mut log = updates(store)?;
    log.truncate(limit);
    Ok(log)
}
