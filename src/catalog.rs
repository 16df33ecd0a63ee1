use anyhow::{anyhow, Context, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::models::{Job, JobId};

const BUNDLED_JOBS: &str = include_str!("../data/jobs.json");

/// Read-only, ordered job listings. Loaded once and never mutated.
#[derive(Debug, Clone)]
pub struct Catalog {
    jobs: Vec<Job>,
}

impl Catalog {
    pub fn new(jobs: Vec<Job>) -> Result<Self> {
        let mut seen = HashSet::new();
        for job in &jobs {
            if !seen.insert(job.id) {
                return Err(anyhow!("Duplicate job id {} in catalog", job.id));
            }
        }
        Ok(Self { jobs })
    }

    /// The listings that ship with the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_JOBS).context("Bundled catalog is invalid")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let jobs: Vec<Job> = serde_json::from_str(raw).context("Failed to parse job catalog")?;
        Self::new(jobs)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        Self::from_json(&raw)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Distinct locations, sorted, for filter and preference pickers.
    pub fn locations(&self) -> Vec<String> {
        self.jobs
            .iter()
            .map(|j| j.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert!(catalog.len() >= 15);
        assert!(catalog.get(1).is_some());
        assert!(catalog.get(9999).is_none());
    }

    #[test]
    fn test_locations_are_sorted_and_distinct() {
        let catalog = Catalog::bundled().unwrap();
        let locations = catalog.locations();
        let mut sorted = locations.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(locations, sorted);
        assert!(locations.contains(&"Bangalore".to_string()));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let catalog = Catalog::bundled().unwrap();
        let mut jobs = catalog.jobs().to_vec();
        jobs.push(jobs[0].clone());
        let err = Catalog::new(jobs).unwrap_err();
        assert!(err.to_string().contains("Duplicate job id"));
    }

    #[test]
    fn test_malformed_catalog_is_an_error() {
        assert!(Catalog::from_json("[{\"id\": 1}]").is_err());
    }
}
