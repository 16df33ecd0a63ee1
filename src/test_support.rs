use crate::models::{Experience, Job, JobId, Source, WorkMode};

/// A plain listing for tests to tweak field by field.
pub fn make_job(id: JobId) -> Job {
    Job {
        id,
        title: format!("Software Engineer {}", id),
        company: "Acme".to_string(),
        location: "Bangalore".to_string(),
        mode: WorkMode::Onsite,
        experience: Experience::OneToThree,
        salary_range: "10–15 LPA".to_string(),
        description: String::new(),
        skills: Vec::new(),
        source: Source::Naukri,
        posted_days_ago: 3,
        apply_url: format!("https://jobs.example.com/{}", id),
    }
}
