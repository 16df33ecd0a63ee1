mod tui;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobtrack::catalog::Catalog;
use jobtrack::config::{Config, StoreLocation};
use jobtrack::digest::{self, DigestLookup};
use jobtrack::filter::SortMode;
use jobtrack::models::{split_terms, ApplicationStatus, DailyDigest, Experience, JobId, Preferences, Source, WorkMode};
use jobtrack::proof::{self, ArtifactKind, ProjectStatus};
use jobtrack::scoring::MatchTier;
use jobtrack::session::{FilterField, Intent, Route, Session};
use jobtrack::store::{KeyValueStore, SqliteStore};
use jobtrack::Tracker;

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Job notification tracker - match, save, and follow up on job listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List jobs, scored against your preferences
    List {
        /// Match title, company or skills
        #[arg(short, long)]
        keyword: Option<String>,

        /// Exact location (e.g. Bangalore)
        #[arg(short, long)]
        location: Option<String>,

        /// Work mode (remote, hybrid, onsite)
        #[arg(short, long)]
        mode: Option<WorkMode>,

        /// Experience band (fresher, 0-1, 1-3, 3-5)
        #[arg(short, long)]
        experience: Option<Experience>,

        /// Listing source (linkedin, naukri, indeed)
        #[arg(long)]
        source: Option<Source>,

        /// Application status (not-applied, applied, rejected, selected)
        #[arg(long)]
        status: Option<ApplicationStatus>,

        /// Sort order (latest, oldest, score, salary)
        #[arg(long, default_value = "latest")]
        sort: SortMode,

        /// Only show jobs at or above your match threshold
        #[arg(long)]
        matches: bool,
    },

    /// Show job details
    Show {
        /// Job ID
        id: JobId,
    },

    /// Save a job for later
    Save {
        /// Job ID
        id: JobId,
    },

    /// Remove a job from saved
    Unsave {
        /// Job ID
        id: JobId,
    },

    /// List saved jobs
    Saved,

    /// Set the application status of a job
    Status {
        /// Job ID
        id: JobId,

        /// New status (not-applied, applied, rejected, selected)
        status: ApplicationStatus,
    },

    /// Manage match preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Daily top-10 digest
    Digest {
        #[command(subcommand)]
        command: DigestCommands,
    },

    /// Show recent status changes
    Updates {
        /// Number of updates to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Pre-ship test checklist
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommands,
    },

    /// Proof-of-work links and build steps
    Proof {
        #[command(subcommand)]
        command: ProofCommands,
    },

    /// Print the final submission (requires every test to pass)
    Ship,

    /// Browse jobs interactively
    Browse {
        /// Start with only matching jobs shown
        #[arg(long)]
        matches: bool,
    },
}

#[derive(Subcommand)]
enum PrefsCommands {
    /// Show saved preferences
    Show,

    /// Update preferences (unspecified fields keep their current value)
    Set(PrefsArgs),

    /// Remove saved preferences
    Clear,
}

#[derive(Args)]
struct PrefsArgs {
    /// Role keywords, comma separated
    #[arg(short, long)]
    keywords: Option<String>,

    /// Preferred locations, comma separated
    #[arg(short, long)]
    locations: Option<String>,

    /// Preferred work modes, comma separated
    #[arg(short, long)]
    modes: Option<String>,

    /// Experience band, or "any"
    #[arg(short, long)]
    experience: Option<String>,

    /// Your skills, comma separated
    #[arg(short, long)]
    skills: Option<String>,

    /// Minimum match score for --matches (0-100)
    #[arg(long)]
    min_score: Option<u8>,
}

#[derive(Subcommand)]
enum DigestCommands {
    /// Generate today's digest (replaces any earlier one for today)
    Generate,

    /// Show a stored digest
    Show {
        /// Day to show (YYYY-MM-DD), today by default
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Print today's digest as plain text
    Copy,

    /// Print a mailto: link carrying today's digest
    Email,
}

#[derive(Subcommand)]
enum ChecklistCommands {
    /// Show every test and whether it passed
    Show,

    /// Mark a test as passed or not
    Set {
        /// Test key (test3 or 3)
        item: String,

        /// Mark as not passed
        #[arg(long)]
        unset: bool,
    },

    /// Uncheck every test
    Reset,
}

#[derive(Subcommand)]
enum ProofCommands {
    /// Show build steps, links and project status
    Show,

    /// Record a proof link
    Set {
        /// Which link (lovable, github, deployed)
        kind: ArtifactKind,

        /// The URL
        url: String,
    },
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_tracker(config: &Config) -> Result<Tracker> {
    let store = match &config.store {
        StoreLocation::File(path) => SqliteStore::open(path)?,
        StoreLocation::InMemory => SqliteStore::open_in_memory()?,
    };
    tracing::debug!(path = ?store.path(), "store opened");

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::bundled()?,
    };
    tracing::debug!(jobs = catalog.len(), "catalog loaded");

    let store: Box<dyn KeyValueStore> = Box::new(store);
    Ok(Tracker::new(store, catalog, config.skill_match))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_logging(&config.log_filter);

    let tracker = open_tracker(&config)?;
    let mut session = Session::new();

    match cli.command {
        Commands::List {
            keyword,
            location,
            mode,
            experience,
            source,
            status,
            sort,
            matches,
        } => {
            let location = location.map(|wanted| catalog_location(tracker.catalog(), &wanted));
            let intents = [
                Intent::Navigate(Route::Dashboard),
                Intent::SetFilter(FilterField::Keyword(keyword.unwrap_or_default())),
                Intent::SetFilter(FilterField::Location(location)),
                Intent::SetFilter(FilterField::Mode(mode)),
                Intent::SetFilter(FilterField::Experience(experience)),
                Intent::SetFilter(FilterField::Source(source)),
                Intent::SetFilter(FilterField::Status(status)),
                Intent::SetSort(sort),
                Intent::ShowOnlyMatches(matches),
            ];
            for intent in intents {
                tracker.dispatch(&mut session, intent)?;
            }

            let prefs = tracker.preferences()?;
            if prefs.is_none() {
                println!("Set your preferences to activate intelligent matching: jobtrack prefs set --help\n");
            }

            let jobs = tracker.apply_filters(&session.filters)?;
            if jobs.is_empty() {
                if matches && prefs.is_some() {
                    println!("No roles match your criteria. Adjust filters or lower threshold.");
                } else {
                    println!("No jobs match your search.");
                }
            } else {
                println!(
                    "{:<5} {:>5} {:<12} {:<28} {:<14} {:<10} {:<7} {:<14} {:<8}",
                    "ID", "SCORE", "STATUS", "TITLE", "COMPANY", "LOCATION", "MODE", "SALARY", "POSTED"
                );
                println!("{}", "-".repeat(110));
                for scored in jobs {
                    let job = scored.job;
                    let saved = if tracker.is_saved(job.id)? { "*" } else { " " };
                    println!(
                        "{:<5} {:>4}% {:<12} {:<28} {:<14} {:<10} {:<7} {:<14} {:<8}",
                        format!("{}{}", job.id, saved),
                        scored.score,
                        tracker.status_of(job.id)?,
                        truncate(&job.title, 26),
                        truncate(&job.company, 12),
                        truncate(&job.location, 10),
                        job.mode,
                        truncate(&job.salary_range, 14),
                        days_ago(job.posted_days_ago),
                    );
                }
            }
        }

        Commands::Show { id } => {
            let job = tracker.job(id)?;
            let score = tracker.score(job)?;
            println!("Job #{}", job.id);
            println!("Title: {}", job.title);
            println!("Company: {}", job.company);
            println!("Location: {} ({})", job.location, job.mode);
            println!("Experience: {}", job.experience);
            println!("Salary: {}", job.salary_range);
            println!("Source: {}", job.source);
            println!("{}", job.posted_label());
            println!("Match: {}% ({})", score, tier_label(MatchTier::from_score(score)));
            println!("Status: {}", tracker.status_of(id)?);
            println!("Saved: {}", if tracker.is_saved(id)? { "yes" } else { "no" });
            println!("Apply: {}", job.apply_url);
            if !job.skills.is_empty() {
                println!("Skills: {}", job.skills.join(", "));
            }
            if !job.description.is_empty() {
                println!("\n--- Description ---");
                println!("{}", textwrap::fill(&job.description, 80));
            }
        }

        Commands::Save { id } => {
            tracker.save_job(id)?;
            println!("Saved job #{}.", id);
        }

        Commands::Unsave { id } => {
            tracker.unsave_job(id)?;
            println!("Removed job #{} from saved.", id);
        }

        Commands::Saved => {
            tracker.dispatch(&mut session, Intent::Navigate(Route::Saved))?;
            let jobs = tracker.saved_jobs()?;
            if jobs.is_empty() {
                println!("No saved jobs yet. Save one with: jobtrack save <id>");
            } else {
                println!("{:<5} {:<12} {:<30} {:<16} {:<12}", "ID", "STATUS", "TITLE", "COMPANY", "LOCATION");
                println!("{}", "-".repeat(79));
                for job in jobs {
                    println!(
                        "{:<5} {:<12} {:<30} {:<16} {:<12}",
                        job.id,
                        tracker.status_of(job.id)?,
                        truncate(&job.title, 28),
                        truncate(&job.company, 14),
                        truncate(&job.location, 12),
                    );
                }
            }
        }

        Commands::Status { id, status } => {
            if let Some(notice) = tracker.dispatch(&mut session, Intent::SetStatus(id, status))? {
                println!("{}", notice);
            }
        }

        Commands::Prefs { command } => match command {
            PrefsCommands::Show => match tracker.preferences()? {
                Some(prefs) => print_preferences(&prefs),
                None => println!("No preferences saved. Set them with: jobtrack prefs set --help"),
            },

            PrefsCommands::Set(args) => {
                let current = tracker.preferences()?.unwrap_or_default();
                let prefs = merge_preferences(current, args, tracker.catalog())?;
                if let Some(notice) = tracker.dispatch(&mut session, Intent::SavePreferences(prefs.clone()))? {
                    println!("{}\n", notice);
                }
                print_preferences(&prefs);
            }

            PrefsCommands::Clear => {
                tracker.clear_preferences()?;
                println!("Preferences cleared.");
            }
        },

        Commands::Digest { command } => {
            tracker.dispatch(&mut session, Intent::Navigate(Route::Digest))?;
            match command {
                DigestCommands::Generate => {
                    if let Some(notice) = tracker.dispatch(&mut session, Intent::GenerateDigest)? {
                        println!("{}\n", notice);
                    }
                    if let DigestLookup::Ready(digest) = tracker.today_digest()? {
                        print!("{}", render_or_empty(&digest));
                    }
                }

                DigestCommands::Show { date } => {
                    let date = date.unwrap_or_else(|| tracker.today());
                    match tracker.digest_for(date)? {
                        DigestLookup::Ready(digest) => print!("{}", render_or_empty(&digest)),
                        DigestLookup::NotGenerated => {
                            println!("No digest for {}.", date);
                            if tracker.preferences()?.is_none() {
                                println!("Set preferences to generate a personalized digest.");
                            } else if date == tracker.today() {
                                println!("Generate one with: jobtrack digest generate");
                            }
                        }
                    }
                }

                DigestCommands::Copy => {
                    let digest = require_today_digest(&tracker)?;
                    println!("{}", digest::render_text(&digest));
                }

                DigestCommands::Email => {
                    let digest = require_today_digest(&tracker)?;
                    println!("{}", digest::mailto_link(&digest));
                }
            }
        }

        Commands::Updates { limit } => {
            let updates = tracker.recent_updates(limit)?;
            if updates.is_empty() {
                println!("No status updates yet.");
            } else {
                println!("{:<17} {:<5} {:<12} {:<30} {:<16}", "WHEN", "ID", "STATUS", "TITLE", "COMPANY");
                println!("{}", "-".repeat(84));
                for update in updates {
                    println!(
                        "{:<17} {:<5} {:<12} {:<30} {:<16}",
                        update.at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                        update.job_id,
                        update.status,
                        truncate(&update.title, 28),
                        truncate(&update.company, 14),
                    );
                }
            }
        }

        Commands::Checklist { command } => {
            tracker.dispatch(&mut session, Intent::Navigate(Route::TestChecklist))?;
            match command {
                ChecklistCommands::Show => print_checklist(&tracker)?,

                ChecklistCommands::Set { item, unset } => {
                    let intent = Intent::SetChecklistItem { key: item, checked: !unset };
                    if let Some(notice) = tracker.dispatch(&mut session, intent)? {
                        println!("{}", notice);
                    }
                }

                ChecklistCommands::Reset => {
                    if let Some(notice) = tracker.dispatch(&mut session, Intent::ResetChecklist)? {
                        println!("{}", notice);
                    }
                }
            }
        }

        Commands::Proof { command } => {
            tracker.dispatch(&mut session, Intent::Navigate(Route::Proof))?;
            match command {
                ProofCommands::Show => print_proof(&tracker)?,

                ProofCommands::Set { kind, url } => {
                    let intent = Intent::SetProofArtifact { kind, value: url.clone() };
                    if let Some(notice) = tracker.dispatch(&mut session, intent)? {
                        println!("{}", notice);
                    }
                    if !proof::is_valid_url(&url) {
                        println!("Warning: '{}' is not a valid URL; it will not count as provided.", url.trim());
                    }
                }
            }
        }

        Commands::Ship => {
            tracker.dispatch(&mut session, Intent::Navigate(Route::Ship))?;
            let (passed, total) = tracker.checklist()?.passed();
            if !tracker.ship_unlocked()? {
                println!("Ship locked: {} / {} tests passed.", passed, total);
                println!("Complete the test checklist first: jobtrack checklist show");
            } else {
                println!("{}", tracker.final_submission()?);
                if tracker.project_status()? == ProjectStatus::Shipped {
                    println!("\nProject 1 Shipped Successfully.");
                } else {
                    println!("\nAdd all three proof links to mark the project as shipped: jobtrack proof show");
                }
            }
        }

        Commands::Browse { matches } => {
            tracker.dispatch(&mut session, Intent::ShowOnlyMatches(matches))?;
            tui::run_browse(&tracker, session)?;
        }
    }

    Ok(())
}

/// Locations compare exactly when scoring and filtering, so user input takes
/// the catalog's spelling when only the case differs.
fn catalog_location(catalog: &Catalog, wanted: &str) -> String {
    let wanted = wanted.trim();
    catalog
        .locations()
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(wanted))
        .unwrap_or_else(|| wanted.to_string())
}

/// Applies `prefs set` arguments on top of the stored preferences.
fn merge_preferences(mut prefs: Preferences, args: PrefsArgs, catalog: &Catalog) -> Result<Preferences> {
    if let Some(keywords) = args.keywords {
        prefs.role_keywords = keywords;
    }
    if let Some(locations) = args.locations {
        prefs.locations = locations
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| catalog_location(catalog, l))
            .collect();
    }
    if let Some(modes) = args.modes {
        prefs.modes = split_terms(&modes)
            .iter()
            .map(|m| m.parse::<WorkMode>())
            .collect::<Result<Vec<_>, _>>()?;
    }
    if let Some(experience) = args.experience {
        prefs.experience = if experience.trim().eq_ignore_ascii_case("any") {
            None
        } else {
            Some(experience.parse::<Experience>()?)
        };
    }
    if let Some(skills) = args.skills {
        prefs.skills = skills;
    }
    if let Some(min_score) = args.min_score {
        prefs.min_match_score = min_score;
    }
    Ok(prefs)
}

fn require_today_digest(tracker: &Tracker) -> Result<DailyDigest> {
    match tracker.today_digest()? {
        DigestLookup::Ready(digest) => Ok(digest),
        DigestLookup::NotGenerated => {
            anyhow::bail!("No digest for today. Generate one with: jobtrack digest generate")
        }
    }
}

fn render_or_empty(digest: &DailyDigest) -> String {
    if digest.entries.is_empty() {
        format!("Digest for {} has no jobs.\n", digest.date)
    } else {
        digest::render_text(digest) + "\n"
    }
}

fn print_preferences(prefs: &Preferences) {
    let or_any = |s: String| if s.is_empty() { "(any)".to_string() } else { s };
    println!("Role keywords:   {}", or_any(prefs.keywords().join(", ")));
    println!("Locations:       {}", or_any(prefs.locations.join(", ")));
    println!(
        "Modes:           {}",
        or_any(prefs.modes.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", "))
    );
    println!(
        "Experience:      {}",
        prefs.experience.map(|e| e.to_string()).unwrap_or_else(|| "(any)".to_string())
    );
    println!("Skills:          {}", or_any(prefs.skill_terms().join(", ")));
    println!("Min match score: {}", prefs.min_match_score);
}

fn print_checklist(tracker: &Tracker) -> Result<()> {
    let checklist = tracker.checklist()?;
    let (passed, total) = checklist.passed();
    println!("Tests Passed: {} / {}\n", passed, total);
    for (item, checked) in checklist.items() {
        println!("[{}] {:<7} {}", if checked { "x" } else { " " }, item.key, item.title);
        println!("            How to test: {}", item.how_to);
    }
    if !checklist.all_passed() {
        println!("\nResolve all issues before shipping.");
    }
    Ok(())
}

fn print_proof(tracker: &Tracker) -> Result<()> {
    println!("Project status: {}\n", tracker.project_status()?);

    println!("Steps:");
    for (i, step) in tracker.step_completion()?.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, if step.completed { "x" } else { " " }, step.step);
    }

    let artifacts = tracker.proof()?;
    println!("\nArtifacts:");
    for kind in ArtifactKind::ALL {
        let value = kind.value(&artifacts);
        let state = if value.is_empty() {
            "missing".to_string()
        } else if proof::is_valid_url(value) {
            value.to_string()
        } else {
            format!("{} (invalid URL)", value)
        };
        println!("  {:<24} {}", kind.label(), state);
    }
    Ok(())
}

fn tier_label(tier: MatchTier) -> &'static str {
    match tier {
        MatchTier::Strong => "strong",
        MatchTier::Good => "good",
        MatchTier::Fair => "fair",
        MatchTier::Weak => "weak",
    }
}

fn days_ago(days: u32) -> String {
    match days {
        0 => "today".to_string(),
        n => format!("{}d", n),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("Frontend", 10), "Frontend");
        assert_eq!(truncate("10–15 LPA, negotiable", 8), "10–15...");
    }

    #[test]
    fn test_cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "jobtrack", "list", "--mode", "remote", "--status", "not-applied", "--sort", "score", "--matches",
        ])
        .unwrap();
        match cli.command {
            Commands::List { mode, status, sort, matches, .. } => {
                assert_eq!(mode, Some(WorkMode::Remote));
                assert_eq!(status, Some(ApplicationStatus::NotApplied));
                assert_eq!(sort, SortMode::MatchScore);
                assert!(matches);
            }
            _ => panic!("expected list"),
        }
    }

    fn prefs_args(argv: &[&str]) -> PrefsArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Prefs { command: PrefsCommands::Set(args) } => args,
            _ => panic!("expected prefs set"),
        }
    }

    fn memory_tracker() -> Tracker {
        Tracker::new(
            Box::new(jobtrack::store::MemoryStore::new()),
            Catalog::bundled().unwrap(),
            jobtrack::scoring::SkillMatch::Substring,
        )
    }

    #[test]
    fn test_prefs_set_locations_take_catalog_spelling() {
        let catalog = Catalog::bundled().unwrap();
        let args = prefs_args(&["jobtrack", "prefs", "set", "--locations", "bangalore, PUNE ,, Atlantis"]);
        let prefs = merge_preferences(Preferences::default(), args, &catalog).unwrap();
        assert_eq!(prefs.locations, vec!["Bangalore", "Pune", "Atlantis"]);
    }

    #[test]
    fn test_prefs_set_location_counts_when_scoring() {
        let t = memory_tracker();
        let job = t
            .catalog()
            .jobs()
            .iter()
            .find(|j| j.location == "Bangalore")
            .unwrap();

        t.save_preferences(&Preferences::default()).unwrap();
        let without_location = t.score(job).unwrap();

        let args = prefs_args(&["jobtrack", "prefs", "set", "--locations", "Bangalore"]);
        let prefs = merge_preferences(t.preferences().unwrap().unwrap(), args, t.catalog()).unwrap();
        t.save_preferences(&prefs).unwrap();

        assert_eq!(t.preferences().unwrap().unwrap().locations, vec!["Bangalore"]);
        assert_eq!(t.score(job).unwrap(), without_location + 15);
    }

    #[test]
    fn test_prefs_set_keeps_unspecified_fields() {
        let catalog = Catalog::bundled().unwrap();
        let current = Preferences {
            role_keywords: "frontend".to_string(),
            min_match_score: 55,
            ..Preferences::default()
        };
        let args = prefs_args(&["jobtrack", "prefs", "set", "--modes", "remote,hybrid", "--experience", "any"]);
        let prefs = merge_preferences(current, args, &catalog).unwrap();
        assert_eq!(prefs.role_keywords, "frontend");
        assert_eq!(prefs.min_match_score, 55);
        assert_eq!(prefs.modes, vec![WorkMode::Remote, WorkMode::Hybrid]);
        assert_eq!(prefs.experience, None);
    }

    #[test]
    fn test_updates_default_limit_is_ten() {
        let cli = Cli::try_parse_from(["jobtrack", "updates"]).unwrap();
        match cli.command {
            Commands::Updates { limit } => assert_eq!(limit, 10),
            _ => panic!("expected updates"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["jobtrack", "status", "3", "ghosted"]).is_err());
    }
}
