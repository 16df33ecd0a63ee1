//! Job notification tracker: a fixed job catalog scored against the user's
//! preferences, with saved jobs, application status, a daily top-10 digest
//! and a shipping checklist, all persisted in a key-value store.

pub mod catalog;
pub mod checklist;
pub mod config;
pub mod digest;
pub mod errors;
pub mod filter;
pub mod models;
pub mod preferences;
pub mod proof;
pub mod saved;
pub mod scoring;
pub mod session;
pub mod status;
pub mod store;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use catalog::Catalog;
pub use errors::{Result, TrackerError};
pub use session::{Intent, Route, Session};
pub use tracker::Tracker;
