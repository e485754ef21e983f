//! Core traits for the candidate filtering stage.
//!
//! Filters run before scoring and decide which catalogue records are
//! eligible at all. Scoring never removes candidates; filters do.

use anyhow::Result;
use catalog::Record;

use crate::preferences::PreferenceProfile;

/// Core trait for filtering candidates.
///
/// ## Design Note
/// - `Send + Sync` lets a configured recommender be shared across threads
/// - Filters take ownership of the candidates and return the survivors in
///   their original relative order, which keeps ranking ties stable
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `prefs` - Preferences of the current call
    fn apply(&self, candidates: Vec<Record>, prefs: &PreferenceProfile) -> Result<Vec<Record>>;
}
