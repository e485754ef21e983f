//! # Recommender
//!
//! Turns a candidate list and a preference profile into a ranked, truncated
//! list:
//! 1. Apply the configured filters (none by default)
//! 2. Score every remaining candidate
//! 3. Sort by total score, highest first; ties keep input order
//! 4. Truncate to the requested `k` (at least 1)
//!
//! The recommender holds no mutable state and never touches storage.

use std::cmp::Ordering;
use std::time::Instant;

use anyhow::Result;
use catalog::Record;

use crate::filter_pipeline::FilterPipeline;
use crate::preferences::PreferenceProfile;
use crate::scoring::{ScoreBreakdown, Scorer, Weights};
use crate::traits::Filter;

/// Number of results returned when the caller does not ask for a count
pub const DEFAULT_TOP_K: usize = 5;

/// One ranked result
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub record: Record,
    pub score: ScoreBreakdown,
}

impl Recommendation {
    pub fn total(&self) -> f64 {
        self.score.total
    }

    pub fn explanation(&self) -> String {
        self.score.explain()
    }
}

/// Ranks catalogue records against preferences
#[derive(Default)]
pub struct Recommender {
    filters: FilterPipeline,
    scorer: Scorer,
}

impl Recommender {
    /// Recommender with default weights and no filters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: Weights) -> Self {
        Self {
            filters: FilterPipeline::new(),
            scorer: Scorer::new(weights),
        }
    }

    /// Add a candidate filter (builder pattern)
    pub fn with_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters = self.filters.add_filter(filter);
        self
    }

    /// Rank `candidates` against `prefs` and keep the top `k`.
    ///
    /// # Arguments
    /// * `candidates` - Records in caller order; that order breaks ties
    /// * `prefs` - Preferences of this call
    /// * `k` - Maximum number of results; `0` is treated as `1`
    ///
    /// # Returns
    /// Recommendations sorted by score (highest first)
    pub fn recommend(
        &self,
        candidates: Vec<Record>,
        prefs: &PreferenceProfile,
        k: usize,
    ) -> Result<Vec<Recommendation>> {
        let start = Instant::now();
        let total_candidates = candidates.len();

        let eligible = self.filters.apply(candidates, prefs)?;
        let scores = self.scorer.score_all(&eligible, prefs);

        let mut ranked: Vec<Recommendation> = eligible
            .into_iter()
            .zip(scores)
            .map(|(record, score)| Recommendation { record, score })
            .collect();

        // sort_by is stable, so equal scores keep input order
        ranked.sort_by(|a, b| {
            b.score
                .total
                .partial_cmp(&a.score.total)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(k.max(1));

        tracing::debug!(
            "Ranked {} of {} candidates in {:?}",
            ranked.len(),
            total_candidates,
            start.elapsed()
        );
        Ok(ranked)
    }
}
