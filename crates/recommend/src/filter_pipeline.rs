//! The FilterPipeline chains candidate filters.

use crate::preferences::PreferenceProfile;
use crate::traits::Filter;
use anyhow::Result;
use catalog::Record;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(InStockFilter)
///     .add_filter(MinimumRatingFilter::new(3.5, true));
///
/// let eligible = pipeline.apply(records, &prefs)?;
/// ```
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    ///
    /// # Returns
    /// * `Ok(Vec<Record>)` - The candidates that passed every filter
    /// * `Err` - If any filter fails
    pub fn apply(&self, candidates: Vec<Record>, prefs: &PreferenceProfile) -> Result<Vec<Record>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, prefs)?;
            tracing::debug!(
                "Filter applied: {} ({} -> {} candidates)",
                filter.name(),
                before,
                current.len()
            );
        }
        Ok(current)
    }
}
