//! Optional hard budget cap.
//!
//! The scorer only penalizes over-budget records. This filter is for callers
//! that want them gone entirely.

use crate::preferences::PreferenceProfile;
use crate::traits::Filter;
use anyhow::Result;
use catalog::Record;

/// Removes candidates priced above the call's `price_max`.
///
/// Without a budget in the preferences every candidate is kept.
pub struct BudgetFilter;

impl Filter for BudgetFilter {
    fn name(&self) -> &str {
        "BudgetFilter"
    }

    fn apply(&self, candidates: Vec<Record>, prefs: &PreferenceProfile) -> Result<Vec<Record>> {
        let Some(price_max) = prefs.price_max else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|r| r.price <= price_max)
            .collect())
    }
}
