//! Filter to remove perfumes that cannot currently be bought.

use crate::preferences::PreferenceProfile;
use crate::traits::Filter;
use anyhow::Result;
use catalog::Record;

/// Removes candidates with zero stock.
pub struct InStockFilter;

impl Filter for InStockFilter {
    fn name(&self) -> &str {
        "InStockFilter"
    }

    fn apply(&self, candidates: Vec<Record>, _prefs: &PreferenceProfile) -> Result<Vec<Record>> {
        Ok(candidates.into_iter().filter(|r| r.stock > 0).collect())
    }
}
