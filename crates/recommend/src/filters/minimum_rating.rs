//! Filter to ensure a minimum quality threshold.

use crate::preferences::PreferenceProfile;
use crate::traits::Filter;
use anyhow::Result;
use catalog::Record;

/// Removes candidates rated below `min_rating`.
///
/// ## Algorithm
/// For each candidate:
/// 1. Rated: keep if rating >= min_rating
/// 2. Unrated: keep only if `keep_unrated` is set
pub struct MinimumRatingFilter {
    min_rating: f64,
    keep_unrated: bool,
}

impl MinimumRatingFilter {
    /// Create a new MinimumRatingFilter.
    ///
    /// # Arguments
    /// * `min_rating` - Minimum rating on the 0.0 to 5.0 scale
    /// * `keep_unrated` - Whether records without a rating pass
    pub fn new(min_rating: f64, keep_unrated: bool) -> Self {
        Self {
            min_rating,
            keep_unrated,
        }
    }
}

impl Filter for MinimumRatingFilter {
    fn name(&self) -> &str {
        "MinimumRatingFilter"
    }

    fn apply(&self, candidates: Vec<Record>, _prefs: &PreferenceProfile) -> Result<Vec<Record>> {
        let filtered = candidates
            .into_iter()
            .filter(|r| match r.rating {
                Some(rating) => rating >= self.min_rating,
                None => self.keep_unrated,
            })
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::test_support::record;

    fn rated(id: &str, rating: Option<f64>) -> Record {
        let mut r = record(id, &[]);
        r.rating = rating;
        r
    }

    #[test]
    fn test_minimum_rating_filter() {
        let candidates = vec![
            rated("high", Some(4.5)),
            rated("low", Some(2.0)),
            rated("none", None),
            rated("edge", Some(3.5)),
        ];

        let strict = MinimumRatingFilter::new(3.5, false)
            .apply(candidates.clone(), &PreferenceProfile::new())
            .unwrap();
        let ids: Vec<&str> = strict.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["high", "edge"]);

        let lenient = MinimumRatingFilter::new(3.5, true)
            .apply(candidates, &PreferenceProfile::new())
            .unwrap();
        assert_eq!(lenient.len(), 3);
    }
}
