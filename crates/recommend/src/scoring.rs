//! Relevance scoring for candidate records.
//!
//! ## Formula (signed weighted sum)
//! ```text
//! score = preferred_note * |notes ∩ preferred|
//!       - avoided_note   * |(notes ∪ allergens) ∩ avoid|
//!       + brand_bias                          if brand matches
//!       + (price_max - price) / max(1, price_max)   if price <= price_max
//!       - over_budget_penalty                 if price >  price_max
//! ```
//! Zero and negative scores are meaningful and are never dropped.

use rayon::prelude::*;
use std::collections::HashSet;

use catalog::Record;
use catalog::normalize::fold;

use crate::preferences::{NormalizedPreferences, PreferenceProfile};

/// Scoring constants
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    pub preferred_note: f64,
    pub avoided_note: f64,
    pub brand_bias: f64,
    pub over_budget_penalty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            preferred_note: 2.0,
            avoided_note: 2.0,
            brand_bias: 1.0,
            over_budget_penalty: 0.5,
        }
    }
}

/// Each term of a record's score, plus the total
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Preferred notes found on the record, in the record's order
    pub matched_notes: Vec<String>,
    /// Avoided notes/allergens found on the record, in the record's order
    pub avoided_hits: Vec<String>,
    pub overlap: f64,
    pub avoid_penalty: f64,
    pub brand_bonus: f64,
    pub price_adjustment: f64,
    pub total: f64,
}

impl ScoreBreakdown {
    /// Human-readable summary of the non-zero terms
    pub fn explain(&self) -> String {
        let mut parts = Vec::new();
        if !self.matched_notes.is_empty() {
            parts.push(format!(
                "matches {} (+{:.2})",
                self.matched_notes.join(", "),
                self.overlap
            ));
        }
        if !self.avoided_hits.is_empty() {
            parts.push(format!(
                "contains avoided {} (-{:.2})",
                self.avoided_hits.join(", "),
                self.avoid_penalty
            ));
        }
        if self.brand_bonus != 0.0 {
            parts.push(format!("preferred brand (+{:.2})", self.brand_bonus));
        }
        if self.price_adjustment > 0.0 {
            parts.push(format!("within budget (+{:.2})", self.price_adjustment));
        } else if self.price_adjustment < 0.0 {
            parts.push(format!("over budget ({:.2})", self.price_adjustment));
        }
        if parts.is_empty() {
            "no preference signal".to_string()
        } else {
            parts.join("; ")
        }
    }
}

/// Computes scores for candidates in parallel.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: Weights,
}

impl Scorer {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Score every candidate.
    ///
    /// # Returns
    /// One breakdown per candidate, in the same order
    pub fn score_all(
        &self,
        candidates: &[Record],
        prefs: &PreferenceProfile,
    ) -> Vec<ScoreBreakdown> {
        let prefs = prefs.normalized();
        candidates
            .par_iter()
            .map(|record| self.score(record, &prefs))
            .collect()
    }

    /// Score a single record against already-normalized preferences.
    pub fn score(&self, record: &Record, prefs: &NormalizedPreferences) -> ScoreBreakdown {
        let w = &self.weights;
        let mut out = ScoreBreakdown::default();

        // Record tags in first-seen order, folded
        let mut seen = HashSet::new();
        let notes: Vec<String> = record
            .notes
            .iter()
            .map(|n| fold(n))
            .filter(|n| !n.is_empty() && seen.insert(n.clone()))
            .collect();
        let allergens: Vec<String> = record
            .allergens
            .iter()
            .map(|a| fold(a))
            .filter(|a| !a.is_empty() && seen.insert(a.clone()))
            .collect();

        out.matched_notes = notes
            .iter()
            .filter(|n| prefs.preferred.contains(*n))
            .cloned()
            .collect();
        out.avoided_hits = notes
            .iter()
            .chain(allergens.iter())
            .filter(|n| prefs.avoid.contains(*n))
            .cloned()
            .collect();

        out.overlap = w.preferred_note * out.matched_notes.len() as f64;
        out.avoid_penalty = w.avoided_note * out.avoided_hits.len() as f64;

        if let Some(brand) = &prefs.brand {
            if fold(&record.brand) == *brand {
                out.brand_bonus = w.brand_bias;
            }
        }

        if let Some(price_max) = prefs.price_max {
            out.price_adjustment = if record.price <= price_max {
                ((price_max - record.price) / price_max.max(1.0)).max(0.0)
            } else {
                -w.over_budget_penalty
            };
        }

        out.total = out.overlap - out.avoid_penalty + out.brand_bonus + out.price_adjustment;
        out
    }
}
