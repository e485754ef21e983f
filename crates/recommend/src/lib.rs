//! Preference matching and ranking over catalogue records.
//!
//! This crate provides:
//! - `PreferenceProfile` for the inputs of one recommendation call
//! - `Scorer` with a signed weighted-sum relevance score
//! - Filter trait, implementations and `FilterPipeline` for opt-in eligibility rules
//! - `Recommender` to filter, score, rank and truncate
//!
//! It depends on the `catalog` crate only for the `Record` and `Profile`
//! shapes; callers load records from a store and hand them in.
//!
//! ## Example Usage
//! ```ignore
//! use recommend::{PreferenceProfile, Recommender, DEFAULT_TOP_K};
//!
//! let records = store.list(&ListQuery::new());
//! let prefs = PreferenceProfile::new()
//!     .prefer(["rose", "musk"])
//!     .avoid(["coumarin"])
//!     .budget(60.0);
//!
//! let ranked = Recommender::new().recommend(records, &prefs, DEFAULT_TOP_K)?;
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod preferences;
pub mod recommender;
pub mod scoring;
pub mod traits;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use preferences::{NormalizedPreferences, PreferenceProfile};
pub use recommender::{DEFAULT_TOP_K, Recommendation, Recommender};
pub use scoring::{ScoreBreakdown, Scorer, Weights};
pub use traits::Filter;
