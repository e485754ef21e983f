//! Filter implementations for the candidate pipeline.
//!
//! None of these are part of the default recommender; callers opt in with
//! `Recommender::with_filter`.

pub mod budget;
pub mod in_stock;
pub mod minimum_rating;

// Re-export for convenience
pub use budget::BudgetFilter;
pub use in_stock::InStockFilter;
pub use minimum_rating::MinimumRatingFilter;
