//! Field validation and normalization shared by every write path.
//!
//! `add`, `update`, bulk import and profile writes all go through these
//! helpers, so a value accepted by one path is accepted by all of them.

use std::collections::HashSet;

use crate::error::{CatalogError, Result};

/// Validation bounds applied to every record and profile
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    pub max_name_len: usize,
    pub max_brand_len: usize,
    pub max_tag_len: usize,
    pub max_price: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_name_len: 80,
            max_brand_len: 80,
            max_tag_len: 40,
            max_price: 1_000_000.0,
        }
    }
}

/// Case-folded, trimmed form used for every case-insensitive comparison
pub fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Trim a required string and check it is non-empty and within `max_len` chars
pub fn required_text(value: &str, field: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation(field, "must be a non-empty string"));
    }
    if trimmed.chars().count() > max_len {
        return Err(CatalogError::validation(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }
    Ok(trimmed.to_string())
}

/// Round a price to 2 decimals, then check it is within `0..=max_price`
pub fn price(value: f64, limits: &Limits) -> Result<f64> {
    let rounded = (value * 100.0).round() / 100.0;
    if !rounded.is_finite() || rounded < 0.0 || rounded > limits.max_price {
        return Err(CatalogError::validation(
            "price",
            format!("must be between 0 and {}", limits.max_price),
        ));
    }
    // -0.004 rounds to -0.0
    Ok(rounded.abs())
}

pub fn rating(value: Option<f64>) -> Result<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_finite() && (0.0..=5.0).contains(&v) => Ok(Some(v)),
        Some(_) => Err(CatalogError::validation(
            "rating",
            "must be between 0.0 and 5.0",
        )),
    }
}

pub fn stock(value: i64) -> Result<u32> {
    if value < 0 {
        return Err(CatalogError::validation("stock", "must be >= 0"));
    }
    u32::try_from(value)
        .map_err(|_| CatalogError::validation("stock", format!("must be at most {}", u32::MAX)))
}

/// Normalize tag input into an ordered, deduplicated lowercase list
///
/// ## Algorithm
/// 1. Split every value on `,` and `;`
/// 2. Trim each piece and drop empty ones
/// 3. Lowercase, keep the first occurrence of each tag
///
/// Example: `["rose, ROSE ", "musk"]` -> `["rose", "musk"]`
pub fn tags<S: AsRef<str>>(values: &[S], field: &str, max_len: usize) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        for piece in value.as_ref().split([',', ';']) {
            let tag = fold(piece);
            if tag.is_empty() {
                continue;
            }
            if tag.chars().count() > max_len {
                return Err(CatalogError::validation(
                    field,
                    format!("entries must be at most {} characters", max_len),
                ));
            }
            if seen.insert(tag.clone()) {
                out.push(tag);
            }
        }
    }
    Ok(out)
}
