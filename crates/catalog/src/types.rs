//! Core domain types for the perfume catalogue.
//!
//! Stored shapes ([`Record`], [`Profile`]) are what the JSON backing files
//! hold. Input shapes ([`RecordDraft`], [`RecordPatch`], [`ProfilePatch`])
//! carry caller-supplied values that still have to pass through
//! normalization before they can become stored entries.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::normalize::{self, Limits};

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque identifier assigned by a store at creation time
pub type RecordId = String;

// =============================================================================
// Stored Types
// =============================================================================

/// One catalogue entry (a perfume).
///
/// Every record that leaves a store has a non-empty trimmed `name`, a price
/// rounded to two decimals and lowercase, deduplicated tag lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stock: u32,
}

impl Record {
    /// Build a record from a draft, validating every field.
    pub fn from_draft(id: RecordId, draft: RecordDraft, limits: &Limits) -> Result<Self> {
        Ok(Self {
            id,
            name: normalize::required_text(&draft.name, "name", limits.max_name_len)?,
            brand: normalize::required_text(&draft.brand, "brand", limits.max_brand_len)?,
            price: normalize::price(draft.price, limits)?,
            notes: normalize::tags(&draft.notes, "notes", limits.max_tag_len)?,
            allergens: normalize::tags(&draft.allergens, "allergens", limits.max_tag_len)?,
            rating: normalize::rating(draft.rating)?,
            stock: normalize::stock(draft.stock)?,
        })
    }

    /// Return a copy with every supplied patch field validated and applied.
    ///
    /// The id never changes. Nothing is applied unless every field passes.
    pub fn patched(&self, patch: &RecordPatch, limits: &Limits) -> Result<Self> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = normalize::required_text(name, "name", limits.max_name_len)?;
        }
        if let Some(brand) = &patch.brand {
            next.brand = normalize::required_text(brand, "brand", limits.max_brand_len)?;
        }
        if let Some(price) = patch.price {
            next.price = normalize::price(price, limits)?;
        }
        if let Some(notes) = &patch.notes {
            next.notes = normalize::tags(notes, "notes", limits.max_tag_len)?;
        }
        if let Some(allergens) = &patch.allergens {
            next.allergens = normalize::tags(allergens, "allergens", limits.max_tag_len)?;
        }
        if let Some(rating) = patch.rating {
            next.rating = normalize::rating(rating)?;
        }
        if let Some(stock) = patch.stock {
            next.stock = normalize::stock(stock)?;
        }
        Ok(next)
    }

    /// Case-folded name used for the uniqueness constraint
    pub fn name_key(&self) -> String {
        normalize::fold(&self.name)
    }
}

/// A named, persisted preference set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub preferred_notes: Vec<String>,
    #[serde(default)]
    pub avoid_allergens: Vec<String>,
}

impl Profile {
    pub fn name_key(&self) -> String {
        normalize::fold(&self.name)
    }
}

/// Stored entries addressable by id or by case-insensitive name
pub(crate) trait Keyed {
    fn entry_id(&self) -> &str;

    fn folded_name(&self) -> String;

    /// Re-check field invariants of an entry read back from disk
    fn check(&self, limits: &Limits) -> Result<()>;
}

fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(CatalogError::validation("id", "must be a non-empty string"));
    }
    Ok(())
}

impl Keyed for Record {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn folded_name(&self) -> String {
        self.name_key()
    }

    fn check(&self, limits: &Limits) -> Result<()> {
        check_id(&self.id)?;
        normalize::required_text(&self.name, "name", limits.max_name_len)?;
        normalize::required_text(&self.brand, "brand", limits.max_brand_len)?;
        normalize::price(self.price, limits)?;
        normalize::tags(&self.notes, "notes", limits.max_tag_len)?;
        normalize::tags(&self.allergens, "allergens", limits.max_tag_len)?;
        normalize::rating(self.rating)?;
        Ok(())
    }
}

impl Keyed for Profile {
    fn entry_id(&self) -> &str {
        &self.id
    }

    fn folded_name(&self) -> String {
        self.name_key()
    }

    fn check(&self, limits: &Limits) -> Result<()> {
        check_id(&self.id)?;
        normalize::required_text(&self.name, "name", limits.max_name_len)?;
        normalize::tags(&self.preferred_notes, "preferred_notes", limits.max_tag_len)?;
        normalize::tags(&self.avoid_allergens, "avoid_allergens", limits.max_tag_len)?;
        Ok(())
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Caller-supplied fields for a new record.
///
/// Tag lists may hold already-split values, comma or semicolon separated
/// strings, or any mix of the two.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub name: String,
    pub brand: String,
    pub price: f64,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub stock: i64,
}

impl RecordDraft {
    pub fn new(name: impl Into<String>, brand: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            brand: brand.into(),
            price,
            ..Self::default()
        }
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes.push(notes.into());
        self
    }

    pub fn allergens(mut self, allergens: impl Into<String>) -> Self {
        self.allergens.push(allergens.into());
        self
    }

    pub fn rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }
}

/// Partial update for a record. `None` leaves the field as it is.
///
/// `rating` is doubly optional so a caller can clear it with `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    pub rating: Option<Option<f64>>,
    pub stock: Option<i64>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial update for a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub preferred_notes: Option<Vec<String>>,
    pub avoid_allergens: Option<Vec<String>>,
}

// =============================================================================
// Query Types
// =============================================================================

/// How the brand filter compares, both ignoring case
#[derive(Debug, Clone, PartialEq)]
pub enum BrandFilter {
    Exact(String),
    Contains(String),
}

/// Sort keys accepted by `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Brand,
    Price,
    Rating,
}

/// Filters and ordering for `CatalogStore::list`. The default matches everything.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub name: Option<String>,
    pub brand: Option<BrandFilter>,
    pub note: Option<String>,
    pub price_max: Option<f64>,
    pub sort: Option<SortKey>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_contains(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn brand(mut self, brand: BrandFilter) -> Self {
        self.brand = Some(brand);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn price_max(mut self, price_max: f64) -> Self {
        self.price_max = Some(price_max);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort = Some(key);
        self
    }

    /// Check a single record against every active filter
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(name) = &self.name {
            if !normalize::fold(&record.name).contains(&normalize::fold(name)) {
                return false;
            }
        }
        if let Some(filter) = &self.brand {
            let brand = normalize::fold(&record.brand);
            let hit = match filter {
                BrandFilter::Exact(b) => brand == normalize::fold(b),
                BrandFilter::Contains(b) => brand.contains(&normalize::fold(b)),
            };
            if !hit {
                return false;
            }
        }
        if let Some(note) = &self.note {
            let wanted = normalize::fold(note);
            if !record.notes.iter().any(|n| normalize::fold(n) == wanted) {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if record.price > max {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Bulk Types
// =============================================================================

/// Bulk import modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStrategy {
    /// Keep existing records, skip rows whose (name, brand) already exists
    Merge,
    /// Replace the whole collection with the imported rows
    Overwrite,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub ingested: usize,
    pub skipped: usize,
}

/// Serialization formats for `export_all`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// A serialized collection plus the number of records it holds
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub body: String,
    pub rows: usize,
}
