//! # Catalog Crate
//!
//! This crate owns the perfume catalogue: validated records, the single-file
//! JSON backing store, named preference profiles and the flat CSV bulk
//! format.
//!
//! ## Main Components
//!
//! - **types**: Stored records/profiles and the draft, patch and query inputs
//! - **normalize**: Field validation shared by every write path
//! - **parser**: CSV bulk import/export format
//! - **collection**: Permissive-read, atomic-write JSON array file
//! - **store**: `CatalogStore` CRUD, search, bulk import and export
//! - **profiles**: `ProfileStore` for named preference sets
//! - **error**: Error taxonomy for all of the above
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogStore, ListQuery, RecordDraft, SortKey};
//!
//! let store = CatalogStore::new("db.json");
//! let rose = store.add(RecordDraft::new("Rose Dusk", "Floral", 55.0).notes("rose, musk"))?;
//!
//! assert_eq!(store.get("rose dusk"), Some(rose));
//! let cheap = store.list(&ListQuery::new().price_max(60.0).sort_by(SortKey::Price));
//! ```

pub mod collection;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod profiles;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use collection::JsonCollection;
pub use error::{CatalogError, ErrorKind, Result};
pub use normalize::Limits;
pub use parser::ImportRow;
pub use profiles::ProfileStore;
pub use store::CatalogStore;
pub use types::{
    BrandFilter, Export, ExportFormat, ImportStrategy, ImportSummary, ListQuery, Profile,
    ProfilePatch, Record, RecordDraft, RecordId, RecordPatch, SortKey,
};
