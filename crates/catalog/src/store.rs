//! The catalogue store.
//!
//! Every operation is a full cycle against the backing file: load the whole
//! collection, work on it in memory, and (for mutations that changed
//! something) write the whole collection back. Validation and uniqueness
//! checks run before the write, so a failed call never persists anything.
//!
//! There is no locking. Callers sharing a file must serialize access.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::collection::JsonCollection;
use crate::error::{CatalogError, Result};
use crate::normalize::{self, Limits};
use crate::parser::{self, ImportRow};
use crate::types::*;

/// Durable, validated CRUD over the perfume collection
#[derive(Debug, Clone)]
pub struct CatalogStore {
    collection: JsonCollection<Record>,
    limits: Limits,
}

/// Fresh opaque identifier
pub(crate) fn new_id() -> RecordId {
    Uuid::new_v4().to_string()
}

/// Position of the entry `key` resolves to: exact id first, then name
pub(crate) fn resolve<T: Keyed>(entries: &[T], key: &str) -> Option<usize> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let folded = normalize::fold(key);
    entries
        .iter()
        .position(|e| e.entry_id() == key)
        .or_else(|| entries.iter().position(|e| e.folded_name() == folded))
}

/// Load every entry, skipping those that break the stored-entry invariants
///
/// Entries with bad fields, or an id or name already taken by an earlier
/// entry, are dropped with a warning.
pub(crate) fn load_checked<T>(collection: &JsonCollection<T>, limits: &Limits) -> Vec<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    let mut out = Vec::new();
    for entry in collection.load() {
        let problem = if let Err(e) = entry.check(limits) {
            Some(e.to_string())
        } else if !ids.insert(entry.entry_id().to_string()) {
            Some("duplicate id".to_string())
        } else if !names.insert(entry.folded_name()) {
            Some("duplicate name".to_string())
        } else {
            None
        };
        match problem {
            Some(reason) => tracing::warn!(
                "Skipping entry {} in {}: {}",
                entry.entry_id(),
                collection.path().display(),
                reason
            ),
            None => out.push(entry),
        }
    }
    out
}

/// Ascending order for a sort key, case-insensitive for text; unrated last
fn compare(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => normalize::fold(&a.name).cmp(&normalize::fold(&b.name)),
        SortKey::Brand => normalize::fold(&a.brand).cmp(&normalize::fold(&b.brand)),
        SortKey::Price => a.price.total_cmp(&b.price),
        SortKey::Rating => match (a.rating, b.rating) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

impl CatalogStore {
    /// Open a store over `path` with the default limits.
    ///
    /// Nothing is read or created until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_limits(path, Limits::default())
    }

    pub fn with_limits(path: impl Into<PathBuf>, limits: Limits) -> Self {
        Self {
            collection: JsonCollection::new(path),
            limits,
        }
    }

    pub fn path(&self) -> &Path {
        self.collection.path()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// All records matching `query`, stable-sorted when a sort key is set
    pub fn list(&self, query: &ListQuery) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .load()
            .into_iter()
            .filter(|r| query.matches(r))
            .collect();
        if let Some(key) = query.sort {
            records.sort_by(|a, b| compare(a, b, key));
        }
        records
    }

    /// Resolve by exact id, falling back to a case-insensitive exact name
    pub fn get(&self, id_or_name: &str) -> Option<Record> {
        let mut records = self.load();
        let idx = resolve(&records, id_or_name)?;
        Some(records.swap_remove(idx))
    }

    /// Validate `draft`, assign a fresh id, append and persist.
    ///
    /// # Errors
    /// - `Validation` naming the first offending field
    /// - `Duplicate` if the name collides (ignoring case) with a stored record
    /// - `Storage` if the file cannot be written
    pub fn add(&self, draft: RecordDraft) -> Result<Record> {
        let record = Record::from_draft(new_id(), draft, &self.limits)?;
        let mut records = self.load();
        ensure_unique_name(&records, &record.name, None)?;

        records.push(record.clone());
        self.collection.save(&records)?;
        tracing::debug!("Added record {} ({})", record.name, record.id);
        Ok(record)
    }

    /// Apply `patch` to the record `id_or_name` resolves to.
    ///
    /// Returns `Ok(false)` without writing when nothing matches.
    pub fn update(&self, id_or_name: &str, patch: &RecordPatch) -> Result<bool> {
        let mut records = self.load();
        let Some(idx) = resolve(&records, id_or_name) else {
            tracing::debug!("Update target not found: {}", id_or_name);
            return Ok(false);
        };

        let next = records[idx].patched(patch, &self.limits)?;
        if patch.name.is_some() {
            ensure_unique_name(&records, &next.name, Some(idx))?;
        }

        records[idx] = next;
        self.collection.save(&records)?;
        tracing::debug!("Updated record {}", records[idx].id);
        Ok(true)
    }

    /// Remove the record `id_or_name` resolves to. Writes only on removal.
    pub fn delete(&self, id_or_name: &str) -> Result<bool> {
        let mut records = self.load();
        let Some(idx) = resolve(&records, id_or_name) else {
            return Ok(false);
        };

        let removed = records.remove(idx);
        self.collection.save(&records)?;
        tracing::debug!("Deleted record {} ({})", removed.name, removed.id);
        Ok(true)
    }

    /// Ingest typed rows under `strategy`.
    ///
    /// Every row is normalized and checked before anything is written; the
    /// first failure is returned with its line number and the file is left
    /// untouched.
    pub fn import_rows(
        &self,
        rows: Vec<ImportRow>,
        strategy: ImportStrategy,
    ) -> Result<ImportSummary> {
        let (records, summary) = match strategy {
            ImportStrategy::Merge => self.merge_rows(self.load(), rows)?,
            ImportStrategy::Overwrite => self.overwrite_rows(rows)?,
        };

        self.collection.save(&records)?;
        tracing::info!(
            "Imported {} rows ({} skipped) into {}",
            summary.ingested,
            summary.skipped,
            self.path().display()
        );
        Ok(summary)
    }

    /// Parse CSV text and ingest it
    pub fn import_csv(&self, text: &str, strategy: ImportStrategy) -> Result<ImportSummary> {
        let rows = parser::parse_csv(text)?;
        self.import_rows(rows, strategy)
    }

    /// Read a CSV file and ingest it. A missing source file is a `Storage` error.
    pub fn import_csv_file(&self, path: &Path, strategy: ImportStrategy) -> Result<ImportSummary> {
        let text = parser::read_source(path)?;
        self.import_csv(&text, strategy)
    }

    /// Serialize the whole collection
    pub fn export_all(&self, format: ExportFormat) -> Result<Export> {
        let records = self.load();
        let body = match format {
            ExportFormat::Csv => parser::write_csv(&records),
            ExportFormat::Json => serde_json::to_string_pretty(&records)?,
        };
        Ok(Export {
            body,
            rows: records.len(),
        })
    }

    /// Serialize the whole collection to `path`, returning the row count
    pub fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<usize> {
        let export = self.export_all(format)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| CatalogError::storage(parent, e))?;
            }
        }
        std::fs::write(path, &export.body).map_err(|e| CatalogError::storage(path, e))?;
        tracing::info!("Exported {} rows to {}", export.rows, path.display());
        Ok(export.rows)
    }

    fn load(&self) -> Vec<Record> {
        load_checked(&self.collection, &self.limits)
    }

    fn build(&self, row: ImportRow, id: RecordId) -> Result<Record> {
        let line = row.line;
        Record::from_draft(id, row.draft, &self.limits).map_err(|e| CatalogError::InvalidRow {
            line,
            source: Box::new(e),
        })
    }

    /// Append rows whose (name, brand) pair is new
    fn merge_rows(
        &self,
        mut records: Vec<Record>,
        rows: Vec<ImportRow>,
    ) -> Result<(Vec<Record>, ImportSummary)> {
        let mut summary = ImportSummary::default();
        let mut ids: HashSet<RecordId> = records.iter().map(|r| r.id.clone()).collect();

        for row in rows {
            let line = row.line;
            let id = match &row.id {
                Some(id) if !ids.contains(id) => id.clone(),
                _ => new_id(),
            };
            let record = self.build(row, id)?;

            let pair_exists = records.iter().any(|r| {
                r.name_key() == record.name_key()
                    && normalize::fold(&r.brand) == normalize::fold(&record.brand)
            });
            if pair_exists {
                tracing::debug!("Skipping existing pair {} / {}", record.name, record.brand);
                summary.skipped += 1;
                continue;
            }
            ensure_unique_name(&records, &record.name, None).map_err(|e| {
                CatalogError::InvalidRow {
                    line,
                    source: Box::new(e),
                }
            })?;

            ids.insert(record.id.clone());
            records.push(record);
            summary.ingested += 1;
        }
        Ok((records, summary))
    }

    /// Build a new collection from rows, collapsing repeated ids
    fn overwrite_rows(&self, rows: Vec<ImportRow>) -> Result<(Vec<Record>, ImportSummary)> {
        let mut summary = ImportSummary::default();
        let mut records: Vec<Record> = Vec::new();
        let mut lines: Vec<usize> = Vec::new();

        for row in rows {
            let line = row.line;
            let id = row.id.clone().unwrap_or_else(new_id);
            let record = self.build(row, id)?;

            // Later rows replace earlier ones with the same id, in place
            if let Some(idx) = records.iter().position(|r| r.id == record.id) {
                records[idx] = record;
                lines[idx] = line;
                summary.skipped += 1;
            } else {
                records.push(record);
                lines.push(line);
            }
        }

        for (idx, record) in records.iter().enumerate() {
            ensure_unique_name(&records, &record.name, Some(idx)).map_err(|e| {
                CatalogError::InvalidRow {
                    line: lines[idx],
                    source: Box::new(e),
                }
            })?;
        }

        summary.ingested = records.len();
        Ok((records, summary))
    }
}

/// Fail with `Duplicate` if any entry other than `skip` already uses `name`
pub(crate) fn ensure_unique_name<T: Keyed>(
    entries: &[T],
    name: &str,
    skip: Option<usize>,
) -> Result<()> {
    let key = normalize::fold(name);
    let clash = entries
        .iter()
        .enumerate()
        .any(|(idx, e)| Some(idx) != skip && e.folded_name() == key);
    if clash {
        return Err(CatalogError::Duplicate {
            name: name.to_string(),
        });
    }
    Ok(())
}
