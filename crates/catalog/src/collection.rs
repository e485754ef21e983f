//! Single-file JSON collection.
//!
//! The backing document is a JSON array holding the entire collection.
//! Reads are permissive: a missing, empty or corrupt file loads as an empty
//! collection and entries of the wrong shape are skipped. Writes are strict
//! and atomic: the whole collection is written to a sibling temp file which
//! is then renamed over the target.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CatalogError, Result};

/// A JSON array of `T` stored at a fixed path
#[derive(Debug, Clone)]
pub struct JsonCollection<T> {
    path: PathBuf,
    _entry: PhantomData<T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _entry: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every entry. Never fails; unreadable storage yields an empty list.
    pub fn load(&self) -> Vec<T> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    "Failed to read {}, treating as empty: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };
        if text.trim().is_empty() {
            return Vec::new();
        }

        let entries = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) => {
                tracing::warn!(
                    "{} does not hold a JSON array, treating as empty",
                    self.path.display()
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    "Corrupt JSON in {}, treating as empty: {}",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        entries
            .into_iter()
            .enumerate()
            .filter_map(|(idx, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(
                        "Skipping entry {} in {}: {}",
                        idx,
                        self.path.display(),
                        e
                    );
                    None
                }
            })
            .collect()
    }

    /// Replace the stored collection with `items` in one atomic write
    pub fn save(&self, items: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| CatalogError::storage(parent, e))?;
            }
        }

        let body = serde_json::to_string_pretty(items)?;
        let tmp = self.temp_path();
        fs::write(&tmp, body).map_err(|e| CatalogError::storage(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CatalogError::storage(&self.path, e)
        })?;

        tracing::debug!("Wrote {} entries to {}", items.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
