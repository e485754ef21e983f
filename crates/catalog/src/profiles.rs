//! Named preference profiles, stored in their own JSON file.
//!
//! Profiles share the catalogue's normalization rules and unique-name
//! constraint. Unlike the catalogue, updating an absent profile is an error:
//! a caller editing a profile by name needs to know it was never there.

use std::path::{Path, PathBuf};

use crate::collection::JsonCollection;
use crate::error::{CatalogError, Result};
use crate::normalize::{self, Limits};
use crate::store::{ensure_unique_name, load_checked, new_id, resolve};
use crate::types::{Profile, ProfilePatch};

#[derive(Debug, Clone)]
pub struct ProfileStore {
    collection: JsonCollection<Profile>,
    limits: Limits,
}

impl ProfileStore {
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

    pub fn list(&self) -> Vec<Profile> {
        load_checked(&self.collection, &self.limits)
    }

    pub fn get(&self, id_or_name: &str) -> Option<Profile> {
        let mut profiles = self.list();
        let idx = resolve(&profiles, id_or_name)?;
        Some(profiles.swap_remove(idx))
    }

    pub fn add<S: AsRef<str>>(
        &self,
        name: &str,
        preferred: &[S],
        avoid: &[S],
    ) -> Result<Profile> {
        let max_tag = self.limits.max_tag_len;
        let profile = Profile {
            id: new_id(),
            name: normalize::required_text(name, "name", self.limits.max_name_len)?,
            preferred_notes: normalize::tags(preferred, "preferred_notes", max_tag)?,
            avoid_allergens: normalize::tags(avoid, "avoid_allergens", max_tag)?,
        };
        let mut profiles = self.list();
        ensure_unique_name(&profiles, &profile.name, None)?;

        profiles.push(profile.clone());
        self.collection.save(&profiles)?;
        tracing::debug!("Added profile {} ({})", profile.name, profile.id);
        Ok(profile)
    }

    /// Apply `patch` and return the stored result.
    ///
    /// # Errors
    /// `NotFound` when `id_or_name` does not resolve, plus the usual
    /// validation, uniqueness and storage errors.
    pub fn update(&self, id_or_name: &str, patch: &ProfilePatch) -> Result<Profile> {
        let mut profiles = self.list();
        let idx = resolve(&profiles, id_or_name)
            .ok_or_else(|| CatalogError::not_found("profile", id_or_name))?;

        let mut next = profiles[idx].clone();
        if let Some(name) = &patch.name {
            next.name = normalize::required_text(name, "name", self.limits.max_name_len)?;
            ensure_unique_name(&profiles, &next.name, Some(idx))?;
        }
        if let Some(preferred) = &patch.preferred_notes {
            next.preferred_notes =
                normalize::tags(preferred, "preferred_notes", self.limits.max_tag_len)?;
        }
        if let Some(avoid) = &patch.avoid_allergens {
            next.avoid_allergens =
                normalize::tags(avoid, "avoid_allergens", self.limits.max_tag_len)?;
        }

        profiles[idx] = next.clone();
        self.collection.save(&profiles)?;
        Ok(next)
    }

    pub fn delete(&self, id_or_name: &str) -> Result<bool> {
        let mut profiles = self.list();
        let Some(idx) = resolve(&profiles, id_or_name) else {
            return Ok(false);
        };
        profiles.remove(idx);
        self.collection.save(&profiles)?;
        Ok(true)
    }
}
