//! Ephemeral preference input for a single recommendation call.

use catalog::Profile;
use catalog::normalize::fold;
use std::collections::HashSet;

/// Preferred/avoided notes plus optional brand and budget.
///
/// Built ad hoc per call or converted from a stored [`Profile`], whose
/// avoided allergens become `avoid_notes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceProfile {
    pub preferred_notes: Vec<String>,
    pub avoid_notes: Vec<String>,
    pub brand_bias: Option<String>,
    pub price_max: Option<f64>,
}

impl PreferenceProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefer<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_notes.extend(notes.into_iter().map(Into::into));
        self
    }

    pub fn avoid<I, S>(mut self, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid_notes.extend(notes.into_iter().map(Into::into));
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand_bias = Some(brand.into());
        self
    }

    pub fn budget(mut self, price_max: f64) -> Self {
        self.price_max = Some(price_max);
        self
    }

    /// True when no term of the profile can influence a score
    pub fn is_empty(&self) -> bool {
        self.normalized().is_empty()
    }

    /// Case-folded sets used by the scorer.
    ///
    /// Blank entries and a blank brand are dropped; a non-finite budget is
    /// ignored.
    pub fn normalized(&self) -> NormalizedPreferences {
        NormalizedPreferences {
            preferred: fold_set(&self.preferred_notes),
            avoid: fold_set(&self.avoid_notes),
            brand: self
                .brand_bias
                .as_deref()
                .map(fold)
                .filter(|b| !b.is_empty()),
            price_max: self.price_max.filter(|p| p.is_finite()),
        }
    }
}

impl From<&Profile> for PreferenceProfile {
    fn from(profile: &Profile) -> Self {
        Self::new()
            .prefer(profile.preferred_notes.iter().cloned())
            .avoid(profile.avoid_allergens.iter().cloned())
    }
}

/// Preference sets after case folding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPreferences {
    pub preferred: HashSet<String>,
    pub avoid: HashSet<String>,
    pub brand: Option<String>,
    pub price_max: Option<f64>,
}

impl NormalizedPreferences {
    pub fn is_empty(&self) -> bool {
        self.preferred.is_empty()
            && self.avoid.is_empty()
            && self.brand.is_none()
            && self.price_max.is_none()
    }
}

/// Fold every value into a set, splitting `,`/`;` lists like stored tags
pub(crate) fn fold_set<S: AsRef<str>>(values: &[S]) -> HashSet<String> {
    values
        .iter()
        .flat_map(|v| v.as_ref().split([',', ';']))
        .map(fold)
        .filter(|s| !s.is_empty())
        .collect()
}
