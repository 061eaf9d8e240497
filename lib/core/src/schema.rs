//! Feature schema definitions
//!
//! The schema is the ordered list of audio features used for scoring.
//! It is resolved once per catalog against the numeric columns the catalog
//! actually provides, and the outcome (including any fallback) is returned
//! to the caller instead of being decided silently.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Canonical audio features, in scoring order
pub const CANONICAL_FEATURES: [&str; 12] = [
    "danceability",
    "energy",
    "key",
    "loudness",
    "mode",
    "speechiness",
    "acousticness",
    "instrumentalness",
    "liveness",
    "valence",
    "tempo",
    "duration_ms",
];

/// Numeric columns never used as features when falling back
pub const FALLBACK_EXCLUDED: [&str; 4] = ["id", "duration_ms", "year", "popularity"];

/// Requested feature list, before resolution against a catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSchema {
    features: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::canonical()
    }
}

impl FeatureSchema {
    pub fn canonical() -> Self {
        Self {
            features: CANONICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Custom feature list; duplicates are dropped, first occurrence kept
    pub fn new(features: Vec<String>) -> Self {
        let mut seen = ahash::AHashSet::new();
        let features = features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty() && seen.insert(f.clone()))
            .collect();
        Self { features }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Intersect with the catalog's numeric columns.
    ///
    /// Falls back to every available column outside [`FALLBACK_EXCLUDED`]
    /// when none of the requested features are present.
    pub fn resolve(&self, available: &[String]) -> Result<SchemaResolution> {
        let mut features = Vec::new();
        let mut missing = Vec::new();
        for name in &self.features {
            if available.iter().any(|c| c == name) {
                features.push(name.clone());
            } else {
                missing.push(name.clone());
            }
        }

        let source = if !features.is_empty() {
            if !missing.is_empty() {
                warn!("Missing audio features in catalog: {:?}", missing);
            }
            SchemaSource::Requested
        } else {
            features = available
                .iter()
                .filter(|c| !FALLBACK_EXCLUDED.contains(&c.as_str()))
                .cloned()
                .collect();
            info!(
                "None of the requested features present, falling back to numeric columns: {:?}",
                features
            );
            SchemaSource::Fallback
        };

        if features.is_empty() {
            return Err(Error::NoFeatures);
        }

        Ok(SchemaResolution {
            features,
            source,
            missing,
        })
    }
}

/// Where the resolved feature list came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    /// Intersection of the requested list and the catalog columns
    Requested,
    /// Numeric catalog columns outside the exclusion set
    Fallback,
}

/// Outcome of resolving a [`FeatureSchema`] against a catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaResolution {
    /// Features used for scoring, in order
    pub features: Vec<String>,
    pub source: SchemaSource,
    /// Requested features the catalog does not provide
    pub missing: Vec<String>,
}

impl SchemaResolution {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.source == SchemaSource::Fallback
    }
}
