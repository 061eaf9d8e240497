//! # TuneMatch Core
//!
//! Core library for the TuneMatch song recommender.
//!
//! This crate provides the fundamental data structures:
//!
//! - [`Song`] - A track with display fields and named audio features
//! - [`FeatureSchema`] - The ordered feature list, resolved per catalog
//! - [`FeatureMatrix`] - Dense row-major feature values
//! - [`Catalog`] - Immutable, indexed collection of songs
//!
//! ## Example
//!
//! ```rust
//! use tunematch_core::{Catalog, FeatureSchema, Song};
//!
//! let songs = vec![
//!     Song::new("s1", "Yellow", "Coldplay").with_feature("energy", 0.4),
//!     Song::new("s2", "Toxic", "Britney Spears").with_feature("energy", 0.8),
//! ];
//! let catalog = Catalog::new(songs, &FeatureSchema::canonical()).unwrap();
//!
//! assert_eq!(catalog.position("s2"), Some(1));
//! assert_eq!(catalog.schema().features, vec!["energy"]);
//! ```

pub mod catalog;
pub mod error;
pub mod matrix;
pub mod schema;
pub mod song;

pub use catalog::{Catalog, CatalogStats, FeatureSummary};
pub use error::{Error, Result};
pub use matrix::FeatureMatrix;
pub use schema::{FeatureSchema, SchemaResolution, SchemaSource, CANONICAL_FEATURES, FALLBACK_EXCLUDED};
pub use song::{Song, SongId};
