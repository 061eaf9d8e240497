//! # TuneMatch
//!
//! Content-based song recommendations from audio features.
//!
//! Given a catalog of songs described by numeric audio features
//! (danceability, energy, tempo, ...), TuneMatch standardizes every feature
//! column, scores all songs against a query song with cosine similarity, and
//! returns the best matches in a stable order.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! tunematch --csv data/songs.csv recommend "Yellow - Coldplay" --by-title --count 5
//! tunematch --csv data/songs.csv export 4uLU6hMCjMI75M1A2tKUQC --output playlist.json
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use tunematch::prelude::*;
//!
//! let store = CatalogStore::open(LoaderConfig::new("data/songs.csv")).unwrap();
//! let results = store.recommend("4uLU6hMCjMI75M1A2tKUQC", 10).unwrap();
//! for rec in results.iter() {
//!     println!("{:.3}  {}", rec.score, rec.display_name());
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `tunematch-core` - Songs, feature schema, feature matrix, catalog
//! - `tunematch-similarity` - Standardization, cosine scoring, ranking, caching
//! - `tunematch-storage` - CSV loading, snapshot reloads, playlist drafts

// Re-export core types
pub use tunematch_core::{
    Catalog, CatalogStats, FeatureMatrix, FeatureSchema, SchemaResolution, Song, SongId,
    Error, Result, CANONICAL_FEATURES,
};

// Re-export similarity
pub use tunematch_similarity::{
    Explanation, Recommendation, RecommendationCache, RecommendationEngine,
    RecommendationHistory, DEFAULT_RECOMMENDATION_COUNT,
};

// Re-export storage
pub use tunematch_storage::{
    CatalogLoader, CatalogStore, LoadReport, LoaderConfig, PlaylistDraft, RetryPolicy,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Catalog, FeatureSchema, Song, SongId,
        Error, Result,
        Recommendation, RecommendationEngine, RecommendationHistory,
        CatalogStore, LoaderConfig, PlaylistDraft,
        DEFAULT_RECOMMENDATION_COUNT,
    };
}
