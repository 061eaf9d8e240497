//! # TuneMatch Similarity
//!
//! Content-based song recommendation over audio-feature vectors.
//!
//! ## Pipeline
//!
//! - **Normalize**: z-score standardization per feature column
//! - **Score**: cosine similarity between the query row and every row
//! - **Rank**: stable top-N by score, excluding the query song
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tunematch_core::{Catalog, FeatureSchema, Song};
//! use tunematch_similarity::RecommendationEngine;
//!
//! let songs = vec![
//!     Song::new("a", "Toxic", "Britney Spears").with_feature("energy", 0.84).with_feature("tempo", 143.0),
//!     Song::new("b", "Yellow", "Coldplay").with_feature("energy", 0.66).with_feature("tempo", 87.0),
//!     Song::new("c", "Lose Yourself", "Eminem").with_feature("energy", 0.74).with_feature("tempo", 171.0),
//! ];
//! let catalog = Catalog::new(songs, &FeatureSchema::canonical()).unwrap();
//! let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
//!
//! let results = engine.recommend("a", 2).unwrap();
//! assert_eq!(results.len(), 2);
//! assert!(results.iter().all(|r| r.song_id.as_str() != "a"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │   Catalog   │────>│ Standardizer │────>│   Scorer    │
//! │ (raw rows)  │     │  (z-score)   │     │  (cosine)   │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                                                 │
//!                      ┌──────────────┐           │
//!                      │    Ranker    │<──────────┘
//!                      │ (stable top) │
//!                      └──────────────┘
//!                             │
//!                      ┌──────────────┐
//!                      │   Explain    │
//!                      │  (features)  │
//!                      └──────────────┘
//! ```

pub mod cache;
pub mod distance;
pub mod engine;
pub mod explain;
pub mod history;
pub mod normalize;
pub mod rank;

// Re-export main types for convenience
pub use cache::{CacheKey, CacheStats, RecommendationCache, DEFAULT_CACHE_CAPACITY};
pub use distance::{cosine_similarity, SimilarityScorer};
pub use engine::{recommend, RecommendationEngine};
pub use explain::{Explanation, FeatureContribution, RecommendationStats};
pub use history::{HistoryEntry, RecommendationHistory, DEFAULT_HISTORY_LEN};
pub use normalize::{standardize, Standardizer};
pub use rank::{top_n, Recommendation, DEFAULT_RECOMMENDATION_COUNT};
