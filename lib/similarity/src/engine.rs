//! Recommendation engine facade
//!
//! Standardization and row normalization run once when the engine is built
//! for a catalog; each query then scores one row and ranks the result.

use crate::distance::SimilarityScorer;
use crate::explain::{Explanation, FeatureContribution, RecommendationStats};
use crate::normalize::Standardizer;
use crate::rank::{top_n, Recommendation};
use std::sync::Arc;
use tracing::debug;
use tunematch_core::{Catalog, Error, Result};

/// Precomputed similarity state for one immutable catalog
///
/// Read-only after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Arc<Catalog>,
    standardizer: Standardizer,
    scorer: SimilarityScorer,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<Catalog>) -> Result<Self> {
        let standardizer = Standardizer::fit(catalog.matrix())?;
        let standardized = standardizer.transform(catalog.matrix())?;
        let scorer = SimilarityScorer::new(&standardized);
        debug!(
            "Built engine for catalog v{} ({} songs x {} features)",
            catalog.version(),
            catalog.len(),
            catalog.schema().len()
        );
        Ok(Self {
            catalog,
            standardizer,
            scorer,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn standardizer(&self) -> &Standardizer {
        &self.standardizer
    }

    fn row_of(&self, song_id: &str) -> Result<usize> {
        self.catalog
            .position(song_id)
            .ok_or_else(|| Error::SongNotFound(song_id.to_string()))
    }

    /// The `count` songs most similar to `song_id`, best first
    pub fn recommend(&self, song_id: &str, count: usize) -> Result<Vec<Recommendation>> {
        let row = self.row_of(song_id)?;
        self.recommend_row(row, count)
    }

    /// Like [`recommend`](Self::recommend), resolving a display name or title
    pub fn recommend_by_title(&self, key: &str, count: usize) -> Result<Vec<Recommendation>> {
        let row = self
            .catalog
            .find_by_title(key)
            .ok_or_else(|| Error::SongNotFound(key.to_string()))?;
        self.recommend_row(row, count)
    }

    pub fn recommend_row(&self, row: usize, count: usize) -> Result<Vec<Recommendation>> {
        let scores = self.scorer.score(row)?;
        let ranked = top_n(&scores, row, count)?;
        debug!(
            "Query row {} of catalog v{}: {} recommendations",
            row,
            self.catalog.version(),
            ranked.len()
        );
        Ok(enrich(&self.catalog, ranked))
    }

    /// Similarity of `song_id` with every song, in catalog order
    pub fn scores(&self, song_id: &str) -> Result<Vec<f64>> {
        let row = self.row_of(song_id)?;
        self.scorer.score(row)
    }

    /// Per-feature breakdown of the score between two songs
    pub fn explain(&self, query_id: &str, candidate_id: &str) -> Result<Explanation> {
        let query = self.row_of(query_id)?;
        let candidate = self.row_of(candidate_id)?;

        let q = self.scorer.unit_row(query);
        let c = self.scorer.unit_row(candidate);
        let matrix = self.catalog.matrix();
        let contributions = self
            .catalog
            .schema()
            .features
            .iter()
            .enumerate()
            .map(|(col, name)| FeatureContribution {
                feature: name.clone(),
                query_value: matrix.get(query, col),
                candidate_value: matrix.get(candidate, col),
                contribution: q[col] * c[col],
            })
            .collect();

        Ok(Explanation::new(
            self.catalog.songs()[query].id.clone(),
            self.catalog.songs()[candidate].id.clone(),
            self.scorer.score_pair(query, candidate),
            contributions,
        ))
    }

    pub fn stats(&self, results: &[Recommendation]) -> RecommendationStats {
        RecommendationStats::compute(results, self.catalog.len().saturating_sub(1))
    }
}

fn enrich(catalog: &Catalog, ranked: Vec<(usize, f64)>) -> Vec<Recommendation> {
    ranked
        .into_iter()
        .map(|(row, score)| Recommendation::from_song(&catalog.songs()[row], score))
        .collect()
}

/// One-shot recommendation against a catalog.
///
/// Builds the normalized state for this call only; keep a
/// [`RecommendationEngine`] around to serve many queries.
pub fn recommend(catalog: &Catalog, song_id: &str, count: usize) -> Result<Vec<Recommendation>> {
    let row = catalog
        .position(song_id)
        .ok_or_else(|| Error::SongNotFound(song_id.to_string()))?;
    let standardizer = Standardizer::fit(catalog.matrix())?;
    let scorer = SimilarityScorer::new(&standardizer.transform(catalog.matrix())?);
    let ranked = top_n(&scorer.score(row)?, row, count)?;
    Ok(enrich(catalog, ranked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::DEFAULT_RECOMMENDATION_COUNT;
    use tunematch_core::{FeatureSchema, Song};

    fn two_feature_catalog(points: &[(&str, f64, f64)]) -> Catalog {
        let songs = points
            .iter()
            .map(|(id, x, y)| {
                Song::new(*id, format!("Song {}", id), "Artist")
                    .with_feature("energy", *x)
                    .with_feature("valence", *y)
            })
            .collect();
        Catalog::new(songs, &FeatureSchema::canonical()).unwrap()
    }

    fn ids(results: &[Recommendation]) -> Vec<&str> {
        results.iter().map(|r| r.song_id.as_str()).collect()
    }

    #[test]
    fn test_duplicate_in_feature_space_ranks_first() {
        let catalog = two_feature_catalog(&[
            ("A", 0.0, 0.0),
            ("B", 0.0, 0.0),
            ("C", 10.0, 10.0),
            ("D", 1.0, 1.0),
            ("E", 5.0, 5.0),
        ]);
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        let results = engine.recommend("A", 3).unwrap();

        // B duplicates A; D lies in the same direction from the mean and ties with it
        assert_eq!(ids(&results), vec!["B", "D", "E"]);
        assert_eq!(results[0].score, results[1].score);
        assert!((results[0].score - 1.0).abs() < 1e-12);
        assert!(results[2].score < 0.0);
    }

    #[test]
    fn test_song_not_found() {
        let catalog = two_feature_catalog(&[("A", 0.0, 1.0), ("B", 1.0, 0.0)]);
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        assert!(matches!(
            engine.recommend("nonexistent-id", 3),
            Err(Error::SongNotFound(id)) if id == "nonexistent-id"
        ));
        assert!(matches!(engine.recommend("a", 3), Err(Error::SongNotFound(_))));
    }

    #[test]
    fn test_single_song_catalog_returns_empty() {
        let catalog = two_feature_catalog(&[("only", 0.3, 0.7)]);
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        let results = engine.recommend("only", DEFAULT_RECOMMENDATION_COUNT).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_invalid_count() {
        let catalog = two_feature_catalog(&[("A", 0.0, 1.0), ("B", 1.0, 0.0)]);
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        assert!(matches!(engine.recommend("A", 0), Err(Error::InvalidCount(0))));
    }

    #[test]
    fn test_constant_feature_does_not_fail() {
        let songs = vec![
            Song::new("a", "a", "x").with_feature("energy", 0.5),
            Song::new("b", "b", "x").with_feature("energy", 0.5),
            Song::new("c", "c", "x").with_feature("energy", 0.5),
        ];
        let catalog = Catalog::new(songs, &FeatureSchema::canonical()).unwrap();
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        let results = engine.recommend("a", 10).unwrap();

        assert_eq!(ids(&results), vec!["b", "c"]);
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_nan_cell_scores_like_a_missing_cell() {
        let build = |b: Song| {
            let songs = vec![
                Song::new("a", "A", "x").with_feature("energy", 0.9).with_feature("valence", 0.2),
                b.with_feature("valence", 0.6),
                Song::new("c", "C", "x").with_feature("energy", 0.1).with_feature("valence", 0.9),
                Song::new("d", "D", "x").with_feature("energy", 0.4).with_feature("valence", 0.1),
            ];
            RecommendationEngine::new(Arc::new(Catalog::new(songs, &FeatureSchema::canonical()).unwrap()))
                .unwrap()
        };
        let with_nan = build(Song::new("b", "B", "x").with_feature("energy", f64::NAN));
        let absent = build(Song::new("b", "B", "x"));

        let a = with_nan.recommend("c", 3).unwrap();
        let b = absent.recommend("c", 3).unwrap();
        assert_eq!(a, b);
        // energy still separates the other songs
        assert!(a.iter().any(|r| r.score.abs() < 0.999));
    }

    #[test]
    fn test_recommend_by_title() {
        let catalog = two_feature_catalog(&[("A", 0.0, 1.0), ("B", 1.0, 0.0), ("C", 0.1, 0.9)]);
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();

        let by_title = engine.recommend_by_title("Song A", 2).unwrap();
        let by_display = engine.recommend_by_title("Song A - Artist", 2).unwrap();
        let by_id = engine.recommend("A", 2).unwrap();
        assert_eq!(by_title, by_id);
        assert_eq!(by_display, by_id);
        assert!(matches!(
            engine.recommend_by_title("Song Z", 2),
            Err(Error::SongNotFound(_))
        ));
    }

    #[test]
    fn test_one_shot_matches_engine() {
        let catalog = two_feature_catalog(&[
            ("A", 0.2, 0.9),
            ("B", 0.8, 0.1),
            ("C", 0.3, 0.7),
            ("D", 0.9, 0.4),
        ]);
        let expected = recommend(&catalog, "C", 3).unwrap();
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        assert_eq!(engine.recommend("C", 3).unwrap(), expected);
    }

    #[test]
    fn test_explain_contributions_sum_to_score() {
        let catalog = two_feature_catalog(&[
            ("A", 0.2, 0.9),
            ("B", 0.8, 0.1),
            ("C", 0.3, 0.7),
            ("D", 0.9, 0.4),
        ]);
        let engine = RecommendationEngine::new(Arc::new(catalog)).unwrap();
        let explanation = engine.explain("A", "C").unwrap();

        let total: f64 = explanation.contributions.iter().map(|c| c.contribution).sum();
        assert!((total - explanation.score).abs() < 1e-12);
        assert_eq!(explanation.contributions.len(), 2);

        let scores = engine.scores("A").unwrap();
        assert_eq!(scores[2], explanation.score);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecommendationEngine>();
    }
}
