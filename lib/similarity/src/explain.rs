//! Explainability for recommendation scores
//!
//! A cosine score over unit rows is a sum of per-feature products, so each
//! feature's share of the score can be reported exactly.

use crate::rank::Recommendation;
use serde::Serialize;
use std::cmp::Ordering;
use tunematch_core::SongId;

/// How one feature contributed to a similarity score
#[derive(Debug, Clone, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    /// Raw value of the query song (missing as 0)
    pub query_value: f64,
    /// Raw value of the candidate song (missing as 0)
    pub candidate_value: f64,
    /// Product of the two unit-row components
    pub contribution: f64,
}

/// Per-feature breakdown of the similarity between two songs
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub query: SongId,
    pub candidate: SongId,
    pub score: f64,
    /// Sorted by contribution, largest first
    pub contributions: Vec<FeatureContribution>,
}

impl Explanation {
    pub fn new(query: SongId, candidate: SongId, score: f64, mut contributions: Vec<FeatureContribution>) -> Self {
        contributions.sort_by(|a, b| {
            b.contribution
                .partial_cmp(&a.contribution)
                .unwrap_or(Ordering::Equal)
        });
        Self {
            query,
            candidate,
            score,
            contributions,
        }
    }

    /// Feature that pulled the two songs together the most
    pub fn top_feature(&self) -> Option<&str> {
        self.contributions
            .first()
            .filter(|c| c.contribution > 0.0)
            .map(|c| c.feature.as_str())
    }
}

/// Summary statistics for one recommendation query
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationStats {
    /// Number of songs considered (catalog size minus the query)
    pub candidates_count: usize,
    pub results_count: usize,
    pub avg_score: f64,
    pub best_score: f64,
    pub worst_score: f64,
}

impl RecommendationStats {
    /// Compute stats from ranked results
    pub fn compute(results: &[Recommendation], candidates_count: usize) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                avg_score: 0.0,
                best_score: 0.0,
                worst_score: 0.0,
            };
        }

        let avg_score = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;
        Self {
            candidates_count,
            results_count: results.len(),
            avg_score,
            // results are sorted
            best_score: results[0].score,
            worst_score: results[results.len() - 1].score,
        }
    }
}
