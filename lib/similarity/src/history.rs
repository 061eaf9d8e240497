//! Bounded log of recent recommendation queries, owned by the caller

use crate::rank::Recommendation;
use serde::Serialize;
use std::collections::VecDeque;
use tunematch_core::SongId;

pub const DEFAULT_HISTORY_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub query: SongId,
    pub result_count: usize,
    pub best_score: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct RecommendationHistory {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl Default for RecommendationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl RecommendationHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries),
            max_entries,
        }
    }

    /// Record a query; the oldest entry is dropped once full
    pub fn record(&mut self, query: impl Into<SongId>, results: &[Recommendation]) {
        if self.max_entries == 0 {
            return;
        }
        if self.entries.len() == self.max_entries {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            query: query.into(),
            result_count: results.len(),
            best_score: results.first().map(|r| r.score),
        });
    }

    /// Up to `n` most recent entries, newest first
    pub fn recent(&self, n: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(score: f64) -> Recommendation {
        Recommendation {
            song_id: SongId::new("r"),
            title: String::new(),
            artist: String::new(),
            score,
        }
    }

    #[test]
    fn test_bounded() {
        let mut history = RecommendationHistory::new(3);
        for i in 0..5 {
            history.record(format!("q{}", i), &[rec(0.5)]);
        }
        assert_eq!(history.len(), 3);
        let queries: Vec<&str> = history.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_recent_newest_first() {
        let mut history = RecommendationHistory::default();
        history.record("first", &[rec(0.9), rec(0.1)]);
        history.record("second", &[]);

        let recent = history.recent(5);
        assert_eq!(recent[0].query.as_str(), "second");
        assert_eq!(recent[0].best_score, None);
        assert_eq!(recent[1].result_count, 2);
        assert_eq!(recent[1].best_score, Some(0.9));
    }
}
