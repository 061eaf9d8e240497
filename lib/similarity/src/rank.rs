//! Top-N selection over similarity scores
//!
//! Rows are ordered by score descending. Equal scores keep catalog order,
//! and the query row is excluded by position, so a duplicate song with
//! identical features but a different id is still eligible.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tunematch_core::{Error, Result, Song, SongId};

/// Number of recommendations returned when the caller does not say
pub const DEFAULT_RECOMMENDATION_COUNT: usize = 10;

/// One recommended song with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub song_id: SongId,
    pub title: String,
    pub artist: String,
    pub score: f64,
}

impl Recommendation {
    pub fn from_song(song: &Song, score: f64) -> Self {
        Self {
            song_id: song.id.clone(),
            title: song.title.clone(),
            artist: song.artist.clone(),
            score,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

/// Select the `min(count, len - 1)` best rows other than `query_row`.
///
/// Returns `(row, score)` pairs, best first.
pub fn top_n(scores: &[f64], query_row: usize, count: usize) -> Result<Vec<(usize, f64)>> {
    if count == 0 {
        return Err(Error::InvalidCount(count));
    }
    if query_row >= scores.len() {
        return Err(Error::RowOutOfRange {
            index: query_row,
            len: scores.len(),
        });
    }

    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(row, _)| *row != query_row)
        .collect();

    // sort_by is stable: equal scores stay in row order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.truncate(count);
    Ok(ranked)
}
