//! Playlist drafts built from recommendations.
//!
//! A draft is the offline half of a playlist export: the name, the
//! description and one search query per track. Resolving the queries and
//! creating the playlist is left to whichever client consumes the JSON.

use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;
use tunematch_core::{Song, SongId};
use tunematch_similarity::Recommendation;

/// Tracks per add-to-playlist request accepted by the music service
pub const PLAYLIST_BATCH_SIZE: usize = 100;

const SEARCH_URL: &str = "https://open.spotify.com/search/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackQuery {
    pub song_id: SongId,
    pub title: String,
    pub artist: String,
    pub score: f64,
    /// Field-qualified search, e.g. `track:Yellow artist:Coldplay`
    pub search_query: String,
    pub search_url: String,
}

impl TrackQuery {
    pub fn from_recommendation(rec: &Recommendation) -> Self {
        let search_query = format!("track:{} artist:{}", rec.title, rec.artist);
        let search_url = format!(
            "{}{}",
            SEARCH_URL,
            urlencoding::encode(&format!("{} {}", rec.artist, rec.title))
        );
        Self {
            song_id: rec.song_id.clone(),
            title: rec.title.clone(),
            artist: rec.artist.clone(),
            score: rec.score,
            search_query,
            search_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub base_song: SongId,
    pub tracks: Vec<TrackQuery>,
    pub created_at: DateTime<Utc>,
}

impl PlaylistDraft {
    pub fn from_recommendations(base: &Song, recommendations: &[Recommendation]) -> Self {
        Self {
            name: format!("Recommended from {}", base.title),
            description: format!(
                "{} songs with a similar audio profile to {}",
                recommendations.len(),
                base.display_name()
            ),
            public: false,
            base_song: base.id.clone(),
            tracks: recommendations.iter().map(TrackQuery::from_recommendation).collect(),
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks split into request-sized chunks; a size of 0 is treated as 1
    pub fn batches(&self, size: usize) -> impl Iterator<Item = &[TrackQuery]> {
        self.tracks.chunks(size.max(1))
    }

    /// Write the draft as pretty JSON, replacing `path` atomically
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_vec_pretty(self)?;
        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(&json))
            .with_context(|| format!("Failed to write playlist draft to {}", path.display()))?;
        info!(
            "Wrote playlist draft '{}' ({} tracks) to {}",
            self.name,
            self.tracks.len(),
            path.display()
        );
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read playlist draft {}", path.display()))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recs(n: usize) -> Vec<Recommendation> {
        (0..n)
            .map(|i| {
                let song = Song::new(format!("s{}", i), format!("Song {}", i), "Band");
                Recommendation::from_song(&song, 1.0 - i as f64 / 256.0)
            })
            .collect()
    }

    #[test]
    fn test_draft_naming_and_queries() {
        let base = Song::new("b", "Yellow", "Coldplay");
        let rec = Recommendation::from_song(&Song::new("x", "Fix You", "Coldplay"), 0.93);
        let draft = PlaylistDraft::from_recommendations(&base, &[rec]);

        assert_eq!(draft.name, "Recommended from Yellow");
        assert!(!draft.public);
        assert_eq!(draft.base_song.as_str(), "b");
        assert_eq!(draft.len(), 1);

        let track = &draft.tracks[0];
        assert_eq!(track.search_query, "track:Fix You artist:Coldplay");
        assert_eq!(track.search_url, "https://open.spotify.com/search/Coldplay%20Fix%20You");
    }

    #[test]
    fn test_batches() {
        let base = Song::new("b", "Base", "Band");
        let draft = PlaylistDraft::from_recommendations(&base, &recs(250));
        let sizes: Vec<usize> = draft.batches(PLAYLIST_BATCH_SIZE).map(|b| b.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(draft.batches(0).count(), 250);

        let empty = PlaylistDraft::from_recommendations(&base, &[]);
        assert!(empty.is_empty());
        assert_eq!(empty.batches(PLAYLIST_BATCH_SIZE).count(), 0);
    }

    #[test]
    fn test_write_and_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        let base = Song::new("b", "Base", "Band");
        let draft = PlaylistDraft::from_recommendations(&base, &recs(3));

        draft.write_json(&path).unwrap();
        // overwriting an existing draft is allowed
        draft.write_json(&path).unwrap();

        let loaded = PlaylistDraft::read_json(&path).unwrap();
        assert_eq!(loaded, draft);
    }
}
