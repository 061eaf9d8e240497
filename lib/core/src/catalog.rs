use crate::{Error, FeatureMatrix, FeatureSchema, Result, SchemaResolution, Song, SongId};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Immutable collection of songs with their feature matrix
///
/// Built once and never mutated; a reload produces a new `Catalog`
/// with a fresh `version`.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: u64,
    songs: Vec<Song>,
    columns: Vec<String>,
    schema: SchemaResolution,
    matrix: FeatureMatrix,
    index: AHashMap<SongId, usize>,
    display_index: AHashMap<String, usize>,
    title_index: AHashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog whose available columns are every feature name
    /// present on at least one song, in sorted order
    pub fn new(songs: Vec<Song>, schema: &FeatureSchema) -> Result<Self> {
        let columns: BTreeSet<&String> = songs.iter().flat_map(|s| s.features.keys()).collect();
        let columns = columns.into_iter().cloned().collect();
        Self::with_columns(songs, columns, schema)
    }

    /// Build a catalog from songs and the ordered numeric columns of their source
    pub fn with_columns(songs: Vec<Song>, columns: Vec<String>, schema: &FeatureSchema) -> Result<Self> {
        if songs.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let schema = schema.resolve(&columns)?;

        let mut index = AHashMap::with_capacity(songs.len());
        let mut display_index = AHashMap::with_capacity(songs.len());
        let mut title_index = AHashMap::with_capacity(songs.len());
        for (row, song) in songs.iter().enumerate() {
            if index.insert(song.id.clone(), row).is_some() {
                return Err(Error::DuplicateSong(song.id.to_string()));
            }
            display_index.entry(song.display_name()).or_insert(row);
            title_index.entry(song.title.clone()).or_insert(row);
        }

        let mut matrix = FeatureMatrix::zeros(songs.len(), schema.len());
        for (row, song) in songs.iter().enumerate() {
            for (col, name) in schema.features.iter().enumerate() {
                matrix.set(row, col, usable_feature(song, name).unwrap_or(0.0));
            }
        }

        Ok(Self {
            version: NEXT_VERSION.fetch_add(1, Ordering::Relaxed),
            songs,
            columns,
            schema,
            matrix,
            index,
            display_index,
            title_index,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn song(&self, row: usize) -> Option<&Song> {
        self.songs.get(row)
    }

    /// Numeric columns the source provided, before schema resolution
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn schema(&self) -> &SchemaResolution {
        &self.schema
    }

    /// Raw feature values, missing filled with 0
    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    /// Row of the song with this exact identifier
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Song> {
        self.position(id).map(|row| &self.songs[row])
    }

    /// Resolve a display name ("title - artist") or raw title to a row.
    ///
    /// Display names are tried first. When several songs share a key the
    /// first one in catalog order wins.
    pub fn find_by_title(&self, key: &str) -> Option<usize> {
        self.display_index
            .get(key)
            .or_else(|| self.title_index.get(key))
            .copied()
    }

    /// Display names in catalog order
    pub fn display_names(&self) -> Vec<String> {
        self.songs.iter().map(Song::display_name).collect()
    }

    /// Up to `limit` ids whose id or title contains `query`, ignoring case
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<SongId> {
        let needle = query.to_lowercase();
        self.songs
            .iter()
            .filter(|s| {
                s.id.as_str().to_lowercase().contains(&needle)
                    || s.title.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|s| s.id.clone())
            .collect()
    }

    /// Summary statistics over the resolved feature columns
    pub fn stats(&self) -> CatalogStats {
        let n = self.matrix.rows() as f64;
        let features = self
            .schema
            .features
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let values: Vec<f64> = self.matrix.column(col).collect();
                let mean = values.iter().sum::<f64>() / n;
                let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                FeatureSummary {
                    name: name.clone(),
                    mean,
                    std_dev: variance.sqrt(),
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    missing: self.songs.iter().filter(|s| usable_feature(s, name).is_none()).count(),
                }
            })
            .collect();

        let unique_artists = self
            .songs
            .iter()
            .map(|s| s.artist.as_str())
            .filter(|a| !a.is_empty())
            .collect::<AHashSet<_>>()
            .len();

        CatalogStats {
            version: self.version,
            song_count: self.songs.len(),
            unique_artists,
            feature_count: self.schema.len(),
            schema_fallback: self.schema.is_fallback(),
            features,
        }
    }
}

/// Feature value usable for scoring; NaN and infinities count as missing
fn usable_feature(song: &Song, name: &str) -> Option<f64> {
    song.feature(name).filter(|v| v.is_finite())
}

/// Dataset overview
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub version: u64,
    pub song_count: usize,
    pub unique_artists: usize,
    pub feature_count: usize,
    pub schema_fallback: bool,
    pub features: Vec<FeatureSummary>,
}

/// Per-feature statistics over raw values (missing counted as 0)
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSummary {
    pub name: String,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub missing: usize,
}
