//! CSV catalog loader
//!
//! Reads a song table, cleans it (empty ids, duplicates), detects the numeric
//! columns and builds an immutable [`Catalog`].

use crate::retry::RetryPolicy;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tunematch_core::{Catalog, Error, FeatureSchema, Result, Song};

/// Columns tried, in order, for the song title
pub const TITLE_COLUMNS: [&str; 3] = ["song", "name", "title"];
/// Columns tried, in order, for the artist
pub const ARTIST_COLUMNS: [&str; 2] = ["artist", "artists"];

fn default_id_column() -> String {
    "id".to_string()
}

/// Catalog loading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub csv_path: PathBuf,
    /// Replaces the canonical feature list when set
    #[serde(default)]
    pub feature_schema_override: Option<Vec<String>>,
    /// Identifier column; ids are derived from "title - artist" when absent
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Write `<stem>_clean.csv` next to the source after cleaning
    #[serde(default)]
    pub write_clean_copy: bool,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl LoaderConfig {
    pub fn new(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            feature_schema_override: None,
            id_column: default_id_column(),
            write_clean_copy: false,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.feature_schema_override = Some(features);
        self
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    pub fn schema(&self) -> FeatureSchema {
        match &self.feature_schema_override {
            Some(features) => FeatureSchema::new(features.clone()),
            None => FeatureSchema::canonical(),
        }
    }
}

/// What the loader did to the source table
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub empty_ids_removed: usize,
    pub duplicates_removed: usize,
    pub songs: usize,
    pub numeric_columns: Vec<String>,
    /// Expected columns (id, title, artist) the source lacks
    pub missing_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean_copy: Option<PathBuf>,
}

struct RawTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

pub struct CatalogLoader {
    config: LoaderConfig,
}

impl CatalogLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Read and clean the configured CSV file
    pub fn load(&self) -> Result<(Catalog, LoadReport)> {
        let path = &self.config.csv_path;
        info!("Loading songs from {:?}", path);

        let table = self.config.retry.run(
            "Reading catalog CSV",
            || read_table(csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?, path),
            is_retryable,
        )?;

        let (catalog, mut report, clean) = self.build(table)?;
        if self.config.write_clean_copy {
            report.clean_copy = Some(write_clean_copy(path, &clean)?);
        }
        Ok((catalog, report))
    }

    /// Read and clean CSV data from any reader
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<(Catalog, LoadReport)> {
        let source = Path::new("<reader>");
        let table = read_table(csv::Reader::from_reader(reader), source)?;
        let (catalog, report, _) = self.build(table)?;
        Ok((catalog, report))
    }

    fn build(&self, table: RawTable) -> Result<(Catalog, LoadReport, RawTable)> {
        let headers = &table.headers;
        let position = |name: &str| headers.iter().position(|h| h == name);

        let mut report = LoadReport {
            rows_read: table.records.len(),
            ..LoadReport::default()
        };

        let id_idx = position(&self.config.id_column);
        let title_idx = TITLE_COLUMNS.iter().find_map(|c| position(*c));
        let artist_idx = ARTIST_COLUMNS.iter().find_map(|c| position(*c));
        if id_idx.is_none() {
            report.missing_columns.push(self.config.id_column.clone());
        }
        if title_idx.is_none() {
            report.missing_columns.push(TITLE_COLUMNS[0].to_string());
        }
        if artist_idx.is_none() {
            report.missing_columns.push(ARTIST_COLUMNS[0].to_string());
        }
        if !report.missing_columns.is_empty() {
            warn!("CSV missing some expected columns: {:?}", report.missing_columns);
        }

        let cell = |record: &[String], idx: Option<usize>| -> String {
            idx.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        // Clean: drop empty ids, keep the first row for each id
        let mut seen = AHashSet::new();
        let mut kept: Vec<(String, Vec<String>)> = Vec::with_capacity(table.records.len());
        for record in table.records {
            let id = match id_idx {
                Some(_) => cell(&record, id_idx),
                None => {
                    let title = cell(&record, title_idx);
                    let artist = cell(&record, artist_idx);
                    if title.is_empty() && artist.is_empty() {
                        String::new()
                    } else {
                        format!("{} - {}", title, artist)
                    }
                }
            };
            if id.is_empty() {
                report.empty_ids_removed += 1;
                continue;
            }
            if !seen.insert(id.clone()) {
                report.duplicates_removed += 1;
                continue;
            }
            kept.push((id, record));
        }

        if report.empty_ids_removed > 0 {
            warn!("Removed {} rows with empty ids", report.empty_ids_removed);
        }
        if report.duplicates_removed > 0 {
            warn!("Removed {} duplicate rows", report.duplicates_removed);
        }
        if kept.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let reserved: Vec<usize> = [id_idx, title_idx, artist_idx].into_iter().flatten().collect();
        let numeric: Vec<usize> = (0..headers.len())
            .filter(|i| !reserved.contains(i))
            .filter(|i| is_numeric_column(kept.iter().map(|(_, r)| r), *i))
            .collect();
        report.numeric_columns = numeric.iter().map(|i| headers[*i].clone()).collect();

        let songs: Vec<Song> = kept
            .iter()
            .map(|(id, record)| {
                let features = numeric.iter().filter_map(|i| {
                    parse_number(record.get(*i).map(String::as_str).unwrap_or(""))
                        .map(|v| (headers[*i].clone(), v))
                });
                Song::new(id.as_str(), cell(record, title_idx), cell(record, artist_idx))
                    .with_features(features)
            })
            .collect();
        report.songs = songs.len();

        let catalog = Catalog::with_columns(songs, report.numeric_columns.clone(), &self.config.schema())?;
        info!(
            "Loaded {} songs with {} features ({} rows read)",
            catalog.len(),
            catalog.schema().len(),
            report.rows_read
        );

        let clean = RawTable {
            headers: table.headers,
            records: kept.into_iter().map(|(_, r)| r).collect(),
        };
        Ok((catalog, report, clean))
    }
}

fn read_table<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<RawTable> {
    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable { headers, records })
}

fn csv_error(path: &Path, e: csv::Error) -> Error {
    if e.is_io_error() {
        Error::Io(std::io::Error::from(e))
    } else {
        Error::Load(format!("{}: {}", path.display(), e))
    }
}

fn is_retryable(e: &Error) -> bool {
    matches!(e, Error::Io(io) if io.kind() != ErrorKind::NotFound)
}

/// A cell as a finite number; empty, NaN and infinite values are missing
fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Every non-empty cell parses as a number and at least one cell is non-empty
fn is_numeric_column<'a>(mut records: impl Iterator<Item = &'a Vec<String>>, idx: usize) -> bool {
    let mut any = false;
    let all_numeric = records.all(|record| {
        let cell = record.get(idx).map(|s| s.trim()).unwrap_or("");
        if cell.is_empty() {
            return true;
        }
        any = true;
        cell.parse::<f64>().is_ok()
    });
    any && all_numeric
}

fn write_clean_copy(path: &Path, table: &RawTable) -> Result<PathBuf> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "catalog".to_string());
    let clean_path = path.with_file_name(format!("{}_clean.csv", stem));

    let mut writer = csv::Writer::from_path(&clean_path).map_err(|e| csv_error(&clean_path, e))?;
    writer
        .write_record(&table.headers)
        .map_err(|e| csv_error(&clean_path, e))?;
    for record in &table.records {
        writer.write_record(record).map_err(|e| csv_error(&clean_path, e))?;
    }
    writer.flush()?;

    info!("Cleaned CSV saved as {:?}", clean_path);
    Ok(clean_path)
}
