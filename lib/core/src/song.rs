use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Canonical song identifier
///
/// Lookups are exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SongId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SongId {
    fn from(s: String) -> Self {
        SongId(s)
    }
}

impl From<&str> for SongId {
    fn from(s: &str) -> Self {
        SongId(s.to_string())
    }
}

impl Borrow<str> for SongId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A song with display fields and named audio features
///
/// Title and artist are display-only and never take part in scoring.
/// A feature absent from `features` is treated as missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Song {
    pub id: SongId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub features: BTreeMap<String, f64>,
}

impl Song {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<SongId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            features: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.features
            .extend(features.into_iter().map(|(name, value)| (name.into(), value)));
        self
    }

    /// Feature value, or `None` when missing
    #[inline]
    pub fn feature(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    /// "title - artist", the string shown in song pickers
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        let song = Song::new("s1", "Oops!...I Did It Again", "Britney Spears");
        assert_eq!(song.display_name(), "Oops!...I Did It Again - Britney Spears");
    }

    #[test]
    fn test_missing_feature() {
        let song = Song::new("s1", "t", "a").with_feature("energy", 0.8);
        assert_eq!(song.feature("energy"), Some(0.8));
        assert_eq!(song.feature("tempo"), None);
    }

    #[test]
    fn test_song_id_serializes_as_plain_string() {
        let id = SongId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
