//! Core data models for the song database.
//!
//! The database is kept as an ordered JSON object so that fields this tool
//! does not know about survive the rewrite untouched. Songs are likewise
//! opaque JSON values; only `OfficialTitle` is ever inspected.

use crate::error::{MigrateError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Top-level key of the flat legacy song list
pub const SONGS_KEY: &str = "Songs";

/// Top-level key of the artist-grouped song list
pub const ARTISTS_KEY: &str = "Artists";

/// Required song field, used for classification and sorting
pub const TITLE_KEY: &str = "OfficialTitle";

// ============================================================================
// Songs and Artists
// ============================================================================

/// A single song record, passed through as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Song(pub Value);

impl Song {
    pub fn official_title(&self) -> Option<&str> {
        self.0.get(TITLE_KEY).and_then(Value::as_str)
    }
}

/// Artist group as written under `Artists`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Songs")]
    pub songs: Vec<Song>,
}

// ============================================================================
// Database Document
// ============================================================================

/// Whole song database document.
#[derive(Clone, Debug, PartialEq)]
pub struct SongDatabase {
    fields: Map<String, Value>,
}

impl SongDatabase {
    /// Parse a document read from `path`. The top level must be an object.
    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes).map_err(|source| MigrateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(MigrateError::Malformed(format!(
                "top level must be an object, found {}",
                json_type(&other)
            ))),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// True once `Artists` holds at least one entry. Absent, null and empty
    /// arrays all count as not migrated.
    pub fn is_migrated(&self) -> Result<bool> {
        match self.fields.get(ARTISTS_KEY) {
            None | Some(Value::Null) => Ok(false),
            Some(Value::Array(artists)) => Ok(!artists.is_empty()),
            Some(other) => Err(MigrateError::Malformed(format!(
                "'{}' must be an array, found {}",
                ARTISTS_KEY,
                json_type(other)
            ))),
        }
    }

    /// The flat legacy song list. A missing `Songs` key reads as empty.
    pub fn songs(&self) -> Result<&[Value]> {
        match self.fields.get(SONGS_KEY) {
            None => Ok(&[][..]),
            Some(Value::Array(songs)) => Ok(songs.as_slice()),
            Some(other) => Err(MigrateError::Malformed(format!(
                "'{}' must be an array, found {}",
                SONGS_KEY,
                json_type(other)
            ))),
        }
    }

    /// Number of songs listed across all `Artists` groups, if that field is
    /// shaped as expected.
    pub fn grouped_song_count(&self) -> Option<usize> {
        let artists = self.fields.get(ARTISTS_KEY)?.as_array()?;
        artists
            .iter()
            .map(|artist| artist.get(SONGS_KEY).and_then(Value::as_array).map(Vec::len))
            .sum()
    }

    /// Build the migrated document: `Artists` first, then every original
    /// field in its original order. `Songs` is always present afterwards.
    pub fn with_artists(&self, artists: &[Artist]) -> Result<Self> {
        let artists = serde_json::to_value(artists).map_err(MigrateError::Serialize)?;

        let mut fields = Map::with_capacity(self.fields.len() + 1);
        fields.insert(ARTISTS_KEY.to_string(), artists);
        for (key, value) in &self.fields {
            if key != ARTISTS_KEY {
                fields.insert(key.clone(), value.clone());
            }
        }
        if !fields.contains_key(SONGS_KEY) {
            fields.insert(SONGS_KEY.to_string(), Value::Array(Vec::new()));
        }

        Ok(Self { fields })
    }

    /// Two-space indented JSON with non-ASCII text left unescaped.
    pub fn to_pretty_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.fields).map_err(MigrateError::Serialize)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// Report
// ============================================================================

/// Song count for one resulting artist group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtistCount {
    pub name: String,
    pub songs: usize,
}

/// Outcome of a migration run, for display or a `--stats` file.
#[derive(Default, Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub already_migrated: bool,
    pub dry_run: bool,
    pub artists: Vec<ArtistCount>,
    pub total_songs: usize,
    /// Songs listed across `Artists`; differs from `total_songs` when the
    /// flat list grew after an earlier migration
    pub grouped_songs: Option<usize>,
    pub backup_path: Option<PathBuf>,
    pub elapsed_seconds: f64,
}

impl MigrationReport {
    /// Songs counted for `name`, zero when the group was omitted
    pub fn count_for(&self, name: &str) -> usize {
        self.artists
            .iter()
            .find(|a| a.name == name)
            .map_or(0, |a| a.songs)
    }

    /// Write the report to a JSON file
    pub fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> SongDatabase {
        let bytes = serde_json::to_vec(&value).unwrap();
        SongDatabase::from_slice(Path::new("songs.json"), &bytes).unwrap()
    }

    #[test]
    fn test_rejects_non_object_document() {
        let result = SongDatabase::from_slice(Path::new("songs.json"), b"[1, 2]");
        assert!(matches!(result, Err(MigrateError::Malformed(_))));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let result = SongDatabase::from_slice(Path::new("songs.json"), b"{\"Songs\": [");
        assert!(matches!(result, Err(MigrateError::Parse { .. })));
    }

    #[test]
    fn test_is_migrated() {
        assert!(!parse(json!({"Songs": []})).is_migrated().unwrap());
        assert!(!parse(json!({"Artists": null})).is_migrated().unwrap());
        assert!(!parse(json!({"Artists": []})).is_migrated().unwrap());
        assert!(parse(json!({"Artists": [{"Name": "X", "Songs": []}]}))
            .is_migrated()
            .unwrap());
        assert!(parse(json!({"Artists": "yes"})).is_migrated().is_err());
    }

    #[test]
    fn test_missing_songs_reads_as_empty() {
        let db = parse(json!({"Version": 1}));
        assert!(db.songs().unwrap().is_empty());
    }

    #[test]
    fn test_songs_must_be_array() {
        let db = parse(json!({"Songs": {"OfficialTitle": "Ripple"}}));
        assert!(matches!(db.songs(), Err(MigrateError::Malformed(_))));
    }

    #[test]
    fn test_song_title() {
        let song = Song(json!({"OfficialTitle": "Ripple", "Aliases": []}));
        assert_eq!(song.official_title(), Some("Ripple"));
        assert_eq!(Song(json!({"OfficialTitle": 3})).official_title(), None);
        assert_eq!(Song(json!({"Aliases": []})).official_title(), None);
    }

    #[test]
    fn test_with_artists_puts_artists_first_and_keeps_other_fields() {
        let db = parse(json!({
            "Version": 2,
            "Songs": [{"OfficialTitle": "Ripple"}],
            "Artists": []
        }));
        let artists = vec![Artist {
            name: "Grateful Dead".to_string(),
            songs: vec![Song(json!({"OfficialTitle": "Ripple"}))],
        }];

        let migrated = db.with_artists(&artists).unwrap();
        let keys: Vec<&str> = migrated.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Artists", "Version", "Songs"]);
        assert_eq!(migrated.fields()["Songs"], db.fields()["Songs"]);
        assert_eq!(migrated.fields()["Artists"][0]["Name"], "Grateful Dead");
    }

    #[test]
    fn test_with_artists_adds_empty_songs() {
        let db = parse(json!({}));
        let migrated = db.with_artists(&[]).unwrap();
        assert_eq!(migrated.fields()["Songs"], json!([]));
        assert_eq!(migrated.fields()["Artists"], json!([]));
    }

    #[test]
    fn test_song_fields_keep_their_order() {
        let bytes = br#"{"Songs":[{"Zeta":1,"OfficialTitle":"Ripple","Aliases":["rip"]}]}"#;
        let db = SongDatabase::from_slice(Path::new("songs.json"), bytes).unwrap();
        let song = db.songs().unwrap()[0].as_object().unwrap();
        let keys: Vec<&str> = song.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Zeta", "OfficialTitle", "Aliases"]);
    }

    #[test]
    fn test_pretty_output_keeps_non_ascii() {
        let db = parse(json!({"Songs": [{"OfficialTitle": "Café Blues"}]}));
        let text = String::from_utf8(db.to_pretty_bytes().unwrap()).unwrap();
        assert!(text.contains("Café Blues"));
        assert!(text.contains("\n  \"Songs\""));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_grouped_song_count() {
        let db = parse(json!({"Artists": [
            {"Name": "A", "Songs": [{}, {}]},
            {"Name": "B", "Songs": [{}]}
        ]}));
        assert_eq!(db.grouped_song_count(), Some(3));
        assert_eq!(parse(json!({})).grouped_song_count(), None);
    }

    #[test]
    fn test_report_count_for() {
        let report = MigrationReport {
            artists: vec![ArtistCount {
                name: "Grateful Dead".to_string(),
                songs: 4,
            }],
            total_songs: 4,
            ..Default::default()
        };
        assert_eq!(report.count_for("Grateful Dead"), 4);
        assert_eq!(report.count_for("New Riders of the Purple Sage"), 0);
    }

    #[test]
    fn test_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let report = MigrationReport {
            total_songs: 2,
            ..Default::default()
        };
        report.write_to_file(&path).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["total_songs"], 2);
        assert_eq!(written["already_migrated"], false);
    }
}
