//! JSON database files: an object keyed by song title
//!
//! ```json
//! { "Blue Monk": { "key": "Bb", "genre": "blues",
//!                  "progressions": [ { "chords": ["Bb7", "Eb7"], "description": "head" } ] } }
//! ```

use super::{DatabaseError, ProgressionDatabase, ProgressionEntry, Song};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SongRecord {
    #[serde(default)]
    key: String,
    #[serde(default)]
    composer: Option<String>,
    #[serde(default)]
    year: Option<u16>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default = "unknown_genre")]
    genre: String,
    #[serde(default)]
    progressions: Vec<ProgressionEntry>,
}

fn unknown_genre() -> String {
    "unknown".to_string()
}

impl ProgressionDatabase {
    /// Parse a database from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let records: BTreeMap<String, SongRecord> = serde_json::from_str(text)?;

        let mut db = ProgressionDatabase::empty();
        for (title, record) in records {
            db.insert(Song {
                title,
                key: record.key,
                composer: record.composer,
                year: record.year,
                difficulty: record.difficulty,
                genre: record.genre,
                progressions: record.progressions,
            });
        }
        Ok(db)
    }

    /// Read a database file
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DatabaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self::from_json_str(&text).map_err(|source| DatabaseError::Malformed {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        tracing::info!(path = %path.display(), songs = db.len(), "loaded database file");
        Ok(db)
    }

    /// Read a database file and merge it in, returning replaced titles
    pub fn merge_json(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>, DatabaseError> {
        let other = Self::load_json(path)?;
        Ok(self.merge(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "Blue Monk": {
            "key": "Bb",
            "composer": "Thelonious Monk",
            "year": 1954,
            "genre": "blues",
            "progressions": [
                { "chords": ["Bb7", "Eb7", "Bb7", "F7"], "description": "head" }
            ]
        },
        "Untitled": { "progressions": [ { "chords": ["C", "G"] } ] }
    }"#;

    #[test]
    fn test_parse_sample() {
        let db = ProgressionDatabase::from_json_str(SAMPLE).unwrap();
        assert_eq!(db.len(), 2);
        let monk = db.song("Blue Monk").unwrap();
        assert_eq!(monk.year, Some(1954));
        assert_eq!(monk.progressions[0].chords.len(), 4);

        let untitled = db.song("Untitled").unwrap();
        assert_eq!(untitled.genre, "unknown");
        assert_eq!(untitled.progressions[0].description, "");
    }

    #[test]
    fn test_load_and_merge_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let mut db = ProgressionDatabase::builtin();
        let before = db.len();
        let replaced = db.merge_json(file.path()).unwrap();
        assert!(replaced.is_empty());
        assert_eq!(db.len(), before + 2);
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2, 3]").unwrap();
        assert!(matches!(
            ProgressionDatabase::load_json(file.path()),
            Err(DatabaseError::Malformed { .. })
        ));
        assert!(matches!(
            ProgressionDatabase::load_json("/definitely/not/here.json"),
            Err(DatabaseError::Io { .. })
        ));
    }
}
