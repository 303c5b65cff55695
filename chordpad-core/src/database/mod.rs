//! Song and progression database
//!
//! A built-in table of jazz standards and exercises, optionally extended
//! from JSON files keyed by song title.

mod builtin;
#[cfg(feature = "serde")]
mod json;

use crate::diagnostic::FallbackApplied;
use crate::parser::chord_parser::parse_chord;
use crate::parser::error::ChordError;
use crate::types::analysis::Key;
use crate::types::chord::Chord;
use crate::types::progression::Progression;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("no song matches '{0}'")]
    SongNotFound(String),
    #[error("'{query}' matches several songs: {}", .candidates.join(", "))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
    #[error("'{title}' has {len} progression(s), no #{}", .index + 1)]
    ProgressionIndex {
        title: String,
        index: usize,
        len: usize,
    },
    #[error("bad chord in '{title}'")]
    Chord {
        title: String,
        #[source]
        source: ChordError,
    },
    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed database file {}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// One chord sequence of a song
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressionEntry {
    pub chords: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub key: String,
    pub composer: Option<String>,
    pub year: Option<u16>,
    pub difficulty: Option<String>,
    pub genre: String,
    pub progressions: Vec<ProgressionEntry>,
}

impl Song {
    pub fn key(&self) -> Option<Key> {
        self.key.parse().ok()
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (key {}", self.title, self.key)?;
        if let Some(composer) = &self.composer {
            write!(f, ", {}", composer)?;
        }
        if let Some(year) = self.year {
            write!(f, ", {}", year)?;
        }
        if let Some(difficulty) = &self.difficulty {
            write!(f, ", {}", difficulty)?;
        }
        write!(f, ")")
    }
}

/// A progression containing the searched chord at some transposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordMatch {
    pub title: String,
    pub index: usize,
    /// Semitones the stored progression was moved to contain the chord
    pub semitones: u8,
    pub description: String,
    pub chords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseStats {
    pub songs: usize,
    pub progressions: usize,
    pub chords: usize,
    pub genres: usize,
    pub composers: usize,
    pub keys: usize,
}

impl fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} songs, {} progressions, {} chords, {} genres, {} composers, {} keys",
            self.songs, self.progressions, self.chords, self.genres, self.composers, self.keys
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressionDatabase {
    songs: BTreeMap<String, Song>,
}

impl ProgressionDatabase {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The songs shipped with the program
    pub fn builtin() -> Self {
        let mut db = Self::empty();
        for song in builtin::songs() {
            db.insert(song);
        }
        db
    }

    /// Add a song, returning any song it replaced
    pub fn insert(&mut self, song: Song) -> Option<Song> {
        self.songs.insert(song.title.clone(), song)
    }

    /// Merge `other` into this database. Songs with an existing title are
    /// replaced; their titles are returned.
    pub fn merge(&mut self, other: ProgressionDatabase) -> Vec<String> {
        let mut replaced = Vec::new();
        for (title, song) in other.songs {
            if self.songs.insert(title.clone(), song).is_some() {
                tracing::warn!(%title, "database entry replaced by later file");
                replaced.push(title);
            }
        }
        replaced
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Songs in title order
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.values()
    }

    pub fn song(&self, title: &str) -> Option<&Song> {
        self.songs.get(title)
    }

    /// Find a song by exact title, case-insensitive title, or a unique
    /// case-insensitive prefix
    pub fn lookup(&self, query: &str) -> Result<&Song, DatabaseError> {
        let query = query.trim();
        if let Some(song) = self.songs.get(query) {
            return Ok(song);
        }

        let lowered = query.to_lowercase();
        if let Some(song) = self.songs.values().find(|s| s.title.to_lowercase() == lowered) {
            return Ok(song);
        }

        let candidates: Vec<&Song> = self
            .songs
            .values()
            .filter(|s| s.title.to_lowercase().starts_with(&lowered))
            .collect();
        match candidates.as_slice() {
            [song] => Ok(song),
            [] => Err(DatabaseError::SongNotFound(query.to_string())),
            many => Err(DatabaseError::Ambiguous {
                query: query.to_string(),
                candidates: many.iter().map(|s| s.title.clone()).collect(),
            }),
        }
    }

    /// Titles grouped by genre
    pub fn genres(&self) -> BTreeMap<String, Vec<String>> {
        let mut genres: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for song in self.songs.values() {
            genres
                .entry(song.genre.clone())
                .or_default()
                .push(song.title.clone());
        }
        genres
    }

    pub fn songs_by_genre(&self, genre: &str) -> Vec<&Song> {
        self.songs
            .values()
            .filter(|s| s.genre.eq_ignore_ascii_case(genre))
            .collect()
    }

    /// Songs whose composer contains `composer`, ignoring case
    pub fn songs_by_composer(&self, composer: &str) -> Vec<&Song> {
        let wanted = composer.trim().to_lowercase();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.songs
            .values()
            .filter(|s| {
                s.composer
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&wanted))
            })
            .collect()
    }

    /// Songs in `key`, matching enharmonic spellings ("Db" finds "C#")
    pub fn songs_by_key(&self, key: &Key) -> Vec<&Song> {
        self.songs
            .values()
            .filter(|s| {
                s.key().is_some_and(|k| {
                    k.mode() == key.mode() && k.tonic().pitch_class() == key.tonic().pitch_class()
                })
            })
            .collect()
    }

    /// Build progression `index` of the song matching `query`, in the song's key
    pub fn progression(
        &self,
        query: &str,
        index: usize,
    ) -> Result<(Progression, Vec<FallbackApplied>), DatabaseError> {
        let song = self.lookup(query)?;
        let entry = song
            .progressions
            .get(index)
            .ok_or_else(|| DatabaseError::ProgressionIndex {
                title: song.title.clone(),
                index,
                len: song.progressions.len(),
            })?;

        let name = if song.progressions.len() > 1 {
            format!("{} #{}", song.title, index + 1)
        } else {
            song.title.clone()
        };
        let (progression, fallbacks) = Progression::from_symbols(name, &entry.chords)
            .map_err(|source| DatabaseError::Chord {
                title: song.title.clone(),
                source,
            })?;

        let progression = match song.key() {
            Some(key) => progression.with_key(key),
            None => {
                tracing::debug!(title = %song.title, key = %song.key, "unrecognised song key");
                progression
            }
        };
        Ok((progression, fallbacks))
    }

    /// Every stored progression that contains `target` at any of the 12
    /// transpositions, untransposed matches first
    pub fn find_by_chord(&self, target: &Chord) -> Vec<ChordMatch> {
        let mut matches = Vec::new();

        for semitones in 0..12u8 {
            for song in self.songs.values() {
                for (index, entry) in song.progressions.iter().enumerate() {
                    let chords = parse_entry(&song.title, entry);
                    let shifted: Vec<Chord> = chords
                        .iter()
                        .map(|c| c.transposed(semitones as i8))
                        .collect();
                    if shifted.iter().any(|c| c.same_harmony(target)) {
                        matches.push(ChordMatch {
                            title: song.title.clone(),
                            index,
                            semitones,
                            description: entry.description.clone(),
                            chords: shifted.iter().map(Chord::symbol).collect(),
                        });
                    }
                }
            }
        }
        matches
    }

    pub fn statistics(&self) -> DatabaseStats {
        let composers: BTreeSet<&str> = self
            .songs
            .values()
            .filter_map(|s| s.composer.as_deref())
            .collect();
        let keys: BTreeSet<&str> = self.songs.values().map(|s| s.key.as_str()).collect();

        DatabaseStats {
            songs: self.songs.len(),
            progressions: self.songs.values().map(|s| s.progressions.len()).sum(),
            chords: self
                .songs
                .values()
                .flat_map(|s| s.progressions.iter())
                .map(|p| p.chords.len())
                .sum(),
            genres: self.genres().len(),
            composers: composers.len(),
            keys: keys.len(),
        }
    }
}

/// Parse the chords of an entry, skipping symbols with no root
fn parse_entry(title: &str, entry: &ProgressionEntry) -> Vec<Chord> {
    entry
        .chords
        .iter()
        .filter_map(|symbol| match parse_chord(symbol) {
            Ok(parsed) => {
                if let Some(fallback) = parsed.fallback {
                    tracing::debug!(%title, %fallback, "database chord fallback");
                }
                Some(parsed.chord)
            }
            Err(err) => {
                tracing::debug!(%title, %err, "skipping database chord");
                None
            }
        })
        .collect()
}
