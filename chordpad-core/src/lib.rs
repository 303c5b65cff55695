//! # Chordpad Core
//!
//! Chord symbol parsing, piano voicings, progression transposition and a
//! small database of jazz progressions. No terminal, MIDI or threads.
//!
//! ## Features
//!
//! - **serde**: JSON progression databases and TOML session configuration
//!
//! ## Example
//!
//! ```
//! use chordpad_core::{parse_chord, VoicingGenerator, VoicingMode};
//!
//! let parsed = parse_chord("Cmaj7").unwrap();
//! let voiced = VoicingGenerator::default().voice(&parsed.chord, VoicingMode::Drop2, None);
//! assert_eq!(voiced.voicing.to_string(), "G3 C4 E4 B4");
//! ```

pub mod database;
pub mod diagnostic;
pub mod export;
pub mod parser;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use database::{ProgressionDatabase, Song};
pub use diagnostic::{Diagnostic, FallbackApplied, RangeClamp};
pub use parser::{parse_chord, ChordError, ParsedChord};
pub use session::{ActionLog, ChordReport, Session, SessionConfig};
pub use types::{
    Chord, ChordQuality, Key, KeyRange, Note, Progression, ProgressionPlayer, Voicing,
    VoicingGenerator, VoicingMode,
};
