// chordpad-core/src/parser/mod.rs

pub mod chord_parser;
pub mod error;

pub use chord_parser::{parse_chord, ParsedChord, ALTERATION_TOKENS, FALLBACK_RULES};
pub use error::ChordError;
