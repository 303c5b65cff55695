// chordpad-core/src/types/mod.rs

pub mod analysis;
pub mod chord;
pub mod note;
pub mod player;
pub mod progression;
pub mod quality;
pub mod voice_leading;
pub mod voicing;

pub use analysis::{Complexity, ComplexityReport, Key, Mode};
pub use chord::Chord;
pub use note::{KeyRange, Note, Spelling};
pub use player::{PlayerState, ProgressionPlayer};
pub use progression::{interval_name, transposition_distance, Progression};
pub use quality::ChordQuality;
pub use voice_leading::{movement, VoiceLeading, VoiceMovement};
pub use voicing::{Voiced, Voicing, VoicingGenerator, VoicingMode};
