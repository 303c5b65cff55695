use anyhow::{anyhow, Result};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A pitch on the chromatic scale (0-11) with an octave and an enharmonic spelling
/// 0=C, 1=C#/Db, 2=D, 3=D#/Eb, 4=E, 5=F, 6=F#/Gb, 7=G, 8=G#/Ab, 9=A, 10=A#/Bb, 11=B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pitch_class: u8, // 0-11 chromatic representation
    octave: i8,      // Scientific pitch notation (4 = middle C)
    spelling: Spelling,
}

/// How a pitch class is written when it falls on a black key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Spelling {
    Natural,
    Sharp,
    Flat,
}

/// Lowest key of an 88-key piano (A0)
pub const PIANO_LOWEST_MIDI: u8 = 21;
/// Highest key of an 88-key piano (C8)
pub const PIANO_HIGHEST_MIDI: u8 = 108;

const NATURAL_NAMES: [&str; 12] = ["C", "", "D", "", "E", "F", "", "G", "", "A", "", "B"];
const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

impl Spelling {
    /// Resolve the spelling a pitch class should carry under this preference.
    /// White keys are always `Natural`; black keys follow the preference,
    /// with `Natural` treated as sharp.
    pub fn for_pitch_class(self, pitch_class: u8) -> Spelling {
        if Note::is_natural_pitch_class(pitch_class) {
            Spelling::Natural
        } else if self == Spelling::Flat {
            Spelling::Flat
        } else {
            Spelling::Sharp
        }
    }
}

impl Note {
    /// Create a new note from chromatic pitch class (0-11), defaulting to octave 4
    pub fn new(pitch_class: u8) -> Result<Self> {
        Self::new_with_octave(pitch_class, 4)
    }

    /// Create a new note with explicit octave
    pub fn new_with_octave(pitch_class: u8, octave: i8) -> Result<Self> {
        if pitch_class > 11 {
            return Err(anyhow!("Pitch class must be 0-11, got {}", pitch_class));
        }

        Ok(Note {
            pitch_class,
            octave,
            spelling: Spelling::Natural.for_pitch_class(pitch_class),
        })
    }

    /// Create a note from a MIDI number, spelled with the given preference
    pub fn from_midi(midi: i16, preference: Spelling) -> Note {
        let pitch_class = midi.rem_euclid(12) as u8;
        Note {
            pitch_class,
            octave: (midi.div_euclid(12) - 1) as i8,
            spelling: preference.for_pitch_class(pitch_class),
        }
    }

    /// Get the chromatic pitch class (0-11)
    pub fn pitch_class(&self) -> u8 {
        self.pitch_class
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn spelling(&self) -> Spelling {
        self.spelling
    }

    /// MIDI note number (C4 = 60). Not clamped; may fall outside 0-127.
    pub fn midi(&self) -> i16 {
        (self.octave as i16 + 1) * 12 + self.pitch_class as i16
    }

    /// MIDI note number clamped to the 7-bit wire range
    pub fn midi_byte(&self) -> u8 {
        self.midi().clamp(0, 127) as u8
    }

    /// Same pitch, written with another accidental preference
    pub fn respelled(self, preference: Spelling) -> Note {
        Note {
            spelling: preference.for_pitch_class(self.pitch_class),
            ..self
        }
    }

    /// Same pitch class and spelling in another octave
    pub fn in_octave(self, octave: i8) -> Note {
        Note { octave, ..self }
    }

    /// Check if a pitch class corresponds to a natural note (white key)
    pub fn is_natural_pitch_class(pitch_class: u8) -> bool {
        matches!(pitch_class % 12, 0 | 2 | 4 | 5 | 7 | 9 | 11) // C, D, E, F, G, A, B
    }

    pub fn is_black_key(&self) -> bool {
        !Self::is_natural_pitch_class(self.pitch_class)
    }

    /// Note name without octave ("C", "F#", "Bb")
    pub fn name(&self) -> &'static str {
        Self::pitch_class_name(self.pitch_class, self.spelling)
    }

    /// Name of a pitch class under a spelling preference
    pub fn pitch_class_name(pitch_class: u8, spelling: Spelling) -> &'static str {
        let pc = (pitch_class % 12) as usize;
        match spelling.for_pitch_class(pitch_class % 12) {
            Spelling::Natural => NATURAL_NAMES[pc],
            Spelling::Sharp => SHARP_NAMES[pc],
            Spelling::Flat => FLAT_NAMES[pc],
        }
    }

    /// Parse a bare note name ("C", "f#", "Bb", "E♭") into pitch class and spelling.
    /// Returns the number of bytes consumed so callers can continue with a suffix.
    pub fn parse_name_prefix(s: &str) -> Option<(u8, Spelling, usize)> {
        let mut chars = s.char_indices();
        let (_, letter) = chars.next()?;

        let natural = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };
        let mut consumed = letter.len_utf8();

        let (pitch_class, spelling) = match chars.next() {
            Some((_, '#')) | Some((_, '♯')) => {
                consumed += s[consumed..].chars().next().map_or(0, char::len_utf8);
                ((natural + 1) % 12, Spelling::Sharp)
            }
            Some((_, 'b')) | Some((_, '♭')) => {
                consumed += s[consumed..].chars().next().map_or(0, char::len_utf8);
                ((natural + 11) % 12, Spelling::Flat)
            }
            _ => (natural, Spelling::Natural),
        };

        Some((pitch_class, spelling.for_pitch_class(pitch_class), consumed))
    }

    /// Transpose the note by a number of semitones.
    /// The accidental preference survives; notes landing on white keys become natural.
    pub fn transpose(self, semitones: i8) -> Note {
        let preference = match self.spelling {
            Spelling::Natural => Spelling::Sharp,
            other => other,
        };
        Note::from_midi(self.midi() + semitones as i16, preference)
    }

    /// Position on an 88-key keyboard (A0 = 0), if the note is on it
    pub fn key_number(&self) -> Option<u8> {
        let midi = self.midi();
        if (PIANO_LOWEST_MIDI as i16..=PIANO_HIGHEST_MIDI as i16).contains(&midi) {
            Some((midi - PIANO_LOWEST_MIDI as i16) as u8)
        } else {
            None
        }
    }
}

impl FromStr for Note {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (pitch_class, spelling, consumed) =
            Self::parse_name_prefix(s).ok_or_else(|| anyhow!("Invalid note name: {}", s))?;

        let octave_part = &s[consumed..];
        let octave = if octave_part.is_empty() {
            4
        } else {
            octave_part
                .parse::<i8>()
                .map_err(|_| anyhow!("Invalid octave: {}", octave_part))?
        };

        Ok(Note {
            pitch_class,
            octave,
            spelling,
        })
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

// Arithmetic operations for transposition
impl Add<i8> for Note {
    type Output = Note;

    fn add(self, semitones: i8) -> Self::Output {
        self.transpose(semitones)
    }
}

impl Sub<i8> for Note {
    type Output = Note;

    fn sub(self, semitones: i8) -> Self::Output {
        self.transpose(-semitones)
    }
}

// Ascending interval between two pitch classes
impl Sub<Note> for Note {
    type Output = u8;

    fn sub(self, other: Note) -> Self::Output {
        (self.pitch_class + 12 - other.pitch_class) % 12
    }
}

/// Inclusive MIDI range a voicing must stay inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyRange {
    pub low: u8,
    pub high: u8,
}

impl KeyRange {
    pub fn new(low: u8, high: u8) -> Result<Self> {
        if high < low || high - low < 11 {
            return Err(anyhow!(
                "Key range {}..={} must span at least one octave",
                low,
                high
            ));
        }
        Ok(KeyRange { low, high })
    }

    /// The full 88-key piano, A0..=C8
    pub fn piano() -> Self {
        KeyRange {
            low: PIANO_LOWEST_MIDI,
            high: PIANO_HIGHEST_MIDI,
        }
    }

    pub fn contains(&self, midi: i16) -> bool {
        (self.low as i16..=self.high as i16).contains(&midi)
    }

    pub fn clamp(&self, midi: i16) -> i16 {
        midi.clamp(self.low as i16, self.high as i16)
    }

    /// Every in-range MIDI number carrying this pitch class, ascending
    pub fn placements(&self, pitch_class: u8) -> Vec<i16> {
        (self.low as i16..=self.high as i16)
            .filter(|m| m.rem_euclid(12) as u8 == pitch_class % 12)
            .collect()
    }
}

impl Default for KeyRange {
    fn default() -> Self {
        Self::piano()
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..={}",
            Note::from_midi(self.low as i16, Spelling::Sharp),
            Note::from_midi(self.high as i16, Spelling::Sharp)
        )
    }
}
