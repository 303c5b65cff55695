//! Harmonic analysis of chords within a key
//!
//! Roman numerals, diatonic membership, secondary and substitute dominants,
//! and a rough complexity grade for whole progressions.

use crate::types::chord::Chord;
use crate::types::note::{Note, Spelling};
use crate::types::quality::ChordQuality;
use anyhow::{anyhow, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

/// A tonic plus a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    tonic: Note,
    mode: Mode,
}

const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_SCALE: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

const MAJOR_NUMERALS: [(u8, &str); 7] = [
    (0, "I"),
    (2, "ii"),
    (4, "iii"),
    (5, "IV"),
    (7, "V"),
    (9, "vi"),
    (11, "vii°"),
];
const MINOR_NUMERALS: [(u8, &str); 7] = [
    (0, "i"),
    (2, "ii°"),
    (3, "III"),
    (5, "iv"),
    (7, "v"),
    (8, "VI"),
    (10, "VII"),
];

impl Key {
    pub fn new(tonic: Note, mode: Mode) -> Self {
        Key {
            tonic: tonic.in_octave(4),
            mode,
        }
    }

    pub fn major(tonic: Note) -> Self {
        Self::new(tonic, Mode::Major)
    }

    pub fn minor(tonic: Note) -> Self {
        Self::new(tonic, Mode::Minor)
    }

    pub fn tonic(&self) -> Note {
        self.tonic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Same key moved by `semitones`, spelled like a transposed chord root
    pub fn transposed(&self, semitones: i8) -> Key {
        let preference = match self.tonic.spelling() {
            Spelling::Sharp => Spelling::Sharp,
            _ => Spelling::Flat,
        };
        let pitch_class = (self.tonic.pitch_class() as i16 + semitones as i16).rem_euclid(12);
        Key {
            tonic: Note::from_midi(60 + pitch_class, preference),
            mode: self.mode,
        }
    }

    /// Pitch classes of the major or natural minor scale
    pub fn scale_pitch_classes(&self) -> [u8; 7] {
        let steps = match self.mode {
            Mode::Major => MAJOR_SCALE,
            Mode::Minor => MINOR_SCALE,
        };
        steps.map(|step| (self.tonic.pitch_class() + step) % 12)
    }

    /// Roman numeral of the scale degree the chord's root sits on.
    /// Chromatic roots are shown as their semitone distance, e.g. "[1]".
    pub fn roman_numeral(&self, chord: &Chord) -> String {
        let degree = chord.root() - self.tonic;
        let table = match self.mode {
            Mode::Major => &MAJOR_NUMERALS,
            Mode::Minor => &MINOR_NUMERALS,
        };
        table
            .iter()
            .find(|(step, _)| *step == degree)
            .map(|(_, numeral)| numeral.to_string())
            .unwrap_or_else(|| format!("[{}]", degree))
    }

    /// Every chord tone belongs to the scale
    pub fn is_diatonic(&self, chord: &Chord) -> bool {
        let scale = self.scale_pitch_classes();
        chord.pitch_classes().iter().all(|pc| scale.contains(pc))
    }
}

impl FromStr for Key {
    type Err = anyhow::Error;

    /// "C", "Gm", "Ebm", "F# minor", "A major"
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (pitch_class, spelling, consumed) =
            Note::parse_name_prefix(s).ok_or_else(|| anyhow!("Invalid key: {}", s))?;

        let mode = match s[consumed..].trim() {
            "" | "maj" | "major" | "M" => Mode::Major,
            "m" | "min" | "minor" | "-" => Mode::Minor,
            other => return Err(anyhow!("Invalid key mode '{}' in {}", other, s)),
        };

        Ok(Key::new(Note::from_midi(60 + pitch_class as i16, spelling), mode))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{}", self.tonic.name()),
            Mode::Minor => write!(f, "{}m", self.tonic.name()),
        }
    }
}

/// A chord's role within a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordInKey {
    pub roman: String,
    pub diatonic: bool,
    pub dominant: bool,
}

pub fn analyze_in_key(chord: &Chord, key: &Key) -> ChordInKey {
    ChordInKey {
        roman: key.roman_numeral(chord),
        diatonic: key.is_diatonic(chord),
        dominant: chord.is_dominant(),
    }
}

/// Label chords that act as secondary dominants: a chromatic dominant chord
/// resolving down a fifth ("V7/ii"), or a diminished seventh resolving up a
/// semitone ("vii°7/V"). Other positions get `None`.
pub fn secondary_dominants(chords: &[Chord], key: &Key) -> Vec<Option<String>> {
    let mut labels = vec![None; chords.len()];

    for (i, pair) in chords.windows(2).enumerate() {
        let (chord, target) = (&pair[0], &pair[1]);
        if !chord.is_dominant() || key.is_diatonic(chord) {
            continue;
        }

        let motion = target.root() - chord.root();
        let label = match chord.quality() {
            ChordQuality::Diminished7 if motion == 1 => {
                format!("vii°7/{}", key.roman_numeral(target))
            }
            ChordQuality::Diminished7 => continue,
            _ if motion == 5 => {
                let suffix = chord.symbol()[chord.root().name().len()..].to_string();
                format!("V{}/{}", suffix, key.roman_numeral(target))
            }
            _ => continue,
        };
        labels[i] = Some(label);
    }

    labels
}

/// The dominant seventh a fifth above `target`
pub fn secondary_dominant_of(target: &Chord) -> Chord {
    Chord::new(target.root().transpose(7), ChordQuality::Dominant7).transposed(0)
}

/// The dominant a tritone away, sharing the guide tones (3rd and 7th).
/// Only dominant sevenths have one; the symmetric diminished seventh does
/// not count.
pub fn tritone_substitution(chord: &Chord) -> Option<Chord> {
    if !chord.is_dominant() || chord.quality() == ChordQuality::Diminished7 {
        return None;
    }
    Some(chord.transposed(6))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Complexity {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Complexity::Easy => "easy",
            Complexity::Medium => "medium",
            Complexity::Hard => "hard",
            Complexity::Expert => "expert",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityReport {
    pub score: u32,
    pub unique_chords: usize,
    pub total_chords: usize,
    pub complexity: Complexity,
}

/// Grade a chord sequence. Each distinct chord scores one point, plus
/// three for an altered tension, two for a natural 9/11/13 or one for a
/// plain seventh.
pub fn complexity(chords: &[Chord]) -> ComplexityReport {
    let unique: BTreeSet<String> = chords.iter().map(|c| c.symbol()).collect();
    let mut score = unique.len() as u32;

    for symbol in &unique {
        let suffix = symbol
            .trim_start_matches(|c: char| matches!(c, 'A'..='G'))
            .trim_start_matches(['#', 'b']);
        score += if ["b9", "#9", "b13", "#11"].iter().any(|t| suffix.contains(t)) {
            3
        } else if ["9", "11", "13"].iter().any(|t| suffix.contains(t)) {
            2
        } else if suffix.contains('7') {
            1
        } else {
            0
        };
    }

    let complexity = match score {
        0..=5 => Complexity::Easy,
        6..=10 => Complexity::Medium,
        11..=15 => Complexity::Hard,
        _ => Complexity::Expert,
    };

    ComplexityReport {
        score,
        unique_chords: unique.len(),
        total_chords: chords.len(),
        complexity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(symbol: &str) -> Chord {
        symbol.parse().unwrap()
    }

    fn key(name: &str) -> Key {
        name.parse().unwrap()
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!(key("C").mode(), Mode::Major);
        assert_eq!(key("Gm").mode(), Mode::Minor);
        assert_eq!(key("Ebm").tonic().pitch_class(), 3);
        assert_eq!(key("F# minor").to_string(), "F#m");
        assert!("Cx".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn test_roman_numerals_major() {
        let c = key("C");
        assert_eq!(c.roman_numeral(&chord("Dm7")), "ii");
        assert_eq!(c.roman_numeral(&chord("G7")), "V");
        assert_eq!(c.roman_numeral(&chord("Bm7b5")), "vii°");
        assert_eq!(c.roman_numeral(&chord("Db7")), "[1]");
    }

    #[test]
    fn test_tritone_substitution() {
        assert_eq!(tritone_substitution(&chord("G7")).unwrap().symbol(), "Db7");
        assert_eq!(tritone_substitution(&chord("C7")).unwrap().symbol(), "Gb7");
        assert_eq!(tritone_substitution(&chord("F#7")).unwrap().symbol(), "C7");
        assert_eq!(
            tritone_substitution(&chord("G7alt")).unwrap().symbol(),
            "Db7(b9,#9,#11,b13)"
        );
        assert_eq!(tritone_substitution(&chord("A13")).unwrap().symbol(), "Eb13");

        assert!(tritone_substitution(&chord("Cmaj7")).is_none());
        assert!(tritone_substitution(&chord("Dm7")).is_none());
        assert!(tritone_substitution(&chord("Bdim7")).is_none());
    }

    #[test]
    fn test_tritone_substitution_twice_returns_home() {
        let g7 = chord("G7");
        let back = tritone_substitution(&tritone_substitution(&g7).unwrap()).unwrap();
        assert!(back.same_harmony(&g7));
    }

    #[test]
    fn test_roman_numerals_minor() {
        let a = key("Am");
        assert_eq!(a.roman_numeral(&chord("Am")), "i");
        assert_eq!(a.roman_numeral(&chord("Bm7b5")), "ii°");
        assert_eq!(a.roman_numeral(&chord("F")), "VI");
    }

    #[test]
    fn test_diatonic() {
        let c = key("C");
        assert!(c.is_diatonic(&chord("G7")));
        assert!(!c.is_diatonic(&chord("A7")));
        assert_eq!(c.scale_pitch_classes(), [0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn test_secondary_dominants() {
        let chords: Vec<Chord> = ["Cmaj7", "A7", "Dm7", "G7", "Cmaj7"]
            .iter()
            .map(|s| chord(s))
            .collect();
        let labels = secondary_dominants(&chords, &key("C"));
        assert_eq!(labels[1].as_deref(), Some("V7/ii"));
        // G7 is diatonic, so it is a primary dominant
        assert_eq!(labels[3], None);
        assert_eq!(labels[4], None);
    }

    #[test]
    fn test_diminished_leading_tone() {
        let chords = vec![chord("C#dim7"), chord("Dm7")];
        let labels = secondary_dominants(&chords, &key("C"));
        assert_eq!(labels[0].as_deref(), Some("vii°7/ii"));
    }

    #[test]
    fn test_secondary_dominant_of() {
        assert_eq!(secondary_dominant_of(&chord("Dm")).symbol(), "A7");
        assert_eq!(secondary_dominant_of(&chord("G")).symbol(), "D7");
        assert_eq!(secondary_dominant_of(&chord("Ab")).symbol(), "Eb7");
    }

    #[test]
    fn test_complexity_grades() {
        let easy: Vec<Chord> = ["C", "F", "G"].iter().map(|s| chord(s)).collect();
        let report = complexity(&easy);
        assert_eq!(report.score, 3);
        assert_eq!(report.complexity, Complexity::Easy);

        let altered: Vec<Chord> = ["Dm9", "G7alt", "Cmaj9", "A7b9", "Dm11", "Db13"]
            .iter()
            .map(|s| chord(s))
            .collect();
        let report = complexity(&altered);
        assert_eq!(report.unique_chords, 6);
        assert!(report.complexity >= Complexity::Hard);
    }
}
