use crate::parser::chord_parser::{alteration_token, parse_chord};
use crate::parser::error::ChordError;
use crate::types::note::{Note, Spelling};
use crate::types::quality::ChordQuality;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A chord as root + quality + extra extension intervals.
/// Only the root's pitch class and spelling matter; its octave is nominal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    root: Note,
    quality: ChordQuality,
    extensions: BTreeSet<u8>, // semitones above the root not in the base quality
}

impl Chord {
    pub fn new(root: Note, quality: ChordQuality) -> Self {
        Self::with_extensions(root, quality, BTreeSet::new())
    }

    pub fn with_extensions(root: Note, quality: ChordQuality, extensions: BTreeSet<u8>) -> Self {
        let base = quality.intervals();
        let extensions = extensions
            .into_iter()
            .filter(|interval| !base.contains(interval))
            .collect();
        Chord {
            root: root.in_octave(4),
            quality,
            extensions,
        }
    }

    pub fn root(&self) -> Note {
        self.root
    }

    pub fn quality(&self) -> ChordQuality {
        self.quality
    }

    pub fn extensions(&self) -> &BTreeSet<u8> {
        &self.extensions
    }

    /// Chord tones as semitone offsets above the root, ascending, one per
    /// pitch class. An altered fifth in the extensions replaces the perfect fifth.
    pub fn intervals(&self) -> Vec<u8> {
        let altered_fifth = self.extensions.contains(&6) || self.extensions.contains(&8);

        let mut all: Vec<u8> = self
            .quality
            .intervals()
            .iter()
            .chain(self.extensions.iter())
            .copied()
            .filter(|&interval| !(altered_fifth && interval == 7))
            .collect();
        all.sort_unstable();

        let mut seen = [false; 12];
        all.retain(|&interval| {
            let pc = (interval % 12) as usize;
            !std::mem::replace(&mut seen[pc], true)
        });
        all
    }

    /// Distinct pitch classes, in interval order
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.intervals()
            .iter()
            .map(|interval| (self.root.pitch_class() + interval) % 12)
            .collect()
    }

    pub fn contains_pitch_class(&self, pitch_class: u8) -> bool {
        self.pitch_classes().contains(&(pitch_class % 12))
    }

    /// How a chord tone at `interval` above the root should be written.
    /// Sharp and flat roots keep their accidental family; natural roots
    /// spell minor and diminished intervals flat, everything else sharp.
    pub fn spelling_for(&self, interval: u8) -> Spelling {
        match self.root.spelling() {
            Spelling::Sharp => Spelling::Sharp,
            Spelling::Flat => Spelling::Flat,
            Spelling::Natural => match interval {
                1 | 3 | 6 | 10 | 13 | 20 => Spelling::Flat,
                _ => Spelling::Sharp,
            },
        }
    }

    /// Chord tones as notes stacked upward from the root in octave 4
    pub fn notes(&self) -> Vec<Note> {
        let root_midi = self.root.midi();
        self.intervals()
            .iter()
            .map(|&interval| Note::from_midi(root_midi + interval as i16, self.spelling_for(interval)))
            .collect()
    }

    /// Canonical symbol: root, canonical suffix, then any extensions as a
    /// parenthesised alteration list ("G7(b9,#9,#11,b13)")
    pub fn symbol(&self) -> String {
        let mut symbol = format!("{}{}", self.root.name(), self.quality.suffix());
        let tokens: Vec<&str> = self
            .extensions
            .iter()
            .filter_map(|&interval| alteration_token(interval))
            .collect();
        if !tokens.is_empty() {
            symbol.push('(');
            symbol.push_str(&tokens.join(","));
            symbol.push(')');
        }
        symbol
    }

    pub fn is_dominant(&self) -> bool {
        self.quality.is_dominant()
    }

    /// Same chord moved by `semitones`. A sharp-spelled root stays sharp;
    /// any other root that lands on a black key is spelled flat.
    pub fn transposed(&self, semitones: i8) -> Chord {
        let preference = match self.root.spelling() {
            Spelling::Sharp => Spelling::Sharp,
            _ => Spelling::Flat,
        };
        let pitch_class = (self.root.pitch_class() as i16 + semitones as i16).rem_euclid(12);
        Chord {
            root: Note::from_midi(60 + pitch_class, preference),
            quality: self.quality,
            extensions: self.extensions.clone(),
        }
    }

    /// Same root pitch class, quality and extensions, regardless of spelling
    pub fn same_harmony(&self, other: &Chord) -> bool {
        self.root.pitch_class() == other.root.pitch_class()
            && self.quality == other.quality
            && self.extensions == other.extensions
    }

    /// Describe the chord: name, tones and their degrees
    pub fn analyze(&self) -> String {
        let intervals = self.intervals();
        let tones: Vec<String> = self.notes().iter().map(|n| n.name().to_string()).collect();
        let degrees: Vec<&str> = intervals.iter().map(|&i| degree_name(i)).collect();

        let mut text = format!(
            "{} ({} {}): {} | degrees {}",
            self.symbol(),
            self.root.name(),
            self.quality.name(),
            tones.join(" "),
            degrees.join(" ")
        );
        if !self.extensions.is_empty() {
            let added: Vec<&str> = self.extensions.iter().map(|&i| degree_name(i)).collect();
            text.push_str(&format!(" | altered {}", added.join(" ")));
        }
        text
    }
}

/// Scale-degree label for an interval above the root
pub fn degree_name(interval: u8) -> &'static str {
    match interval {
        0 => "1",
        1 => "b2",
        2 => "2",
        3 => "b3",
        4 => "3",
        5 => "4",
        6 => "b5",
        7 => "5",
        8 => "#5",
        9 => "6",
        10 => "b7",
        11 => "7",
        12 => "8",
        13 => "b9",
        14 => "9",
        15 => "#9",
        16 => "10",
        17 => "11",
        18 => "#11",
        19 => "12",
        20 => "b13",
        21 => "13",
        _ => "?",
    }
}

impl FromStr for Chord {
    type Err = ChordError;

    /// Parse a symbol, accepting any fallback silently
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord(s).map(|parsed| parsed.chord)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(symbol: &str) -> Chord {
        symbol.parse().unwrap()
    }

    fn names(chord: &Chord) -> Vec<String> {
        chord.notes().iter().map(|n| n.name().to_string()).collect()
    }

    #[test]
    fn test_major_seventh_tones() {
        let cmaj7 = chord("Cmaj7");
        assert_eq!(cmaj7.intervals(), vec![0, 4, 7, 11]);
        assert_eq!(names(&cmaj7), vec!["C", "E", "G", "B"]);
    }

    #[test]
    fn test_spelling_of_tones() {
        assert_eq!(names(&chord("C7")), vec!["C", "E", "G", "Bb"]);
        assert_eq!(names(&chord("D")), vec!["D", "F#", "A"]);
        assert_eq!(names(&chord("Cm")), vec!["C", "Eb", "G"]);
        assert_eq!(names(&chord("Eb7")), vec!["Eb", "G", "Bb", "Db"]);
        assert_eq!(names(&chord("F#7")), vec!["F#", "A#", "C#", "E"]);
        assert_eq!(names(&chord("Dm7b5")), vec!["D", "F", "Ab", "C"]);
    }

    #[test]
    fn test_altered_fifth_replaces_fifth() {
        let c = chord("Cmaj7#5");
        assert_eq!(c.intervals(), vec![0, 4, 8, 11]);
    }

    #[test]
    fn test_extension_duplicates_collapse_by_pitch_class() {
        // 13 (A) over a 6th chord is the same pitch class as the 6th
        let c = chord("C6(13)");
        assert_eq!(c.pitch_classes(), vec![0, 4, 7, 9]);
    }

    #[test]
    fn test_symbol_round_trip() {
        for quality in ChordQuality::ALL {
            let original = Chord::new(Note::new(2).unwrap(), quality);
            let reparsed = chord(&original.symbol());
            assert_eq!(reparsed, original, "{}", original.symbol());
        }

        let altered = chord("G7alt");
        assert_eq!(altered.symbol(), "G7(b9,#9,#11,b13)");
        assert_eq!(chord(&altered.symbol()), altered);
    }

    #[test]
    fn test_transposed_spelling() {
        let c = chord("Cmaj7");
        assert_eq!(c.transposed(1).symbol(), "Dbmaj7");
        assert_eq!(c.transposed(-1).symbol(), "Bmaj7");

        let fs = chord("F#m7");
        assert_eq!(fs.transposed(2).symbol(), "G#m7");

        assert_eq!(c.transposed(0), c);
        assert_eq!(c.transposed(12), c);
    }

    #[test]
    fn test_same_harmony_ignores_spelling() {
        assert!(chord("C#7").same_harmony(&chord("Db7")));
        assert!(!chord("C7").same_harmony(&chord("Cmaj7")));
    }

    #[test]
    fn test_analyze_mentions_tones() {
        let text = chord("Cmaj7").analyze();
        assert!(text.contains("C E G B"));
        assert!(text.contains("major 7th"));
    }
}
