use std::fmt;
use std::sync::OnceLock;

/// The fixed set of chord qualities the parser recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChordQuality {
    Major,
    Minor,
    Power,
    Augmented,
    Diminished,
    Sus2,
    Sus4,
    Add9,
    Major6,
    Minor6,
    Dominant7,
    Major7,
    Minor7,
    MinorMajor7,
    HalfDiminished7,
    Diminished7,
    Dominant7Flat5,
    Dominant7Sharp5,
    Dominant7Sus4,
    Dominant7Flat9,
    Dominant9,
    Major9,
    Minor9,
    Minor11,
    Dominant13,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 25] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Power,
        ChordQuality::Augmented,
        ChordQuality::Diminished,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
        ChordQuality::Add9,
        ChordQuality::Major6,
        ChordQuality::Minor6,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::MinorMajor7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Diminished7,
        ChordQuality::Dominant7Flat5,
        ChordQuality::Dominant7Sharp5,
        ChordQuality::Dominant7Sus4,
        ChordQuality::Dominant7Flat9,
        ChordQuality::Dominant9,
        ChordQuality::Major9,
        ChordQuality::Minor9,
        ChordQuality::Minor11,
        ChordQuality::Dominant13,
    ];

    /// Canonical suffix written after the root
    pub fn suffix(self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Power => "5",
            ChordQuality::Augmented => "aug",
            ChordQuality::Diminished => "dim",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Add9 => "add9",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::MinorMajor7 => "m(maj7)",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::Dominant7Flat5 => "7b5",
            ChordQuality::Dominant7Sharp5 => "7#5",
            ChordQuality::Dominant7Sus4 => "7sus4",
            ChordQuality::Dominant7Flat9 => "7b9",
            ChordQuality::Dominant9 => "9",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Minor11 => "m11",
            ChordQuality::Dominant13 => "13",
        }
    }

    /// Alternative spellings accepted on input, already normalised
    /// (no parentheses or spaces)
    fn aliases(self) -> &'static [&'static str] {
        match self {
            ChordQuality::Major => &["maj", "Maj", "M"],
            ChordQuality::Minor => &["min", "-"],
            ChordQuality::Power => &[],
            ChordQuality::Augmented => &["+"],
            ChordQuality::Diminished => &["°", "o"],
            ChordQuality::Sus2 => &[],
            ChordQuality::Sus4 => &["sus"],
            ChordQuality::Add9 => &["2"],
            ChordQuality::Major6 => &["maj6", "Maj6", "M6"],
            ChordQuality::Minor6 => &["min6", "-6"],
            ChordQuality::Dominant7 => &["dom7"],
            ChordQuality::Major7 => &["Maj7", "M7", "Δ7", "Δ", "ma7"],
            ChordQuality::Minor7 => &["min7", "-7"],
            ChordQuality::MinorMajor7 => &["mmaj7", "mM7", "minmaj7", "-maj7"],
            ChordQuality::HalfDiminished7 => &["ø", "ø7", "-7b5", "min7b5"],
            ChordQuality::Diminished7 => &["°7", "o7"],
            ChordQuality::Dominant7Flat5 => &[],
            ChordQuality::Dominant7Sharp5 => &["aug7", "+7", "7+"],
            ChordQuality::Dominant7Sus4 => &["7sus"],
            ChordQuality::Dominant7Flat9 => &[],
            ChordQuality::Dominant9 => &[],
            ChordQuality::Major9 => &["Maj9", "M9", "Δ9", "ma9"],
            ChordQuality::Minor9 => &["min9", "-9"],
            ChordQuality::Minor11 => &["min11", "-11"],
            ChordQuality::Dominant13 => &[],
        }
    }

    /// Semitone offsets above the root, ascending
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Power => &[0, 7],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Sus2 => &[0, 2, 7],
            ChordQuality::Sus4 => &[0, 5, 7],
            ChordQuality::Add9 => &[0, 4, 7, 14],
            ChordQuality::Major6 => &[0, 4, 7, 9],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::MinorMajor7 => &[0, 3, 7, 11],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::Dominant7Flat5 => &[0, 4, 6, 10],
            ChordQuality::Dominant7Sharp5 => &[0, 4, 8, 10],
            ChordQuality::Dominant7Sus4 => &[0, 5, 7, 10],
            ChordQuality::Dominant7Flat9 => &[0, 4, 7, 10, 13],
            ChordQuality::Dominant9 => &[0, 4, 7, 10, 14],
            ChordQuality::Major9 => &[0, 4, 7, 11, 14],
            ChordQuality::Minor9 => &[0, 3, 7, 10, 14],
            ChordQuality::Minor11 => &[0, 3, 7, 10, 14, 17],
            ChordQuality::Dominant13 => &[0, 4, 7, 10, 14, 21],
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Power => "power chord",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Sus2 => "suspended 2nd",
            ChordQuality::Sus4 => "suspended 4th",
            ChordQuality::Add9 => "added 9th",
            ChordQuality::Major6 => "major 6th",
            ChordQuality::Minor6 => "minor 6th",
            ChordQuality::Dominant7 => "dominant 7th",
            ChordQuality::Major7 => "major 7th",
            ChordQuality::Minor7 => "minor 7th",
            ChordQuality::MinorMajor7 => "minor-major 7th",
            ChordQuality::HalfDiminished7 => "half-diminished 7th",
            ChordQuality::Diminished7 => "diminished 7th",
            ChordQuality::Dominant7Flat5 => "dominant 7th flat 5",
            ChordQuality::Dominant7Sharp5 => "dominant 7th sharp 5",
            ChordQuality::Dominant7Sus4 => "dominant 7th suspended 4th",
            ChordQuality::Dominant7Flat9 => "dominant 7th flat 9",
            ChordQuality::Dominant9 => "dominant 9th",
            ChordQuality::Major9 => "major 9th",
            ChordQuality::Minor9 => "minor 9th",
            ChordQuality::Minor11 => "minor 11th",
            ChordQuality::Dominant13 => "dominant 13th",
        }
    }

    /// Dominant-function qualities (major third plus minor seventh, or the
    /// fully diminished seventh that substitutes for one)
    pub fn is_dominant(self) -> bool {
        matches!(
            self,
            ChordQuality::Dominant7
                | ChordQuality::Dominant7Flat5
                | ChordQuality::Dominant7Sharp5
                | ChordQuality::Dominant7Sus4
                | ChordQuality::Dominant7Flat9
                | ChordQuality::Dominant9
                | ChordQuality::Dominant13
                | ChordQuality::Diminished7
        )
    }

    pub fn has_seventh(self) -> bool {
        self.intervals().iter().any(|&i| i == 10 || i == 11)
            || self == ChordQuality::Diminished7
    }

    /// Exact lookup of a normalised suffix
    pub fn from_suffix(suffix: &str) -> Option<ChordQuality> {
        suffix_table()
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|(_, q)| *q)
    }

    /// Longest table suffix that is a prefix of `suffix` (the empty major
    /// suffix is excluded). Returns the quality and the byte length matched.
    pub fn longest_prefix(suffix: &str) -> Option<(ChordQuality, usize)> {
        suffix_table()
            .iter()
            .filter(|(s, _)| !s.is_empty())
            .find(|(s, _)| suffix.starts_with(s))
            .map(|(s, q)| (*q, s.len()))
    }
}

/// Remove the characters that never carry meaning in a suffix and fold
/// typographic accidentals to ASCII
pub fn normalize_suffix(suffix: &str) -> String {
    suffix
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ' ' | ','))
        .map(|c| match c {
            '♯' => '#',
            '♭' => 'b',
            other => other,
        })
        .collect()
}

/// All accepted (normalised) suffixes, longest first so that prefix lookups
/// never stop at a shorter spelling ("m7b5" before "m7" before "m")
fn suffix_table() -> &'static [(&'static str, ChordQuality)] {
    static TABLE: OnceLock<Vec<(&'static str, ChordQuality)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table: Vec<(&'static str, ChordQuality)> = Vec::new();
        for quality in ChordQuality::ALL {
            // Canonical suffixes are stored normalised: "m(maj7)" -> "mmaj7"
            let canonical = quality.suffix();
            let canonical = match canonical {
                "m(maj7)" => "mmaj7",
                other => other,
            };
            if !table.iter().any(|(s, _)| *s == canonical) {
                table.push((canonical, quality));
            }
            for alias in quality.aliases() {
                if !table.iter().any(|(s, _)| s == alias) {
                    table.push((alias, quality));
                }
            }
        }
        // Stable sort keeps declaration order among equal lengths
        table.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        table
    })
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_canonical_suffix_resolves_to_itself() {
        for quality in ChordQuality::ALL {
            let normalized = normalize_suffix(quality.suffix());
            assert_eq!(
                ChordQuality::from_suffix(&normalized),
                Some(quality),
                "suffix {:?}",
                quality.suffix()
            );
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ChordQuality::from_suffix("min7"), Some(ChordQuality::Minor7));
        assert_eq!(ChordQuality::from_suffix("Δ7"), Some(ChordQuality::Major7));
        assert_eq!(ChordQuality::from_suffix("M7"), Some(ChordQuality::Major7));
        assert_eq!(ChordQuality::from_suffix("ø7"), Some(ChordQuality::HalfDiminished7));
        assert_eq!(ChordQuality::from_suffix("sus"), Some(ChordQuality::Sus4));
        assert_eq!(ChordQuality::from_suffix("7alt"), None);
    }

    #[test]
    fn test_case_sensitive_major_minor() {
        // "M7" is major, "m7" is minor
        assert_eq!(ChordQuality::from_suffix("M7"), Some(ChordQuality::Major7));
        assert_eq!(ChordQuality::from_suffix("m7"), Some(ChordQuality::Minor7));
    }

    #[test]
    fn test_capitalised_maj() {
        assert_eq!(ChordQuality::from_suffix("Maj7"), Some(ChordQuality::Major7));
        assert_eq!(ChordQuality::from_suffix("Maj9"), Some(ChordQuality::Major9));
        assert_eq!(ChordQuality::from_suffix("Maj6"), Some(ChordQuality::Major6));
        assert_eq!(ChordQuality::from_suffix("Maj"), Some(ChordQuality::Major));
    }

    #[test]
    fn test_longest_prefix() {
        assert_eq!(
            ChordQuality::longest_prefix("m7b5xyz"),
            Some((ChordQuality::HalfDiminished7, 4))
        );
        assert_eq!(
            ChordQuality::longest_prefix("7zz"),
            Some((ChordQuality::Dominant7, 1))
        );
        assert_eq!(ChordQuality::longest_prefix("qq"), None);
    }

    #[test]
    fn test_intervals_start_at_root() {
        for quality in ChordQuality::ALL {
            let intervals = quality.intervals();
            assert_eq!(intervals[0], 0);
            assert!(intervals.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_dominant_family() {
        assert!(ChordQuality::Dominant7.is_dominant());
        assert!(ChordQuality::Dominant13.is_dominant());
        assert!(!ChordQuality::Major7.is_dominant());
        assert!(!ChordQuality::Minor7.is_dominant());
    }
}
