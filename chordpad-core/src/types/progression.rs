use crate::diagnostic::FallbackApplied;
use crate::parser::chord_parser::parse_chord;
use crate::parser::error::ChordError;
use crate::types::analysis::Key;
use crate::types::chord::Chord;
use crate::types::note::Note;
use crate::types::voice_leading::VoiceLeading;
use crate::types::voicing::{Voiced, Voicing, VoicingGenerator, VoicingMode};
use std::fmt;
use std::ops::{Add, Sub};

/// A named chord sequence stored as a template plus a transposition offset.
/// Transposing only moves the offset, so it never accumulates spelling drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    name: String,
    template: Vec<Chord>,
    offset: u8, // 0-11 semitones above the template
    key: Option<Key>,
}

impl Progression {
    pub fn new(name: impl Into<String>, chords: Vec<Chord>) -> Self {
        Progression {
            name: name.into(),
            template: chords,
            offset: 0,
            key: None,
        }
    }

    /// Parse each symbol, collecting any fallbacks that were applied
    pub fn from_symbols<S: AsRef<str>>(
        name: impl Into<String>,
        symbols: &[S],
    ) -> Result<(Self, Vec<FallbackApplied>), ChordError> {
        let mut chords = Vec::with_capacity(symbols.len());
        let mut fallbacks = Vec::new();

        for symbol in symbols {
            let parsed = parse_chord(symbol.as_ref())?;
            chords.push(parsed.chord);
            fallbacks.extend(parsed.fallback);
        }

        Ok((Self::new(name, chords), fallbacks))
    }

    /// Attach the key the template is written in
    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key.transposed(-(self.offset as i8)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.template.len()
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    /// The untransposed chords
    pub fn template(&self) -> &[Chord] {
        &self.template
    }

    /// Chords at the current transposition
    pub fn chords(&self) -> Vec<Chord> {
        self.template
            .iter()
            .map(|chord| self.shift(chord))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<Chord> {
        self.template.get(index).map(|chord| self.shift(chord))
    }

    /// Key at the current transposition
    pub fn key(&self) -> Option<Key> {
        self.key.map(|key| key.transposed(self.offset as i8))
    }

    fn shift(&self, chord: &Chord) -> Chord {
        if self.offset == 0 {
            chord.clone()
        } else {
            chord.transposed(self.offset as i8)
        }
    }

    /// Move the whole progression by `semitones`; the result depends only
    /// on the total offset mod 12
    pub fn transpose(&self, semitones: i8) -> Self {
        let offset = (self.offset as i16 + semitones as i16).rem_euclid(12) as u8;
        Progression {
            offset,
            ..self.clone()
        }
    }

    /// Transpose so the progression sits in `target`, if its key is known
    pub fn transpose_to(&self, target: Note) -> Option<Self> {
        let current = self.key()?;
        let distance = transposition_distance(current.tonic(), target);
        Some(self.transpose(distance as i8))
    }

    /// Every other transposition, +1 through +11 semitones
    pub fn all_transpositions(&self) -> Vec<Self> {
        (1..12).map(|n| self.transpose(n)).collect()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.chords().iter().map(|c| c.symbol()).collect()
    }

    /// Voice every chord, feeding each voicing into the next for smooth mode
    pub fn voicings(&self, generator: &VoicingGenerator, mode: VoicingMode) -> Vec<Voiced> {
        let mut previous: Option<Voicing> = None;
        let mut result = Vec::with_capacity(self.len());

        for chord in self.chords() {
            let voiced = generator.voice(&chord, mode, previous.as_ref());
            previous = Some(voiced.voicing.clone());
            result.push(voiced);
        }
        result
    }

    /// Voice leading between consecutive voicings
    pub fn voice_leading(&self, generator: &VoicingGenerator, mode: VoicingMode) -> Vec<VoiceLeading> {
        self.voicings(generator, mode)
            .windows(2)
            .map(|pair| VoiceLeading::between(&pair[0].voicing, &pair[1].voicing))
            .collect()
    }

    /// Total semitone movement across the progression in `mode`
    pub fn total_movement(&self, generator: &VoicingGenerator, mode: VoicingMode) -> u32 {
        self.voice_leading(generator, mode)
            .iter()
            .map(|vl| vl.total_movement)
            .sum()
    }
}

/// Semitones upward from `from` to `to` (0-11)
pub fn transposition_distance(from: Note, to: Note) -> u8 {
    to - from
}

/// Name of an interval of `semitones` (mod 12)
pub fn interval_name(semitones: i8) -> &'static str {
    match semitones.rem_euclid(12) {
        0 => "unison",
        1 => "minor 2nd",
        2 => "major 2nd",
        3 => "minor 3rd",
        4 => "major 3rd",
        5 => "perfect 4th",
        6 => "tritone",
        7 => "perfect 5th",
        8 => "minor 6th",
        9 => "major 6th",
        10 => "minor 7th",
        _ => "major 7th",
    }
}

impl Add<i8> for Progression {
    type Output = Progression;

    fn add(self, semitones: i8) -> Self::Output {
        self.transpose(semitones)
    }
}

impl Sub<i8> for Progression {
    type Output = Progression;

    fn sub(self, semitones: i8) -> Self::Output {
        self.transpose(-semitones)
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.symbols().join(" | "))?;
        if let Some(key) = self.key() {
            write!(f, " (key {})", key)?;
        }
        Ok(())
    }
}
