use crate::diagnostic::{ClampKind, RangeClamp};
use crate::types::chord::Chord;
use crate::types::note::{KeyRange, Note};
use crate::types::voice_leading::best_assignment;
use anyhow::{anyhow, Result};
use std::fmt;
use std::str::FromStr;

/// Strategy for laying chord tones out on the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum VoicingMode {
    /// Stacked upward from the root
    #[default]
    Root,
    /// Least movement from the previous voicing
    Smooth,
    /// Root stacking with the second-highest note dropped an octave
    Drop2,
}

impl VoicingMode {
    pub const ALL: [VoicingMode; 3] = [VoicingMode::Root, VoicingMode::Smooth, VoicingMode::Drop2];

    pub fn name(self) -> &'static str {
        match self {
            VoicingMode::Root => "root",
            VoicingMode::Smooth => "smooth",
            VoicingMode::Drop2 => "drop2",
        }
    }
}

impl FromStr for VoicingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "root" | "root-position" => Ok(VoicingMode::Root),
            "smooth" | "smooth-voice-leading" => Ok(VoicingMode::Smooth),
            "drop2" | "drop-2" => Ok(VoicingMode::Drop2),
            other => Err(anyhow!(
                "Unknown voicing '{}' (expected root, smooth or drop2)",
                other
            )),
        }
    }
}

impl fmt::Display for VoicingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Absolute notes of a chord, ordered low to high
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Voicing {
    notes: Vec<Note>,
}

impl Voicing {
    /// Build a voicing, sorting the notes by pitch
    pub fn from_notes(mut notes: Vec<Note>) -> Self {
        notes.sort_by_key(|n| n.midi());
        Voicing { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn midi_numbers(&self) -> Vec<i16> {
        self.notes.iter().map(|n| n.midi()).collect()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn lowest(&self) -> Option<Note> {
        self.notes.first().copied()
    }

    pub fn highest(&self) -> Option<Note> {
        self.notes.last().copied()
    }

    /// Mean MIDI pitch
    pub fn centre(&self) -> Option<f64> {
        if self.notes.is_empty() {
            return None;
        }
        let sum: i32 = self.notes.iter().map(|n| n.midi() as i32).sum();
        Some(sum as f64 / self.notes.len() as f64)
    }

    pub fn contains_midi(&self, midi: i16) -> bool {
        self.notes.iter().any(|n| n.midi() == midi)
    }
}

impl fmt::Display for Voicing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.notes.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", names.join(" "))
    }
}

/// A voicing plus any range corrections made while building it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voiced {
    pub voicing: Voicing,
    pub clamps: Vec<RangeClamp>,
}

/// Turns chords into voicings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoicingGenerator {
    base_octave: i8,
    range: KeyRange,
}

impl Default for VoicingGenerator {
    fn default() -> Self {
        VoicingGenerator {
            base_octave: 4,
            range: KeyRange::piano(),
        }
    }
}

impl VoicingGenerator {
    pub fn new(base_octave: i8, range: KeyRange) -> Self {
        VoicingGenerator { base_octave, range }
    }

    pub fn base_octave(&self) -> i8 {
        self.base_octave
    }

    pub fn range(&self) -> KeyRange {
        self.range
    }

    /// Voice `chord` with `mode`. Smooth mode uses `previous` and behaves
    /// like root mode without it. Chords with fewer than three distinct
    /// tones always get a root voicing with the root doubled an octave up.
    pub fn voice(&self, chord: &Chord, mode: VoicingMode, previous: Option<&Voicing>) -> Voiced {
        if chord.intervals().len() < 3 {
            return self.doubled_root(chord);
        }

        match (mode, previous) {
            (VoicingMode::Root, _) => self.root_position(chord),
            (VoicingMode::Drop2, _) => self.drop2(chord),
            (VoicingMode::Smooth, Some(prev)) if !prev.is_empty() => self.smooth(chord, prev),
            (VoicingMode::Smooth, _) => self.root_position(chord),
        }
    }

    /// Voicings of every mode, for side-by-side comparison
    pub fn compare(&self, chord: &Chord, previous: Option<&Voicing>) -> Vec<(VoicingMode, Voiced)> {
        VoicingMode::ALL
            .iter()
            .map(|&mode| (mode, self.voice(chord, mode, previous)))
            .collect()
    }

    fn root_midi(&self, chord: &Chord) -> i16 {
        (self.base_octave as i16 + 1) * 12 + chord.root().pitch_class() as i16
    }

    /// Bring `midi` inside the range: one octave wrap, then a clamp
    fn place(&self, midi: i16, clamps: &mut Vec<RangeClamp>) -> i16 {
        if self.range.contains(midi) {
            return midi;
        }

        let wrapped = if midi > self.range.high as i16 {
            midi - 12
        } else {
            midi + 12
        };
        if self.range.contains(wrapped) {
            clamps.push(RangeClamp {
                pitch: midi,
                clamped_to: wrapped,
                kind: ClampKind::Wrapped,
            });
            return wrapped;
        }

        let clamped = self.range.clamp(midi);
        clamps.push(RangeClamp {
            pitch: midi,
            clamped_to: clamped,
            kind: ClampKind::Clamped,
        });
        clamped
    }

    fn build(&self, chord: &Chord, placed: Vec<(i16, u8)>, clamps: Vec<RangeClamp>) -> Voiced {
        let mut placed = placed;
        placed.sort_by_key(|&(midi, _)| midi);
        placed.dedup_by_key(|&mut (midi, _)| midi);

        let notes = placed
            .into_iter()
            .map(|(midi, interval)| Note::from_midi(midi, chord.spelling_for(interval)))
            .collect();
        Voiced {
            voicing: Voicing::from_notes(notes),
            clamps,
        }
    }

    fn root_placements(&self, chord: &Chord, clamps: &mut Vec<RangeClamp>) -> Vec<(i16, u8)> {
        let root = self.root_midi(chord);
        chord
            .intervals()
            .into_iter()
            .map(|interval| (self.place(root + interval as i16, clamps), interval))
            .collect()
    }

    fn root_position(&self, chord: &Chord) -> Voiced {
        let mut clamps = Vec::new();
        let placed = self.root_placements(chord, &mut clamps);
        self.build(chord, placed, clamps)
    }

    fn doubled_root(&self, chord: &Chord) -> Voiced {
        let mut clamps = Vec::new();
        let mut placed = self.root_placements(chord, &mut clamps);

        let root = placed.first().map(|&(midi, _)| midi).unwrap_or_else(|| self.root_midi(chord));
        let upper = if self.range.contains(root + 12) {
            root + 12
        } else {
            root - 12
        };
        if self.range.contains(upper) {
            placed.push((upper, 0));
        }
        self.build(chord, placed, clamps)
    }

    /// Root stacking with the second-highest note an octave down. Triads
    /// stay in root position.
    fn drop2(&self, chord: &Chord) -> Voiced {
        let mut clamps = Vec::new();
        let mut placed = self.root_placements(chord, &mut clamps);
        placed.sort_by_key(|&(midi, _)| midi);

        if placed.len() >= 4 {
            let idx = placed.len() - 2;
            let dropped = placed[idx].0 - 12;
            if self.range.contains(dropped) {
                placed[idx].0 = dropped;
            } else {
                clamps.push(RangeClamp {
                    pitch: dropped,
                    clamped_to: placed[idx].0,
                    kind: ClampKind::DropSkipped,
                });
            }
        }
        self.build(chord, placed, clamps)
    }

    fn smooth(&self, chord: &Chord, previous: &Voicing) -> Voiced {
        let intervals = chord.intervals();
        let root_pc = chord.root().pitch_class();
        let prev = previous.midi_numbers();

        // In-range positions of each tone, ascending
        let placements: Vec<Vec<i16>> = intervals
            .iter()
            .map(|&interval| self.range.placements((root_pc + interval) % 12))
            .collect();

        // nearest[t][p]: closest placement of tone t to previous voice p,
        // the lower one on ties
        let nearest: Vec<Vec<(i16, u32)>> = placements
            .iter()
            .map(|positions| {
                prev.iter()
                    .map(|&voice| {
                        let mut best = (positions[0], u32::MAX);
                        for &pos in positions {
                            let distance = (pos - voice).unsigned_abs() as u32;
                            if distance < best.1 {
                                best = (pos, distance);
                            }
                        }
                        best
                    })
                    .collect()
            })
            .collect();

        let pairs = best_assignment(intervals.len(), prev.len(), |t, p| nearest[t][p].1);

        let mut chosen: Vec<Option<i16>> = vec![None; intervals.len()];
        for (t, p) in pairs {
            chosen[t] = Some(nearest[t][p].0);
        }

        let centre = previous.centre().unwrap_or(self.root_midi(chord) as f64);
        let placed = chosen
            .into_iter()
            .zip(intervals.iter())
            .enumerate()
            .map(|(t, (position, &interval))| {
                let midi = position.unwrap_or_else(|| nearest_to(&placements[t], centre));
                (midi, interval)
            })
            .collect();

        self.build(chord, placed, Vec::new())
    }
}

/// Placement nearest `centre`, the lower one on ties
fn nearest_to(positions: &[i16], centre: f64) -> i16 {
    let mut best = positions[0];
    for &pos in positions {
        if (pos as f64 - centre).abs() < (best as f64 - centre).abs() {
            best = pos;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::voice_leading::movement;

    fn chord(symbol: &str) -> Chord {
        symbol.parse().unwrap()
    }

    fn render(voiced: &Voiced) -> String {
        voiced.voicing.to_string()
    }

    #[test]
    fn test_root_voicing() {
        let generator = VoicingGenerator::default();
        let voiced = generator.voice(&chord("Cmaj7"), VoicingMode::Root, None);
        assert_eq!(render(&voiced), "C4 E4 G4 B4");
        assert_eq!(voiced.voicing.midi_numbers(), vec![60, 64, 67, 71]);
        assert!(voiced.clamps.is_empty());
    }

    #[test]
    fn test_drop2_voicing() {
        let generator = VoicingGenerator::default();
        let voiced = generator.voice(&chord("Cmaj7"), VoicingMode::Drop2, None);
        assert_eq!(render(&voiced), "G3 C4 E4 B4");
    }

    #[test]
    fn test_drop2_leaves_triads_in_root_position() {
        let generator = VoicingGenerator::default();
        for symbol in ["C", "Fm", "Bdim"] {
            let drop2 = generator.voice(&chord(symbol), VoicingMode::Drop2, None);
            let root = generator.voice(&chord(symbol), VoicingMode::Root, None);
            assert_eq!(drop2, root, "{}", symbol);
        }
        let voiced = generator.voice(&chord("C"), VoicingMode::Drop2, None);
        assert_eq!(render(&voiced), "C4 E4 G4");
    }

    #[test]
    fn test_power_chord_doubles_root() {
        let generator = VoicingGenerator::default();
        for mode in VoicingMode::ALL {
            let voiced = generator.voice(&chord("C5"), mode, None);
            assert_eq!(render(&voiced), "C4 G4 C5");
        }
    }

    #[test]
    fn test_smooth_without_previous_is_root() {
        let generator = VoicingGenerator::default();
        let smooth = generator.voice(&chord("Dm7"), VoicingMode::Smooth, None);
        let root = generator.voice(&chord("Dm7"), VoicingMode::Root, None);
        assert_eq!(smooth, root);
    }

    #[test]
    fn test_smooth_follows_previous() {
        let generator = VoicingGenerator::default();
        let dm7 = generator.voice(&chord("Dm7"), VoicingMode::Root, None).voicing;
        let g7 = generator.voice(&chord("G7"), VoicingMode::Smooth, Some(&dm7));
        // D4 F4 A4 C5 -> D4 F4 G4 B4
        assert_eq!(render(&g7), "D4 F4 G4 B4");
        assert_eq!(movement(&dm7, &g7.voicing), 3);
    }

    #[test]
    fn test_wrap_above_range() {
        let generator = VoicingGenerator::new(4, KeyRange::new(48, 72).unwrap());
        let voiced = generator.voice(&chord("B7"), VoicingMode::Root, None);
        // B4 D#5 F#5 A5 -> D#5, F#5 and A5 wrap down an octave
        assert_eq!(voiced.voicing.midi_numbers(), vec![63, 66, 69, 71]);
        assert_eq!(voiced.clamps.len(), 3);
        assert!(voiced.clamps.iter().all(|c| c.kind == ClampKind::Wrapped));
    }

    #[test]
    fn test_notes_stay_inside_range() {
        let range = KeyRange::new(55, 80).unwrap();
        let generator = VoicingGenerator::new(5, range);
        for symbol in ["C13", "Bmaj9", "G7alt", "F#m11"] {
            for mode in VoicingMode::ALL {
                let voiced = generator.voice(&chord(symbol), mode, None);
                assert!(voiced
                    .voicing
                    .midi_numbers()
                    .iter()
                    .all(|&m| range.contains(m)));
            }
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("drop-2".parse::<VoicingMode>().unwrap(), VoicingMode::Drop2);
        assert_eq!("Smooth".parse::<VoicingMode>().unwrap(), VoicingMode::Smooth);
        assert!("spread".parse::<VoicingMode>().is_err());
    }

    #[test]
    fn test_compare_lists_every_mode() {
        let generator = VoicingGenerator::default();
        let results = generator.compare(&chord("Cmaj7"), None);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].0, VoicingMode::Drop2);
    }
}
