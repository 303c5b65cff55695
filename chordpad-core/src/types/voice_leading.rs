//! Voice leading between voicings
//!
//! Matches the voices of one voicing to the voices of the next so that the
//! total semitone movement is minimal. The same search drives the smooth
//! voicing strategy.

use crate::types::note::Note;
use crate::types::voicing::Voicing;
use std::fmt;

/// Voice movement summary between two voicings
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceLeading {
    pub common_tones: Vec<Note>,
    pub movements: Vec<VoiceMovement>,
    pub total_movement: u32,
}

/// Tracks movement of a single voice from one voicing to the next
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceMovement {
    pub from_note: Note,
    pub to_note: Note,
    pub semitones: i16,
    pub voice_index: usize, // index into the earlier voicing, 0 = lowest
}

impl VoiceLeading {
    /// Pair the voices of `from` with those of `to` at least total movement
    pub fn between(from: &Voicing, to: &Voicing) -> Self {
        let from_notes = from.notes();
        let to_notes = to.notes();

        let to_pitch_classes: Vec<u8> = to_notes.iter().map(|n| n.pitch_class()).collect();
        let common_tones: Vec<Note> = from_notes
            .iter()
            .filter(|note| to_pitch_classes.contains(&note.pitch_class()))
            .copied()
            .collect();

        let pairs = best_assignment(from_notes.len(), to_notes.len(), |i, j| {
            (to_notes[j].midi() - from_notes[i].midi()).unsigned_abs() as u32
        });

        let mut movements: Vec<VoiceMovement> = pairs
            .into_iter()
            .map(|(i, j)| VoiceMovement {
                from_note: from_notes[i],
                to_note: to_notes[j],
                semitones: to_notes[j].midi() - from_notes[i].midi(),
                voice_index: i,
            })
            .collect();
        movements.sort_by_key(|m| m.voice_index);

        let total_movement = movements
            .iter()
            .map(|m| m.semitones.unsigned_abs() as u32)
            .sum();

        VoiceLeading {
            common_tones,
            movements,
            total_movement,
        }
    }

    /// Every voice moves by a step or less
    pub fn is_smooth(&self) -> bool {
        self.movements.iter().all(|m| m.semitones.abs() <= 2)
    }

    /// Voices that leap more than a fourth
    pub fn leaps(&self) -> impl Iterator<Item = &VoiceMovement> {
        self.movements.iter().filter(|m| m.semitones.abs() > 5)
    }
}

/// Minimal total absolute semitone movement between two voicings over
/// injective voice matchings of size min(|from|, |to|)
pub fn movement(from: &Voicing, to: &Voicing) -> u32 {
    VoiceLeading::between(from, to).total_movement
}

/// Find the injective pairing of `rows` with `cols` (of size min(rows,
/// cols)) with least total cost. Among pairings of equal cost, the one
/// whose partners, read along the smaller side, come first in
/// lexicographic order wins.
pub fn best_assignment(
    rows: usize,
    cols: usize,
    cost: impl Fn(usize, usize) -> u32,
) -> Vec<(usize, usize)> {
    if rows <= cols {
        assign(rows, cols, &cost).into_iter().enumerate().collect()
    } else {
        let mut pairs: Vec<(usize, usize)> = assign(cols, rows, &|c, r| cost(r, c))
            .into_iter()
            .enumerate()
            .map(|(c, r)| (r, c))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Partner in `0..large` for each of `0..small` (small <= large).
///
/// Dynamic programming over the subsets of the larger side: item `i` is
/// placed once `i` partners are taken, so the set of taken partners is the
/// whole state. Voicings hold at most a chord's tones, which keeps the
/// table small.
fn assign(small: usize, large: usize, cost: &dyn Fn(usize, usize) -> u32) -> Vec<usize> {
    if small == 0 {
        return Vec::new();
    }

    // rest[taken]: least cost of placing the remaining items
    let states = 1usize << large;
    let mut rest = vec![u32::MAX; states];
    for taken in (0..states).rev() {
        let placed = taken.count_ones() as usize;
        if placed > small {
            continue;
        }
        if placed == small {
            rest[taken] = 0;
            continue;
        }
        rest[taken] = (0..large)
            .filter(|&c| taken & (1 << c) == 0)
            .map(|c| cost(placed, c).saturating_add(rest[taken | (1 << c)]))
            .min()
            .unwrap_or(u32::MAX);
    }

    // Walk forward, taking the lowest partner that stays optimal
    let mut taken = 0usize;
    let mut partners = Vec::with_capacity(small);
    for item in 0..small {
        let target = rest[taken];
        let next = (0..large).find(|&c| {
            taken & (1 << c) == 0
                && cost(item, c).saturating_add(rest[taken | (1 << c)]) == target
        });
        match next {
            Some(c) => {
                partners.push(c);
                taken |= 1 << c;
            }
            None => break,
        }
    }
    partners
}

impl fmt::Display for VoiceLeading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.common_tones.is_empty() {
            let common: Vec<String> = self.common_tones.iter().map(|n| n.to_string()).collect();
            write!(f, "Common: [{}] ", common.join(", "))?;
        } else {
            write!(f, "No common tones ")?;
        }

        let moves: Vec<String> = self
            .movements
            .iter()
            .map(|m| match m.semitones {
                0 => format!("{}={}", m.from_note, m.to_note),
                s if s > 0 => format!("{}→{}(+{})", m.from_note, m.to_note, s),
                s => format!("{}→{}({})", m.from_note, m.to_note, s),
            })
            .collect();
        write!(
            f,
            "Movements: {} [Total: {}]",
            moves.join(", "),
            self.total_movement
        )
    }
}
