//! ASCII piano keyboard
//!
//! Each white key takes two columns: a `|` separator and the key itself.
//! Black keys sit above the separator between their neighbours.
//!
//! ```text
//!   # #   # # #
//! |*| |*| |*| |
//!  C4
//! ```

use chordpad_core::types::note::{KeyRange, Note};
use chordpad_core::{Voicing, VoicingMode};
use colored::*;

const PRESSED: char = '*';
const BLACK: char = '#';

/// A window of the keyboard, both ends inclusive MIDI numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardView {
    low: i16,
    high: i16,
}

fn is_black(midi: i16) -> bool {
    !Note::is_natural_pitch_class(midi.rem_euclid(12) as u8)
}

impl KeyboardView {
    /// Every key of the range
    pub fn full(range: KeyRange) -> Self {
        Self::new(range.low as i16, range.high as i16)
    }

    /// Whole octaves around the voicing, cut to the range
    pub fn around(voicing: &Voicing, range: KeyRange) -> Self {
        let (lowest, highest) = match (voicing.lowest(), voicing.highest()) {
            (Some(lo), Some(hi)) => (lo.midi(), hi.midi()),
            _ => (60, 71),
        };
        let low = lowest - lowest.rem_euclid(12);
        let high = highest - highest.rem_euclid(12) + 11;
        Self::new(low.max(range.low as i16), high.min(range.high as i16))
    }

    fn new(low: i16, high: i16) -> Self {
        // Start and end on white keys so every black key has neighbours
        let low = if is_black(low) { low - 1 } else { low };
        let high = if is_black(high) { high + 1 } else { high };
        KeyboardView { low, high }
    }

    fn white_keys(&self) -> Vec<i16> {
        (self.low..=self.high).filter(|&m| !is_black(m)).collect()
    }

    /// Black-key row, white-key row and octave labels, without colour
    pub fn lines(&self, pressed: &[i16]) -> [String; 3] {
        let whites = self.white_keys();
        let mut black_row = String::from(" ");
        let mut white_row = String::new();
        let mut label_row = String::new();

        for (i, &white) in whites.iter().enumerate() {
            white_row.push('|');
            white_row.push(if pressed.contains(&white) { PRESSED } else { ' ' });

            black_row.push(' ');
            let black = white + 1;
            let has_black = i + 1 < whites.len() && is_black(black);
            black_row.push(match (has_black, pressed.contains(&black)) {
                (true, true) => PRESSED,
                (true, false) => BLACK,
                (false, _) => ' ',
            });

            if white.rem_euclid(12) == 0 {
                while label_row.len() < 2 * i + 1 {
                    label_row.push(' ');
                }
                label_row.push_str(&format!("C{}", white.div_euclid(12) - 1));
            }
        }
        white_row.push('|');

        [
            black_row.trim_end().to_string(),
            white_row,
            label_row.trim_end().to_string(),
        ]
    }
}

/// Highlight colour for a voicing mode
pub fn mode_color(mode: VoicingMode) -> Color {
    match mode {
        VoicingMode::Root => Color::Red,
        VoicingMode::Smooth => Color::Cyan,
        VoicingMode::Drop2 => Color::Blue,
    }
}

/// Render the keys around a voicing, pressed keys coloured by mode
pub fn render(voicing: &Voicing, range: KeyRange, mode: VoicingMode) -> String {
    let view = KeyboardView::around(voicing, range);
    let pressed = voicing.midi_numbers();
    let color = mode_color(mode);

    view.lines(&pressed)
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| match c {
                    PRESSED => c.to_string().color(color).bold().to_string(),
                    BLACK => c.to_string().dimmed().to_string(),
                    _ => c.to_string(),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
