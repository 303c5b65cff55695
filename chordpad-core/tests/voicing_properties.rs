#[cfg(test)]
mod tests {
    use chordpad_core::types::voice_leading::movement;
    use chordpad_core::{Chord, KeyRange, VoicingGenerator, VoicingMode};

    const SAMPLE: &[&str] = &[
        "C", "Cm7", "G7", "Fmaj7", "Bbmaj7", "Ebm7", "F#m7b5", "Adim7", "E7b9", "Dm9", "G13",
        "Caug", "Asus4", "Db7#5", "B6", "Abm(maj7)", "C5", "C13alt", "F#m11(b9)", "Gm11alt",
    ];

    fn chords() -> Vec<Chord> {
        SAMPLE.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn smooth_never_moves_more_than_root() {
        let generator = VoicingGenerator::default();
        let chords = chords();

        for from in &chords {
            for prev_mode in VoicingMode::ALL {
                let prev = generator.voice(from, prev_mode, None).voicing;
                for to in &chords {
                    let smooth = generator.voice(to, VoicingMode::Smooth, Some(&prev)).voicing;
                    let root = generator.voice(to, VoicingMode::Root, None).voicing;
                    let drop2 = generator.voice(to, VoicingMode::Drop2, None).voicing;

                    let smooth_cost = movement(&prev, &smooth);
                    assert!(
                        smooth_cost <= movement(&prev, &root),
                        "{} ({}) -> {}: smooth {} vs root {}",
                        from,
                        prev_mode,
                        to,
                        smooth,
                        root
                    );
                    assert!(smooth_cost <= movement(&prev, &drop2));
                }
            }
        }
    }

    #[test]
    fn smooth_finds_least_movement_between_extended_chords() {
        let generator = VoicingGenerator::default();
        let pairs = [("F#m11(b9)", "C13alt"), ("Gm11alt", "F#m11(b9)"), ("C13alt", "Gm11alt")];

        for (from, to) in pairs {
            let from: Chord = from.parse().unwrap();
            let to: Chord = to.parse().unwrap();
            for prev_mode in [VoicingMode::Root, VoicingMode::Drop2] {
                let prev = generator.voice(&from, prev_mode, None).voicing;
                let smooth = generator.voice(&to, VoicingMode::Smooth, Some(&prev)).voicing;
                let root = generator.voice(&to, VoicingMode::Root, None).voicing;
                assert!(
                    movement(&prev, &smooth) <= movement(&prev, &root),
                    "{} ({}) -> {}",
                    from,
                    prev_mode,
                    to
                );
            }
        }
    }

    #[test]
    fn voicings_are_sorted_distinct_and_in_range() {
        let range = KeyRange::new(40, 84).unwrap();
        let generator = VoicingGenerator::new(4, range);
        let chords = chords();

        let mut previous = None;
        for chord in &chords {
            for mode in VoicingMode::ALL {
                let voiced = generator.voice(chord, mode, previous.as_ref());
                let midi = voiced.voicing.midi_numbers();
                assert!(midi.windows(2).all(|w| w[0] < w[1]), "{} {}", chord, mode);
                assert!(midi.iter().all(|&m| range.contains(m)), "{} {}", chord, mode);
                previous = Some(voiced.voicing);
            }
        }
    }

    #[test]
    fn smooth_voicing_keeps_every_chord_tone() {
        let generator = VoicingGenerator::default();
        let prev = generator
            .voice(&"Cmaj7".parse().unwrap(), VoicingMode::Root, None)
            .voicing;

        for chord in chords() {
            let smooth = generator.voice(&chord, VoicingMode::Smooth, Some(&prev)).voicing;
            let mut voiced: Vec<u8> = smooth.notes().iter().map(|n| n.pitch_class()).collect();
            voiced.sort_unstable();
            voiced.dedup();
            let mut expected = chord.pitch_classes();
            expected.sort_unstable();
            assert_eq!(voiced, expected, "{}", chord);
        }
    }
}
