#[cfg(test)]
mod tests {
    use chordpad_core::{Progression, ProgressionDatabase};

    fn samples() -> Vec<Progression> {
        let db = ProgressionDatabase::builtin();
        vec![
            db.progression("Autumn Leaves", 0).unwrap().0,
            db.progression("Giant Steps", 0).unwrap().0,
            db.progression("ii-V-I Altered Dominant", 0).unwrap().0,
            Progression::from_symbols("sharps", &["F#m7", "B7", "Emaj7", "C#7(b9)"])
                .unwrap()
                .0,
        ]
    }

    #[test]
    fn transpose_by_zero_is_identity() {
        for p in samples() {
            assert_eq!(p.transpose(0), p);
            assert_eq!(p.transpose(0).symbols(), p.symbols());
        }
    }

    #[test]
    fn transpositions_compose_mod_12() {
        for p in samples() {
            for a in 0..12i8 {
                for b in 0..12i8 {
                    let stepwise = p.transpose(a).transpose(b);
                    let direct = p.transpose((a + b) % 12);
                    assert_eq!(stepwise, direct, "{} +{} +{}", p.name(), a, b);
                    assert_eq!(stepwise.symbols(), direct.symbols());
                    assert_eq!(stepwise.key(), direct.key());
                }
            }
        }
    }

    #[test]
    fn negative_transposition_inverts() {
        for p in samples() {
            for n in -11..=11i8 {
                assert_eq!(p.transpose(n).transpose(-n), p);
            }
        }
    }

    #[test]
    fn transposition_preserves_intervals() {
        for p in samples() {
            for n in 1..12i8 {
                let moved = p.transpose(n);
                for (a, b) in p.chords().iter().zip(moved.chords().iter()) {
                    assert_eq!(a.quality(), b.quality());
                    assert_eq!(a.intervals(), b.intervals());
                    assert_eq!(
                        b.root().pitch_class(),
                        ((a.root().pitch_class() as i8 + n).rem_euclid(12)) as u8
                    );
                }
            }
        }
    }
}
