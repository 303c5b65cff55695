//! Songs shipped with the program

use super::{ProgressionEntry, Song};

struct BuiltinSong {
    title: &'static str,
    key: &'static str,
    composer: Option<&'static str>,
    year: Option<u16>,
    difficulty: &'static str,
    genre: &'static str,
    progressions: &'static [(&'static [&'static str], &'static str)],
}

const STANDARD: &str = "jazz-standards";
const EXERCISE: &str = "jazz-progressions";
const BLUES: &str = "blues";

const SONGS: &[BuiltinSong] = &[
    BuiltinSong {
        title: "Fly Me to the Moon",
        key: "C",
        composer: Some("Bart Howard"),
        year: Some(1954),
        difficulty: "Easy-Medium",
        genre: STANDARD,
        progressions: &[
            (&["Am7", "Dm7", "G7", "Cmaj7"], "vi-ii-V-I main progression"),
            (&["Fmaj7", "Bm7b5", "E7", "Am7"], "IV-viiø-III7-vi, moving to vi"),
        ],
    },
    BuiltinSong {
        title: "Autumn Leaves",
        key: "Gm",
        composer: Some("Joseph Kosma"),
        year: Some(1945),
        difficulty: "Easy-Medium",
        genre: STANDARD,
        progressions: &[
            (&["Cm7", "F7", "Bbmaj7", "Ebmaj7"], "ii-V-I-IV in the relative major, Bb"),
            (&["Am7b5", "D7", "Gm"], "iiø-V-i in G minor"),
        ],
    },
    BuiltinSong {
        title: "All The Things You Are",
        key: "Ab",
        composer: Some("Jerome Kern"),
        year: Some(1939),
        difficulty: "Medium-Advanced",
        genre: STANDARD,
        progressions: &[
            (&["Fm7", "Bbm7", "Eb7", "Abmaj7"], "vi-ii-V-I in Ab major"),
            (&["Dbmaj7", "G7", "Cmaj7"], "IV-VII7-III, modulating to C major"),
            (&["Am7", "D7", "Gmaj7"], "ii-V-I in G major (bridge)"),
        ],
    },
    BuiltinSong {
        title: "Blue Bossa",
        key: "Cm",
        composer: Some("Kenny Dorham"),
        year: Some(1963),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Cm7", "Fm7", "Dm7b5", "G7", "Cm7"], "i-iv-iiø-V-i in C minor"),
            (&["Ebm7", "Ab7", "Dbmaj7"], "ii-V-I in Db major"),
        ],
    },
    BuiltinSong {
        title: "Giant Steps",
        key: "B",
        composer: Some("John Coltrane"),
        year: Some(1959),
        difficulty: "Very Advanced",
        genre: STANDARD,
        progressions: &[
            (
                &["Bmaj7", "D7", "Gmaj7", "Bb7", "Ebmaj7"],
                "Coltrane changes, major-third key centres",
            ),
            (&["Am7", "D7", "Gmaj7"], "ii-V-I in G major"),
            (&["C#m7", "F#7", "Bmaj7"], "ii-V-I in B major"),
        ],
    },
    BuiltinSong {
        title: "Take The A Train",
        key: "C",
        composer: Some("Billy Strayhorn"),
        year: Some(1939),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Cmaj7", "Cmaj7", "D7", "D7"], "opening with the II7 lift"),
            (&["Dm7", "G7", "Cmaj7", "A7"], "ii-V-I-VI7 turnaround"),
        ],
    },
    BuiltinSong {
        title: "Satin Doll",
        key: "C",
        composer: Some("Duke Ellington"),
        year: Some(1953),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Dm7", "G7", "Dm7", "G7"], "repeated ii-V"),
            (&["Em7", "A7", "Dm7", "G7"], "iii-VI7-ii-V extension"),
        ],
    },
    BuiltinSong {
        title: "Stella by Starlight",
        key: "Bb",
        composer: Some("Victor Young"),
        year: Some(1944),
        difficulty: "Medium-Advanced",
        genre: STANDARD,
        progressions: &[
            (&["Em7b5", "A7b9", "Cm7", "F7"], "unresolved iiø-V leading to ii-V"),
            (&["Bbmaj7", "Bdim7", "Cm7", "F7"], "I-#io7-ii-V turnaround"),
            (&["Dm7", "G7", "Cm7", "F7"], "ii-V-ii-V cycle"),
        ],
    },
    BuiltinSong {
        title: "My Funny Valentine",
        key: "Cm",
        composer: Some("Richard Rodgers"),
        year: Some(1937),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Cm", "Cm(maj7)", "Cm7", "Cm6"], "descending line inside the i chord"),
            (&["Abmaj7", "Fm7", "Dm7b5", "G7"], "VI-iv-iiø-V"),
            (&["Cm", "Eb7", "Abmaj7", "D7b9"], "i-III7-VI-II7 turnaround"),
        ],
    },
    BuiltinSong {
        title: "Summertime",
        key: "Am",
        composer: Some("George Gershwin"),
        year: Some(1935),
        difficulty: "Easy",
        genre: STANDARD,
        progressions: &[
            (&["Am", "E7", "Am", "E7"], "basic i-V-i"),
            (&["Dm7", "G7", "C", "F"], "iv-VII7-III-VI in the relative major"),
            (&["Am", "Dm", "Am", "E7"], "i-iv-i-V cycle"),
        ],
    },
    BuiltinSong {
        title: "Body and Soul",
        key: "Db",
        composer: Some("Johnny Green"),
        year: Some(1930),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Ebmaj7", "Ab7", "Dbmaj7", "Dbmaj7"], "ii-V-I in Db major"),
            (&["Ebm7", "Ab7", "Dbmaj7", "B7"], "ii-V-I with turnaround to the bridge"),
            (&["Bbm7", "Eb7", "Abmaj7", "G7"], "bridge: ii-V-I in Ab, then V/ii"),
        ],
    },
    BuiltinSong {
        title: "Night and Day",
        key: "Eb",
        composer: Some("Cole Porter"),
        year: Some(1932),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Eb", "Fm7", "Bb7", "Eb"], "I-ii-V-I"),
            (&["Gbm7b5", "Fm7", "Em7", "Ebm7"], "chromatically descending minor sevenths"),
            (&["Dm7", "G7", "Cm7", "F7"], "bridge: ii-V-ii-V in Bb"),
        ],
    },
    BuiltinSong {
        title: "Georgia On My Mind",
        key: "F",
        composer: Some("Hoagy Carmichael"),
        year: Some(1930),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["F", "Am7", "Dm7", "G7", "C7", "F"], "main progression through vi-ii-V-I"),
            (&["Bbmaj7", "Bdim7", "C7", "F"], "IV-#iio7-V-I turnaround"),
        ],
    },
    BuiltinSong {
        title: "Looking Up",
        key: "C",
        composer: Some("Michel Petrucciani"),
        year: Some(1980),
        difficulty: "Medium-Advanced",
        genre: STANDARD,
        progressions: &[
            (&["Cmaj7", "Em7", "A7", "Dm7", "G7"], "ii-V-I and modulating motion"),
            (&["Fmaj7", "Fm7", "Cmaj7"], "modulating bridge"),
        ],
    },
    BuiltinSong {
        title: "Brazilian Like",
        key: "D",
        composer: Some("Michel Petrucciani"),
        year: Some(1982),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Dmaj7", "G7", "Cmaj7", "F#7"], "bossa nova movement"),
            (&["Bm7", "E7", "Amaj7"], "ii-V-I in A major"),
        ],
    },
    BuiltinSong {
        title: "Little Peace in C For You",
        key: "C",
        composer: Some("Michel Petrucciani"),
        year: Some(1985),
        difficulty: "Medium",
        genre: STANDARD,
        progressions: &[
            (&["Cmaj7", "Am7", "Dm7", "G7", "Cmaj7"], "I-vi-ii-V-I loop"),
            (&["Fmaj7", "Em7", "A7", "Dm7"], "sequence with chromatic connections"),
        ],
    },
    BuiltinSong {
        title: "ii-V-I Major Basic",
        key: "C",
        composer: None,
        year: None,
        difficulty: "Easy",
        genre: EXERCISE,
        progressions: &[(&["Dm7", "G7", "Cmaj7"], "basic ii-V-I in C major")],
    },
    BuiltinSong {
        title: "ii-V-i Minor Basic",
        key: "Cm",
        composer: None,
        year: None,
        difficulty: "Easy",
        genre: EXERCISE,
        progressions: &[(&["Dm7b5", "G7", "Cm7"], "basic iiø-V-i in C minor")],
    },
    BuiltinSong {
        title: "ii-V-I Major Extended",
        key: "C",
        composer: None,
        year: None,
        difficulty: "Medium",
        genre: EXERCISE,
        progressions: &[(&["Dm9", "G13", "Cmaj9"], "ii-V-I with added colour tones")],
    },
    BuiltinSong {
        title: "ii-V-i Minor Altered",
        key: "Cm",
        composer: None,
        year: None,
        difficulty: "Medium-Advanced",
        genre: EXERCISE,
        progressions: &[(&["Dm7b5", "G7b9#11", "Cm7"], "iiø-V-i with an altered dominant")],
    },
    BuiltinSong {
        title: "ii-V-I Chromatic Approach",
        key: "C",
        composer: None,
        year: None,
        difficulty: "Advanced",
        genre: EXERCISE,
        progressions: &[(&["Dm7", "D7", "G7", "Cmaj7"], "II7 approaching V7")],
    },
    BuiltinSong {
        title: "ii-V-i Minor Modulating",
        key: "Cm",
        composer: None,
        year: None,
        difficulty: "Advanced",
        genre: EXERCISE,
        progressions: &[(
            &["Am7b5", "D7b9", "Gm7", "C7", "Fm7"],
            "iiø-V-i moving on to F minor",
        )],
    },
    BuiltinSong {
        title: "ii-V-I Third Cycle",
        key: "C",
        composer: None,
        year: None,
        difficulty: "Very Advanced",
        genre: EXERCISE,
        progressions: &[(
            &["Dm7", "G7", "E7", "Amaj7", "D7", "Gmaj7"],
            "ii-V sequence moving by thirds",
        )],
    },
    BuiltinSong {
        title: "ii-V-I Altered Dominant",
        key: "C",
        composer: None,
        year: None,
        difficulty: "Advanced",
        genre: EXERCISE,
        progressions: &[(&["Dm7", "G7alt", "Cmaj7"], "ii-V-I over an altered dominant")],
    },
    BuiltinSong {
        title: "Blues in C",
        key: "C",
        composer: None,
        year: None,
        difficulty: "Easy",
        genre: BLUES,
        progressions: &[
            (&["C7", "F7", "C7", "G7"], "basic 12-bar blues outline"),
            (
                &["C7", "F7", "C7", "C7", "F7", "F7", "C7", "A7", "Dm7", "G7", "C7", "G7"],
                "jazz blues with ii-V turnaround",
            ),
        ],
    },
];

pub(super) fn songs() -> Vec<Song> {
    SONGS
        .iter()
        .map(|s| Song {
            title: s.title.to_string(),
            key: s.key.to_string(),
            composer: s.composer.map(str::to_string),
            year: s.year,
            difficulty: Some(s.difficulty.to_string()),
            genre: s.genre.to_string(),
            progressions: s
                .progressions
                .iter()
                .map(|(chords, description)| ProgressionEntry {
                    chords: chords.iter().map(|c| c.to_string()).collect(),
                    description: description.to_string(),
                })
                .collect(),
        })
        .collect()
}
