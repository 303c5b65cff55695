use crate::diagnostic::{FallbackApplied, FallbackRule};
use crate::parser::error::ChordError;
use crate::types::chord::Chord;
use crate::types::note::Note;
use crate::types::quality::{normalize_suffix, ChordQuality};
use std::collections::BTreeSet;

/// Alteration tokens, longest first so "b13" is never read as "13"
pub const ALTERATION_TOKENS: &[(&str, &[u8])] = &[
    ("alt", &[13, 15, 18, 20]),
    ("add13", &[21]),
    ("add11", &[17]),
    ("add9", &[14]),
    ("#11", &[18]),
    ("b13", &[20]),
    ("#9", &[15]),
    ("b9", &[13]),
    ("#5", &[8]),
    ("b5", &[6]),
    ("13", &[21]),
    ("11", &[17]),
    ("9", &[14]),
    ("6", &[9]),
];

/// Fallback rules in the order they are tried
pub const FALLBACK_RULES: [FallbackRule; 3] = [
    FallbackRule::StripAlteration,
    FallbackRule::LongestPrefix,
    FallbackRule::MajorTriad,
];

/// Result of parsing a chord symbol: the chord plus the fallback that
/// produced it, if the suffix was not recognised as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChord {
    pub chord: Chord,
    pub fallback: Option<FallbackApplied>,
}

impl ParsedChord {
    pub fn is_exact(&self) -> bool {
        self.fallback.is_none()
    }
}

/// Parse a chord symbol such as "Cmaj7", "F#m7b5" or "Bb7(b9,#11)".
///
/// Fails only when no root letter can be read. An unrecognised suffix is
/// resolved through [`FALLBACK_RULES`] and reported in
/// [`ParsedChord::fallback`].
pub fn parse_chord(symbol: &str) -> Result<ParsedChord, ChordError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(ChordError::parse_failure(symbol, "empty chord symbol"));
    }

    let (pitch_class, spelling, consumed) = Note::parse_name_prefix(trimmed)
        .ok_or_else(|| ChordError::parse_failure(trimmed, "no root note A-G"))?;
    let root = Note::from_midi(60 + pitch_class as i16, spelling);
    let raw_suffix = &trimmed[consumed..];

    if let Some(chord) = parse_explicit_alterations(root, raw_suffix) {
        return Ok(ParsedChord {
            chord,
            fallback: None,
        });
    }

    let suffix = normalize_suffix(raw_suffix);
    if let Some(quality) = ChordQuality::from_suffix(&suffix) {
        return Ok(ParsedChord {
            chord: Chord::new(root, quality),
            fallback: None,
        });
    }

    for rule in FALLBACK_RULES {
        if let Some((chord, stripped, dropped)) = apply_rule(rule, root, &suffix) {
            let fallback = FallbackApplied {
                symbol: trimmed.to_string(),
                resolved: chord.symbol(),
                rule,
                stripped,
                dropped,
            };
            tracing::debug!(%fallback, "chord fallback");
            return Ok(ParsedChord {
                chord,
                fallback: Some(fallback),
            });
        }
    }

    // MajorTriad always applies
    Err(ChordError::parse_failure(trimmed, "unresolvable suffix"))
}

type RuleOutcome = (Chord, Vec<String>, Option<String>);

fn apply_rule(rule: FallbackRule, root: Note, suffix: &str) -> Option<RuleOutcome> {
    match rule {
        FallbackRule::StripAlteration => strip_alterations(root, suffix),
        FallbackRule::LongestPrefix => {
            let (quality, len) = ChordQuality::longest_prefix(suffix)?;
            Some((
                Chord::new(root, quality),
                Vec::new(),
                Some(suffix[len..].to_string()),
            ))
        }
        FallbackRule::MajorTriad => Some((
            Chord::new(root, ChordQuality::Major),
            Vec::new(),
            Some(suffix.to_string()),
        )),
    }
}

/// Strip trailing alteration tokens one at a time, retrying the exact
/// lookup after each strip
fn strip_alterations(root: Note, suffix: &str) -> Option<RuleOutcome> {
    let mut rest = suffix;
    let mut stripped: Vec<String> = Vec::new();
    let mut extensions = BTreeSet::new();

    while let Some((token, intervals)) = ALTERATION_TOKENS
        .iter()
        .find(|(token, _)| rest.ends_with(token))
    {
        rest = &rest[..rest.len() - token.len()];
        stripped.insert(0, token.to_string());
        extensions.extend(intervals.iter().copied());

        if let Some(quality) = ChordQuality::from_suffix(rest) {
            return Some((
                Chord::with_extensions(root, quality, extensions),
                stripped,
                None,
            ));
        }
    }

    None
}

/// Recognise an explicit alteration list written as a trailing
/// parenthesised group, e.g. "7(b9,#11)". The text before the group must be
/// an exact quality suffix and every item a known alteration token.
fn parse_explicit_alterations(root: Note, raw_suffix: &str) -> Option<Chord> {
    let body = raw_suffix.trim_end().strip_suffix(')')?;
    let open = body.rfind('(')?;
    let base = normalize_suffix(&body[..open]);
    let quality = ChordQuality::from_suffix(&base)?;

    let mut extensions = BTreeSet::new();
    for item in body[open + 1..].split(',') {
        let token = normalize_suffix(item);
        let (_, intervals) = ALTERATION_TOKENS.iter().find(|(t, _)| *t == token)?;
        extensions.extend(intervals.iter().copied());
    }

    if extensions.is_empty() {
        return None;
    }
    Some(Chord::with_extensions(root, quality, extensions))
}

/// Spelling of an extension interval in a rendered symbol
pub fn alteration_token(interval: u8) -> Option<&'static str> {
    match interval {
        6 => Some("b5"),
        8 => Some("#5"),
        9 => Some("6"),
        13 => Some("b9"),
        14 => Some("9"),
        15 => Some("#9"),
        17 => Some("11"),
        18 => Some("#11"),
        20 => Some("b13"),
        21 => Some("13"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(symbol: &str) -> ParsedChord {
        parse_chord(symbol).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let parsed = parse("Cmaj7");
        assert!(parsed.is_exact());
        assert_eq!(parsed.chord.root().pitch_class(), 0);
        assert_eq!(parsed.chord.quality(), ChordQuality::Major7);
    }

    #[test]
    fn test_root_accidentals() {
        assert_eq!(parse("F#m7b5").chord.root().pitch_class(), 6);
        assert_eq!(parse("Bb7").chord.root().pitch_class(), 10);
        assert_eq!(parse("E♭maj7").chord.root().pitch_class(), 3);
        assert_eq!(parse("c#m").chord.quality(), ChordQuality::Minor);
    }

    #[test]
    fn test_parentheses_and_spaces_are_ignored() {
        assert_eq!(parse("Cm(maj7)").chord.quality(), ChordQuality::MinorMajor7);
        assert_eq!(parse(" D m7 ").chord.quality(), ChordQuality::Minor7);
    }

    #[test]
    fn test_explicit_alteration_list() {
        let parsed = parse("G7(b9,#11)");
        assert!(parsed.is_exact());
        assert_eq!(parsed.chord.quality(), ChordQuality::Dominant7);
        let extensions: Vec<u8> = parsed.chord.extensions().iter().copied().collect();
        assert_eq!(extensions, vec![13, 18]);
    }

    #[test]
    fn test_alt_falls_back_to_dominant() {
        let parsed = parse("G7alt");
        assert_eq!(parsed.chord.quality(), ChordQuality::Dominant7);
        let fallback = parsed.fallback.expect("fallback recorded");
        assert_eq!(fallback.rule, FallbackRule::StripAlteration);
        assert_eq!(fallback.stripped, vec!["alt".to_string()]);
        let extensions: Vec<u8> = parsed.chord.extensions().iter().copied().collect();
        assert_eq!(extensions, vec![13, 15, 18, 20]);
    }

    #[test]
    fn test_stacked_alterations() {
        let parsed = parse("C7b9#11");
        assert_eq!(parsed.chord.quality(), ChordQuality::Dominant7Flat9);
        assert!(parsed.chord.extensions().contains(&18));

        let parsed = parse("C7b13");
        assert_eq!(parsed.chord.quality(), ChordQuality::Dominant7);
        assert!(parsed.chord.extensions().contains(&20));
    }

    #[test]
    fn test_longest_prefix_fallback() {
        let parsed = parse("Dm7zz");
        assert_eq!(parsed.chord.quality(), ChordQuality::Minor7);
        let fallback = parsed.fallback.unwrap();
        assert_eq!(fallback.rule, FallbackRule::LongestPrefix);
        assert_eq!(fallback.dropped.as_deref(), Some("zz"));
    }

    #[test]
    fn test_major_triad_fallback() {
        let parsed = parse("Cxyz");
        assert_eq!(parsed.chord.quality(), ChordQuality::Major);
        let fallback = parsed.fallback.unwrap();
        assert_eq!(fallback.rule, FallbackRule::MajorTriad);
        assert_eq!(fallback.dropped.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_parse_failure_without_root() {
        assert!(parse_chord("").is_err());
        assert!(parse_chord("   ").is_err());
        assert!(parse_chord("Hmaj7").is_err());
        assert!(parse_chord("7").is_err());
    }
}
