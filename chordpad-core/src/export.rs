//! Plain-text export of progressions and the action log

use crate::diagnostic::FallbackApplied;
use crate::parser::error::ChordError;
use crate::session::ActionLog;
use crate::types::progression::Progression;
use crate::types::voicing::Voicing;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// One chord symbol per line, preceded by a `#` header naming the progression
pub fn progression_to_text(progression: &Progression) -> String {
    let mut text = header(progression);
    for symbol in progression.symbols() {
        text.push_str(&symbol);
        text.push('\n');
    }
    text
}

/// One line per chord: symbol, a tab, then the voiced notes
pub fn progression_with_voicings(progression: &Progression, voicings: &[Voicing]) -> String {
    let mut text = header(progression);
    for (symbol, voicing) in progression.symbols().iter().zip(voicings) {
        text.push_str(&format!("{}\t{}\n", symbol, voicing));
    }
    text
}

fn header(progression: &Progression) -> String {
    match progression.key() {
        Some(key) => format!("# {} (key {})\n", progression.name(), key),
        None => format!("# {}\n", progression.name()),
    }
}

/// Read the text format back. Blank lines and `#` comments are skipped and
/// anything after a tab on a line is ignored.
pub fn progression_from_text(
    name: &str,
    text: &str,
) -> Result<(Progression, Vec<FallbackApplied>), ChordError> {
    let symbols: Vec<&str> = text
        .lines()
        .map(|line| line.split('\t').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    Progression::from_symbols(name, &symbols)
}

pub fn write_progression(
    path: impl AsRef<Path>,
    progression: &Progression,
    voicings: Option<&[Voicing]>,
) -> Result<()> {
    let path = path.as_ref();
    let text = match voicings {
        Some(voicings) => progression_with_voicings(progression, voicings),
        None => progression_to_text(progression),
    };
    fs::write(path, text)
        .with_context(|| format!("Failed to write progression to {}", path.display()))?;
    tracing::info!(path = %path.display(), "exported progression");
    Ok(())
}

pub fn read_progression(path: impl AsRef<Path>) -> Result<(Progression, Vec<FallbackApplied>)> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read progression from {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "imported".to_string());
    let parsed = progression_from_text(&name, &text)
        .with_context(|| format!("Invalid progression file {}", path.display()))?;
    Ok(parsed)
}

/// Write the action log, one line per event
pub fn write_log(path: impl AsRef<Path>, log: &ActionLog) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, log.to_text())
        .with_context(|| format!("Failed to write log to {}", path.display()))?;
    tracing::info!(path = %path.display(), entries = log.len(), "exported log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::voicing::{VoicingGenerator, VoicingMode};

    fn ii_v_i() -> Progression {
        Progression::from_symbols("ii-V-I", &["Dm7", "G7", "Cmaj7"])
            .unwrap()
            .0
            .with_key("C".parse().unwrap())
    }

    #[test]
    fn test_plain_text() {
        let text = progression_to_text(&ii_v_i());
        assert_eq!(text, "# ii-V-I (key C)\nDm7\nG7\nCmaj7\n");
    }

    #[test]
    fn test_text_with_voicings() {
        let progression = ii_v_i();
        let voicings: Vec<Voicing> = progression
            .voicings(&VoicingGenerator::default(), VoicingMode::Root)
            .into_iter()
            .map(|v| v.voicing)
            .collect();
        let text = progression_with_voicings(&progression, &voicings);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "Dm7\tD4 F4 A4 C5");
        assert_eq!(lines[3], "Cmaj7\tC4 E4 G4 B4");
    }

    #[test]
    fn test_read_back_skips_comments() {
        let text = "# my tune\n\nDm7\tD4 F4 A4 C5\n  G7alt  \n# bridge\nCmaj7\n";
        let (progression, fallbacks) = progression_from_text("tune", text).unwrap();
        assert_eq!(progression.len(), 3);
        assert_eq!(fallbacks.len(), 1);
        assert_eq!(progression.symbols()[1], "G7(b9,#9,#11,b13)");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ii-v-i.txt");
        write_progression(&path, &ii_v_i().transpose(3), None).unwrap();

        let (read, fallbacks) = read_progression(&path).unwrap();
        assert!(fallbacks.is_empty());
        assert_eq!(read.name(), "ii-v-i");
        assert_eq!(read.symbols(), vec!["Fm7", "Bb7", "Ebmaj7"]);
    }

    #[test]
    fn test_write_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let mut log = ActionLog::default();
        log.message("first");
        log.message("second");
        write_log(&path, &log).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.lines().last().unwrap().ends_with("second"));
    }
}
