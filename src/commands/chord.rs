//! Chord commands: play, analyze, compare, voicing, reset

use crate::commands::{CommandContext, CommandResult};
use crate::keyboard;
use chordpad_core::diagnostic::Diagnostic;
use chordpad_core::session::LogEvent;
use chordpad_core::types::analysis::{
    analyze_in_key, complexity, secondary_dominants, tritone_substitution,
};
use chordpad_core::types::voice_leading::movement;
use chordpad_core::{
    parse_chord, Chord, ChordError, ChordReport, Key, Progression, VoicingGenerator, VoicingMode,
};
use colored::*;
use std::time::Duration;

/// Format a sounded chord with its keyboard, and send it to MIDI
pub fn present(report: &ChordReport, ctx: &CommandContext) -> String {
    let mut output = format!(
        "{} {}  {}  {}",
        "🎹".bright_yellow(),
        report.chord.symbol().bright_cyan().bold(),
        format!("[{}]", report.mode).color(keyboard::mode_color(report.mode)),
        report.voicing,
    );
    let midi: Vec<String> = report
        .voicing
        .midi_numbers()
        .iter()
        .map(|m| m.to_string())
        .collect();
    output.push_str(&format!("  {}", format!("(MIDI {})", midi.join(" ")).dimmed()));

    let mut details = Vec::new();
    if let Some((index, len)) = report.position {
        details.push(format!("chord {}/{}", index + 1, len));
        let key = ctx.session.player().progression().and_then(|p| p.key());
        if let Some(key) = key {
            details.push(format!("{} in {}", key.roman_numeral(&report.chord), key));
        }
    }
    if let Some(moved) = report.movement {
        details.push(format!("moved {} semitones", moved));
    }
    if !details.is_empty() {
        output.push_str(&format!("\n  {}", details.join(" | ").dimmed()));
    }

    output.push('\n');
    output.push_str(&keyboard::render(
        &report.voicing,
        ctx.session.generator().range(),
        report.mode,
    ));

    for diagnostic in &report.diagnostics {
        let label = match diagnostic {
            Diagnostic::FallbackApplied(_) => "Fallback:",
            Diagnostic::RangeClamp(_) => "Range:",
        };
        output.push_str(&format!(
            "\n  {} {}",
            label.yellow().bold(),
            diagnostic.to_string().yellow()
        ));
    }

    send_to_midi(report, ctx);
    output
}

fn send_to_midi(report: &ChordReport, ctx: &CommandContext) {
    if let Some(handle) = &ctx.midi {
        let notes = report.voicing.notes().iter().map(|n| n.midi_byte()).collect();
        let hold = Duration::from_millis(ctx.session.config().chord_duration_ms);
        if let Err(e) = handle.play_chord(notes, hold) {
            tracing::warn!(error = %e, "could not send chord to MIDI");
        }
    }
}

fn parse_error(ctx: &mut CommandContext, err: &ChordError) -> CommandResult {
    let ChordError::ParseFailure { symbol, reason } = err;
    ctx.session.log_mut().record(LogEvent::ParseFailure {
        symbol: symbol.clone(),
        reason: reason.clone(),
    });
    CommandResult::Error(err.to_string())
}

/// Sound typed input: one symbol plays a chord, several load them as a
/// progression named "input"
pub fn play_input(line: &str, ctx: &mut CommandContext) -> CommandResult {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [] => CommandResult::Success,
        [symbol] => match ctx.session.play_symbol(symbol) {
            Ok(report) => CommandResult::Message(present(&report, ctx)),
            Err(e) => CommandResult::Error(e.to_string()),
        },
        symbols => match Progression::from_symbols("input", symbols) {
            Ok((progression, fallbacks)) => {
                let len = progression.len();
                match ctx.session.load(progression, fallbacks) {
                    Some(report) => CommandResult::Message(format!(
                        "Loaded {} chords. Use {} and {} to step.\n{}",
                        len,
                        "next".green(),
                        "prev".green(),
                        present(&report, ctx)
                    )),
                    None => CommandResult::Success,
                }
            }
            Err(e) => parse_error(ctx, &e),
        },
    }
}

/// Handle `play <symbol>...` command
pub fn cmd_play(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: play <chord> [chord...]".to_string());
    }
    play_input(args, ctx)
}

/// Split "Dm7 in F" into the subject and an optional key
fn split_key(args: &str) -> Result<(&str, Option<Key>), String> {
    let (subject, key) = if let Some(key) = args.strip_prefix("in ") {
        ("", Some(key))
    } else if let Some((subject, key)) = args.split_once(" in ") {
        (subject.trim(), Some(key))
    } else {
        (args, None)
    };
    match key {
        Some(key) => key
            .parse::<Key>()
            .map(|k| (subject, Some(k)))
            .map_err(|e| e.to_string()),
        None => Ok((subject, None)),
    }
}

/// Handle `analyze [chord] [in <key>]` command. Without a chord the loaded
/// progression is analysed.
pub fn cmd_analyze(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (subject, key) = match split_key(args) {
        Ok(split) => split,
        Err(e) => return CommandResult::Error(e),
    };

    if subject.is_empty() {
        return match ctx.session.player().progression() {
            Some(progression) => CommandResult::Message(analyze_progression(
                progression,
                key,
                ctx.session.generator(),
            )),
            None => CommandResult::Error(
                "No progression loaded. Usage: analyze <chord> [in <key>]".to_string(),
            ),
        };
    }

    let parsed = match parse_chord(subject) {
        Ok(parsed) => parsed,
        Err(e) => return parse_error(ctx, &e),
    };
    let mut output = parsed.chord.analyze();
    if let Some(fallback) = &parsed.fallback {
        output.push_str(&format!("\n  {} {}", "Fallback:".yellow(), fallback));
    }
    if let Some(sub) = tritone_substitution(&parsed.chord) {
        output.push_str(&format!("\n  Tritone substitute: {}", sub.symbol().bright_cyan()));
    }
    if let Some(key) = key {
        let role = analyze_in_key(&parsed.chord, &key);
        output.push_str(&format!(
            "\n  In {}: {}{}{}",
            key,
            role.roman.bright_cyan(),
            if role.diatonic { ", diatonic" } else { ", chromatic" },
            if role.dominant { ", dominant function" } else { "" },
        ));
    }
    CommandResult::Message(output)
}

/// Roman numerals, secondary dominants, complexity and voice-leading cost
pub fn analyze_progression(
    progression: &Progression,
    key: Option<Key>,
    generator: &VoicingGenerator,
) -> String {
    let chords = progression.chords();
    let key = key.or_else(|| progression.key());
    let mut output = format!("{}\n", format!("📊 {}", progression).bold());

    let secondaries = match &key {
        Some(key) => secondary_dominants(&chords, key),
        None => vec![None; chords.len()],
    };
    for (i, (chord, secondary)) in chords.iter().zip(&secondaries).enumerate() {
        let mut line = format!("  {:>2}. {:<12}", i + 1, chord.symbol());
        if let Some(key) = &key {
            let role = analyze_in_key(chord, key);
            line.push_str(&format!("{:<6}", role.roman));
            if !role.diatonic {
                line.push_str(&" chromatic".dimmed().to_string());
            }
        }
        if let Some(label) = secondary {
            line.push_str(&format!(" {}", label.bright_magenta()));
        }
        if let Some(sub) = tritone_substitution(chord) {
            line.push_str(&format!(" {}", format!("(sub {})", sub.symbol()).dimmed()));
        }
        output.push_str(&line);
        output.push('\n');
    }

    let report = complexity(&chords);
    output.push_str(&format!(
        "  Complexity: {} (score {}, {} unique of {} chords)\n",
        report.complexity.to_string().bright_yellow(),
        report.score,
        report.unique_chords,
        report.total_chords
    ));
    output.push_str("  Voice movement:");
    for mode in VoicingMode::ALL {
        output.push_str(&format!(
            " {} {}",
            mode.to_string().color(keyboard::mode_color(mode)),
            progression.total_movement(generator, mode)
        ));
    }
    output
}

/// Handle `compare [chord]` command - every voicing mode side by side
pub fn cmd_compare(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let chord: Chord = if args.is_empty() {
        match ctx.session.current() {
            Some(chord) => chord,
            None => return CommandResult::Error("Usage: compare <chord>".to_string()),
        }
    } else {
        match parse_chord(args) {
            Ok(parsed) => parsed.chord,
            Err(e) => return parse_error(ctx, &e),
        }
    };

    let previous = ctx.session.previous_voicing().cloned();
    let mut output = format!("{} {}\n", "Voicings of".bold(), chord.symbol().bright_cyan());
    for (mode, voiced) in ctx.session.compare(&chord) {
        let marker = if mode == ctx.session.mode() { "▶" } else { " " };
        output.push_str(&format!(
            "  {} {:<7}{}",
            marker,
            mode.to_string().color(keyboard::mode_color(mode)),
            voiced.voicing
        ));
        if let Some(prev) = &previous {
            output.push_str(&format!("  (moves {})", movement(prev, &voiced.voicing)));
        }
        if !voiced.clamps.is_empty() {
            output.push_str(&format!(
                "  {}",
                format!("{} range adjustments", voiced.clamps.len()).yellow()
            ));
        }
        output.push('\n');
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `voicing [root|smooth|drop2]` command
pub fn cmd_voicing(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        let modes: Vec<String> = VoicingMode::ALL.iter().map(|m| m.to_string()).collect();
        return CommandResult::Message(format!(
            "Voicing: {} (available: {})",
            ctx.session.mode().to_string().bright_green(),
            modes.join(", ")
        ));
    }

    match args.parse::<VoicingMode>() {
        Ok(mode) => {
            if ctx.session.set_mode(mode) {
                CommandResult::Message(format!("Voicing set to {}", mode.to_string().green()))
            } else {
                CommandResult::Message(format!("Voicing is already {}", mode))
            }
        }
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `reset` command - next smooth voicing starts from root position
pub fn cmd_reset(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.session.reset_voicing();
    CommandResult::Message("Voicing state reset".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordpad_core::types::player::PlayerState;
    use chordpad_core::{ProgressionDatabase, Session};

    fn context() -> CommandContext {
        CommandContext::new(Session::default(), ProgressionDatabase::builtin())
    }

    #[test]
    fn test_play_single_chord() {
        let mut ctx = context();
        match play_input("Cmaj7", &mut ctx) {
            CommandResult::Message(msg) => {
                assert!(msg.contains("C4 E4 G4 B4"));
                assert!(msg.contains("60 64 67 71"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ctx.session.previous_voicing().unwrap().len(), 4);
    }

    #[test]
    fn test_play_reports_fallback() {
        let mut ctx = context();
        match play_input("G7alt", &mut ctx) {
            CommandResult::Message(msg) => assert!(msg.contains("Fallback")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_play_several_loads_progression() {
        let mut ctx = context();
        assert!(matches!(
            play_input("Dm7 G7 Cmaj7", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.session.player().state(), PlayerState::AtIndex(0));
        assert_eq!(ctx.session.player().progression().unwrap().name(), "input");
    }

    #[test]
    fn test_bad_symbol_is_logged() {
        let mut ctx = context();
        assert!(matches!(
            play_input("Dm7 H7", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(matches!(
            ctx.session.log().entries().last().unwrap().event,
            LogEvent::ParseFailure { .. }
        ));
        assert_eq!(ctx.session.player().state(), PlayerState::Empty);
    }

    #[test]
    fn test_split_key() {
        let (subject, key) = split_key("Dm7 in F").unwrap();
        assert_eq!(subject, "Dm7");
        assert_eq!(key.unwrap().to_string(), "F");

        let (subject, key) = split_key("in Gm").unwrap();
        assert_eq!(subject, "");
        assert_eq!(key.unwrap().to_string(), "Gm");

        assert_eq!(split_key("Cmaj7").unwrap(), ("Cmaj7", None));
        assert!(split_key("C in Q").is_err());
    }

    #[test]
    fn test_analyze_chord_in_key() {
        let mut ctx = context();
        match cmd_analyze("A7 in C", &mut ctx) {
            CommandResult::Message(msg) => {
                assert!(msg.contains("A7"));
                assert!(msg.contains("chromatic"));
                assert!(msg.contains("dominant function"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_analyze_shows_tritone_substitute() {
        let mut ctx = context();
        match cmd_analyze("G7", &mut ctx) {
            CommandResult::Message(msg) => assert!(msg.contains("Tritone substitute: ")
                && msg.contains("Db7")),
            other => panic!("unexpected {:?}", other),
        }
        match cmd_analyze("Cmaj7", &mut ctx) {
            CommandResult::Message(msg) => assert!(!msg.contains("Tritone substitute")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_analyze_needs_progression() {
        let mut ctx = context();
        assert!(matches!(cmd_analyze("", &mut ctx), CommandResult::Error(_)));

        play_input("Cmaj7 A7 Dm7 G7", &mut ctx);
        match cmd_analyze("in C", &mut ctx) {
            CommandResult::Message(msg) => {
                assert!(msg.contains("Complexity"));
                assert!(msg.contains("V7/"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compare_lists_every_mode() {
        let mut ctx = context();
        play_input("Dm7", &mut ctx);
        match cmd_compare("G7", &mut ctx) {
            CommandResult::Message(msg) => {
                assert_eq!(msg.lines().count(), 4);
                assert!(msg.contains("moves"));
            }
            other => panic!("unexpected {:?}", other),
        }
        // Comparing does not sound anything
        assert_eq!(
            ctx.session.previous_voicing().unwrap().to_string(),
            "D4 F4 A4 C5"
        );
    }

    #[test]
    fn test_voicing_command() {
        let mut ctx = context();
        assert!(matches!(
            cmd_voicing("drop-2", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.session.mode(), VoicingMode::Drop2);
        assert!(matches!(
            cmd_voicing("spread", &mut ctx),
            CommandResult::Error(_)
        ));
    }
}
