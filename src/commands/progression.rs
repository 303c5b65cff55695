//! Progression commands: database browsing, the player, transposition and
//! plain-text import/export

use crate::commands::chord::present;
use crate::commands::{CommandContext, CommandResult};
use chordpad_core::export::{read_progression, write_progression};
use chordpad_core::types::analysis::complexity;
use chordpad_core::types::progression::{interval_name, transposition_distance};
use chordpad_core::{parse_chord, ChordReport, Key, Note, Progression, Voicing};
use colored::*;

fn loaded(ctx: &CommandContext) -> Result<Progression, CommandResult> {
    ctx.session
        .player()
        .progression()
        .cloned()
        .ok_or_else(|| CommandResult::Error("No progression loaded".to_string()))
}

fn sounded(report: Option<ChordReport>, ctx: &CommandContext) -> CommandResult {
    match report {
        Some(report) => CommandResult::Message(present(&report, ctx)),
        None => CommandResult::Success,
    }
}

/// Handle `songs [genre]` command
pub fn cmd_songs(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let songs: Vec<_> = if args.is_empty() {
        ctx.database.songs().collect()
    } else if let Some(composer) = args.strip_prefix("by ") {
        ctx.database.songs_by_composer(composer)
    } else if let Some(key) = args.strip_prefix("in ") {
        match key.trim().parse::<Key>() {
            Ok(key) => ctx.database.songs_by_key(&key),
            Err(e) => return CommandResult::Error(e.to_string()),
        }
    } else {
        ctx.database.songs_by_genre(args)
    };
    if songs.is_empty() {
        return CommandResult::Error(format!("No songs matching '{}'. Try 'genres'.", args));
    }

    let mut output = format!("{}\n", format!("📚 {} songs:", songs.len()).bold());
    for song in songs {
        output.push_str(&format!("  {}", song.to_string().cyan()));
        if song.progressions.len() > 1 {
            output.push_str(&format!(" {}", format!("[{} progressions]", song.progressions.len()).dimmed()));
        }
        output.push('\n');
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `genres` command
pub fn cmd_genres(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let mut output = format!("{}\n", "📚 Genres:".bold());
    for (genre, titles) in ctx.database.genres() {
        output.push_str(&format!("  {} ({})\n", genre.cyan(), titles.len()));
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `song <title>` command - details and every progression of a song
pub fn cmd_song(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: song <title>".to_string());
    }
    let song = match ctx.database.lookup(args) {
        Ok(song) => song,
        Err(e) => return CommandResult::Error(e.to_string()),
    };

    let mut output = format!("{} {}\n", "🎼".bright_yellow(), song.to_string().bold());
    output.push_str(&format!("  Genre: {}\n", song.genre));
    for (i, entry) in song.progressions.iter().enumerate() {
        output.push_str(&format!("  #{} {}\n", i + 1, entry.chords.join(" ").cyan()));
        if !entry.description.is_empty() {
            output.push_str(&format!("     {}\n", entry.description.dimmed()));
        }
        let chords: Vec<_> = entry
            .chords
            .iter()
            .filter_map(|s| parse_chord(s).ok().map(|p| p.chord))
            .collect();
        output.push_str(&format!("     Complexity: {}\n", complexity(&chords).complexity));
    }
    output.push_str(&format!("Use {} to play it.", format!("load {}", song.title).green()));
    CommandResult::Message(output)
}

/// `<title> [#n] [+k|-k]`: progression number (1-based) and semitone shift
fn parse_load_args(args: &str) -> Result<(String, usize, i8), String> {
    let mut tokens: Vec<&str> = args.split_whitespace().collect();
    let mut index = 0;
    let mut semitones = 0;

    while let Some(last) = tokens.last() {
        if let Some(n) = last.strip_prefix('#') {
            index = match n.parse::<usize>() {
                Ok(n) if n >= 1 => n - 1,
                _ => return Err(format!("Invalid progression number '{}'", last)),
            };
        } else if last.starts_with('+') || last.starts_with('-') {
            semitones = last
                .parse::<i8>()
                .map_err(|_| format!("Invalid transposition '{}'", last))?;
        } else {
            break;
        }
        tokens.pop();
    }

    if tokens.is_empty() {
        return Err("Usage: load <title> [#n] [+semitones]".to_string());
    }
    Ok((tokens.join(" "), index, semitones))
}

/// Handle `load <title> [#n] [+k]` command
pub fn cmd_load(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (title, index, semitones) = match parse_load_args(args) {
        Ok(parsed) => parsed,
        Err(e) => return CommandResult::Error(e),
    };
    let (progression, fallbacks) = match ctx.database.progression(&title, index) {
        Ok(found) => found,
        Err(e) => return CommandResult::Error(e.to_string()),
    };

    let progression = progression.transpose(semitones);
    let header = format!(
        "{} {} ({} chords)",
        "▶ Loaded".bright_green(),
        progression.to_string().bold(),
        progression.len()
    );
    let report = ctx.session.load(progression, fallbacks);
    match sounded(report, ctx) {
        CommandResult::Message(msg) => CommandResult::Message(format!("{}\n{}", header, msg)),
        _ => CommandResult::Message(header),
    }
}

fn step(
    report: Option<ChordReport>,
    at_end: bool,
    ctx: &mut CommandContext,
) -> CommandResult {
    if ctx.session.player().progression().is_none() {
        return CommandResult::Error("No progression loaded".to_string());
    }
    match report {
        Some(report) => CommandResult::Message(present(&report, ctx)),
        None if at_end => CommandResult::Message("Already at the last chord".yellow().to_string()),
        None => CommandResult::Message("Already at the first chord".yellow().to_string()),
    }
}

/// Handle `next` command
pub fn cmd_next(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let report = ctx.session.next();
    step(report, true, ctx)
}

/// Handle `prev` command
pub fn cmd_prev(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let report = ctx.session.prev();
    step(report, false, ctx)
}

/// Handle `goto <n>` command, 1-based
pub fn cmd_goto(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let progression = match loaded(ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    match args.parse::<usize>() {
        Ok(n) if (1..=progression.len()).contains(&n) => sounded(ctx.session.jump(n - 1), ctx),
        _ => CommandResult::Error(format!("Usage: goto <1-{}>", progression.len())),
    }
}

/// Handle `current` command
pub fn cmd_current(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Message(ctx.session.player().to_string())
}

/// Handle `unload` command
pub fn cmd_unload(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match ctx.session.unload() {
        Some(progression) => CommandResult::Message(format!("Unloaded {}", progression.name())),
        None => CommandResult::Error("No progression loaded".to_string()),
    }
}

/// Handle `transpose <+k|-k|key>` command on the loaded progression,
/// keeping the player's position
pub fn cmd_transpose(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let progression = match loaded(ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    if args.is_empty() {
        return CommandResult::Error("Usage: transpose <semitones|key>".to_string());
    }

    let transposed = if let Ok(semitones) = args.parse::<i8>() {
        progression.transpose(semitones)
    } else {
        let target: Note = match args.trim_start_matches("to ").parse() {
            Ok(note) => note,
            Err(e) => return CommandResult::Error(e.to_string()),
        };
        match progression.transpose_to(target) {
            Some(p) => p,
            None => {
                return CommandResult::Error(format!(
                    "{} has no key; transpose by semitones instead",
                    progression.name()
                ))
            }
        }
    };

    let shift = (transposed.offset() as i8 - progression.offset() as i8).rem_euclid(12);
    let header = format!(
        "Transposed {} {} ({} semitones): {}",
        "↑".bright_green(),
        interval_name(shift),
        shift,
        transposed.symbols().join(" ").cyan()
    );

    let index = ctx.session.player().index().unwrap_or(0);
    let report = ctx.session.load(transposed, Vec::new());
    let report = if index > 0 {
        ctx.session.jump(index)
    } else {
        report
    };
    match sounded(report, ctx) {
        CommandResult::Message(msg) => CommandResult::Message(format!("{}\n{}", header, msg)),
        _ => CommandResult::Message(header),
    }
}

/// Handle `keys` command - the loaded progression in all twelve keys
pub fn cmd_keys(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let progression = match loaded(ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };

    let mut output = format!("{}\n", format!("🔁 {} in every key:", progression.name()).bold());
    for shifted in std::iter::once(progression.clone()).chain(progression.all_transpositions()) {
        let distance = match (progression.key(), shifted.key()) {
            (Some(from), Some(to)) => transposition_distance(from.tonic(), to.tonic()),
            _ => (shifted.offset() + 12 - progression.offset()) % 12,
        };
        let key = shifted
            .key()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "  +{:<2} {:<4} {}\n",
            distance,
            key,
            shifted.symbols().join(" ")
        ));
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `find <chord>` command - progressions containing the chord in any key
pub fn cmd_find(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: find <chord>".to_string());
    }
    let chord = match parse_chord(args) {
        Ok(parsed) => parsed.chord,
        Err(e) => return CommandResult::Error(e.to_string()),
    };

    let matches = ctx.database.find_by_chord(&chord);
    if matches.is_empty() {
        return CommandResult::Message(format!("No progression contains {}", chord.symbol()));
    }

    let mut output = format!(
        "{}\n",
        format!("🔍 {} progressions contain {}:", matches.len(), chord.symbol()).bold()
    );
    for m in matches {
        let shift = if m.semitones == 0 {
            String::new()
        } else {
            format!(" +{}", m.semitones)
        };
        output.push_str(&format!(
            "  {} #{}{}: {}\n",
            m.title.cyan(),
            m.index + 1,
            shift.dimmed(),
            m.chords.join(" ")
        ));
    }
    CommandResult::Message(output.trim_end().to_string())
}

/// Handle `stats` command
pub fn cmd_stats(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Message(format!("📊 Database: {}", ctx.database.statistics()))
}

/// Handle `export <path> [--voicings]` command
pub fn cmd_export(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let progression = match loaded(ctx) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let (path, with_voicings) = match args.strip_suffix("--voicings") {
        Some(path) => (path.trim(), true),
        None => (args, false),
    };
    if path.is_empty() {
        return CommandResult::Error("Usage: export <path> [--voicings]".to_string());
    }

    let voicings: Option<Vec<Voicing>> = with_voicings.then(|| {
        progression
            .voicings(ctx.session.generator(), ctx.session.mode())
            .into_iter()
            .map(|v| v.voicing)
            .collect()
    });
    match write_progression(path, &progression, voicings.as_deref()) {
        Ok(()) => {
            ctx.session
                .log_mut()
                .message(format!("Exported {} to {}", progression.name(), path));
            CommandResult::Message(format!("💾 Exported {} to {}", progression.name(), path.green()))
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `import <path>` command - load a plain-text progression file
pub fn cmd_import(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: import <path>".to_string());
    }
    match read_progression(args) {
        Ok((progression, fallbacks)) => {
            let header = format!("▶ Imported {} ({} chords)", progression.name(), progression.len());
            let report = ctx.session.load(progression, fallbacks);
            match sounded(report, ctx) {
                CommandResult::Message(msg) => CommandResult::Message(format!("{}\n{}", header, msg)),
                _ => CommandResult::Message(header),
            }
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}
