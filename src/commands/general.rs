//! General REPL commands (help, quit, log, config, database reload)

use crate::commands::{CommandContext, CommandResult};
use chordpad_core::ProgressionDatabase;
use colored::*;
use std::path::PathBuf;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `log [n]` command - the last n entries, 20 by default
pub fn cmd_log(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let count = if args.is_empty() {
        20
    } else {
        match args.parse::<usize>() {
            Ok(n) => n,
            Err(_) => return CommandResult::Error("Usage: log [count]".to_string()),
        }
    };

    let log = ctx.session.log();
    if log.is_empty() {
        return CommandResult::Message("Log is empty".dimmed().to_string());
    }
    let lines: Vec<String> = log
        .recent(count)
        .iter()
        .map(|entry| {
            if entry.event.is_diagnostic() {
                entry.to_string().yellow().to_string()
            } else {
                entry.to_string()
            }
        })
        .collect();
    CommandResult::Message(lines.join("\n"))
}

/// Handle `log clear` command
pub fn cmd_log_clear(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.session.log_mut().clear();
    CommandResult::Message("Log cleared".to_string())
}

/// Handle `log export <path>` command
pub fn cmd_log_export(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: log export <path>".to_string());
    }
    match ctx.session.log().export(args) {
        Ok(()) => CommandResult::Message(format!(
            "💾 Wrote {} log entries to {}",
            ctx.session.log().len(),
            args.green()
        )),
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `config` command - show the active settings
pub fn cmd_config(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let config = ctx.session.config();
    let mut output = format!("{}\n", "⚙️  Settings:".bold());
    output.push_str(&format!("  Base octave: {}\n", config.base_octave));
    output.push_str(&format!("  Key range: {}\n", config.key_range));
    output.push_str(&format!("  Voicing: {}\n", ctx.session.mode()));
    output.push_str(&format!("  MIDI velocity: {}\n", config.midi_velocity));
    output.push_str(&format!("  MIDI channel: {}\n", config.midi_channel + 1));
    output.push_str(&format!("  Chord length: {} ms\n", config.chord_duration_ms));
    output.push_str(&format!("  Log capacity: {}\n", config.log_capacity));
    if ctx.database_paths.is_empty() {
        output.push_str("  Database files: none");
    } else {
        output.push_str("  Database files:");
        for path in &ctx.database_paths {
            output.push_str(&format!("\n    {}", path.display()));
        }
    }
    CommandResult::Message(output)
}

/// Rebuild the database from the built-in songs and every database file.
/// Files that fail to load are skipped and reported.
pub fn reload_database(ctx: &mut CommandContext) -> (usize, Vec<String>) {
    let mut database = ProgressionDatabase::builtin();
    let mut problems = Vec::new();
    for path in &ctx.database_paths {
        if let Err(e) = database.merge_json(path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping database file");
            problems.push(format!("{}: {}", path.display(), error_chain(&e)));
        }
    }
    let songs = database.len();
    ctx.database = database;
    ctx.session
        .log_mut()
        .message(format!("Reloaded database ({} songs)", songs));
    (songs, problems)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    text
}

/// Handle `reload` command
pub fn cmd_reload(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let (songs, problems) = reload_database(ctx);
    if problems.is_empty() {
        CommandResult::Message(format!("{} Database reloaded: {} songs", "✓".bright_green(), songs))
    } else {
        CommandResult::Error(format!(
            "Database reloaded with {} songs, but some files failed:\n  {}",
            songs,
            problems.join("\n  ")
        ))
    }
}

/// Handle `watch [file]` command. A new file is added to the database first.
pub fn cmd_watch(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if !args.is_empty() {
        let path = PathBuf::from(args);
        if !ctx.database_paths.contains(&path) {
            ctx.database_paths.push(path.clone());
            let (_, problems) = reload_database(ctx);
            if !problems.is_empty() {
                ctx.database_paths.retain(|p| p != &path);
                return CommandResult::Error(problems.join("\n"));
            }
        }
        return CommandResult::Watch(vec![path]);
    }

    if ctx.database_paths.is_empty() {
        return CommandResult::Error("Usage: watch <database.json>".to_string());
    }
    CommandResult::Watch(ctx.database_paths.clone())
}

/// Print help information
fn print_help() {
    println!("{}", "🎹 Chordpad Help".bold());
    println!("{}", "================".bold());
    println!();
    println!("{}", "Chords:".green());
    println!("  {}              - Voice and play a chord", "Cmaj7".cyan());
    println!("  {}     - Load chords as a progression", "Dm7 G7 Cmaj7".cyan());
    println!("  {}  - Chord tones, degrees and tritone substitute", "analyze G7b9".cyan());
    println!("  {} - Role of a chord in a key", "analyze A7 in C".cyan());
    println!("  {}      - Root, smooth and drop-2 side by side", "compare G7".cyan());
    println!("  {} - Choose the voicing", "voicing root|smooth|drop2".cyan());
    println!("  {}              - Forget the previous voicing", "reset".cyan());
    println!();
    println!("{}", "Progressions:".green());
    println!("  {}       - List songs, optionally by genre", "songs [genre]".cyan());
    println!("  {} - Songs by a composer or in a key", "songs by <name> | in <key>".cyan());
    println!("  {}             - List genres", "genres".cyan());
    println!("  {}       - Song details", "song <title>".cyan());
    println!("  {} - Load a song's progression", "load <title> [#n] [+k]".cyan());
    println!("  {}  - Step through the progression", "next / prev / goto <n>".cyan());
    println!("  {}  - Show or drop the loaded progression", "current / unload".cyan());
    println!("  {} - Move the progression", "transpose <+k|-k|key>".cyan());
    println!("  {}               - The progression in all 12 keys", "keys".cyan());
    println!("  {}     - Analyse the progression", "analyze [in key]".cyan());
    println!("  {}        - Songs containing a chord", "find <chord>".cyan());
    println!("  {}              - Database statistics", "stats".cyan());
    println!("  {} - Save as text", "export <path> [--voicings]".cyan());
    println!("  {}      - Load a text progression", "import <path>".cyan());
    println!();
    println!("{}", "MIDI:".green());
    println!("  {}       - List output ports", "midi devices".cyan());
    println!("  {} - Connect to a port", "midi connect <name>".cyan());
    println!("  {}    - Disconnect", "midi disconnect".cyan());
    println!("  {}  - Output channel", "midi channel [1-16]".cyan());
    println!("  {} - Note velocity", "midi velocity [0-127]".cyan());
    println!("  {}        - Connection status", "midi status".cyan());
    println!("  {}         - All notes off", "midi panic".cyan());
    println!();
    println!("{}", "Session:".green());
    println!("  {}            - Recent log entries", "log [n]".cyan());
    println!("  {}  - Write the log to a file", "log export <path>".cyan());
    println!("  {}          - Empty the log", "log clear".cyan());
    println!("  {}             - Show settings", "config".cyan());
    println!("  {}             - Reload database files", "reload".cyan());
    println!("  {}       - Reload a database file when it changes", "watch [file]".cyan());
    println!("  {}          - Leave chordpad", "quit / exit".cyan());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordpad_core::Session;
    use std::io::Write;

    fn context() -> CommandContext {
        CommandContext::new(Session::default(), ProgressionDatabase::builtin())
    }

    #[test]
    fn test_log_shows_recent_entries() {
        let mut ctx = context();
        assert!(matches!(cmd_log("", &mut ctx), CommandResult::Message(_)));
        ctx.session.log_mut().message("one");
        ctx.session.log_mut().message("two");
        match cmd_log("1", &mut ctx) {
            CommandResult::Message(msg) => {
                assert_eq!(msg.lines().count(), 1);
                assert!(msg.ends_with("two"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(cmd_log("many", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_log_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let mut ctx = context();
        ctx.session.play_symbol("Cmaj7").unwrap();

        let result = cmd_log_export(path.to_str().unwrap(), &mut ctx);
        assert!(matches!(result, CommandResult::Message(_)));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Played Cmaj7"));
    }

    #[test]
    fn test_watch_adds_database_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{ "Tune": { "key": "F", "progressions": [ { "chords": ["F6", "Gm7", "C7"] } ] } }"#)
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let mut ctx = context();
        let before = ctx.database.len();
        match cmd_watch(&path, &mut ctx) {
            CommandResult::Watch(paths) => assert_eq!(paths, vec![PathBuf::from(&path)]),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(ctx.database.len(), before + 1);
        assert!(ctx.database.song("Tune").is_some());

        // Watching again with no argument covers every known file
        assert!(matches!(cmd_watch("", &mut ctx), CommandResult::Watch(p) if p.len() == 1));
    }

    #[test]
    fn test_watch_rejects_bad_file() {
        let mut ctx = context();
        assert!(matches!(
            cmd_watch("/no/such/songs.json", &mut ctx),
            CommandResult::Error(_)
        ));
        assert!(ctx.database_paths.is_empty());
        assert!(matches!(cmd_watch("", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_reload_reports_problems_but_keeps_builtin() {
        let mut ctx = context();
        ctx.database_paths.push(PathBuf::from("/no/such/songs.json"));
        assert!(matches!(cmd_reload("", &mut ctx), CommandResult::Error(_)));
        assert_eq!(ctx.database.len(), ProgressionDatabase::builtin().len());
    }
}
