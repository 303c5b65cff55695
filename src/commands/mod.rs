//! Command registry for shell commands
//!
//! Input that matches no command is treated as chord symbols by the REPL.

pub mod chord;
pub mod general;
pub mod midi;
pub mod progression;

use crate::midi::MidiOutputHandle;
use chordpad_core::{ProgressionDatabase, Session};
use std::path::PathBuf;
use std::sync::Arc;

/// Result of executing a command
#[derive(Debug)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, try reading it as chord symbols
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch these database files for changes
    Watch(Vec<PathBuf>),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub session: Session,
    pub database: ProgressionDatabase,
    /// JSON files merged over the built-in songs on reload
    pub database_paths: Vec<PathBuf>,
    pub midi: Option<Arc<MidiOutputHandle>>,
}

impl CommandContext {
    pub fn new(session: Session, database: ProgressionDatabase) -> Self {
        Self {
            database_paths: session.config().database_paths.clone(),
            session,
            database,
            midi: None,
        }
    }

    /// Create a new context with MIDI support
    pub fn new_with_midi(
        session: Session,
        database: ProgressionDatabase,
        midi: Arc<MidiOutputHandle>,
    ) -> Self {
        Self {
            midi: Some(midi),
            ..Self::new(session, database)
        }
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if input == prefix || input.starts_with(&format!("{} ", prefix)) {
                let args = input[prefix.len()..].trim();
                tracing::debug!(command = %prefix, args, "dispatch");
                return handler(args, ctx);
            }
        }
        CommandResult::NotACommand
    }

    /// Get all registered command prefixes
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Chords
    registry.register("play", chord::cmd_play);
    registry.register("analyze", chord::cmd_analyze);
    registry.register("compare", chord::cmd_compare);
    registry.register("voicing", chord::cmd_voicing);
    registry.register("reset", chord::cmd_reset);

    // Progressions and the database
    registry.register("songs", progression::cmd_songs);
    registry.register("genres", progression::cmd_genres);
    registry.register("song", progression::cmd_song);
    registry.register("find", progression::cmd_find);
    registry.register("stats", progression::cmd_stats);
    registry.register("load", progression::cmd_load);
    registry.register("next", progression::cmd_next);
    registry.register("prev", progression::cmd_prev);
    registry.register("goto", progression::cmd_goto);
    registry.register("current", progression::cmd_current);
    registry.register("unload", progression::cmd_unload);
    registry.register("transpose", progression::cmd_transpose);
    registry.register("keys", progression::cmd_keys);
    registry.register("export", progression::cmd_export);
    registry.register("import", progression::cmd_import);

    // MIDI commands
    registry.register("midi devices", midi::cmd_midi_devices);
    registry.register("midi connect", midi::cmd_midi_connect);
    registry.register("midi disconnect", midi::cmd_midi_disconnect);
    registry.register("midi channel", midi::cmd_midi_channel);
    registry.register("midi velocity", midi::cmd_midi_velocity);
    registry.register("midi status", midi::cmd_midi_status);
    registry.register("midi panic", midi::cmd_midi_panic);

    // General commands
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("log", general::cmd_log);
    registry.register("log clear", general::cmd_log_clear);
    registry.register("log export", general::cmd_log_export);
    registry.register("config", general::cmd_config);
    registry.register("reload", general::cmd_reload);
    registry.register("watch", general::cmd_watch);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CommandContext {
        CommandContext::new(Session::default(), ProgressionDatabase::builtin())
    }

    #[test]
    fn test_longest_prefix_wins() {
        let registry = create_registry();
        let commands = registry.list_commands();
        let log_export = commands.iter().position(|c| *c == "log export").unwrap();
        let log = commands.iter().position(|c| *c == "log").unwrap();
        assert!(log_export < log);

        let mut ctx = context();
        ctx.session.log_mut().message("hello");
        assert!(matches!(
            registry.execute("log clear", &mut ctx),
            CommandResult::Message(_)
        ));
        assert_eq!(ctx.session.log().len(), 1);
    }

    #[test]
    fn test_chord_symbols_are_not_commands() {
        let registry = create_registry();
        let mut ctx = context();
        for input in ["Cmaj7", "Dm7 G7 Cmaj7", "songster", "Bb7"] {
            assert!(matches!(
                registry.execute(input, &mut ctx),
                CommandResult::NotACommand
            ));
        }
    }

    #[test]
    fn test_exit_commands() {
        let registry = create_registry();
        let mut ctx = context();
        assert!(matches!(registry.execute("quit", &mut ctx), CommandResult::Exit));
        assert!(matches!(registry.execute("exit", &mut ctx), CommandResult::Exit));
    }
}
