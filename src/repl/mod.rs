//! REPL (Read-Eval-Print Loop) for chordpad

use crate::commands::chord::play_input;
use crate::commands::general::reload_database;
use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::repl::watcher::{is_content_change, DatabaseWatcher};
use anyhow::{anyhow, Result};
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::Event;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::path::PathBuf;
use std::thread;

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// What the loop should do after one line
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive shell
pub struct Repl {
    editor: Option<DefaultEditor>,
    registry: CommandRegistry,
    ctx: CommandContext,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    watcher: Option<DatabaseWatcher>,
}

impl Repl {
    pub fn new(ctx: CommandContext) -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            editor: Some(editor),
            registry: create_registry(),
            ctx,
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    /// Handle one line of input: a command, or chord symbols
    fn handle_line(&mut self, line: &str) -> Flow {
        let result = match self.registry.execute(line, &mut self.ctx) {
            CommandResult::NotACommand => play_input(line, &mut self.ctx),
            other => other,
        };

        match result {
            CommandResult::Success | CommandResult::NotACommand => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => return Flow::Exit,
            CommandResult::Error(e) => {
                println!("{} {}", "Error:".bright_red().bold(), e.red())
            }
            CommandResult::Watch(paths) => self.watch(paths),
        }
        Flow::Continue
    }

    fn watch(&mut self, paths: Vec<PathBuf>) {
        if self.watcher.is_none() {
            match DatabaseWatcher::new(self.tx_watcher.clone()) {
                Ok(w) => self.watcher = Some(w),
                Err(e) => {
                    println!("{} Failed to create watcher: {}", "Error:".red(), e);
                    return;
                }
            }
        }

        if let Some(w) = &mut self.watcher {
            for path in paths {
                match w.watch(&path) {
                    Ok(true) => println!(
                        "{} Watching {} for changes...",
                        "👀".bright_cyan(),
                        path.display().to_string().bright_green()
                    ),
                    Ok(false) => println!("Already watching {}", path.display()),
                    Err(e) => println!(
                        "{} Failed to watch {}: {}",
                        "Error:".red(),
                        path.display(),
                        e
                    ),
                }
            }
        }
    }

    fn on_file_event(&mut self, event: Event) {
        if !is_content_change(&event) {
            return;
        }
        for path in &event.paths {
            println!("{} File changed: {}", "⚡".bright_yellow(), path.display());
        }
        let (songs, problems) = reload_database(&mut self.ctx);
        if problems.is_empty() {
            println!("{} Reloaded {} songs", "✓".bright_green(), songs);
        } else {
            for problem in problems {
                println!("{} {}", "Error:".red(), problem);
            }
        }
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🎹".bright_yellow(),
            "Chordpad: piano chords and jazz progressions".bright_cyan().bold()
        );
        println!(
            "Type chords like: {}, {}, or {}",
            "Cmaj7".cyan(),
            "G7alt".cyan(),
            "Dm7 G7 Cmaj7".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        if !self.ctx.database_paths.is_empty() {
            self.watch(self.ctx.database_paths.clone());
        }

        // Move editor to thread
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "chordpad>".bright_magenta().bold());
            let readline = editor.readline(&prompt);

            match readline {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if line.is_empty() {
                            continue;
                        }
                        if self.handle_line(&line) == Flow::Exit {
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted)))
                    | Ok(ReplEvent::Input(Err(ReadlineError::Eof))) => break,
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                        break;
                    }
                    Err(_) => break, // Channel closed
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => self.on_file_event(event),
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break, // Channel closed
                }
            }
        }

        if let Some(midi) = &self.ctx.midi {
            let _ = midi.release();
        }
        println!("{} 🎹", "Goodbye!".bright_cyan());
        Ok(())
    }
}

/// Convenience function to start the REPL
pub fn start(ctx: CommandContext) -> Result<()> {
    let mut repl = Repl::new(ctx).map_err(|e| anyhow!("Failed to initialize REPL: {}", e))?;
    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chordpad_core::types::player::PlayerState;
    use chordpad_core::{ProgressionDatabase, Session};

    fn repl() -> Repl {
        let ctx = CommandContext::new(Session::default(), ProgressionDatabase::builtin());
        Repl::new(ctx).unwrap()
    }

    #[test]
    fn test_chord_input_falls_through_to_player() {
        let mut repl = repl();
        assert_eq!(repl.handle_line("Cmaj7"), Flow::Continue);
        assert_eq!(
            repl.ctx.session.previous_voicing().unwrap().to_string(),
            "C4 E4 G4 B4"
        );

        assert_eq!(repl.handle_line("Dm7 G7 Cmaj7"), Flow::Continue);
        assert_eq!(repl.ctx.session.player().state(), PlayerState::AtIndex(0));
        assert_eq!(repl.handle_line("next"), Flow::Continue);
        assert_eq!(repl.ctx.session.player().index(), Some(1));
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let mut repl = repl();
        assert_eq!(repl.handle_line("H13"), Flow::Continue);
        assert_eq!(repl.handle_line("goto 3"), Flow::Continue);
        assert_eq!(repl.handle_line("quit"), Flow::Exit);
    }

    #[test]
    fn test_database_file_change_reloads() {
        let mut repl = repl();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        std::fs::write(&path, r#"{ "Extra": { "progressions": [ { "chords": ["C"] } ] } }"#)
            .unwrap();
        repl.ctx.database_paths.push(path.clone());

        let mut event = Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any));
        event.paths.push(path);
        repl.on_file_event(event);
        assert!(repl.ctx.database.song("Extra").is_some());
    }
}
