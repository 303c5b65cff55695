//! # Chordpad
//!
//! Terminal front end for `chordpad-core`: an interactive shell that voices
//! chord symbols on an ASCII piano keyboard, steps through jazz
//! progressions, and sends each chord to a MIDI output port.
//!
//! ## Modules
//!
//! - `commands`: the longest-prefix command registry and its handlers.
//! - `keyboard`: ASCII keyboard rendering of a voicing.
//! - `midi`: MIDI output on a worker thread, via midir.
//! - `repl`: the read-eval-print loop and the database file watcher.

pub mod commands;
pub mod keyboard;
pub mod midi;
pub mod repl;

pub use crate::commands::{create_registry, CommandContext, CommandResult};
pub use crate::midi::MidiOutputHandle;
