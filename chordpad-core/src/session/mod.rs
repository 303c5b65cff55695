//! Application state: voicing mode, player position, the previous voicing
//! for smooth voice leading, and the action log

pub mod action_log;
pub mod config;

pub use action_log::{ActionLog, LogEntry, LogEvent};
pub use config::{ConfigError, SessionConfig};

use crate::diagnostic::{Diagnostic, FallbackApplied};
use crate::parser::chord_parser::parse_chord;
use crate::parser::error::ChordError;
use crate::types::chord::Chord;
use crate::types::player::{PlayerState, ProgressionPlayer};
use crate::types::progression::Progression;
use crate::types::voice_leading::movement;
use crate::types::voicing::{Voiced, Voicing, VoicingGenerator, VoicingMode};

/// Everything produced by sounding one chord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordReport {
    pub chord: Chord,
    pub mode: VoicingMode,
    pub voicing: Voicing,
    pub diagnostics: Vec<Diagnostic>,
    /// Semitones moved from the previous voicing, if there was one
    pub movement: Option<u32>,
    /// (index, length) when the chord comes from the loaded progression
    pub position: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    generator: VoicingGenerator,
    mode: VoicingMode,
    player: ProgressionPlayer,
    previous: Option<Voicing>,
    log: ActionLog,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Session {
            generator: config.generator(),
            mode: config.default_voicing,
            player: ProgressionPlayer::new(),
            previous: None,
            log: ActionLog::with_capacity(config.log_capacity),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn generator(&self) -> &VoicingGenerator {
        &self.generator
    }

    pub fn mode(&self) -> VoicingMode {
        self.mode
    }

    pub fn player(&self) -> &ProgressionPlayer {
        &self.player
    }

    pub fn previous_voicing(&self) -> Option<&Voicing> {
        self.previous.as_ref()
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ActionLog {
        &mut self.log
    }

    /// Switch voicing mode. Returns false if it was already active.
    pub fn set_mode(&mut self, mode: VoicingMode) -> bool {
        if mode == self.mode {
            return false;
        }
        self.log.record(LogEvent::ModeChanged {
            from: self.mode,
            to: mode,
        });
        self.mode = mode;
        true
    }

    /// Parse and voice a chord symbol. A parse failure is logged and returned.
    pub fn play_symbol(&mut self, symbol: &str) -> Result<ChordReport, ChordError> {
        match parse_chord(symbol) {
            Ok(parsed) => Ok(self.sound(parsed.chord, parsed.fallback, None)),
            Err(err) => {
                let reason = match &err {
                    ChordError::ParseFailure { reason, .. } => reason.clone(),
                };
                self.log.record(LogEvent::ParseFailure {
                    symbol: symbol.trim().to_string(),
                    reason,
                });
                Err(err)
            }
        }
    }

    pub fn play_chord(&mut self, chord: Chord) -> ChordReport {
        self.sound(chord, None, None)
    }

    /// Voicings of every mode for `chord`, relative to the previous voicing.
    /// Nothing is recorded.
    pub fn compare(&self, chord: &Chord) -> Vec<(VoicingMode, Voiced)> {
        self.generator.compare(chord, self.previous.as_ref())
    }

    /// Load a progression and sound its first chord. Fallbacks met while
    /// parsing it are logged. The previous voicing is forgotten so the
    /// progression starts from a root voicing.
    pub fn load(
        &mut self,
        progression: Progression,
        fallbacks: Vec<FallbackApplied>,
    ) -> Option<ChordReport> {
        for fallback in fallbacks {
            self.log.record(LogEvent::Fallback(fallback));
        }
        self.log.record(LogEvent::ProgressionLoaded {
            name: progression.name().to_string(),
            chords: progression.len(),
        });

        self.previous = None;
        match self.player.load(progression) {
            PlayerState::AtIndex(_) => self.sound_current(),
            _ => None,
        }
    }

    /// Step forward. At the last chord nothing moves and `None` is returned.
    pub fn next(&mut self) -> Option<ChordReport> {
        if self.player.next() {
            self.sound_current()
        } else {
            if self.player.index().is_some() {
                self.log.record(LogEvent::BoundaryReached { at_end: true });
            }
            None
        }
    }

    /// Step back. At the first chord nothing moves and `None` is returned.
    pub fn prev(&mut self) -> Option<ChordReport> {
        if self.player.prev() {
            self.sound_current()
        } else {
            if self.player.index().is_some() {
                self.log.record(LogEvent::BoundaryReached { at_end: false });
            }
            None
        }
    }

    pub fn jump(&mut self, index: usize) -> Option<ChordReport> {
        if self.player.jump(index) {
            self.sound_current()
        } else {
            None
        }
    }

    pub fn current(&self) -> Option<Chord> {
        self.player.current()
    }

    pub fn unload(&mut self) -> Option<Progression> {
        let progression = self.player.unload()?;
        self.log.record(LogEvent::ProgressionUnloaded {
            name: progression.name().to_string(),
        });
        Some(progression)
    }

    /// Forget the previous voicing so the next smooth voicing starts fresh
    pub fn reset_voicing(&mut self) {
        self.previous = None;
        self.log.record(LogEvent::VoicingReset);
    }

    fn sound_current(&mut self) -> Option<ChordReport> {
        let index = self.player.index()?;
        let len = self.player.progression()?.len();
        let chord = self.player.current()?;
        self.log.record(LogEvent::Position {
            index,
            len,
            symbol: chord.symbol(),
        });
        Some(self.sound(chord, None, Some((index, len))))
    }

    fn sound(
        &mut self,
        chord: Chord,
        fallback: Option<FallbackApplied>,
        position: Option<(usize, usize)>,
    ) -> ChordReport {
        let Voiced { voicing, clamps } =
            self.generator
                .voice(&chord, self.mode, self.previous.as_ref());
        let movement = self.previous.as_ref().map(|prev| movement(prev, &voicing));
        let symbol = chord.symbol();

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        diagnostics.extend(fallback.map(Diagnostic::from));
        diagnostics.extend(clamps.into_iter().map(Diagnostic::from));
        for diagnostic in &diagnostics {
            self.log
                .record(LogEvent::from_diagnostic(&symbol, diagnostic.clone()));
        }

        self.log.record(LogEvent::ChordPlayed {
            symbol,
            mode: self.mode,
            notes: voicing.to_string(),
        });
        self.previous = Some(voicing.clone());

        ChordReport {
            chord,
            mode: self.mode,
            voicing,
            diagnostics,
            movement,
            position,
        }
    }
}
