use crate::diagnostic::{Diagnostic, FallbackApplied, RangeClamp};
use crate::types::voicing::VoicingMode;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;
use tracing::Level;

/// Something the user did, or something the program recovered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    ChordPlayed {
        symbol: String,
        mode: VoicingMode,
        notes: String,
    },
    Fallback(FallbackApplied),
    RangeClamp {
        symbol: String,
        clamp: RangeClamp,
    },
    ParseFailure {
        symbol: String,
        reason: String,
    },
    ModeChanged {
        from: VoicingMode,
        to: VoicingMode,
    },
    ProgressionLoaded {
        name: String,
        chords: usize,
    },
    ProgressionUnloaded {
        name: String,
    },
    Position {
        index: usize,
        len: usize,
        symbol: String,
    },
    BoundaryReached {
        at_end: bool,
    },
    VoicingReset,
    LogCleared {
        removed: usize,
    },
    Message(String),
}

impl LogEvent {
    /// Diagnostics become log events tied to the chord they concern
    pub fn from_diagnostic(symbol: &str, diagnostic: Diagnostic) -> Self {
        match diagnostic {
            Diagnostic::FallbackApplied(fallback) => LogEvent::Fallback(fallback),
            Diagnostic::RangeClamp(clamp) => LogEvent::RangeClamp {
                symbol: symbol.to_string(),
                clamp,
            },
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            LogEvent::Fallback(_) | LogEvent::RangeClamp { .. } | LogEvent::ParseFailure { .. }
        )
    }

    /// Level the event is traced at. Diagnostics are recovered or already
    /// reported to the caller, so they stay below the default `warn` filter.
    pub fn trace_level(&self) -> Level {
        if self.is_diagnostic() {
            Level::INFO
        } else {
            Level::DEBUG
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::ChordPlayed {
                symbol,
                mode,
                notes,
            } => write!(f, "Played {} ({}): {}", symbol, mode, notes),
            LogEvent::Fallback(fallback) => write!(f, "Fallback: {}", fallback),
            LogEvent::RangeClamp { symbol, clamp } => write!(f, "Range in {}: {}", symbol, clamp),
            LogEvent::ParseFailure { symbol, reason } => {
                write!(f, "Parse failure: '{}' ({})", symbol, reason)
            }
            LogEvent::ModeChanged { from, to } => {
                write!(f, "Voicing changed from '{}' to '{}'", from, to)
            }
            LogEvent::ProgressionLoaded { name, chords } => {
                write!(f, "Loaded progression {} ({} chords)", name, chords)
            }
            LogEvent::ProgressionUnloaded { name } => write!(f, "Unloaded progression {}", name),
            LogEvent::Position { index, len, symbol } => {
                write!(f, "Chord {}/{}: {}", index + 1, len, symbol)
            }
            LogEvent::BoundaryReached { at_end: true } => write!(f, "Reached end of progression"),
            LogEvent::BoundaryReached { at_end: false } => {
                write!(f, "Reached start of progression")
            }
            LogEvent::VoicingReset => write!(f, "Voicing state reset"),
            LogEvent::LogCleared { removed } => write!(f, "Log cleared ({} entries)", removed),
            LogEvent::Message(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub event: LogEvent,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.event
        )
    }
}

/// Timestamped history of the session, oldest first
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}

impl ActionLog {
    /// A log holding at most `capacity` entries; the oldest are dropped first
    pub fn with_capacity(capacity: usize) -> Self {
        ActionLog {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, event: LogEvent) {
        if event.trace_level() == Level::INFO {
            tracing::info!(%event);
        } else {
            tracing::debug!(%event);
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: Local::now(),
            event,
        });
    }

    pub fn message(&mut self, message: impl Into<String>) {
        self.record(LogEvent::Message(message.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The last `n` entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<&LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    /// Remove every entry, leaving a single note of the clear
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.record(LogEvent::LogCleared { removed });
    }

    /// One line per entry
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push_str(&entry.to_string());
            text.push('\n');
        }
        text
    }

    /// Write `to_text()` to a file
    pub fn export(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        crate::export::write_log(path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_recent() {
        let mut log = ActionLog::default();
        log.message("one");
        log.message("two");
        log.message("three");

        let recent: Vec<String> = log.recent(2).iter().map(|e| e.event.to_string()).collect();
        assert_eq!(recent, vec!["two", "three"]);
        assert_eq!(log.recent(10).len(), 3);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = ActionLog::with_capacity(2);
        log.message("a");
        log.message("b");
        log.message("c");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries().next().unwrap().event, LogEvent::Message("b".into()));
    }

    #[test]
    fn test_clear_leaves_marker() {
        let mut log = ActionLog::default();
        log.message("a");
        log.message("b");
        log.clear();
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.entries().next().unwrap().event,
            LogEvent::LogCleared { removed: 2 }
        );
    }

    #[test]
    fn test_diagnostics_trace_below_warn() {
        let parsed = crate::parser::parse_chord("G7alt").unwrap();
        let fallback = LogEvent::Fallback(parsed.fallback.unwrap());
        assert!(fallback.is_diagnostic());
        assert_eq!(fallback.trace_level(), Level::INFO);
        assert!(fallback.trace_level() > Level::WARN);

        assert_eq!(LogEvent::VoicingReset.trace_level(), Level::DEBUG);
    }

    #[test]
    fn test_text_format() {
        let mut log = ActionLog::default();
        log.record(LogEvent::ModeChanged {
            from: VoicingMode::Root,
            to: VoicingMode::Drop2,
        });
        let text = log.to_text();
        assert_eq!(text.lines().count(), 1);
        let line = text.lines().next().unwrap();
        assert!(line.starts_with('['));
        // "[YYYY-MM-DD HH:MM:SS] " prefix
        assert_eq!(&line[20..22], "] ");
        assert!(line.ends_with("Voicing changed from 'root' to 'drop2'"));
    }
}
