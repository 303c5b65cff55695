//! Recovered conditions. None of these stop the program; they are reported
//! to the caller and recorded in the action log.

use std::fmt;

/// Which fallback rule resolved an unrecognised suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FallbackRule {
    StripAlteration,
    LongestPrefix,
    MajorTriad,
}

impl fmt::Display for FallbackRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackRule::StripAlteration => write!(f, "strip alteration"),
            FallbackRule::LongestPrefix => write!(f, "longest prefix"),
            FallbackRule::MajorTriad => write!(f, "major triad"),
        }
    }
}

/// An unrecognised chord symbol was resolved to a nearby chord
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallbackApplied {
    /// The symbol as typed
    pub symbol: String,
    /// Canonical symbol of the chord actually produced
    pub resolved: String,
    pub rule: FallbackRule,
    /// Alteration tokens recognised and kept as extensions
    pub stripped: Vec<String>,
    /// Suffix text that was ignored
    pub dropped: Option<String>,
}

impl fmt::Display for FallbackApplied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' resolved to '{}' ({})",
            self.symbol, self.resolved, self.rule
        )?;
        if !self.stripped.is_empty() {
            write!(f, ", alterations {}", self.stripped.join(","))?;
        }
        if let Some(dropped) = &self.dropped {
            write!(f, ", ignored '{}'", dropped)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClampKind {
    /// Moved by one octave back inside the range
    Wrapped,
    /// Still outside after one octave, pinned to the range edge
    Clamped,
    /// A drop-2 note that would have left the range was kept in place
    DropSkipped,
}

/// A voicing pitch fell outside the keyboard range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeClamp {
    /// Requested MIDI number
    pub pitch: i16,
    /// MIDI number actually used
    pub clamped_to: i16,
    pub kind: ClampKind,
}

impl fmt::Display for RangeClamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ClampKind::Wrapped => write!(
                f,
                "MIDI {} outside keyboard, wrapped to {}",
                self.pitch, self.clamped_to
            ),
            ClampKind::Clamped => write!(
                f,
                "MIDI {} outside keyboard, clamped to {}",
                self.pitch, self.clamped_to
            ),
            ClampKind::DropSkipped => write!(
                f,
                "drop-2 note MIDI {} would leave keyboard, kept at {}",
                self.pitch, self.clamped_to
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    FallbackApplied(FallbackApplied),
    RangeClamp(RangeClamp),
}

impl From<FallbackApplied> for Diagnostic {
    fn from(fallback: FallbackApplied) -> Self {
        Diagnostic::FallbackApplied(fallback)
    }
}

impl From<RangeClamp> for Diagnostic {
    fn from(clamp: RangeClamp) -> Self {
        Diagnostic::RangeClamp(clamp)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FallbackApplied(d) => write!(f, "fallback: {}", d),
            Diagnostic::RangeClamp(d) => write!(f, "range: {}", d),
        }
    }
}
