use crate::types::chord::Chord;
use crate::types::progression::Progression;
use std::fmt;

/// Where the player is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing loaded
    Empty,
    /// A progression with no chords is loaded
    Loaded,
    /// Positioned on a chord
    AtIndex(usize),
}

/// Steps through a loaded progression one chord at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionPlayer {
    progression: Option<Progression>,
    state: PlayerState,
}

impl Default for ProgressionPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressionPlayer {
    pub fn new() -> Self {
        ProgressionPlayer {
            progression: None,
            state: PlayerState::Empty,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn progression(&self) -> Option<&Progression> {
        self.progression.as_ref()
    }

    /// Load a progression, replacing any current one, and move to its first chord
    pub fn load(&mut self, progression: Progression) -> PlayerState {
        self.state = if progression.is_empty() {
            PlayerState::Loaded
        } else {
            PlayerState::AtIndex(0)
        };
        self.progression = Some(progression);
        self.state
    }

    pub fn unload(&mut self) -> Option<Progression> {
        self.state = PlayerState::Empty;
        self.progression.take()
    }

    /// Advance one chord. Returns false at the last chord or when nothing
    /// is positioned.
    pub fn next(&mut self) -> bool {
        match (self.state, self.len()) {
            (PlayerState::AtIndex(i), len) if i + 1 < len => {
                self.state = PlayerState::AtIndex(i + 1);
                true
            }
            _ => false,
        }
    }

    /// Step back one chord. Returns false at the first chord.
    pub fn prev(&mut self) -> bool {
        match self.state {
            PlayerState::AtIndex(i) if i > 0 => {
                self.state = PlayerState::AtIndex(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Jump to `index` if it names a chord of the loaded progression
    pub fn jump(&mut self, index: usize) -> bool {
        if index < self.len() {
            self.state = PlayerState::AtIndex(index);
            true
        } else {
            false
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            PlayerState::AtIndex(i) => Some(i),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<Chord> {
        let index = self.index()?;
        self.progression.as_ref()?.get(index)
    }

    fn len(&self) -> usize {
        self.progression.as_ref().map_or(0, Progression::len)
    }

    pub fn is_at_end(&self) -> bool {
        matches!(self.state, PlayerState::AtIndex(i) if i + 1 == self.len())
    }
}

impl fmt::Display for ProgressionPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.progression, self.state) {
            (Some(p), PlayerState::AtIndex(i)) => {
                write!(f, "{} [{}/{}]", p.name(), i + 1, p.len())?;
                if let Some(chord) = p.get(i) {
                    write!(f, " {}", chord)?;
                }
                Ok(())
            }
            (Some(p), _) => write!(f, "{} (no chords)", p.name()),
            (None, _) => write!(f, "no progression loaded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression(symbols: &[&str]) -> Progression {
        Progression::from_symbols("test", symbols).unwrap().0
    }

    #[test]
    fn test_starts_empty() {
        let mut player = ProgressionPlayer::new();
        assert_eq!(player.state(), PlayerState::Empty);
        assert!(!player.next());
        assert!(!player.prev());
        assert!(!player.jump(0));
        assert_eq!(player.current(), None);
    }

    #[test]
    fn test_load_and_step() {
        let mut player = ProgressionPlayer::new();
        assert_eq!(
            player.load(progression(&["Dm7", "G7", "Cmaj7"])),
            PlayerState::AtIndex(0)
        );
        assert_eq!(player.current().unwrap().symbol(), "Dm7");

        assert!(player.next());
        assert!(player.next());
        assert!(player.is_at_end());
        assert!(!player.next());
        assert_eq!(player.state(), PlayerState::AtIndex(2));

        assert!(player.prev());
        assert_eq!(player.current().unwrap().symbol(), "G7");
    }

    #[test]
    fn test_prev_clamps_at_start() {
        let mut player = ProgressionPlayer::new();
        player.load(progression(&["C", "F"]));
        assert!(!player.prev());
        assert_eq!(player.state(), PlayerState::AtIndex(0));
    }

    #[test]
    fn test_empty_progression_is_loaded_state() {
        let mut player = ProgressionPlayer::new();
        assert_eq!(player.load(progression(&[])), PlayerState::Loaded);
        assert!(!player.next());
        assert_eq!(player.current(), None);
    }

    #[test]
    fn test_jump_and_unload() {
        let mut player = ProgressionPlayer::new();
        player.load(progression(&["C", "Am", "F", "G"]));
        assert!(player.jump(3));
        assert_eq!(player.current().unwrap().symbol(), "G");
        assert!(!player.jump(4));
        assert_eq!(player.index(), Some(3));

        let unloaded = player.unload();
        assert!(unloaded.is_some());
        assert_eq!(player.state(), PlayerState::Empty);
    }
}
