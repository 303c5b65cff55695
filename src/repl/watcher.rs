use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches database files. notify runs its own thread and sends events
/// to the channel.
pub struct DatabaseWatcher {
    watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl DatabaseWatcher {
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone only when the REPL is shutting down
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            watched: Vec::new(),
        })
    }

    /// Start watching `path`. Returns false if it was already watched.
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<bool> {
        let path = path.as_ref();
        if self.watched.iter().any(|p| p == path) {
            return Ok(false);
        }
        self.watcher.watch(path, RecursiveMode::NonRecursive)?;
        self.watched.push(path.to_path_buf());
        tracing::info!(path = %path.display(), "watching database file");
        Ok(true)
    }

    pub fn unwatch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let path = path.as_ref();
        self.watcher.unwatch(path)?;
        self.watched.retain(|p| p != path);
        Ok(())
    }

    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

/// Writes and newly created files; other events (access, metadata) are noise
pub fn is_content_change(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    #[test]
    fn test_content_changes() {
        assert!(is_content_change(&Event::new(EventKind::Modify(
            ModifyKind::Any
        ))));
        assert!(is_content_change(&Event::new(EventKind::Create(
            CreateKind::File
        ))));
        assert!(!is_content_change(&Event::new(EventKind::Access(
            AccessKind::Any
        ))));
    }

    #[test]
    fn test_watch_once() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut watcher = DatabaseWatcher::new(tx).unwrap();

        assert!(watcher.watch(file.path()).unwrap());
        assert!(!watcher.watch(file.path()).unwrap());
        assert_eq!(watcher.watched().len(), 1);

        watcher.unwatch(file.path()).unwrap();
        assert!(watcher.watched().is_empty());
    }
}
