//! File watching for rebuild-on-change.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Quiet period used to coalesce bursts of events (editor saves, git checkouts).
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// File was created or modified
    Changed(PathBuf),

    /// File was deleted
    Removed(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(path) | Self::Removed(path) => path,
        }
    }
}

/// Decides which filesystem events under a watched root matter.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: PathBuf,
    ignored: Vec<PathBuf>,
}

impl WatchFilter {
    /// `ignored` directories are matched by prefix; typically the output directory.
    pub fn new(root: impl Into<PathBuf>, ignored: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignored,
        }
    }

    /// Classify a notify event for `path`, or `None` if it should not trigger a rebuild.
    pub fn classify(&self, path: &Path, kind: &EventKind) -> Option<WatchEvent> {
        if self.ignored.iter().any(|dir| path.starts_with(dir)) {
            return None;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let skipped = relative.components().any(|component| match component {
            Component::Normal(name) => {
                let name = name.to_string_lossy();
                name.starts_with('.') || name.ends_with('~') || name == "node_modules"
            }
            _ => false,
        });
        if skipped {
            return None;
        }

        match kind {
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Create(_) | EventKind::Modify(_) => Some(WatchEvent::Changed(path.to_path_buf())),
            EventKind::Remove(_) => Some(WatchEvent::Removed(path.to_path_buf())),
            _ => None,
        }
    }
}

/// Recursive watcher over a content root.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `root` recursively, ignoring anything under `ignored`.
    ///
    /// Returns the watcher and a channel to receive events. Events are
    /// delivered in batches separated by a short quiet period, with
    /// duplicate paths within a batch removed.
    pub fn new(
        root: &Path,
        ignored: &[PathBuf],
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let root = fs::canonicalize(root)?;
        let ignored = ignored
            .iter()
            .map(|dir| fs::canonicalize(dir).unwrap_or_else(|_| dir.clone()))
            .collect();
        let filter = WatchFilter::new(root.clone(), ignored);

        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            while let Ok(event) = sync_rx.recv() {
                let mut batch = vec![event];
                while let Ok(event) = sync_rx.recv_timeout(DEBOUNCE) {
                    batch.push(event);
                }

                let mut events: Vec<WatchEvent> = Vec::new();
                for event in &batch {
                    for path in &event.paths {
                        if let Some(e) = filter.classify(path, &event.kind) {
                            if !events.contains(&e) {
                                events.push(e);
                            }
                        }
                    }
                }

                for e in events {
                    if async_tx.blocking_send(e).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}
