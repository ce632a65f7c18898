//! Event types for file change notifications.
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//! notify-debouncer-mini (debounce window)
//!        │
//!        ▼
//!   FileEventBatch ──► WatchSignal::Batch
//!        │
//!        ▼
//!   WatchSession (echo check, candidate filter, scheduler)
//! ```
//!
//! Event payloads are advisory. A regeneration pass always rescans the whole
//! candidate set, so the path and kind are only used to decide whether a
//! pass is needed and for logging.

use std::fmt;

use camino::Utf8PathBuf;
use smallvec::SmallVec;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileEventKind {
    /// The path was created.
    Added,
    /// The path was modified.
    Changed,
    /// The path was deleted.
    Removed,
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "add",
            Self::Changed => "change",
            Self::Removed => "remove",
        })
    }
}

/// A file change event with a UTF-8 path guarantee.
///
/// # Examples
///
/// ```
/// use qk_watcher::{FileEvent, FileEventKind};
///
/// let event = FileEvent::changed("src/app.ts");
/// assert_eq!(event.path.as_str(), "src/app.ts");
/// assert_eq!(event.kind, FileEventKind::Changed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// The path that changed, usually absolute.
    pub path: Utf8PathBuf,

    /// What happened to the path.
    pub kind: FileEventKind,
}

impl FileEvent {
    /// Creates an event.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, kind: FileEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Shorthand for an [`FileEventKind::Added`] event.
    #[inline]
    #[must_use]
    pub fn added(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(path, FileEventKind::Added)
    }

    /// Shorthand for a [`FileEventKind::Changed`] event.
    #[inline]
    #[must_use]
    pub fn changed(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(path, FileEventKind::Changed)
    }

    /// Shorthand for a [`FileEventKind::Removed`] event.
    #[inline]
    #[must_use]
    pub fn removed(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(path, FileEventKind::Removed)
    }
}

/// Events delivered together after one debounce window.
///
/// Most bursts touch only a handful of files, so up to 8 events are stored
/// inline.
#[derive(Debug, Clone, Default)]
pub struct FileEventBatch {
    /// The events in arrival order.
    pub events: SmallVec<[FileEvent; 8]>,
}

impl FileEventBatch {
    /// Returns `true` if the batch holds no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl From<FileEvent> for FileEventBatch {
    fn from(event: FileEvent) -> Self {
        std::iter::once(event).collect()
    }
}

impl FromIterator<FileEvent> for FileEventBatch {
    fn from_iter<T: IntoIterator<Item = FileEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileEventBatch {
    type Item = &'a FileEvent;
    type IntoIter = std::slice::Iter<'a, FileEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// One message from an event source.
#[derive(Debug, Clone)]
pub enum WatchSignal {
    /// A debounced batch of file events.
    Batch(FileEventBatch),
    /// The underlying watcher reported an internal error.
    Error(String),
}

impl From<FileEvent> for WatchSignal {
    fn from(event: FileEvent) -> Self {
        Self::Batch(event.into())
    }
}

impl From<FileEventBatch> for WatchSignal {
    fn from(batch: FileEventBatch) -> Self {
        Self::Batch(batch)
    }
}
