//! Event sources a session can be driven by.

use std::future::Future;

use tokio::sync::mpsc;

use crate::events::WatchSignal;
use crate::watcher::FileWatcher;

/// A stream of [`WatchSignal`]s.
///
/// Implemented by [`FileWatcher`] for live sessions and by
/// `mpsc::Receiver<WatchSignal>` for simulated ones. `None` means the source
/// is exhausted and the session should stop accepting events.
pub trait EventSource: Send {
    /// Waits for the next signal.
    fn next_signal(&mut self) -> impl Future<Output = Option<WatchSignal>> + Send;
}

impl EventSource for FileWatcher {
    fn next_signal(&mut self) -> impl Future<Output = Option<WatchSignal>> + Send {
        self.recv()
    }
}

impl EventSource for mpsc::Receiver<WatchSignal> {
    fn next_signal(&mut self) -> impl Future<Output = Option<WatchSignal>> + Send {
        self.recv()
    }
}
