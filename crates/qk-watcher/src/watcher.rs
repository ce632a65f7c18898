//! File watcher with async event streaming.
//!
//! This module provides the [`FileWatcher`] type that bridges the synchronous
//! `notify` file watching crate to the async tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Blocking Thread (spawn_blocking)             │
//! │  ┌───────────────────┐   ┌────────────────┐   ┌─────────────┐  │
//! │  │ RecommendedWatcher│ ->│ Debouncer      │ ->│ Callback    │  │
//! │  │ (notify)          │   │ (debounce_ms)  │   │ (filtering) │  │
//! │  └───────────────────┘   └────────────────┘   └──────┬──────┘  │
//! └──────────────────────────────────────────────────────│─────────┘
//!                                                        │
//!                                          blocking_send │
//!                                                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌────────────────┐                     │
//! │  │ FileWatcher      │    │ mpsc::Receiver │ -> WatchSession     │
//! │  │ (shutdown ctrl)  │    │ (WatchSignal)  │                     │
//! │  └──────────────────┘    └────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use qk_core::Config;
//! use qk_scanner::Scanner;
//! use qk_watcher::{CandidateFilter, FileWatcher, WatchSignal};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::default().resolve()?);
//! let scanner = Scanner::new(Arc::clone(&config))?;
//! let filter = CandidateFilter::new(Arc::clone(scanner.matcher()));
//! let mut watcher = FileWatcher::new(&config.root, &config.watch, filter).await?;
//!
//! while let Some(signal) = watcher.recv().await {
//!     if let WatchSignal::Batch(batch) = signal {
//!         for event in &batch {
//!             println!("{} {}", event.kind, event.path);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use qk_core::WatchConfig;

use crate::error::WatchError;
use crate::events::{FileEvent, FileEventBatch, FileEventKind, WatchSignal};
use crate::filter::FileFilter;

/// Default channel capacity for watch signals.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// A recursive file watcher that streams debounced batches to async code.
///
/// # Lifecycle
///
/// 1. **Creation**: [`FileWatcher::new`] validates the path, spawns a
///    blocking task running the notify debouncer, and waits until the
///    watch is registered. Registration failures are returned here.
///
/// 2. **Reception**: [`recv`](Self::recv) yields [`WatchSignal`]s. Batches
///    are already filtered.
///
/// 3. **Shutdown**: call [`shutdown`](Self::shutdown), or drop the watcher.
///    Dropping sends the shutdown signal without waiting.
pub struct FileWatcher {
    /// Set to `None` once shutdown is initiated.
    shutdown_tx: Option<oneshot::Sender<()>>,

    task_handle: Option<JoinHandle<()>>,

    signal_rx: mpsc::Receiver<WatchSignal>,

    watch_path: Utf8PathBuf,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_path", &self.watch_path)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Starts watching `path` recursively.
    ///
    /// # Errors
    ///
    /// - [`WatchError::PathNotFound`] if the path doesn't exist
    /// - [`WatchError::Io`] if it cannot be canonicalised
    /// - [`WatchError::Notify`] if the watcher fails to initialize
    /// - [`WatchError::ChannelClosed`] if the watcher thread died during startup
    pub async fn new<F: FileFilter>(path: &Utf8Path, config: &WatchConfig, filter: F) -> Result<Self, WatchError> {
        Self::with_capacity(path, config, filter, DEFAULT_CHANNEL_CAPACITY).await
    }

    /// Like [`new`](Self::new) with a custom signal channel capacity.
    ///
    /// A larger channel absorbs bursts without blocking the watcher thread.
    pub async fn with_capacity<F: FileFilter>(
        path: &Utf8Path,
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if !path.exists() {
            return Err(WatchError::path_not_found(path));
        }
        let watch_path = path.canonicalize_utf8()?;

        let (signal_tx, signal_rx) = mpsc::channel(channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let task_path = watch_path.clone();
        let debounce = Duration::from_millis(config.debounce_ms);
        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(&task_path, debounce, signal_tx, shutdown_rx, ready_tx, filter);
        });

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                let _ = task_handle.await;
                return Err(error);
            }
            Err(_) => return Err(WatchError::ChannelClosed),
        }

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            signal_rx,
            watch_path,
        })
    }

    /// Receives the next signal.
    ///
    /// Returns `None` once the watcher has shut down.
    pub async fn recv(&mut self) -> Option<WatchSignal> {
        self.signal_rx.recv().await
    }

    /// The canonical path being watched.
    #[must_use]
    pub fn watch_path(&self) -> &Utf8Path {
        &self.watch_path
    }

    /// Returns `true` until shutdown is initiated or the watcher thread exits.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for its thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::ChannelClosed`] if the watcher thread panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.task_handle.take() {
            handle.await.map_err(|_| WatchError::ChannelClosed)?;
        }
        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the notify debouncer until shutdown.
///
/// Called from `spawn_blocking`. Readiness (or the startup error) is reported
/// through `ready_tx` before blocking on `shutdown_rx`.
fn run_watcher_loop<F: FileFilter>(
    path: &Utf8Path,
    debounce: Duration,
    signal_tx: mpsc::Sender<WatchSignal>,
    shutdown_rx: oneshot::Receiver<()>,
    ready_tx: oneshot::Sender<Result<(), WatchError>>,
    filter: F,
) {
    let debouncer = match start_debouncer(path, debounce, signal_tx, filter) {
        Ok(debouncer) => debouncer,
        Err(error) => {
            let _ = ready_tx.send(Err(error));
            return;
        }
    };
    if ready_tx.send(Ok(())).is_err() {
        return;
    }

    tracing::info!(path = %path, debounce_ms = debounce.as_millis(), "File watcher started");

    let _ = shutdown_rx.blocking_recv();
    drop(debouncer);

    tracing::info!(path = %path, "File watcher stopped");
}

fn start_debouncer<F: FileFilter>(
    path: &Utf8Path,
    debounce: Duration,
    signal_tx: mpsc::Sender<WatchSignal>,
    filter: F,
) -> Result<Debouncer<notify::RecommendedWatcher>, WatchError> {
    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
        let signal = match result {
            Ok(events) => {
                let batch: FileEventBatch = events
                    .into_iter()
                    .filter_map(|event| {
                        let path = match Utf8PathBuf::try_from(event.path) {
                            Ok(path) => path,
                            Err(error) => {
                                tracing::warn!(
                                    path = %error.into_path_buf().display(),
                                    "Skipping non-UTF-8 path in file event"
                                );
                                return None;
                            }
                        };
                        if !filter.should_process(&path) {
                            tracing::trace!(path = %path, "Filtered out file event");
                            return None;
                        }
                        let kind = if path.exists() {
                            FileEventKind::Changed
                        } else {
                            FileEventKind::Removed
                        };
                        Some(FileEvent::new(path, kind))
                    })
                    .collect();
                if batch.is_empty() {
                    return;
                }
                WatchSignal::Batch(batch)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Debouncer error");
                WatchSignal::Error(error.to_string())
            }
        };

        if signal_tx.blocking_send(signal).is_err() {
            tracing::debug!("Signal channel closed, dropping file events");
        }
    })?;

    debouncer.watcher().watch(path.as_std_path(), RecursiveMode::Recursive)?;
    Ok(debouncer)
}
