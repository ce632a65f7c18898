//! Error types for the qk-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while starting or running a watch session.

use camino::Utf8PathBuf;
use qk_scanner::ScanError;

/// Errors that can occur while setting up file watching.
///
/// Everything here is reported at session start. Once a session is running,
/// watcher failures are delivered as [`WatchSignal::Error`](crate::WatchSignal)
/// and logged rather than returned.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal - the watcher could not start
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - path must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): Fatal - the watcher thread is gone
/// - **Scan setup** ([`WatchError::Scan`]): Fatal - globs did not compile
/// - **I/O errors** ([`WatchError::Io`]): Fatal - propagate immediately
///
/// # Examples
///
/// ```
/// use qk_watcher::WatchError;
/// use camino::Utf8PathBuf;
///
/// let error = WatchError::path_not_found("/missing/project");
/// assert!(error.is_fatal());
/// assert_eq!(error.path().map(|p| p.as_str()), Some("/missing/project"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The specified path does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The watcher thread exited before reporting readiness or panicked.
    #[error("watcher thread stopped unexpectedly")]
    ChannelClosed,

    /// The scanner could not be built from the configuration.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// An I/O error occurred while validating the watch path.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Returns `true` if the session can continue after this error.
    ///
    /// Setup errors never are; the method exists so callers can treat
    /// every error type in the workspace the same way.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }

    /// Returns `true` if this error should stop the session from starting.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) => Some(path),
            Self::Scan(error) => error.path(),
            Self::Notify(_) | Self::ChannelClosed | Self::Io(_) => None,
        }
    }
}
