//! Error types for the qk-scanner crate.

use camino::Utf8PathBuf;
use qk_core::ConfigError;

/// Errors that can occur during scanning operations.
///
/// # Error Recovery Strategy
///
/// - **File read errors** ([`ScanError::Read`]): log warning, skip file, continue
/// - **Parse errors** ([`ScanError::Parse`]): log warning, skip file, continue
/// - **Configuration errors** ([`ScanError::Config`]): fatal at session start
/// - **Walk and task errors**: fatal for the pass
///
/// # Examples
///
/// ```
/// use qk_scanner::ScanError;
///
/// let err = ScanError::read("src/a.ts", std::io::Error::other("denied"));
/// assert!(err.is_recoverable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk the project root.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a source file.
    #[error("failed to parse file {path}: {source}")]
    Parse {
        /// The path of the file that couldn't be parsed.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: qk_ts_parser::ParseError,
    },

    /// Invalid configuration, such as a glob that does not compile.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A background task panicked or was cancelled.
    #[error("scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: qk_ts_parser::ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error is recoverable (scanning can continue).
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }

    /// Returns `true` if this error is fatal.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } => Some(path),
            Self::Config(error) => error.path(),
            Self::Walk(_) | Self::Task(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_scan_error_read() {
        let err = ScanError::read("src/foo.ts", io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/foo.ts"));
        assert!(err.to_string().contains("src/foo.ts"));
    }

    #[test]
    fn test_scan_error_parse() {
        let err = ScanError::parse("src/bar.ts", qk_ts_parser::ParseError::Parse);
        assert!(err.is_recoverable());
        assert_eq!(err.path().map(|p| p.as_str()), Some("src/bar.ts"));
    }

    #[test]
    fn test_scan_error_config_is_fatal() {
        let err = ScanError::from(ConfigError::InvalidGlob {
            pattern: "[".to_owned(),
            reason: "unclosed class".to_owned(),
        });
        assert!(err.is_fatal());
        assert!(err.path().is_none());
        assert_eq!(err.to_string(), "invalid glob pattern '[': unclosed class");
    }
}
