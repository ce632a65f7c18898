//! Error types for the qk-core crate.
//!
//! This module provides the [`ConfigError`] type for configuration-related errors.
//! Every variant is fatal: configuration problems are reported to the caller at
//! session start and the core makes no attempt to guess the intended value.

use camino::Utf8PathBuf;

/// Errors that can occur while loading, merging, or resolving configuration.
///
/// # Examples
///
/// ```
/// use qk_core::ConfigError;
///
/// let error = ConfigError::InvalidGlob {
///     pattern: "src/**/[".to_owned(),
///     reason: "unclosed character class".to_owned(),
/// };
/// assert!(error.to_string().contains("src/**/["));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The provided path is invalid or malformed.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath {
        /// The invalid path.
        path: Utf8PathBuf,
        /// Explanation of why the path is invalid.
        reason: String,
    },

    /// The project root does not exist or is not a directory.
    #[error("missing required directory: {0}")]
    MissingDirectory(Utf8PathBuf),

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An include or exclude glob could not be compiled.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidGlob {
        /// The offending glob.
        pattern: String,
        /// The compiler's explanation.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        /// The file that could not be parsed.
        path: Utf8PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidOption`] error.
    #[inline]
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::InvalidPath { path, .. }
            | Self::Io { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingDirectory(path) => Some(path),
            Self::InvalidOption { .. } | Self::InvalidGlob { .. } => None,
        }
    }
}
