//! Candidate resolution and pattern extraction for qk-gen.
//!
//! A scan is a full, stateless pass: the candidate set is re-resolved from the
//! include/exclude globs, every candidate is read and parsed, and the patterns
//! found are returned as one [`PatternSet`].
//!
//! # Overview
//!
//! The main entry point is [`Scanner`], which combines:
//!
//! - [`FileMatcher`]: include/exclude globs compiled once per session
//! - [`FileWalker`]: directory traversal honouring `.gitignore`
//! - [`read_sources`]: concurrent file reads on the tokio runtime
//! - [`extract_patterns`]: parallel parsing with rayon
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qk_core::Config;
//! use qk_scanner::Scanner;
//!
//! let resolved = Arc::new(Config::default().resolve()?);
//! let scanner = Scanner::new(resolved)?;
//! let result = scanner.scan().await?;
//! println!("{} patterns in {} files", result.patterns.len(), result.files_scanned);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Scanner
//!     │
//!     ├── FileWalker (collect candidates, blocking pool)
//!     │       └── FileMatcher (globset)
//!     │
//!     ├── read_sources (tokio::fs, bounded concurrency)
//!     │
//!     └── extract_patterns (rayon map_init, one parser per thread)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod collector;
mod error;
mod matcher;
mod walker;

pub use collector::{SourceFile, extract_patterns, read_sources};
pub use error::ScanError;
pub use matcher::FileMatcher;
pub use walker::FileWalker;

use std::sync::Arc;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use qk_core::{PatternSet, ResolvedConfig};
use tracing::debug;

/// Result of one scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Patterns passed directly to marker calls, deduplicated.
    pub patterns: PatternSet,
    /// Number of candidate files that were read and parsed.
    pub files_scanned: usize,
    /// Per-file errors; all are recoverable.
    pub errors: Vec<ScanError>,
    /// Wall-clock time of the scan.
    pub elapsed: Duration,
}

/// Resolves candidates and extracts patterns.
///
/// `Scanner` is cheaply cloneable; clones share the configuration and the
/// compiled globs.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: Arc<ResolvedConfig>,
    matcher: Arc<FileMatcher>,
    walker: FileWalker,
}

impl Scanner {
    /// Creates a scanner, compiling the configured globs.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Config`] if a glob does not compile.
    pub fn new(config: Arc<ResolvedConfig>) -> Result<Self, ScanError> {
        let matcher = Arc::new(FileMatcher::new(&config)?);
        let walker = FileWalker::new(Arc::clone(&matcher), config.respect_gitignore);
        Ok(Self {
            config,
            matcher,
            walker,
        })
    }

    /// The compiled include/exclude matcher.
    #[inline]
    #[must_use]
    pub fn matcher(&self) -> &Arc<FileMatcher> {
        &self.matcher
    }

    /// The configuration this scanner was built from.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Arc<ResolvedConfig> {
        &self.config
    }

    /// Walks the root and returns the current candidate set, sorted.
    ///
    /// Blocks on file-system I/O.
    #[must_use]
    pub fn candidates(&self) -> Vec<Utf8PathBuf> {
        self.walker.collect_paths()
    }

    /// Runs a full scan.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Task`] if a blocking task panics. Per-file read
    /// and parse failures are reported in [`ScanResult::errors`].
    pub async fn scan(&self) -> Result<ScanResult, ScanError> {
        let start = Instant::now();

        let walker = self.walker.clone();
        let paths = tokio::task::spawn_blocking(move || walker.collect_paths()).await?;
        debug!(count = paths.len(), "Resolved candidate files");

        let (files, mut errors) = read_sources(paths).await;
        let files_scanned = files.len();

        let markers = self.config.function_names.clone();
        let (patterns, parse_errors) =
            tokio::task::spawn_blocking(move || extract_patterns(&files, &markers)).await?;
        errors.extend(parse_errors);

        let patterns: PatternSet = patterns.into_iter().collect();
        let elapsed = start.elapsed();
        debug!(
            files = files_scanned,
            patterns = patterns.len(),
            errors = errors.len(),
            elapsed_ms = elapsed.as_millis(),
            "Scan complete"
        );

        Ok(ScanResult {
            patterns,
            files_scanned,
            errors,
            elapsed,
        })
    }
}
