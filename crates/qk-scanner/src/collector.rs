//! Reading and parsing of candidate files.
//!
//! Reads are issued concurrently on the async runtime; parsing is CPU-bound
//! and runs on rayon with one [`PatternExtractor`] per worker thread.

use camino::Utf8PathBuf;
use futures_util::StreamExt;
use futures_util::stream;
use qk_core::Pattern;
use qk_ts_parser::{ParseError, PatternExtractor};
use rayon::prelude::*;

use crate::error::ScanError;

/// Maximum number of files read at once.
const READ_CONCURRENCY: usize = 64;

/// A file read into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path.
    pub path: Utf8PathBuf,
    /// Content, with invalid UTF-8 sequences replaced by U+FFFD.
    pub content: String,
}

/// Reads every path concurrently.
///
/// Files that fail to read (deleted since the walk, permission denied) are
/// returned as recoverable errors instead of aborting. Invalid UTF-8 is
/// decoded lossily rather than treated as a read failure.
pub async fn read_sources(paths: Vec<Utf8PathBuf>) -> (Vec<SourceFile>, Vec<ScanError>) {
    let results: Vec<Result<SourceFile, ScanError>> = stream::iter(paths)
        .map(|path| async move {
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(SourceFile {
                    content: decode(bytes),
                    path,
                }),
                Err(source) => Err(ScanError::read(path, source)),
            }
        })
        .buffer_unordered(READ_CONCURRENCY)
        .collect()
        .await;

    let mut files = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(file) => files.push(file),
            Err(error) => {
                tracing::warn!(path = ?error.path(), error = %error, "Skipping unreadable file");
                errors.push(error);
            }
        }
    }
    (files, errors)
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    }
}

/// Extracts marker patterns from `files` in parallel.
///
/// Returns the patterns of all files (duplicates included, order unspecified)
/// and any per-file parse errors.
#[must_use]
pub fn extract_patterns(files: &[SourceFile], markers: &[String]) -> (Vec<Pattern>, Vec<ScanError>) {
    let results: Vec<Result<Vec<Pattern>, ScanError>> = files
        .par_iter()
        .map_init(
            || PatternExtractor::new().ok(),
            |extractor, file| {
                let extractor = extractor
                    .as_mut()
                    .ok_or_else(|| ScanError::parse(file.path.clone(), ParseError::LanguageInit))?;
                extractor
                    .parse_file(&file.path, &file.content, markers)
                    .map(|parsed| parsed.calls.into_iter().map(|call| call.pattern).collect())
                    .map_err(|source| ScanError::parse(file.path.clone(), source))
            },
        )
        .collect();

    let mut patterns = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(found) => patterns.extend(found),
            Err(error) => {
                tracing::warn!(path = ?error.path(), error = %error, "Skipping unparseable file");
                errors.push(error);
            }
        }
    }
    (patterns, errors)
}
