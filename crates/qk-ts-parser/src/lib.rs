//! Marker-call extraction for TypeScript and JavaScript sources.
//!
//! This crate finds calls such as `qk('users/$userId')` and returns the string
//! literal passed as the first argument.
//!
//! # Matching rules
//!
//! | Call | Extracted |
//! |------|-----------|
//! | `qk('a/b')` | `a/b` |
//! | `qk<T>("a/b", params)` | `a/b` |
//! | `obj.qk('a/b')` | no (member access) |
//! | ``qk(`a/b`)`` | no (template literal) |
//! | `qk(key)` | no (not a literal) |
//!
//! Aliases and re-exports of the marker function are not followed.
//!
//! # Overview
//!
//! ```
//! use camino::Utf8Path;
//! use qk_ts_parser::PatternExtractor;
//!
//! let mut extractor = PatternExtractor::new()?;
//! let patterns = extractor.scan(
//!     Utf8Path::new("src/posts.tsx"),
//!     "const k = qk('posts/$postId'); other('ignored');",
//!     &["qk".to_owned()],
//! );
//! assert_eq!(patterns.len(), 1);
//! assert_eq!(patterns[0].as_str(), "posts/$postId");
//! # Ok::<(), qk_ts_parser::ParseError>(())
//! ```
//!
//! # Thread Safety
//!
//! [`MarkerParser`] and [`PatternExtractor`] are `Send` but not `Sync`. Create
//! one per worker thread (for example with rayon's `map_init`). The compiled
//! queries are shared globally.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod dialect;
pub mod error;
mod extract;
mod literal;
mod parser;
pub mod queries;

pub use dialect::Dialect;
pub use error::ParseError;
pub use extract::{MarkerCall, extract_marker_calls};
pub use literal::decode_string_literal;
pub use parser::{MarkerParser, ParsedSource, PatternExtractor};

use camino::Utf8Path;
use qk_core::Pattern;

/// Returns the patterns passed to calls of `markers` in one file.
///
/// Convenience wrapper that builds a fresh [`PatternExtractor`]. Prefer reusing
/// an extractor when scanning many files.
///
/// # Errors
///
/// Returns [`ParseError::LanguageInit`] if a grammar cannot be loaded.
pub fn scan_source(path: &Utf8Path, content: &str, markers: &[String]) -> Result<Vec<Pattern>, ParseError> {
    Ok(PatternExtractor::new()?.scan(path, content, markers))
}
