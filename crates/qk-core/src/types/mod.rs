//! Domain types for the qk-gen tool.
//!
//! - [`pattern`] - A single key pattern and its segment helpers
//! - [`pattern_set`] - The deduplicated set of patterns seen in one pass
//! - [`location`] - Source positions of marker calls
//!
//! All public types are re-exported at the crate root:
//!
//! ```
//! use qk_core::{Pattern, PatternSet, SourceLocation};
//! ```

mod location;
mod pattern;
mod pattern_set;

pub use location::SourceLocation;
pub use pattern::{PARAM_SIGIL, Pattern};
pub use pattern_set::PatternSet;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
///
/// Faster than the standard library's `HashSet` for short string keys; no
/// denial-of-service resistance is needed for patterns read from local files.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;
