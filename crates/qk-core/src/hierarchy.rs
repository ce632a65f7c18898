//! Parent-pattern expansion.
//!
//! A pattern such as `users/$userId/posts` implies the existence of the
//! coarser keys `users` and `users/$userId`. [`expand_hierarchy`] closes a
//! [`PatternSet`] under that relation so the generated declaration can be
//! queried at any prefix depth.

use crate::types::{Pattern, PatternSet};

/// Returns every strict prefix of `pattern` that ends before a `/`.
///
/// Segments are taken literally: empty segments are not collapsed, so `a//b`
/// yields `a` and `a/`.
///
/// # Examples
///
/// ```
/// use qk_core::parent_patterns;
///
/// assert_eq!(parent_patterns("a/b/c"), vec!["a", "a/b"]);
/// assert!(parent_patterns("a").is_empty());
/// ```
#[must_use]
pub fn parent_patterns(pattern: &str) -> Vec<&str> {
    pattern
        .char_indices()
        .filter(|&(_, c)| c == '/')
        .map(|(index, _)| &pattern[..index])
        .collect()
}

/// Closes `patterns` under the parent relation.
///
/// The result contains every input pattern plus every parent of every input
/// pattern. Applying the function to its own output returns an equal set.
#[must_use]
pub fn expand_hierarchy(mut patterns: PatternSet) -> PatternSet {
    let parents: Vec<Pattern> = patterns
        .iter()
        .flat_map(Pattern::parents)
        .filter(|parent| !patterns.contains(parent))
        .map(Pattern::new)
        .collect();

    let before = patterns.len();
    patterns.extend(parents);
    tracing::trace!(
        direct = before,
        total = patterns.len(),
        "Expanded pattern hierarchy"
    );
    patterns
}
