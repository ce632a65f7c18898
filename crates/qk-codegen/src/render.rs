//! Deterministic rendering of a pattern set.

use qk_core::{Fingerprint, PatternSet};

use crate::template;

/// A rendered document and its fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The full artifact text.
    pub document: String,
    /// Fingerprint of `document`.
    pub fingerprint: Fingerprint,
    /// Number of entries in the document.
    pub pattern_count: usize,
}

/// Renders `patterns` into the artifact for `module_name`.
///
/// Entries are emitted in lexicographic order, so equal sets always produce
/// byte-identical documents and equal fingerprints.
///
/// # Examples
///
/// ```
/// use qk_codegen::render;
/// use qk_core::{Pattern, PatternSet};
///
/// let forward: PatternSet = ["b", "a"].into_iter().map(Pattern::from).collect();
/// let backward: PatternSet = ["a", "b"].into_iter().map(Pattern::from).collect();
/// assert_eq!(render(&forward, "keys"), render(&backward, "keys"));
/// ```
#[must_use]
pub fn render(patterns: &PatternSet, module_name: &str) -> Rendered {
    let document = if patterns.is_empty() {
        template::empty(module_name)
    } else {
        template::populated(module_name, patterns.sorted())
    };
    let fingerprint = Fingerprint::of(&document);
    Rendered {
        document,
        fingerprint,
        pattern_count: patterns.len(),
    }
}
