//! Key patterns extracted from marker calls.
//!
//! A [`Pattern`] is the raw string literal passed to a marker function such as
//! `qk('users/$userId/posts')`. Patterns are opaque: they are compared and stored
//! as exact strings, never normalised. The helpers here only look at the
//! `/`-separated segments.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Leading character of a segment that names a parameter slot.
pub const PARAM_SIGIL: char = '$';

/// Segment separator.
const SEPARATOR: char = '/';

/// A slash-delimited key pattern.
///
/// Ordering is plain byte-wise string ordering, which is what the code
/// generator uses to enumerate a set deterministically.
///
/// # Examples
///
/// ```
/// use qk_core::Pattern;
///
/// let pattern = Pattern::new("users/$userId/posts");
/// assert_eq!(pattern.segments().collect::<Vec<_>>(), ["users", "$userId", "posts"]);
/// assert_eq!(pattern.parents().collect::<Vec<_>>(), ["users", "users/$userId"]);
/// assert_eq!(pattern.params().collect::<Vec<_>>(), ["userId"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    /// Creates a pattern from the literal text of a marker argument.
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the pattern text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the pattern, returning the owned text.
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Iterates over the `/`-separated segments.
    ///
    /// Empty segments are yielded as-is: `a//b` has the segments `a`, `` and `b`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments in the pattern.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Iterates over every strict prefix ending just before a separator.
    ///
    /// For `a/b/c` this yields `a` then `a/b`; the full pattern is never
    /// yielded. A pattern without separators has no parents.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.0
            .char_indices()
            .filter(|&(_, c)| c == SEPARATOR)
            .map(|(index, _)| &self.0[..index])
    }

    /// Iterates over parameter names (segments starting with `$`, sigil removed).
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments()
            .filter_map(|segment| segment.strip_prefix(PARAM_SIGIL))
    }

    /// Returns `true` if any segment is a parameter slot.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        self.params().next().is_some()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Pattern {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
