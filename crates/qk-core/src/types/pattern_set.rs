//! The set of patterns accumulated during one regeneration pass.

use serde::Serialize;

use super::FxHashSet;
use super::pattern::Pattern;

/// A deduplicated set of [`Pattern`]s.
///
/// Membership is the only contract: insertion order is not tracked. Use
/// [`sorted`](Self::sorted) for a deterministic enumeration.
///
/// # Examples
///
/// ```
/// use qk_core::PatternSet;
///
/// let mut set = PatternSet::new();
/// assert!(set.insert("posts".into()));
/// assert!(!set.insert("posts".into()));
/// assert_eq!(set.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternSet {
    patterns: FxHashSet<Pattern>,
}

impl PatternSet {
    /// Creates an empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a pattern, returning `true` if it was not already present.
    #[inline]
    pub fn insert(&mut self, pattern: Pattern) -> bool {
        self.patterns.insert(pattern)
    }

    /// Returns `true` if the set contains a pattern with exactly this text.
    #[inline]
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.contains(pattern)
    }

    /// Number of distinct patterns.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if the set is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the patterns in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Returns the patterns in lexicographic order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Pattern> {
        let mut sorted: Vec<&Pattern> = self.patterns.iter().collect();
        sorted.sort_unstable();
        sorted
    }

    /// Moves every pattern of `other` into this set.
    pub fn merge(&mut self, other: Self) {
        self.patterns.extend(other.patterns);
    }
}

impl Extend<Pattern> for PatternSet {
    fn extend<T: IntoIterator<Item = Pattern>>(&mut self, iter: T) {
        self.patterns.extend(iter);
    }
}

impl FromIterator<Pattern> for PatternSet {
    fn from_iter<T: IntoIterator<Item = Pattern>>(iter: T) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PatternSet {
    type Item = Pattern;
    type IntoIter = std::collections::hash_set::IntoIter<Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.into_iter()
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a Pattern;
    type IntoIter = std::collections::hash_set::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_is_stable_across_insertion_orders() {
        let forward: PatternSet = ["b", "a/c", "a"].into_iter().map(Pattern::from).collect();
        let backward: PatternSet = ["a", "a/c", "b"].into_iter().map(Pattern::from).collect();
        assert_eq!(forward, backward);
        assert_eq!(forward.sorted(), backward.sorted());
        let texts: Vec<_> = forward.sorted().into_iter().map(Pattern::as_str).collect();
        assert_eq!(texts, vec!["a", "a/c", "b"]);
    }

    #[test]
    fn test_merge_deduplicates() {
        let mut left: PatternSet = ["posts"].into_iter().map(Pattern::from).collect();
        let right: PatternSet = ["posts", "posts/$id"].into_iter().map(Pattern::from).collect();
        left.merge(right);
        assert_eq!(left.len(), 2);
        assert!(left.contains("posts/$id"));
    }

    #[test]
    fn test_empty_set() {
        let set = PatternSet::new();
        assert!(set.is_empty());
        assert!(set.sorted().is_empty());
    }
}
