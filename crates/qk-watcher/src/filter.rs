//! File filtering for watch events.
//!
//! Filters run on the blocking watcher thread, before events are sent to the
//! session, so irrelevant churn (editor swap files, build output, dependency
//! installs) never reaches the async side.
//!
//! [`CandidateFilter`] applies the same rules as the scan's directory walk,
//! so an event is forwarded only for a file the next pass would read.

use std::sync::Arc;

use camino::Utf8Path;
use qk_scanner::FileMatcher;

/// A predicate deciding which file events to forward.
///
/// Filters must be [`Send`] and [`Sync`] because they are used from the
/// blocking watcher thread, and `'static` to be moved into it.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if events for `path` should be forwarded.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// Forwards events for scan candidates and for the generated artifact.
///
/// The artifact is never a candidate, but its events are still needed to
/// recognise our own writes and external edits.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    matcher: Arc<FileMatcher>,
}

impl CandidateFilter {
    /// Creates a filter sharing the scanner's compiled globs.
    #[inline]
    #[must_use]
    pub fn new(matcher: Arc<FileMatcher>) -> Self {
        Self { matcher }
    }
}

impl FileFilter for CandidateFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.matcher.is_output(path) || self.matcher.is_scannable(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use qk_core::{Config, ScanConfig};

    fn candidate_filter() -> (tempfile::TempDir, Utf8PathBuf, CandidateFilter) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        let config = Config {
            scan: ScanConfig {
                root: root.clone(),
                ..ScanConfig::default()
            },
            ..Config::default()
        };
        let resolved = config.resolve().expect("resolve");
        let root = resolved.root.clone();
        let matcher = FileMatcher::new(&resolved).expect("matcher");
        (dir, root, CandidateFilter::new(Arc::new(matcher)))
    }

    #[test]
    fn test_candidate_filter() {
        let (_dir, root, filter) = candidate_filter();

        assert!(filter.should_process(&root.join("src/posts.ts")));
        assert!(filter.should_process(&root.join("src/App.tsx")));
        assert!(filter.should_process(&root.join(".generated/query-keys.d.ts")));

        assert!(!filter.should_process(&root.join("README.md")));
        assert!(!filter.should_process(&root.join("node_modules/pkg/index.ts")));
        assert!(!filter.should_process(&root.join("vite.config.ts")));
        assert!(!filter.should_process(Utf8Path::new("/elsewhere/src/posts.ts")));
    }

    #[test]
    fn test_candidate_filter_applies_walk_rules() {
        let (_dir, root, filter) = candidate_filter();
        std::fs::write(root.join(".gitignore"), "dist/\n").expect("write");

        assert!(!filter.should_process(&root.join("dist/bundle.js")));
        assert!(!filter.should_process(&root.join(".storybook/preview.ts")));
        assert!(filter.should_process(&root.join("src/posts.ts")));
    }
}
