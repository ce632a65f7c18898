//! Directory traversal for candidate files.
//!
//! [`FileWalker`] uses the `ignore` crate to walk the project root and keeps
//! every file accepted by a [`FileMatcher`].

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;

use crate::matcher::FileMatcher;

/// Directories never descended into, whatever the configuration says.
const SKIP_DIRECTORIES: &[&str] = &["node_modules", ".git"];

/// Walks the project root and collects candidate files.
///
/// # Examples
///
/// ```ignore
/// let walker = FileWalker::new(Arc::new(matcher), true);
/// let paths = walker.collect_paths();
/// ```
#[derive(Debug, Clone)]
pub struct FileWalker {
    matcher: Arc<FileMatcher>,
    respect_gitignore: bool,
}

impl FileWalker {
    /// Creates a walker rooted at the matcher's root.
    ///
    /// With `respect_gitignore`, `.gitignore`, `.ignore` and hidden-file rules
    /// apply on top of the matcher.
    #[must_use]
    pub fn new(matcher: Arc<FileMatcher>, respect_gitignore: bool) -> Self {
        Self {
            matcher,
            respect_gitignore,
        }
    }

    /// Collects all candidate paths, sorted.
    ///
    /// Entries that cannot be read or are not valid UTF-8 are logged and
    /// skipped; a file deleted mid-walk must not fail the pass.
    #[must_use]
    pub fn collect_paths(&self) -> Vec<Utf8PathBuf> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(error = %error, "Skipping unreadable directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                tracing::warn!(path = %entry.path().display(), "Skipping non-UTF-8 path");
                continue;
            };

            if self.matcher.is_candidate(path) {
                paths.push(path.to_owned());
            }
        }

        paths.sort_unstable();
        paths
    }

    /// The directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.matcher.root()
    }

    fn build_walker(&self) -> ignore::Walk {
        let matcher = Arc::clone(&self.matcher);
        WalkBuilder::new(self.matcher.root())
            .standard_filters(self.respect_gitignore)
            .follow_links(false)
            .threads(1)
            .require_git(false)
            .filter_entry(move |entry| {
                if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                if entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
                {
                    return false;
                }
                Utf8Path::from_path(entry.path()).is_none_or(|dir| !matcher.is_excluded_dir(dir))
            })
            .build()
    }
}
