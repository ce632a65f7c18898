//! Include/exclude glob matching and ignore rules.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use qk_core::{ConfigError, ResolvedConfig};

/// Per-directory ignore files, in increasing precedence.
const LOCAL_IGNORE_FILES: [&str; 2] = [".gitignore", ".ignore"];

/// Decides whether a path belongs to the candidate set.
///
/// Globs are matched against the path relative to the project root, with `*`
/// stopping at `/` and `**` crossing directories. The configured ignore file,
/// if any, removes further paths. The artifact path is never a candidate.
///
/// # Examples
///
/// ```ignore
/// let matcher = FileMatcher::new(&resolved)?;
/// assert!(matcher.is_candidate(Utf8Path::new("src/posts.ts")));
/// assert!(!matcher.is_candidate(Utf8Path::new("node_modules/pkg/index.ts")));
/// ```
#[derive(Debug, Clone)]
pub struct FileMatcher {
    root: Utf8PathBuf,
    output_path: Utf8PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    excluded_dirs: GlobSet,
    ignore_file: Option<Gitignore>,
    respect_gitignore: bool,
}

impl FileMatcher {
    /// Compiles the include and exclude globs of `config` and loads its
    /// ignore file.
    ///
    /// A missing or malformed ignore file is logged and contributes whatever
    /// rules could be read.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGlob`] for the first glob that fails to
    /// compile.
    pub fn new(config: &ResolvedConfig) -> Result<Self, ConfigError> {
        let dir_globs: Vec<String> = config
            .exclude
            .iter()
            .filter_map(|glob| glob.strip_suffix("/**"))
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_owned)
            .collect();

        Ok(Self {
            root: config.root.clone(),
            output_path: config.output_path.clone(),
            include: build_set(&config.include)?,
            exclude: build_set(&config.exclude)?,
            excluded_dirs: build_set(&dir_globs)?,
            ignore_file: config.ignore_file.as_deref().and_then(load_ignore_file),
            respect_gitignore: config.respect_gitignore,
        })
    }

    /// Returns `true` if `path` should be scanned.
    ///
    /// `path` may be absolute (it must then lie under the root) or relative
    /// to the root. `.gitignore` and hidden-file rules are not consulted here;
    /// the walk applies them itself. See [`is_scannable`](Self::is_scannable).
    #[must_use]
    pub fn is_candidate(&self, path: &Utf8Path) -> bool {
        if self.is_output(path) {
            return false;
        }
        let Some(relative) = self.relative(path) else {
            return false;
        };
        self.include.is_match(relative)
            && !self.exclude.is_match(relative)
            && !self.ignored_by_file(&self.root.join(relative), false)
    }

    /// Returns `true` if `path` is a candidate the walk would also reach.
    ///
    /// On top of [`is_candidate`](Self::is_candidate), applies the hidden-file
    /// rule and the `.gitignore`/`.ignore` files between the root and `path`
    /// when the configuration respects them. Used to filter file-system events.
    #[must_use]
    pub fn is_scannable(&self, path: &Utf8Path) -> bool {
        if !self.is_candidate(path) {
            return false;
        }
        if !self.respect_gitignore {
            return true;
        }
        let Some(relative) = self.relative(path) else {
            return false;
        };
        !is_hidden(relative) && !self.ignored_by_local_files(relative)
    }

    /// Returns `true` if `path` names the generated artifact.
    #[must_use]
    pub fn is_output(&self, path: &Utf8Path) -> bool {
        qk_core::config::absolutize(&self.root, path) == self.output_path
    }

    /// Returns `true` if a directory can be skipped during the walk.
    ///
    /// A directory is skipped when an exclude glob of the form `<dir>/**`
    /// covers it, or when the ignore file ignores it.
    #[must_use]
    pub fn is_excluded_dir(&self, path: &Utf8Path) -> bool {
        let Some(relative) = self.relative(path) else {
            return false;
        };
        if relative.as_str().is_empty() {
            return false;
        }
        self.excluded_dirs.is_match(relative) || self.ignored_by_file(&self.root.join(relative), true)
    }

    /// The project root globs are relative to.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The absolute artifact path.
    #[inline]
    #[must_use]
    pub fn output_path(&self) -> &Utf8Path {
        &self.output_path
    }

    fn relative<'a>(&self, path: &'a Utf8Path) -> Option<&'a Utf8Path> {
        if path.is_absolute() {
            path.strip_prefix(&self.root).ok()
        } else {
            Some(path)
        }
    }

    fn ignored_by_file(&self, absolute: &Utf8Path, is_dir: bool) -> bool {
        self.ignore_file
            .as_ref()
            .is_some_and(|rules| matches!(match_under(rules, absolute, is_dir), Match::Ignore(_)))
    }

    /// Walks from the file's directory up to the root; the nearest rule wins.
    fn ignored_by_local_files(&self, relative: &Utf8Path) -> bool {
        let absolute = self.root.join(relative);
        let mut dir = absolute.parent();
        while let Some(current) = dir {
            if let Some(rules) = load_local_rules(current) {
                match match_under(&rules, &absolute, false) {
                    Match::Ignore(_) => return true,
                    Match::Whitelist(_) => return false,
                    Match::None => {}
                }
            }
            if current == self.root.as_path() {
                break;
            }
            dir = current.parent();
        }
        false
    }
}

fn match_under<'a>(rules: &'a Gitignore, absolute: &Utf8Path, is_dir: bool) -> Match<&'a ignore::gitignore::Glob> {
    match absolute.as_std_path().strip_prefix(rules.path()) {
        Ok(relative) if !relative.as_os_str().is_empty() => rules.matched_path_or_any_parents(relative, is_dir),
        _ => Match::None,
    }
}

fn is_hidden(relative: &Utf8Path) -> bool {
    relative
        .components()
        .any(|component| matches!(component, Utf8Component::Normal(name) if name.starts_with('.')))
}

fn load_ignore_file(path: &Utf8Path) -> Option<Gitignore> {
    let anchor = path.parent().unwrap_or(path);
    let mut builder = GitignoreBuilder::new(anchor);
    if let Some(error) = builder.add(path) {
        tracing::warn!(path = %path, error = %error, "Problem reading ignore file");
    }
    match builder.build() {
        Ok(rules) => {
            tracing::debug!(path = %path, rules = rules.len(), "Loaded ignore file");
            Some(rules)
        }
        Err(error) => {
            tracing::warn!(path = %path, error = %error, "Ignoring unusable ignore file");
            None
        }
    }
}

fn load_local_rules(dir: &Utf8Path) -> Option<Gitignore> {
    let mut builder = GitignoreBuilder::new(dir);
    let mut found = false;
    for name in LOCAL_IGNORE_FILES {
        let path = dir.join(name);
        if path.is_file() {
            found = true;
            if let Some(error) = builder.add(&path) {
                tracing::debug!(path = %path, error = %error, "Problem reading ignore file");
            }
        }
    }
    if !found {
        return None;
    }
    builder.build().ok()
}

fn build_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                reason: e.kind().to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidGlob {
        pattern: e.glob().unwrap_or_default().to_owned(),
        reason: e.kind().to_string(),
    })
}
