//! Configuration structures for the qk-gen tool.
//!
//! - [`ScanConfig`] - what to scan and where to write the artifact
//! - [`WatchConfig`] - file watcher settings
//! - [`Config`] - root configuration, loadable from JSON
//! - [`ResolvedConfig`] - validated, absolute form handed to the pipeline
//!
//! All configuration types implement [`Default`]. Fields omitted from a
//! configuration file fall back to these defaults.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Marker function name that is always recognised.
pub const DEFAULT_FUNCTION_NAME: &str = "qk";

/// Include glob used when none is configured.
pub const DEFAULT_INCLUDE: &str = "**/*.{ts,tsx,js,jsx}";

/// Default artifact location, relative to the project root.
pub const DEFAULT_OUTPUT_PATH: &str = ".generated/query-keys.d.ts";

/// Module augmented by the generated declaration.
pub const DEFAULT_MODULE_NAME: &str = "typesafe-query-keys";

/// Exclude globs appended to every configuration.
pub const ALWAYS_EXCLUDE: [&str; 2] = ["**/node_modules/**", "**/vite.config.*"];

/// File names tried, in order, when discovering a configuration file.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["querykeys.json", ".querykeysrc.json"];

/// Configuration for scanning and generation.
///
/// # Examples
///
/// ```
/// use qk_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.function_names, vec!["qk"]);
/// assert_eq!(config.output_path, ".generated/query-keys.d.ts");
/// assert!(config.respect_gitignore);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Project root. Globs and relative paths are resolved against it.
    pub root: Utf8PathBuf,

    /// Glob patterns selecting candidate source files.
    pub include: Vec<String>,

    /// Glob patterns removing files from the candidate set.
    ///
    /// [`ALWAYS_EXCLUDE`] is appended at resolution.
    pub exclude: Vec<String>,

    /// Names of marker functions whose first argument is extracted.
    pub function_names: Vec<String>,

    /// Where the generated declaration is written.
    pub output_path: Utf8PathBuf,

    /// Module name used in `declare module`.
    pub module_name: String,

    /// Optional gitignore-style file, relative to the root unless absolute.
    ///
    /// Its rules are anchored at the file's own directory and apply on top
    /// of `exclude`, negations included.
    pub ignore_file: Option<Utf8PathBuf>,

    /// Whether the directory walk honours `.gitignore` and hidden-file rules.
    pub respect_gitignore: bool,

    /// Enable debug-level logging.
    pub verbose: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::from("."),
            include: vec![DEFAULT_INCLUDE.to_owned()],
            exclude: Vec::new(),
            function_names: vec![DEFAULT_FUNCTION_NAME.to_owned()],
            output_path: Utf8PathBuf::from(DEFAULT_OUTPUT_PATH),
            module_name: DEFAULT_MODULE_NAME.to_owned(),
            ignore_file: None,
            respect_gitignore: true,
            verbose: false,
        }
    }
}

/// Configuration for the file watcher.
///
/// # Examples
///
/// ```
/// use qk_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window in milliseconds.
    ///
    /// File-system events within this window are delivered as one batch.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

/// Root configuration for the qk-gen tool.
///
/// # Examples
///
/// ```
/// use qk_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"scan": {"function_names": ["key"]}}"#)?;
/// assert_eq!(config.scan.function_names, vec!["key"]);
/// assert_eq!(config.watch.debounce_ms, 100);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scan and generation settings.
    pub scan: ScanConfig,

    /// File watcher settings.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid configuration JSON.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Looks for one of [`CONFIG_FILE_NAMES`] in `dir` and loads the first found.
    ///
    /// A configuration loaded this way has its `root` interpreted relative to
    /// `dir`.
    ///
    /// # Errors
    ///
    /// Propagates [`Config::from_json_file`] errors for a file that exists.
    pub fn discover(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, Self)>, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                let mut config = Self::from_json_file(&candidate)?;
                if config.scan.root.is_relative() {
                    config.scan.root = dir.join(&config.scan.root);
                }
                tracing::debug!(path = %candidate, "Discovered configuration file");
                return Ok(Some((candidate, config)));
            }
        }
        Ok(None)
    }

    /// Validates the configuration and produces its absolute form.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingDirectory`] if the root is not a directory
    /// - [`ConfigError::InvalidPath`] if the root is not UTF-8 after
    ///   canonicalisation or the output path names a directory
    /// - [`ConfigError::InvalidOption`] for empty includes, empty marker names,
    ///   or an empty module name
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let scan = &self.scan;

        if !scan.root.is_dir() {
            return Err(ConfigError::MissingDirectory(scan.root.clone()));
        }
        let canonical = std::fs::canonicalize(&scan.root).map_err(|source| ConfigError::Io {
            path: scan.root.clone(),
            source,
        })?;
        let root = Utf8PathBuf::from_path_buf(canonical).map_err(|path| ConfigError::InvalidPath {
            path: Utf8PathBuf::from(path.to_string_lossy().into_owned()),
            reason: "path is not valid UTF-8".to_owned(),
        })?;

        if scan.include.is_empty() {
            return Err(ConfigError::invalid_option("include", "at least one glob is required"));
        }
        if scan.module_name.trim().is_empty() {
            return Err(ConfigError::invalid_option("module_name", "must not be empty"));
        }

        let mut function_names: Vec<String> = Vec::with_capacity(scan.function_names.len() + 1);
        for name in std::iter::once(DEFAULT_FUNCTION_NAME).chain(scan.function_names.iter().map(String::as_str)) {
            if !is_identifier(name) {
                return Err(ConfigError::invalid_option(
                    "function_names",
                    format!("'{name}' is not a valid identifier"),
                ));
            }
            if !function_names.iter().any(|existing| existing == name) {
                function_names.push(name.to_owned());
            }
        }

        let output_path = absolutize(&root, &scan.output_path);
        if output_path.is_dir() {
            return Err(ConfigError::InvalidPath {
                path: output_path,
                reason: "output path is a directory".to_owned(),
            });
        }

        let ignore_file = scan.ignore_file.as_ref().map(|path| absolutize(&root, path));

        let mut exclude = scan.exclude.clone();
        for glob in ALWAYS_EXCLUDE {
            if !exclude.iter().any(|existing| existing == glob) {
                exclude.push(glob.to_owned());
            }
        }

        Ok(ResolvedConfig {
            root,
            include: scan.include.clone(),
            exclude,
            function_names,
            output_path,
            module_name: scan.module_name.clone(),
            ignore_file,
            respect_gitignore: scan.respect_gitignore,
            verbose: scan.verbose,
            watch: self.watch,
        })
    }
}

/// A validated configuration with absolute paths.
///
/// Immutable for the lifetime of a watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Canonical project root.
    pub root: Utf8PathBuf,
    /// Include globs, relative to `root`.
    pub include: Vec<String>,
    /// Effective exclude globs, relative to `root`.
    pub exclude: Vec<String>,
    /// Deduplicated marker names; always contains [`DEFAULT_FUNCTION_NAME`].
    pub function_names: Vec<String>,
    /// Absolute artifact path.
    pub output_path: Utf8PathBuf,
    /// Module name used in `declare module`.
    pub module_name: String,
    /// Absolute path of the configured ignore file, if any.
    pub ignore_file: Option<Utf8PathBuf>,
    /// Whether `.gitignore`, `.ignore` and hidden-file rules apply.
    pub respect_gitignore: bool,
    /// Debug-level logging requested.
    pub verbose: bool,
    /// File watcher settings.
    pub watch: WatchConfig,
}

impl ResolvedConfig {
    /// The artifact path relative to the root, if it lies inside it.
    #[must_use]
    pub fn output_relative(&self) -> Option<&Utf8Path> {
        self.output_path.strip_prefix(&self.root).ok()
    }

    /// Resolves `path` against the root without touching the file system.
    #[must_use]
    pub fn absolutize(&self, path: &Utf8Path) -> Utf8PathBuf {
        absolutize(&self.root, path)
    }
}

/// Joins `path` onto `base` (unless already absolute) and removes `.` and `..`
/// components lexically.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use qk_core::config::absolutize;
///
/// let path = absolutize(Utf8Path::new("/project"), Utf8Path::new("./src/../out/keys.d.ts"));
/// assert_eq!(path, "/project/out/keys.d.ts");
/// ```
#[must_use]
pub fn absolutize(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    let joined = if path.is_absolute() { path.to_owned() } else { base.join(path) };
    let mut normalized = Utf8PathBuf::new();
    for component in joined.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_str()),
        }
    }
    normalized
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 path");
        (dir, path)
    }

    fn config_at(root: &Utf8Path) -> Config {
        let mut config = Config::default();
        config.scan.root = root.to_owned();
        config
    }

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.include, vec![DEFAULT_INCLUDE]);
        assert!(config.exclude.is_empty());
        assert_eq!(config.module_name, "typesafe-query-keys");
        assert!(config.ignore_file.is_none());
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"scan": {"output_path": "types/keys.d.ts"}}"#;
        let config: Config = serde_json::from_str(json).expect("parse");
        assert_eq!(config.scan.output_path, "types/keys.d.ts");
        assert_eq!(config.scan.function_names, vec!["qk"]);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed: Config = serde_json::from_str(&json).expect("parse");
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_resolve_defaults() {
        let (_dir, root) = temp_root();
        let resolved = config_at(&root).resolve().expect("resolve");

        assert!(resolved.root.is_absolute());
        assert!(resolved.output_path.ends_with(".generated/query-keys.d.ts"));
        assert_eq!(
            resolved.output_relative().map(Utf8Path::as_str),
            Some(".generated/query-keys.d.ts")
        );
        assert_eq!(resolved.exclude, ALWAYS_EXCLUDE.to_vec());
        assert_eq!(resolved.function_names, vec!["qk"]);
    }

    #[test]
    fn test_resolve_adds_default_marker_and_dedupes() {
        let (_dir, root) = temp_root();
        let mut config = config_at(&root);
        config.scan.function_names = vec!["key".to_owned(), "qk".to_owned(), "key".to_owned()];
        let resolved = config.resolve().expect("resolve");
        assert_eq!(resolved.function_names, vec!["qk", "key"]);
    }

    #[test]
    fn test_resolve_rejects_bad_marker_name() {
        let (_dir, root) = temp_root();
        let mut config = config_at(&root);
        config.scan.function_names = vec!["obj.qk".to_owned()];
        let error = config.resolve().expect_err("invalid marker");
        assert!(matches!(error, ConfigError::InvalidOption { ref option, .. } if option == "function_names"));
    }

    #[test]
    fn test_resolve_missing_root() {
        let (_dir, root) = temp_root();
        let config = config_at(&root.join("does-not-exist"));
        assert!(matches!(config.resolve(), Err(ConfigError::MissingDirectory(_))));
    }

    #[test]
    fn test_resolve_rejects_directory_output() {
        let (_dir, root) = temp_root();
        std::fs::create_dir_all(root.join("out")).expect("mkdir");
        let mut config = config_at(&root);
        config.scan.output_path = Utf8PathBuf::from("out");
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidPath { .. })));
    }

    #[test]
    fn test_resolve_ignore_file_is_absolute() {
        let (_dir, root) = temp_root();
        let mut config = config_at(&root);
        config.scan.exclude = vec!["**/*.test.ts".to_owned()];
        config.scan.ignore_file = Some(Utf8PathBuf::from("tools/../.qkignore"));
        let resolved = config.resolve().expect("resolve");
        assert_eq!(resolved.ignore_file, Some(resolved.root.join(".qkignore")));
        assert_eq!(
            resolved.exclude,
            vec!["**/*.test.ts", "**/node_modules/**", "**/vite.config.*"]
        );
    }

    #[test]
    fn test_discover_prefers_first_name() {
        let (_dir, root) = temp_root();
        std::fs::write(root.join("querykeys.json"), r#"{"scan": {"module_name": "first"}}"#)
            .expect("write");
        std::fs::write(root.join(".querykeysrc.json"), r#"{"scan": {"module_name": "second"}}"#)
            .expect("write");

        let (path, config) = Config::discover(&root).expect("discover").expect("found");
        assert!(path.ends_with("querykeys.json"));
        assert_eq!(config.scan.module_name, "first");
        assert_eq!(config.scan.root, root.join("."));
    }

    #[test]
    fn test_discover_none() {
        let (_dir, root) = temp_root();
        assert!(Config::discover(&root).expect("discover").is_none());
    }

    #[test]
    fn test_from_json_file_parse_error() {
        let (_dir, root) = temp_root();
        let path = root.join("querykeys.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert!(matches!(Config::from_json_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_absolutize_keeps_absolute() {
        let path = absolutize(Utf8Path::new("/project"), Utf8Path::new("/elsewhere/out.d.ts"));
        assert_eq!(path, "/elsewhere/out.d.ts");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("qk"));
        assert!(is_identifier("$key_1"));
        assert!(!is_identifier("1qk"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
