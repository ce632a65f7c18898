//! Core types, configuration, and errors for the qk-gen tool.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Pattern`] and [`PatternSet`], the key patterns extracted from source
//! - [`expand_hierarchy`], which closes a set over its parent patterns
//! - [`Fingerprint`], the content hash used for change detection
//! - Configuration structures ([`ScanConfig`], [`WatchConfig`], [`Config`])
//! - [`ConfigError`] for configuration-level failures
//!
//! # Example
//!
//! ```
//! use qk_core::{expand_hierarchy, Pattern, PatternSet};
//!
//! let mut set = PatternSet::new();
//! set.insert(Pattern::new("users/$userId/posts"));
//!
//! let expanded = expand_hierarchy(set);
//! assert!(expanded.contains("users"));
//! assert!(expanded.contains("users/$userId"));
//! assert_eq!(expanded.len(), 3);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod hierarchy;
pub mod types;

pub use config::{
    Config, ResolvedConfig, ScanConfig, WatchConfig, ALWAYS_EXCLUDE, CONFIG_FILE_NAMES,
    DEFAULT_FUNCTION_NAME, DEFAULT_INCLUDE, DEFAULT_MODULE_NAME, DEFAULT_OUTPUT_PATH,
};
pub use error::ConfigError;
pub use fingerprint::Fingerprint;
pub use hierarchy::{expand_hierarchy, parent_patterns};
pub use types::{FxHashSet, Pattern, PatternSet, SourceLocation, PARAM_SIGIL};
