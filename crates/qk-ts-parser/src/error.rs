//! Error types for the qk-ts-parser crate.

/// Errors that can occur while parsing a source file.
///
/// Initialization and query errors indicate a broken build of the grammar and
/// are fatal. [`ParseError::Parse`] only affects the one file being parsed.
///
/// # Examples
///
/// ```
/// use qk_ts_parser::ParseError;
///
/// assert!(ParseError::Parse.is_recoverable());
/// assert!(!ParseError::LanguageInit.is_recoverable());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the grammar on the parser.
    #[error("failed to set TypeScript language")]
    LanguageInit,

    /// Failed to compile the marker query.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The kind of query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser produced no tree.
    ///
    /// Tree-sitter recovers from syntax errors on its own, so this only
    /// happens when parsing is cancelled.
    #[error("failed to parse source code")]
    Parse,
}

impl ParseError {
    /// Returns `true` if the error only concerns a single file.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_init_display() {
        assert_eq!(ParseError::LanguageInit.to_string(), "failed to set TypeScript language");
    }

    #[test]
    fn test_parse_display() {
        assert_eq!(ParseError::Parse.to_string(), "failed to parse source code");
    }
}
