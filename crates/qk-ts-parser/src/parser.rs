//! Tree-sitter parser management.
//!
//! [`MarkerParser`] wraps a single grammar. [`PatternExtractor`] owns one
//! parser per dialect and picks between them by file extension.

use camino::Utf8Path;
use qk_core::Pattern;
use smallvec::SmallVec;
use tree_sitter::Parser;

use crate::dialect::Dialect;
use crate::error::ParseError;
use crate::extract::{MarkerCall, extract_marker_calls};
use crate::queries::marker_query;

/// Result of parsing one source text.
#[derive(Debug, Default)]
pub struct ParsedSource {
    /// Marker calls in source order.
    pub calls: SmallVec<[MarkerCall; 4]>,
    /// Whether the tree contains syntax errors.
    ///
    /// Calls are still extracted from the parts of the tree that parsed.
    pub has_errors: bool,
}

/// A tree-sitter parser configured for one [`Dialect`].
///
/// `MarkerParser` is `Send` but not `Sync`; create one per thread.
///
/// # Examples
///
/// ```
/// use qk_ts_parser::{Dialect, MarkerParser};
///
/// let mut parser = MarkerParser::new(Dialect::TypeScript)?;
/// let parsed = parser.parse("export const k = qk('posts/$id');", &["qk".to_owned()])?;
/// assert_eq!(parsed.calls[0].pattern.as_str(), "posts/$id");
/// # Ok::<(), qk_ts_parser::ParseError>(())
/// ```
pub struct MarkerParser {
    parser: Parser,
    dialect: Dialect,
}

impl MarkerParser {
    /// Creates a parser for `dialect`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the grammar cannot be loaded.
    pub fn new(dialect: Dialect) -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|_| ParseError::LanguageInit)?;
        Ok(Self { parser, dialect })
    }

    /// The dialect this parser was created for.
    #[inline]
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parses `source` and extracts calls to any of `markers`.
    ///
    /// Malformed input still yields a tree; calls are taken from whatever
    /// parsed.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Parse`] if tree-sitter returned no tree
    /// - [`ParseError::QueryCompile`] if the marker query failed to compile
    pub fn parse(&mut self, source: &str, markers: &[String]) -> Result<ParsedSource, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::Parse)?;
        let query = marker_query(self.dialect)?;
        let calls = extract_marker_calls(&tree, source, query, markers);
        Ok(ParsedSource {
            calls,
            has_errors: tree.root_node().has_error(),
        })
    }
}

impl std::fmt::Debug for MarkerParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerParser")
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// Extracts patterns from files of any supported dialect.
///
/// Holds one [`MarkerParser`] per dialect so a worker thread can reuse them
/// across files.
#[derive(Debug)]
pub struct PatternExtractor {
    typescript: MarkerParser,
    tsx: MarkerParser,
}

impl PatternExtractor {
    /// Creates parsers for every dialect.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if a grammar cannot be loaded.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            typescript: MarkerParser::new(Dialect::TypeScript)?,
            tsx: MarkerParser::new(Dialect::Tsx)?,
        })
    }

    /// Returns the parser for `dialect`.
    pub fn parser_for(&mut self, dialect: Dialect) -> &mut MarkerParser {
        match dialect {
            Dialect::TypeScript => &mut self.typescript,
            Dialect::Tsx => &mut self.tsx,
        }
    }

    /// Parses one file's content, choosing the grammar from its extension.
    ///
    /// # Errors
    ///
    /// See [`MarkerParser::parse`].
    pub fn parse_file(
        &mut self,
        path: &Utf8Path,
        content: &str,
        markers: &[String],
    ) -> Result<ParsedSource, ParseError> {
        let parsed = self.parser_for(Dialect::from_path(path)).parse(content, markers)?;
        if parsed.has_errors {
            tracing::debug!(path = %path, calls = parsed.calls.len(), "Source contains syntax errors");
        }
        Ok(parsed)
    }

    /// Returns the patterns passed to marker calls in one file.
    ///
    /// A file that cannot be parsed contributes no patterns; the failure is
    /// logged as a warning.
    pub fn scan(&mut self, path: &Utf8Path, content: &str, markers: &[String]) -> Vec<Pattern> {
        match self.parse_file(path, content, markers) {
            Ok(parsed) => parsed.calls.into_iter().map(|call| call.pattern).collect(),
            Err(error) => {
                tracing::warn!(path = %path, error = %error, "Failed to parse file");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        vec!["qk".to_owned()]
    }

    #[test]
    fn test_parser_new() {
        assert!(MarkerParser::new(Dialect::TypeScript).is_ok());
        assert!(MarkerParser::new(Dialect::Tsx).is_ok());
    }

    #[test]
    fn test_parse_empty_source() {
        let mut parser = MarkerParser::new(Dialect::TypeScript).expect("Parser creation failed");
        let parsed = parser.parse("", &markers()).expect("Parse failed");
        assert!(parsed.calls.is_empty());
        assert!(!parsed.has_errors);
    }

    #[test]
    fn test_parse_incomplete_source() {
        let mut parser = MarkerParser::new(Dialect::TypeScript).expect("Parser creation failed");
        let source = "const a = qk('posts');\nfunction broken( {\n";
        let parsed = parser.parse(source, &markers()).expect("Parse failed");
        assert!(parsed.has_errors);
        assert_eq!(parsed.calls.len(), 1);
        assert_eq!(parsed.calls[0].pattern.as_str(), "posts");
    }

    #[test]
    fn test_type_assertion_in_ts() {
        let mut extractor = PatternExtractor::new().expect("extractor");
        let source = "const key = <string>qk('legacy/$id');";
        let patterns = extractor.scan(Utf8Path::new("a.ts"), source, &markers());
        assert_eq!(patterns, vec![Pattern::new("legacy/$id")]);
    }

    #[test]
    fn test_jsx_file() {
        let mut extractor = PatternExtractor::new().expect("extractor");
        let source = "export const View = () => <Query k={qk('todos/$todoId')} />;";
        let patterns = extractor.scan(Utf8Path::new("View.jsx"), source, &markers());
        assert_eq!(patterns, vec![Pattern::new("todos/$todoId")]);
    }

    #[test]
    fn test_duplicates_are_returned() {
        let mut extractor = PatternExtractor::new().expect("extractor");
        let patterns = extractor.scan(Utf8Path::new("a.ts"), "qk('a'); qk('a');", &markers());
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn test_parser_debug() {
        let parser = MarkerParser::new(Dialect::Tsx).expect("Parser creation failed");
        assert!(format!("{parser:?}").contains("Tsx"));
    }
}
