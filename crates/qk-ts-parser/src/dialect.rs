//! Grammar selection by file extension.

use camino::Utf8Path;
use tree_sitter::Language;

/// The tree-sitter grammar used for a file.
///
/// Plain TypeScript cannot parse JSX, and the TSX grammar rejects angle-bracket
/// type assertions (`<T>value`). Files that may contain JSX, including all
/// JavaScript flavours, use [`Dialect::Tsx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `.ts`, `.mts`, `.cts`
    TypeScript,
    /// `.tsx`, `.js`, `.jsx`, `.mjs`, `.cjs`, and anything unrecognised.
    Tsx,
}

impl Dialect {
    /// Picks the dialect for a path.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use qk_ts_parser::Dialect;
    ///
    /// assert_eq!(Dialect::from_path(Utf8Path::new("src/keys.ts")), Dialect::TypeScript);
    /// assert_eq!(Dialect::from_path(Utf8Path::new("src/App.jsx")), Dialect::Tsx);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Self {
        // `.d.ts` files end in `.ts` too.
        match path.extension() {
            Some("ts" | "mts" | "cts") => Self::TypeScript,
            _ => Self::Tsx,
        }
    }

    /// Returns the tree-sitter language for this dialect.
    #[must_use]
    pub fn language(self) -> Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}
