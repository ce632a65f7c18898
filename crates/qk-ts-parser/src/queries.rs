//! Pre-compiled tree-sitter query for marker calls.
//!
//! The query matches any call whose callee is a bare identifier and which
//! has a quoted string literal among its arguments. Marker names are
//! configured at runtime, and comments are named children of `arguments`, so
//! both the name check and the first-argument check happen after matching.

use std::sync::OnceLock;

use tree_sitter::Query;

use crate::dialect::Dialect;
use crate::error::ParseError;

/// Tree-sitter query for marker calls.
///
/// # Capture Names
///
/// - `marker.name` - The callee identifier
/// - `marker.argument` - A `string` argument; the caller keeps it only when it
///   is the first argument
///
/// Member calls (`obj.qk('x')`) have a `member_expression` callee and do not
/// match. Template literals are `template_string` nodes and do not match.
pub const MARKER_QUERY: &str = r"
(call_expression
  function: (identifier) @marker.name
  arguments: (arguments
    (string) @marker.argument))
";

/// Capture index for `marker.name`.
pub const CAPTURE_MARKER_NAME: u32 = 0;

/// Capture index for `marker.argument`.
pub const CAPTURE_MARKER_ARGUMENT: u32 = 1;

static COMPILED_QUERY_TS: OnceLock<Query> = OnceLock::new();
static COMPILED_QUERY_TSX: OnceLock<Query> = OnceLock::new();

/// Returns the compiled marker query for a dialect.
///
/// Each dialect's query is compiled once and cached for the process.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn marker_query(dialect: Dialect) -> Result<&'static Query, ParseError> {
    let cell = match dialect {
        Dialect::TypeScript => &COMPILED_QUERY_TS,
        Dialect::Tsx => &COMPILED_QUERY_TSX,
    };
    if let Some(query) = cell.get() {
        return Ok(query);
    }

    let query = Query::new(&dialect.language(), MARKER_QUERY).map_err(|e| {
        ParseError::QueryCompile {
            offset: e.offset,
            kind: e,
        }
    })?;
    Ok(cell.get_or_init(|| query))
}
