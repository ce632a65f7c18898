//! Marker call extraction from parsed syntax trees.

use qk_core::{Pattern, SourceLocation};
use smallvec::SmallVec;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor, Tree};

use crate::literal::decode_string_literal;
use crate::queries::{CAPTURE_MARKER_ARGUMENT, CAPTURE_MARKER_NAME};

/// A marker call found in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerCall {
    /// The marker function name as written at the call site.
    pub callee: String,
    /// The decoded first argument.
    pub pattern: Pattern,
    /// Position of the argument literal.
    pub location: SourceLocation,
}

/// Extracts every call to one of `markers` whose first argument is a string
/// literal.
///
/// Calls are returned in source order. Arguments whose escapes cannot be
/// decoded are skipped.
pub fn extract_marker_calls(
    tree: &Tree,
    source: &str,
    query: &Query,
    markers: &[String],
) -> SmallVec<[MarkerCall; 4]> {
    let source_bytes = source.as_bytes();
    let mut cursor = QueryCursor::new();
    let mut calls: SmallVec<[MarkerCall; 4]> = SmallVec::new();

    let mut matches = cursor.matches(query, tree.root_node(), source_bytes);
    while let Some(match_) = matches.next() {
        let mut callee = None;
        let mut argument = None;
        for capture in match_.captures {
            match capture.index {
                idx if idx == CAPTURE_MARKER_NAME => callee = Some(capture.node),
                idx if idx == CAPTURE_MARKER_ARGUMENT => argument = Some(capture.node),
                _ => {}
            }
        }

        let (Some(callee), Some(argument)) = (callee, argument) else {
            continue;
        };
        if !is_first_argument(argument) {
            continue;
        }
        let Some(name) = node_text(callee, source_bytes) else {
            continue;
        };
        if !markers.iter().any(|marker| marker == name) {
            continue;
        }
        let Some(raw) = node_text(argument, source_bytes) else {
            continue;
        };
        let location = node_to_location(argument);
        match decode_string_literal(raw) {
            Some(value) => calls.push(MarkerCall {
                callee: name.to_owned(),
                pattern: Pattern::new(value),
                location,
            }),
            None => tracing::debug!(%location, literal = raw, "Skipping undecodable marker argument"),
        }
    }

    calls.sort_by_key(|call| call.location.byte_offset);
    calls
}

/// Returns `true` if `node` is the first argument of its call, ignoring
/// comments.
fn is_first_argument(node: Node<'_>) -> bool {
    let Some(arguments) = node.parent() else {
        return false;
    };
    let mut cursor = arguments.walk();
    let first = arguments
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first.is_some_and(|first| first.id() == node.id())
}

fn node_text<'a>(node: Node<'_>, source: &'a [u8]) -> Option<&'a str> {
    std::str::from_utf8(source.get(node.start_byte()..node.end_byte())?).ok()
}

#[allow(clippy::cast_possible_truncation)]
fn node_to_location(node: Node<'_>) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(start.row as u32 + 1, start.column as u32, node.start_byte() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::queries::marker_query;
    use tree_sitter::Parser;

    fn extract(source: &str, markers: &[&str]) -> Vec<MarkerCall> {
        extract_as(Dialect::Tsx, source, markers)
    }

    fn extract_as(dialect: Dialect, source: &str, markers: &[&str]) -> Vec<MarkerCall> {
        let mut parser = Parser::new();
        parser.set_language(&dialect.language()).expect("language");
        let tree = parser.parse(source, None).expect("tree");
        let query = marker_query(dialect).expect("query");
        let markers: Vec<String> = markers.iter().map(|m| (*m).to_owned()).collect();
        extract_marker_calls(&tree, source, query, &markers).into_vec()
    }

    fn patterns(calls: &[MarkerCall]) -> Vec<&str> {
        calls.iter().map(|call| call.pattern.as_str()).collect()
    }

    #[test]
    fn test_bare_call() {
        let calls = extract("const key = qk('users/$userId');", &["qk"]);
        assert_eq!(patterns(&calls), vec!["users/$userId"]);
        assert_eq!(calls[0].callee, "qk");
        assert_eq!(calls[0].location.line, 1);
        assert_eq!(calls[0].location.column, 15);
    }

    #[test]
    fn test_member_call_not_matched() {
        let calls = extract("obj.qk('x'); qk('y');", &["qk"]);
        assert_eq!(patterns(&calls), vec!["y"]);
    }

    #[test]
    fn test_only_first_argument() {
        let calls = extract("qk('a', 'b'); qk(id, 'c');", &["qk"]);
        assert_eq!(patterns(&calls), vec!["a"]);
    }

    #[test]
    fn test_comments_before_first_argument() {
        let source = "qk(/* list */ 'posts');\nqk(\n  // detail\n  'posts/$id',\n);\nqk(/* c */ id, 'skip');";
        let calls = extract(source, &["qk"]);
        assert_eq!(patterns(&calls), vec!["posts", "posts/$id"]);
        assert_eq!(calls[0].location.column, 14);
    }

    #[test]
    fn test_template_literal_not_matched() {
        let calls = extract("qk(`users/${id}`); qk(`static`);", &["qk"]);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_other_names_ignored() {
        let calls = extract("key('a'); qk('b'); queryKey('c');", &["qk", "queryKey"]);
        assert_eq!(patterns(&calls), vec!["b", "c"]);
    }

    #[test]
    fn test_nested_and_generic_calls() {
        let source = "useQuery({ queryKey: qk<Params>('posts/$id', { id }) });";
        let calls = extract_as(Dialect::TypeScript, source, &["qk"]);
        assert_eq!(patterns(&calls), vec!["posts/$id"]);
    }

    #[test]
    fn test_calls_in_jsx() {
        let source = "const App = () => <List keys={qk('todos')} />;";
        assert_eq!(patterns(&extract(source, &["qk"])), vec!["todos"]);
    }

    #[test]
    fn test_source_order() {
        let source = "qk('b');\nfunction f() { return qk('a'); }\nqk('c');";
        let calls = extract(source, &["qk"]);
        assert_eq!(patterns(&calls), vec!["b", "a", "c"]);
        assert_eq!(calls[1].location.line, 2);
    }

    #[test]
    fn test_escaped_argument() {
        let calls = extract(r"qk('it\'s/$id');", &["qk"]);
        assert_eq!(patterns(&calls), vec!["it's/$id"]);
    }
}
