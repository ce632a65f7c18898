//! The two document templates.
//!
//! Both augment the configured module, so the artifact merges with any
//! hand-written `RegisteredPaths` declaration instead of replacing it.

use std::fmt::Write as _;

use qk_core::Pattern;

const HEADER: &str = "// @ts-nocheck\n// This file is auto-generated. Do not edit manually.\n\n";

/// Renders the placeholder document used when no patterns were found.
#[must_use]
pub fn empty(module_name: &str) -> String {
    let module = quote(module_name);
    format!("{HEADER}import {module};\n\ndeclare module {module} {{}}\n")
}

/// Renders the document declaring one `RegisteredPaths` entry per pattern,
/// in the order given.
#[must_use]
pub fn populated<'a>(module_name: &str, patterns: impl IntoIterator<Item = &'a Pattern>) -> String {
    let module = quote(module_name);
    let mut document = format!(
        "{HEADER}import {module};\n\ndeclare module {module} {{\n  export interface RegisteredPaths {{\n"
    );
    for pattern in patterns {
        // Writing to a String cannot fail.
        let _ = writeln!(document, "    {}: true;", quote(pattern.as_str()));
    }
    document.push_str("  }\n}\n");
    document
}

/// Quotes `value` as a double-quoted string literal.
///
/// JSON string syntax is a subset of TypeScript's, so JSON escaping is exact.
fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_template() {
        assert_eq!(
            empty("typesafe-query-keys"),
            "// @ts-nocheck\n\
             // This file is auto-generated. Do not edit manually.\n\
             \n\
             import \"typesafe-query-keys\";\n\
             \n\
             declare module \"typesafe-query-keys\" {}\n"
        );
    }

    #[test]
    fn test_populated_template() {
        let patterns = [Pattern::new("posts"), Pattern::new("posts/$id")];
        assert_eq!(
            populated("keys", &patterns),
            "// @ts-nocheck\n\
             // This file is auto-generated. Do not edit manually.\n\
             \n\
             import \"keys\";\n\
             \n\
             declare module \"keys\" {\n  \
               export interface RegisteredPaths {\n    \
                 \"posts\": true;\n    \
                 \"posts/$id\": true;\n  \
               }\n\
             }\n"
        );
    }

    #[test]
    fn test_entries_are_escaped() {
        let patterns = [Pattern::new("say \"hi\"\\now")];
        let document = populated("keys", &patterns);
        assert!(document.contains(r#"    "say \"hi\"\\now": true;"#));
    }
}
