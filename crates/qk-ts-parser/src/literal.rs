//! Decoding of JavaScript string literals.

/// Decodes the source text of a single- or double-quoted string literal,
/// quotes included, into its value.
///
/// Returns `None` if the text is not a quoted literal or contains a malformed
/// hex or unicode escape. Lone surrogates decode to U+FFFD.
///
/// # Examples
///
/// ```
/// use qk_ts_parser::decode_string_literal;
///
/// assert_eq!(decode_string_literal(r"'users/$id'").as_deref(), Some("users/$id"));
/// assert_eq!(decode_string_literal(r#""café""#).as_deref(), Some("café"));
/// assert_eq!(decode_string_literal("`tpl`"), None);
/// ```
#[must_use]
pub fn decode_string_literal(raw: &str) -> Option<String> {
    let quote = raw.chars().next().filter(|c| matches!(c, '\'' | '"'))?;
    let body = raw.strip_prefix(quote)?.strip_suffix(quote)?;

    if !body.contains('\\') {
        return Some(body.to_owned());
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => out.push('\0'),
            'x' => {
                let code = take_hex(&mut chars, 2)?;
                out.push(char::from_u32(code)?);
            }
            'u' => {
                let code = decode_unicode_escape(&mut chars)?;
                out.push(code);
            }
            // Line continuations contribute nothing.
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                chars.next_if_eq(&'\n');
            }
            other => out.push(other),
        }
    }
    Some(out)
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn take_hex(chars: &mut Chars<'_>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn decode_unicode_escape(chars: &mut Chars<'_>) -> Option<char> {
    if chars.next_if_eq(&'{').is_some() {
        let mut value = 0u32;
        let mut digits = 0;
        loop {
            let c = chars.next()?;
            if c == '}' {
                break;
            }
            value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            digits += 1;
        }
        if digits == 0 {
            return None;
        }
        return char::from_u32(value);
    }

    let unit = take_hex(chars, 4)?;
    match unit {
        0xD800..=0xDBFF => {
            let mut lookahead = chars.clone();
            if lookahead.next() == Some('\\') && lookahead.next() == Some('u') {
                if let Some(low @ 0xDC00..=0xDFFF) = take_hex(&mut lookahead, 4) {
                    *chars = lookahead;
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code);
                }
            }
            Some(char::REPLACEMENT_CHARACTER)
        }
        0xDC00..=0xDFFF => Some(char::REPLACEMENT_CHARACTER),
        _ => char::from_u32(unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Option<String> {
        decode_string_literal(raw)
    }

    #[test]
    fn test_plain_literals() {
        assert_eq!(decode("'posts'").as_deref(), Some("posts"));
        assert_eq!(decode(r#""posts/$id""#).as_deref(), Some("posts/$id"));
        assert_eq!(decode("''").as_deref(), Some(""));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(decode(r"'it\'s'").as_deref(), Some("it's"));
        assert_eq!(decode(r#""say \"hi\"""#).as_deref(), Some("say \"hi\""));
        assert_eq!(decode(r"'a\\b'").as_deref(), Some("a\\b"));
    }

    #[test]
    fn test_control_escapes() {
        assert_eq!(decode(r"'a\nb\tc'").as_deref(), Some("a\nb\tc"));
        assert_eq!(decode(r"'\0'").as_deref(), Some("\0"));
    }

    #[test]
    fn test_hex_and_unicode() {
        assert_eq!(decode(r"'\x41'").as_deref(), Some("A"));
        assert_eq!(decode(r"'\u0041'").as_deref(), Some("A"));
        assert_eq!(decode(r"'\u{1F600}'").as_deref(), Some("\u{1F600}"));
        assert_eq!(decode(r"'\uD83D\uDE00'").as_deref(), Some("\u{1F600}"));
        assert_eq!(decode(r"'\uD83Dx'").as_deref(), Some("\u{FFFD}x"));
    }

    #[test]
    fn test_line_continuation() {
        assert_eq!(decode("'users/\\\n$id'").as_deref(), Some("users/$id"));
        assert_eq!(decode("'users/\\\r\n$id'").as_deref(), Some("users/$id"));
    }

    #[test]
    fn test_identity_escape() {
        assert_eq!(decode(r"'\$id'").as_deref(), Some("$id"));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(decode(r"'\xZZ'"), None);
        assert_eq!(decode(r"'\u{}'"), None);
        assert_eq!(decode(r"'\u12'"), None);
        assert_eq!(decode("'unterminated"), None);
        assert_eq!(decode("posts"), None);
    }
}
