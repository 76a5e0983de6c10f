//! Rendering of JSON values and labels as Python source text.

use regex::Regex;
use serde_json::Value;

lazy_static::lazy_static! {
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub fn is_identifier(name: &str) -> bool {
    IDENT_RE.is_match(name) && !KEYWORDS.contains(&name)
}

/// Python literal for a JSON value: `true` → `True`, `null` → `None`, objects → dicts.
pub fn literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string_literal(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(literal).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", string_literal(k), literal(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Single-line comment text: line breaks become spaces, surrounding space trimmed.
pub fn comment_text(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line comment block, one `# ` line per input line.
///
/// `\r\n`, `\n` and a bare `\r` all end a line, as they do for Python.
pub fn comment_block(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = text.strip_suffix(['\r', '\n']).unwrap_or(&text);
    let lines: Vec<String> = text
        .split(['\r', '\n'])
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "#".to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect();
    if lines.is_empty() {
        "#".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_values_become_python_literals() {
        let value = json!({"text": "Hello, Alice!", "ok": true, "n": null, "xs": [1, 2.5]});
        assert_eq!(
            literal(&value),
            r#"{"text": "Hello, Alice!", "ok": True, "n": None, "xs": [1, 2.5]}"#
        );
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(string_literal("a\"b\\c\nd"), r#""a\"b\\c\nd""#);
        assert_eq!(string_literal("\u{1}"), r#""\x01""#);
        assert_eq!(string_literal("héllo"), "\"héllo\"");
    }

    #[test]
    fn identifiers_exclude_keywords() {
        assert!(is_identifier("name"));
        assert!(is_identifier("_private2"));
        assert!(!is_identifier("class"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("with space"));
    }

    #[test]
    fn comment_block_prefixes_each_line() {
        assert_eq!(comment_block("one\n\ntwo  "), "# one\n#\n# two");
        assert_eq!(comment_block(""), "#");
    }

    #[test]
    fn comment_block_breaks_on_carriage_returns() {
        assert_eq!(
            comment_block("harmless note\rprint('x')"),
            "# harmless note\n# print('x')"
        );
        assert_eq!(comment_block("a\r\nb\n"), "# a\n# b");
    }
}
