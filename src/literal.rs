//! JavaScript object-literal writer.

use crate::error::{ChartError, ChartResult};
use crate::parser;
use crate::value::{format_number, Value};

const INDENT: &str = "  ";

/// Words that cannot appear as bare object keys without quoting in the
/// older engines the library still supports.
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
    "implements", "interface", "package", "private", "protected", "public", "await",
];

/// Renders `value` as object-literal source.
pub fn to_literal(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// Parses `text` back to confirm it is a well-formed literal.
pub fn validate_literal(text: &str) -> ChartResult<()> {
    parser::parse_literal_text(text)
        .map(|_| ())
        .map_err(|e| ChartError::Parse(format!("generated literal does not parse: {e}")))
}

pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&key)
}

/// JSON string quoting, additionally escaping `</` so the text can sit
/// inside a `<script>` element.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut prev = '\0';
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '/' if prev == '<' => out.push_str("\\/"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
        prev = c;
    }
    out.push('"');
    out
}

fn write_key(out: &mut String, key: &str) {
    if is_identifier(key) {
        out.push_str(key);
    } else {
        out.push_str(&quote_string(key));
    }
}

fn is_flat(items: &[Value]) -> bool {
    items.iter().all(|item| match item {
        Value::Array(inner) => inner.iter().all(Value::is_scalar),
        Value::Object(_) | Value::Code(_) => false,
        _ => true,
    })
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => out.push_str(&quote_string(s)),
        Value::Code(code) => out.push_str(code.trim()),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) if is_flat(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth);
            }
            out.push(']');
        }
        Value::Array(items) => {
            out.push_str("[\n");
            for (idx, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1);
                if idx + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (idx, (key, item)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                write_key(out, key);
                out.push_str(": ");
                write_value(out, item, depth + 1);
                if idx + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    #[test]
    fn test_keys_are_quoted_only_when_needed() {
        let value = object! {
            "plain" => 1,
            "with-dash" => 2,
            "default" => 3,
        };
        let text = to_literal(&value);
        assert_eq!(text, "{\n  plain: 1,\n  \"with-dash\": 2,\n  \"default\": 3\n}");
    }

    #[test]
    fn test_code_is_emitted_verbatim() {
        let value = object! {
            "formatter" => Value::Code("function() { return this.y; }".to_owned()),
            "name" => "function() {}",
        };
        let text = to_literal(&value);
        assert!(text.contains("formatter: function() { return this.y; }"));
        assert!(text.contains("name: \"function() {}\""));
    }

    #[test]
    fn test_flat_arrays_stay_inline() {
        let value = object! {
            "data" => Value::Array(vec![
                Value::Array(vec![Value::from(1), Value::from(2)]),
                Value::Array(vec![Value::from(3), Value::Null]),
            ]),
        };
        assert_eq!(to_literal(&value), "{\n  data: [[1, 2], [3, null]]\n}");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("a\"b\n</script>"), r#""a\"b\n<\/script>""#);
    }

    #[test]
    fn test_validate_literal() {
        assert!(validate_literal("{ a: [1, 2], b: 'x' }").is_ok());
        assert!(validate_literal("{ a: [1, 2 }").is_err());
    }
}
