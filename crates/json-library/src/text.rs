//! Document text codec.
//!
//! Output uses `", "` and `": "` separators, or one element per line with
//! an indent. Key order and element order are kept as stored.

use serde_json::Value;

use crate::error::Result;

#[derive(Clone, Copy)]
struct TextOptions {
    indent: Option<usize>,
    ensure_ascii: bool,
}

/// Serialize `doc` to text.
///
/// `indent` is the number of spaces per nesting level; `None` keeps the
/// output on one line. With `ensure_ascii` every non-ASCII character is
/// written as a `\uXXXX` escape.
pub fn convert_json_to_string(doc: &Value, indent: Option<usize>, ensure_ascii: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, doc, &TextOptions { indent, ensure_ascii }, 0);
    out
}

/// Parse text into a document.
pub fn convert_string_to_json(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

fn write_value(out: &mut String, val: &Value, options: &TextOptions, level: usize) {
    match val {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s, options.ensure_ascii),
        Value::Array(arr) => {
            if arr.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push('[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_break(out, options, level + 1, i > 0);
                write_value(out, item, options, level + 1);
            }
            write_break(out, options, level, false);
            out.push(']');
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push('{');
            for (i, (key, item)) in obj.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_break(out, options, level + 1, i > 0);
                write_string(out, key, options.ensure_ascii);
                out.push_str(": ");
                write_value(out, item, options, level + 1);
            }
            write_break(out, options, level, false);
            out.push('}');
        }
    }
}

/// Newline plus indentation, or the compact space after a comma.
fn write_break(out: &mut String, options: &TextOptions, level: usize, after_comma: bool) {
    match options.indent {
        Some(width) => {
            out.push('\n');
            out.extend(std::iter::repeat(' ').take(width * level));
        }
        None if after_comma => out.push(' '),
        None => {}
    }
}

fn write_string(out: &mut String, s: &str, ensure_ascii: bool) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => push_escape(out, c as u16),
            c if ensure_ascii && !c.is_ascii() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    push_escape(out, *unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn push_escape(out: &mut String, unit: u16) {
    out.push_str(&format!("\\u{unit:04x}"));
}
