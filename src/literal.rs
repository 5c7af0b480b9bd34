use std::fmt::{self, Write};

use bytes::Bytes;
use serde_json::Value;

/// The token the engine parses as SQL NULL.
pub const NULL_LITERAL: &str = "NULL";

/// Empty struct literal produced by `Struct` for an empty (but present) mapping.
pub const EMPTY_STRUCT_LITERAL: &str = "{}";

/// Empty map literal, also produced for an absent mapping.
pub const EMPTY_MAP_LITERAL: &str = "MAP {}";

/// Empty list literal produced by `List` and `NestedArray`.
pub const EMPTY_LIST_LITERAL: &str = "[]";

/// Literal produced by `Decimal` for an empty payload.
pub const ZERO_DECIMAL_LITERAL: &str = "0";

/// Literal produced by `Interval` when every component is zero.
pub const EMPTY_INTERVAL_LITERAL: &str = "INTERVAL '0 SECS'";

/// The external representation produced by a codec's encode operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// The absent marker.
    Null,

    /// Literal text, spliced as-is or bound as a text parameter.
    Text(String),

    /// A raw byte payload with no text escaping. Only produced by `Blob`.
    Bytes(Bytes),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Returns the literal text, or `None` for `Null` and `Bytes`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the byte payload, or `None` for `Null` and `Text`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Literal::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Formats the literal as splice-ready SQL: `NULL`, the text verbatim, or a
/// hex-escaped `BLOB` literal.
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str(NULL_LITERAL),
            Literal::Text(s) => f.write_str(s),
            Literal::Bytes(b) => {
                f.write_char('\'')?;
                for byte in b.iter() {
                    write!(f, "\\x{byte:02X}")?;
                }
                f.write_str("'::BLOB")
            }
        }
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Text(s)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

/// Appends `s` as a single-quoted SQL string, doubling embedded quotes.
pub(crate) fn write_quoted(output: &mut String, s: &str) {
    output.reserve(s.len() + 2);
    output.push('\'');
    for c in s.chars() {
        if c == '\'' {
            output.push('\'');
        }
        output.push(c);
    }
    output.push('\'');
}

pub(crate) fn quoted(s: &str) -> String {
    let mut output = String::new();
    write_quoted(&mut output, s);
    output
}

/// Appends the engine literal form of an arbitrary nested value.
///
/// Strings are single-quoted, arrays become list literals and objects become
/// struct literals.
pub(crate) fn write_sql_value(output: &mut String, value: &Value) {
    match value {
        Value::Null => output.push_str(NULL_LITERAL),
        Value::Bool(b) => output.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => output.push_str(&n.to_string()),
        Value::String(s) => write_quoted(output, s),
        Value::Array(elements) => {
            output.push('[');
            for (i, elem) in elements.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                write_sql_value(output, elem);
            }
            output.push(']');
        }
        Value::Object(fields) => {
            output.push('{');
            for (i, (key, elem)) in fields.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                write_quoted(output, key);
                output.push_str(": ");
                write_sql_value(output, elem);
            }
            output.push('}');
        }
    }
}
