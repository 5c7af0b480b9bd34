use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use num_bigint::BigInt;
use serde_json::{Map as JsonMap, Value};

use crate::{DecodeError, DecodeErrorKind, DecodeResult};

/// A native scalar value already produced by the engine client or by
/// application code.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    BigInt(BigInt),

    /// The engine client's native interval: a month count, a day count and a
    /// microsecond count, each independently signed.
    Interval { months: i32, days: i32, micros: i64 },

    #[cfg(feature = "chrono")]
    Timestamp(chrono::DateTime<chrono::FixedOffset>),
}

impl Scalar {
    fn shape(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) | Scalar::UInt(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::BigInt(_) => "big integer",
            Scalar::Interval { .. } => "interval",
            #[cfg(feature = "chrono")]
            Scalar::Timestamp(_) => "timestamp",
        }
    }

    /// Converts to a JSON value where a lossless representation exists.
    pub(crate) fn to_json(&self) -> Option<Value> {
        match self {
            Scalar::Bool(b) => Some(Value::Bool(*b)),
            Scalar::Int(n) => Some(Value::from(*n)),
            Scalar::UInt(n) => Some(Value::from(*n)),
            Scalar::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::UInt(n) => write!(f, "{n}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::BigInt(n) => write!(f, "{n}"),
            Scalar::Interval {
                months,
                days,
                micros,
            } => write!(f, "{months} months {days} days {micros} microseconds"),
            #[cfg(feature = "chrono")]
            Scalar::Timestamp(ts) => write!(f, "{}", ts.format(crate::timestamp::TIMESTAMP_FORMAT)),
        }
    }
}

/// An external value handed to a codec's decode operation.
///
/// This is the closed set of shapes the engine client layer (or application
/// code) can produce for a column value. Each codec documents which variants
/// it accepts.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Input {
    /// SQL NULL / no value.
    #[default]
    Absent,

    /// Textual form.
    Text(String),

    /// Byte form, treated as an alternative textual form by text-accepting
    /// codecs.
    Bytes(Bytes),

    /// A native scalar.
    Scalar(Scalar),

    /// A native name-to-value mapping.
    Mapping(JsonMap<String, Value>),

    /// A native ordered sequence.
    Sequence(Vec<Value>),
}

impl Input {
    /// Returns a short description of the input's shape for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Input::Absent => "absent",
            Input::Text(_) => "text",
            Input::Bytes(_) => "bytes",
            Input::Scalar(s) => s.shape(),
            Input::Mapping(_) => "mapping",
            Input::Sequence(_) => "sequence",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Input::Absent)
    }

    /// Returns the textual form of `Text` and `Bytes` inputs, `None` for
    /// every other shape. Bytes must be valid UTF-8.
    pub(crate) fn text(&self) -> Option<DecodeResult<Cow<'_, str>>> {
        match self {
            Input::Text(s) => Some(Ok(Cow::Borrowed(s.as_str()))),
            Input::Bytes(b) => Some(
                std::str::from_utf8(b)
                    .map(Cow::Borrowed)
                    .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidUtf8)),
            ),
            _ => None,
        }
    }

    /// Coerces any present input to its textual form. Used by the lenient
    /// codecs, which never fail.
    pub(crate) fn into_lossy_text(self) -> Option<String> {
        match self {
            Input::Absent => None,
            Input::Text(s) => Some(s),
            Input::Bytes(b) => Some(String::from_utf8_lossy(&b).into_owned()),
            Input::Scalar(s) => Some(s.to_string()),
            Input::Mapping(m) => Some(Value::Object(m).to_string()),
            Input::Sequence(v) => Some(Value::Array(v).to_string()),
        }
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(s.to_string())
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s)
    }
}

impl From<Bytes> for Input {
    fn from(b: Bytes) -> Self {
        Input::Bytes(b)
    }
}

impl From<Vec<u8>> for Input {
    fn from(b: Vec<u8>) -> Self {
        Input::Bytes(Bytes::from(b))
    }
}

impl From<&[u8]> for Input {
    fn from(b: &[u8]) -> Self {
        Input::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Scalar> for Input {
    fn from(s: Scalar) -> Self {
        Input::Scalar(s)
    }
}

macro_rules! impl_input_from_scalar {
    ($ty:ty, $variant:ident, $conv:ty) => {
        impl From<$ty> for Input {
            fn from(v: $ty) -> Self {
                Input::Scalar(Scalar::$variant(<$conv>::from(v)))
            }
        }
    };
}

impl_input_from_scalar!(bool, Bool, bool);
impl_input_from_scalar!(i8, Int, i64);
impl_input_from_scalar!(i16, Int, i64);
impl_input_from_scalar!(i32, Int, i64);
impl_input_from_scalar!(i64, Int, i64);
impl_input_from_scalar!(u8, UInt, u64);
impl_input_from_scalar!(u16, UInt, u64);
impl_input_from_scalar!(u32, UInt, u64);
impl_input_from_scalar!(u64, UInt, u64);
impl_input_from_scalar!(f32, Float, f64);
impl_input_from_scalar!(f64, Float, f64);
impl_input_from_scalar!(BigInt, BigInt, BigInt);

#[cfg(feature = "chrono")]
impl From<chrono::DateTime<chrono::FixedOffset>> for Input {
    fn from(ts: chrono::DateTime<chrono::FixedOffset>) -> Self {
        Input::Scalar(Scalar::Timestamp(ts))
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::DateTime<chrono::Utc>> for Input {
    fn from(ts: chrono::DateTime<chrono::Utc>) -> Self {
        Input::Scalar(Scalar::Timestamp(ts.fixed_offset()))
    }
}

impl From<JsonMap<String, Value>> for Input {
    fn from(m: JsonMap<String, Value>) -> Self {
        Input::Mapping(m)
    }
}

impl From<Vec<Value>> for Input {
    fn from(v: Vec<Value>) -> Self {
        Input::Sequence(v)
    }
}

/// Converts a JSON tree into the closest input shape: `null` is absent,
/// objects are mappings, arrays are sequences, and scalars become native
/// scalars.
impl From<Value> for Input {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Input::Absent,
            Value::Bool(b) => Input::Scalar(Scalar::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Input::Scalar(Scalar::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Input::Scalar(Scalar::UInt(u))
                } else {
                    Input::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Input::Text(s),
            Value::Array(a) => Input::Sequence(a),
            Value::Object(m) => Input::Mapping(m),
        }
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(v: Option<T>) -> Self {
        v.map_or(Input::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::{Input, Scalar};
    use crate::DecodeErrorKind;
    use bytes::Bytes;
    use serde_json::json;

    #[test]
    fn test_text_and_bytes_are_equivalent() {
        let text = Input::from("abc");
        let bytes = Input::from(b"abc".as_slice());
        assert_eq!(text.text().unwrap().unwrap(), "abc");
        assert_eq!(bytes.text().unwrap().unwrap(), "abc");
        assert!(Input::from(42i64).text().is_none());
    }

    #[test]
    fn test_invalid_utf8_bytes() {
        let input = Input::Bytes(Bytes::from_static(&[0xFF, 0xFE]));
        let err = input.text().unwrap().unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::InvalidUtf8);
    }

    #[test]
    fn test_lossy_text() {
        assert_eq!(Input::Absent.into_lossy_text(), None);
        assert_eq!(Input::from(123i32).into_lossy_text().as_deref(), Some("123"));
        assert_eq!(Input::from(true).into_lossy_text().as_deref(), Some("true"));
        assert_eq!(
            Input::from(json!({"a": 1})).into_lossy_text().as_deref(),
            Some("{\"a\":1}")
        );
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(Input::from(json!(null)), Input::Absent);
        assert_eq!(Input::from(json!(7)), Input::Scalar(Scalar::Int(7)));
        assert_eq!(Input::from(json!(u64::MAX)), Input::Scalar(Scalar::UInt(u64::MAX)));
        assert_eq!(Input::from(json!("x")), Input::Text("x".to_string()));
        assert_eq!(Input::from(json!([1])), Input::Sequence(vec![json!(1)]));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Input::from(None::<&str>), Input::Absent);
        assert_eq!(Input::from(Some(5u8)), Input::Scalar(Scalar::UInt(5)));
    }
}
