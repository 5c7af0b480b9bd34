//! Structured metadata records carried through a JSON envelope.
//!
//! Descriptors are not column data. Each one encodes to a JSON object of its
//! fields and decodes from JSON text or a native mapping. [`Constraint`] and
//! [`AnalyticalFunction`] can also render themselves as SQL clauses through
//! [`Fragment`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map as JsonMap, Value};

use crate::{
    Codec, DecodeError, DecodeResult, EncodeError, EncodeErrorKind, EncodeResult, Fragment,
    Input, Literal,
};

/// An optimizer or execution hint attached to a query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryHint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    pub options: JsonMap<String, Value>,
}

/// A table or column constraint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraint {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expression: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub references_table: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references_columns: Vec<String>,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    pub options: JsonMap<String, Value>,
}

/// A window or aggregate function call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticalFunction {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partition_by: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<String>,
    /// A frame clause such as `ROWS BETWEEN 1 PRECEDING AND CURRENT ROW`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub frame: String,
    /// A predicate rendered as `FILTER (WHERE ...)`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
    #[serde(skip_serializing_if = "JsonMap::is_empty")]
    pub options: JsonMap<String, Value>,
}

/// Execution statistics for a single query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceMetrics {
    /// JSON has no non-finite numbers: NaN and infinities encode as `null`,
    /// which decodes back as NaN.
    #[serde(deserialize_with = "nan_if_null")]
    pub execution_time_ms: f64,
    pub rows_processed: u64,
    pub memory_bytes: u64,
    pub options: JsonMap<String, Value>,
}

fn nan_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an additional named measurement, replacing any previous value.
    pub fn record(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.options.insert(key.into(), value.into());
    }
}

macro_rules! impl_descriptor_codec {
    ($ty:ty, $name:literal) => {
        impl Codec for $ty {
            const TYPE_NAME: &'static str = $name;

            fn encode(&self) -> EncodeResult<Literal> {
                Ok(Literal::Text(serde_json::to_string(self)?))
            }

            fn decode(&mut self, input: Input) -> DecodeResult<()> {
                if let Some(text) = input.text() {
                    *self = serde_json::from_str(&text?)
                        .map_err(|e| DecodeError::malformed(Self::TYPE_NAME, e.to_string()))?;
                    return Ok(());
                }
                *self = match input {
                    Input::Absent => Self::default(),
                    Input::Mapping(map) => serde_json::from_value(Value::Object(map))
                        .map_err(|e| DecodeError::malformed(Self::TYPE_NAME, e.to_string()))?,
                    other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
                };
                Ok(())
            }
        }
    };
}

impl_descriptor_codec!(QueryHint, "QUERY_HINT");
impl_descriptor_codec!(Constraint, "CONSTRAINT");
impl_descriptor_codec!(AnalyticalFunction, "ANALYTICAL_FUNCTION");
impl_descriptor_codec!(PerformanceMetrics, "PERFORMANCE_METRICS");

/// Normalizes a kind tag: case-insensitive, `_` and `-` read as spaces.
fn normalize_kind(kind: &str) -> String {
    kind.trim()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn required<'a>(value: &'a str, field: &'static str) -> EncodeResult<&'a str> {
    if value.trim().is_empty() {
        return Err(EncodeError::new(EncodeErrorKind::MissingField(field)));
    }
    Ok(value)
}

fn required_list<'a>(values: &'a [String], field: &'static str) -> EncodeResult<&'a [String]> {
    if values.is_empty() {
        return Err(EncodeError::new(EncodeErrorKind::MissingField(field)));
    }
    Ok(values)
}

fn unsupported_kind(kind: &str) -> EncodeError {
    EncodeError::new(EncodeErrorKind::UnsupportedDescriptorKind(kind.to_string()))
}

impl Fragment for Constraint {
    /// Renders the constraint clause, prefixed with `CONSTRAINT <name>` when
    /// the constraint is named.
    fn to_fragment(&self) -> EncodeResult<String> {
        let mut out = String::new();
        if !self.name.is_empty() {
            out.push_str(&format!("CONSTRAINT {} ", self.name));
        }

        let kind = normalize_kind(required(&self.kind, "type")?);
        match kind.as_str() {
            "CHECK" => {
                out.push_str(&format!("CHECK ({})", required(&self.expression, "expression")?));
            }
            "UNIQUE" | "PRIMARY KEY" => {
                let columns = required_list(&self.columns, "columns")?;
                out.push_str(&format!("{kind} ({})", columns.join(", ")));
            }
            "FOREIGN KEY" => {
                let columns = required_list(&self.columns, "columns")?;
                let table = required(&self.references_table, "references_table")?;
                out.push_str(&format!("FOREIGN KEY ({}) REFERENCES {table}", columns.join(", ")));
                if !self.references_columns.is_empty() {
                    out.push_str(&format!(" ({})", self.references_columns.join(", ")));
                }
            }
            "NOT NULL" => out.push_str("NOT NULL"),
            _ => return Err(unsupported_kind(&self.kind)),
        }
        Ok(out)
    }
}

impl AnalyticalFunction {
    fn call(&self) -> EncodeResult<String> {
        let name = required(&self.name, "name")?;
        let mut out = format!("{name}({})", self.arguments.join(", "));
        if !self.filter.is_empty() {
            out.push_str(&format!(" FILTER (WHERE {})", self.filter));
        }
        Ok(out)
    }

    fn window(&self) -> String {
        let mut clauses = Vec::new();
        if !self.partition_by.is_empty() {
            clauses.push(format!("PARTITION BY {}", self.partition_by.join(", ")));
        }
        if !self.order_by.is_empty() {
            clauses.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }
        if !self.frame.is_empty() {
            clauses.push(self.frame.clone());
        }
        format!("OVER ({})", clauses.join(" "))
    }
}

impl Fragment for AnalyticalFunction {
    /// Renders the function call. Window functions always carry an `OVER`
    /// clause, even an empty one.
    fn to_fragment(&self) -> EncodeResult<String> {
        match normalize_kind(required(&self.kind, "type")?).as_str() {
            "WINDOW" => Ok(format!("{} {}", self.call()?, self.window())),
            "AGGREGATE" => self.call(),
            _ => Err(unsupported_kind(&self.kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalyticalFunction, Constraint, PerformanceMetrics, QueryHint};
    use crate::{Codec, DecodeErrorKind, EncodeErrorKind, Fragment, Input, Literal, decode};
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hint_envelope() {
        let hint = QueryHint {
            kind: "threads".to_string(),
            value: "4".to_string(),
            ..Default::default()
        };
        assert_eq!(
            hint.encode(),
            Ok(Literal::from(r#"{"type":"threads","value":"4"}"#))
        );

        let decoded: QueryHint = decode(hint.encode().unwrap().as_text().unwrap()).unwrap();
        assert_eq!(decoded, hint);
    }

    #[test]
    fn test_descriptor_roundtrips() {
        let constraint = Constraint {
            name: "fk_user".to_string(),
            kind: "FOREIGN KEY".to_string(),
            columns: strings(&["user_id"]),
            references_table: "users".to_string(),
            references_columns: strings(&["id"]),
            ..Default::default()
        };
        let literal = constraint.encode().unwrap();
        assert_eq!(decode::<Constraint>(literal.as_text().unwrap()), Ok(constraint));

        let mut metrics = PerformanceMetrics::new();
        metrics.execution_time_ms = 12.5;
        metrics.rows_processed = 1000;
        metrics.record("spilled", true);
        let literal = metrics.encode().unwrap();
        assert_eq!(decode::<PerformanceMetrics>(literal.as_text().unwrap()), Ok(metrics));
    }

    #[test]
    fn test_decode_mapping_and_absent() {
        let mut f = AnalyticalFunction::default();
        f.decode(Input::from(json!({
            "name": "sum",
            "type": "AGGREGATE",
            "arguments": ["amount"],
        })))
        .unwrap();
        assert_eq!(f.name, "sum");
        assert_eq!(f.arguments, strings(&["amount"]));

        f.decode(Input::Absent).unwrap();
        assert_eq!(f, AnalyticalFunction::default());
    }

    #[test]
    fn test_decode_errors() {
        let err = decode::<QueryHint>("{not json").unwrap_err();
        assert!(matches!(
            err.kind(),
            DecodeErrorKind::MalformedText {
                target: "QUERY_HINT",
                ..
            }
        ));
        let err = decode::<Constraint>(json!({"columns": "id"})).unwrap_err();
        assert!(matches!(err.kind(), DecodeErrorKind::MalformedText { .. }));
        assert_eq!(
            decode::<PerformanceMetrics>(5i32).unwrap_err().kind(),
            &DecodeErrorKind::UnsupportedShape {
                target: "PERFORMANCE_METRICS",
                shape: "integer"
            }
        );
    }

    #[test]
    fn test_metrics_non_finite_time() {
        for time in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let metrics = PerformanceMetrics {
                execution_time_ms: time,
                rows_processed: 7,
                ..Default::default()
            };
            let literal = metrics.encode().unwrap();
            assert!(literal.as_text().unwrap().contains(r#""execution_time_ms":null"#));

            let decoded: PerformanceMetrics = decode(literal.as_text().unwrap()).unwrap();
            assert!(decoded.execution_time_ms.is_nan());
            assert_eq!(decoded.rows_processed, 7);
        }
    }

    #[test]
    fn test_metrics_options_start_empty() {
        let mut metrics = PerformanceMetrics::new();
        assert!(metrics.options.is_empty());
        metrics.record("cache_hits", 3);
        assert_eq!(metrics.options["cache_hits"], 3);
    }

    #[test]
    fn test_constraint_fragments() {
        let cases = [
            (
                Constraint {
                    kind: "CHECK".to_string(),
                    expression: "price > 0".to_string(),
                    ..Default::default()
                },
                "CHECK (price > 0)",
            ),
            (
                Constraint {
                    name: "uq_email".to_string(),
                    kind: "unique".to_string(),
                    columns: strings(&["email"]),
                    ..Default::default()
                },
                "CONSTRAINT uq_email UNIQUE (email)",
            ),
            (
                Constraint {
                    kind: "primary_key".to_string(),
                    columns: strings(&["a", "b"]),
                    ..Default::default()
                },
                "PRIMARY KEY (a, b)",
            ),
            (
                Constraint {
                    kind: "FOREIGN KEY".to_string(),
                    columns: strings(&["user_id"]),
                    references_table: "users".to_string(),
                    references_columns: strings(&["id"]),
                    ..Default::default()
                },
                "FOREIGN KEY (user_id) REFERENCES users (id)",
            ),
            (
                Constraint {
                    kind: "not null".to_string(),
                    ..Default::default()
                },
                "NOT NULL",
            ),
        ];
        for (constraint, expected) in cases {
            assert_eq!(constraint.to_fragment().as_deref(), Ok(expected));
        }
    }

    #[test]
    fn test_constraint_fragment_errors() {
        let unknown = Constraint {
            kind: "EXCLUDE".to_string(),
            ..Default::default()
        };
        assert_eq!(
            unknown.to_fragment().unwrap_err().kind(),
            &EncodeErrorKind::UnsupportedDescriptorKind("EXCLUDE".to_string())
        );

        let check = Constraint {
            kind: "CHECK".to_string(),
            ..Default::default()
        };
        assert_eq!(
            check.to_fragment().unwrap_err().kind(),
            &EncodeErrorKind::MissingField("expression")
        );

        assert_eq!(
            Constraint::default().to_fragment().unwrap_err().kind(),
            &EncodeErrorKind::MissingField("type")
        );
    }

    #[test]
    fn test_function_fragments() {
        let window = AnalyticalFunction {
            name: "row_number".to_string(),
            kind: "WINDOW".to_string(),
            partition_by: strings(&["dept"]),
            order_by: strings(&["salary DESC", "id"]),
            ..Default::default()
        };
        assert_eq!(
            window.to_fragment().as_deref(),
            Ok("row_number() OVER (PARTITION BY dept ORDER BY salary DESC, id)")
        );

        let framed = AnalyticalFunction {
            name: "avg".to_string(),
            kind: "window".to_string(),
            arguments: strings(&["price"]),
            order_by: strings(&["ts"]),
            frame: "ROWS BETWEEN 2 PRECEDING AND CURRENT ROW".to_string(),
            ..Default::default()
        };
        assert_eq!(
            framed.to_fragment().as_deref(),
            Ok("avg(price) OVER (ORDER BY ts ROWS BETWEEN 2 PRECEDING AND CURRENT ROW)")
        );

        let bare = AnalyticalFunction {
            name: "rank".to_string(),
            kind: "WINDOW".to_string(),
            ..Default::default()
        };
        assert_eq!(bare.to_fragment().as_deref(), Ok("rank() OVER ()"));

        let aggregate = AnalyticalFunction {
            name: "count".to_string(),
            kind: "AGGREGATE".to_string(),
            arguments: strings(&["*"]),
            filter: "status = 'ok'".to_string(),
            ..Default::default()
        };
        assert_eq!(
            aggregate.to_fragment().as_deref(),
            Ok("count(*) FILTER (WHERE status = 'ok')")
        );
    }

    #[test]
    fn test_function_fragment_errors() {
        let unnamed = AnalyticalFunction {
            kind: "AGGREGATE".to_string(),
            ..Default::default()
        };
        assert_eq!(
            unnamed.to_fragment().unwrap_err().kind(),
            &EncodeErrorKind::MissingField("name")
        );

        let scalar = AnalyticalFunction {
            name: "abs".to_string(),
            kind: "SCALAR".to_string(),
            ..Default::default()
        };
        assert_eq!(
            scalar.to_fragment().unwrap_err().kind(),
            &EncodeErrorKind::UnsupportedDescriptorKind("SCALAR".to_string())
        );
    }
}
