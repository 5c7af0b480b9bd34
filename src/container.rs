use std::ops::Index;

use serde_json::{Map as JsonMap, Value};

use crate::literal::{
    EMPTY_LIST_LITERAL, EMPTY_MAP_LITERAL, EMPTY_STRUCT_LITERAL, write_quoted, write_sql_value,
};
use crate::parse::{parse_literal, parse_map_literal};
use crate::{Codec, DecodeError, DecodeResult, EncodeResult, Input, Literal};

static NULL: Value = Value::Null;

/// Parses object text, trying JSON first and then the engine's struct and map
/// literal forms.
fn parse_object_text(target: &'static str, text: &str) -> DecodeResult<JsonMap<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DecodeError::malformed(
            target,
            format!("expected an object, found {other}"),
        )),
        Err(json_err) => parse_map_literal(target, text)
            .map_err(|_| DecodeError::malformed(target, json_err.to_string())),
    }
}

/// Parses array text, trying JSON first and then the engine's list literal
/// form.
fn parse_array_text(target: &'static str, text: &str) -> DecodeResult<Vec<Value>> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(json_err) => parse_literal(target, text)
            .map_err(|_| DecodeError::malformed(target, json_err.to_string()))?,
    };
    match value {
        Value::Array(elements) => Ok(elements),
        other => Err(DecodeError::malformed(
            target,
            format!("expected a list, found {other}"),
        )),
    }
}

/// A named-field record. An absent record is distinct from an empty one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Struct {
    pub fields: Option<JsonMap<String, Value>>,
}

impl Struct {
    pub fn new(fields: JsonMap<String, Value>) -> Self {
        Struct {
            fields: Some(fields),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.fields.is_none()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.as_ref()?.get(name)
    }
}

/// Missing fields, and every field of an absent record, index as `null`.
impl Index<&str> for Struct {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        self.get(name).unwrap_or(&NULL)
    }
}

impl Codec for Struct {
    const TYPE_NAME: &'static str = "STRUCT";

    fn encode(&self) -> EncodeResult<Literal> {
        match &self.fields {
            None => Ok(Literal::Null),
            Some(fields) if fields.is_empty() => Ok(Literal::from(EMPTY_STRUCT_LITERAL)),
            Some(fields) => Ok(Literal::Text(serde_json::to_string(fields)?)),
        }
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            self.fields = Some(parse_object_text(Self::TYPE_NAME, &text?)?);
            return Ok(());
        }
        self.fields = match input {
            Input::Absent => None,
            Input::Mapping(fields) => Some(fields),
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}

/// A key-to-value mapping rendered as an engine `MAP` literal.
///
/// Entries are kept sorted by key, so the literal is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    pub entries: JsonMap<String, Value>,
}

impl Map {
    pub fn new(entries: JsonMap<String, Value>) -> Self {
        Map { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }
}

impl Codec for Map {
    const TYPE_NAME: &'static str = "MAP";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.entries.is_empty() {
            return Ok(Literal::from(EMPTY_MAP_LITERAL));
        }

        let mut output = String::from("MAP {");
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                output.push_str(", ");
            }
            write_quoted(&mut output, key);
            output.push_str(": ");
            write_sql_value(&mut output, value);
        }
        output.push('}');
        Ok(Literal::Text(output))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            self.entries = parse_object_text(Self::TYPE_NAME, &text?)?;
            return Ok(());
        }
        self.entries = match input {
            Input::Absent => JsonMap::new(),
            Input::Mapping(entries) => entries,
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}

/// An ordered sequence of values of any kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List {
    pub elements: Vec<Value>,
}

impl List {
    pub fn new(elements: Vec<Value>) -> Self {
        List { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Codec for List {
    const TYPE_NAME: &'static str = "LIST";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.elements.is_empty() {
            return Ok(Literal::from(EMPTY_LIST_LITERAL));
        }
        let mut output = String::new();
        write_sql_value(&mut output, &Value::Array(self.elements.clone()));
        Ok(Literal::Text(output))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            self.elements = parse_array_text(Self::TYPE_NAME, &text?)?;
            return Ok(());
        }
        self.elements = match input {
            Input::Absent => Vec::new(),
            Input::Sequence(elements) => elements,
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}

/// A multi-dimensional array with a declared element type.
///
/// Elements are stored as given (inner dimensions as nested arrays);
/// `dimensions` records the nesting depth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NestedArray {
    pub element_type: String,
    pub elements: Vec<Value>,
    pub dimensions: usize,
}

fn nesting_depth(elements: &[Value]) -> usize {
    1 + elements
        .iter()
        .filter_map(Value::as_array)
        .map(|inner| nesting_depth(inner))
        .max()
        .unwrap_or(0)
}

impl NestedArray {
    pub fn new(element_type: impl Into<String>, elements: Vec<Value>) -> Self {
        let dimensions = if elements.is_empty() {
            0
        } else {
            nesting_depth(&elements)
        };
        NestedArray {
            element_type: element_type.into(),
            elements,
            dimensions,
        }
    }

    /// The engine column type, e.g. `INTEGER[][]`.
    pub fn type_name(&self) -> String {
        let mut name = self.element_type.clone();
        for _ in 0..self.dimensions.max(1) {
            name.push_str("[]");
        }
        name
    }

    fn set_elements(&mut self, elements: Vec<Value>) {
        self.dimensions = if elements.is_empty() {
            0
        } else {
            nesting_depth(&elements)
        };
        self.elements = elements;
    }
}

impl Codec for NestedArray {
    const TYPE_NAME: &'static str = "ARRAY";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.elements.is_empty() {
            return Ok(Literal::from(EMPTY_LIST_LITERAL));
        }
        Ok(Literal::Text(serde_json::to_string(&self.elements)?))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            let elements = parse_array_text(Self::TYPE_NAME, &text?)?;
            self.set_elements(elements);
            return Ok(());
        }
        match input {
            Input::Absent => self.set_elements(Vec::new()),
            Input::Sequence(elements) => self.set_elements(elements),
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{List, Map, NestedArray, Struct};
    use crate::{Codec, DecodeErrorKind, Input, Literal, decode};
    use serde_json::{Value, json};

    fn object(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_struct_encode() {
        assert_eq!(Struct::default().encode(), Ok(Literal::Null));
        assert_eq!(
            Struct::new(serde_json::Map::new()).encode(),
            Ok(Literal::from("{}"))
        );
        let s = Struct::new(object(json!({"name": "duck", "legs": 2})));
        assert_eq!(s.encode(), Ok(Literal::from(r#"{"legs":2,"name":"duck"}"#)));
    }

    #[test]
    fn test_struct_decode_native_mapping() {
        let s: Struct = decode(object(json!({"key": "value", "number": 42}))).unwrap();
        assert_eq!(s["key"], "value");
        assert_eq!(s["number"], 42);
        assert_eq!(s["missing"], Value::Null);
    }

    #[test]
    fn test_struct_decode_text() {
        let s: Struct = decode(r#"{"a": [1, 2]}"#).unwrap();
        assert_eq!(s.get("a"), Some(&json!([1, 2])));

        let engine: Struct = decode(b"{'a': 1, 'b': hello}".as_slice()).unwrap();
        assert_eq!(engine.fields, Some(object(json!({"a": 1, "b": "hello"}))));

        let mut s = s;
        s.decode(Input::Absent).unwrap();
        assert!(s.is_absent());
        assert_eq!(s["a"], Value::Null);
    }

    #[test]
    fn test_struct_decode_errors() {
        for text in ["[1, 2]", "{not json", "42"] {
            let err = decode::<Struct>(text).unwrap_err();
            assert!(
                matches!(err.kind(), DecodeErrorKind::MalformedText { target: "STRUCT", .. }),
                "{text:?} -> {err:?}"
            );
        }
        assert_eq!(
            decode::<Struct>(1.5f64).unwrap_err().kind(),
            &DecodeErrorKind::UnsupportedShape {
                target: "STRUCT",
                shape: "float"
            }
        );
        assert!(decode::<Struct>(Input::Sequence(vec![])).is_err());
    }

    #[test]
    fn test_struct_roundtrip() {
        let s = Struct::new(object(json!({"nested": {"x": [true, null]}, "s": "it's"})));
        let literal = s.encode().unwrap();
        let decoded: Struct = decode(literal.as_text().unwrap()).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn test_map_encode() {
        assert_eq!(Map::default().encode(), Ok(Literal::from("MAP {}")));

        let mut m = Map::default();
        m.insert("b", json!("it's"));
        m.insert("a", json!(1));
        m.insert("c", json!([1, null]));
        assert_eq!(
            m.encode(),
            Ok(Literal::from("MAP {'a': 1, 'b': 'it''s', 'c': [1, NULL]}"))
        );
    }

    #[test]
    fn test_map_roundtrip() {
        let m = Map::new(object(json!({"k1": "v", "k2": 2.5, "k3": {"x": false}})));
        let literal = m.encode().unwrap();
        let decoded: Map = decode(literal.as_text().unwrap()).unwrap();
        assert_eq!(decoded, m);
    }

    #[test]
    fn test_map_decode() {
        let display: Map = decode("{a=1, b=x}").unwrap();
        assert_eq!(display.get("a"), Some(&json!(1)));
        assert_eq!(display.get("b"), Some(&json!("x")));

        let json_text: Map = decode(br#"{"a": null}"#.as_slice()).unwrap();
        assert_eq!(json_text.get("a"), Some(&Value::Null));

        let mut m = display;
        m.decode(Input::Absent).unwrap();
        assert_eq!(m.encode(), Ok(Literal::from("MAP {}")));

        assert!(decode::<Map>("MAP {'a' 1}").is_err());
        assert!(decode::<Map>(3i32).is_err());
    }

    #[test]
    fn test_list_encode() {
        assert_eq!(List::default().encode(), Ok(Literal::from("[]")));
        let l = List::new(vec![json!(1), json!("two"), json!(null), json!([3.5])]);
        assert_eq!(l.encode(), Ok(Literal::from("[1, 'two', NULL, [3.5]]")));
    }

    #[test]
    fn test_list_roundtrip() {
        let l = List::new(vec![
            json!("NULL"),
            json!("1"),
            json!(-7),
            json!({"k": "v"}),
            json!(true),
        ]);
        let literal = l.encode().unwrap();
        let decoded: List = decode(literal.as_text().unwrap()).unwrap();
        assert_eq!(decoded, l);
    }

    #[test]
    fn test_list_decode() {
        let native: List = decode(vec![json!(1), json!("a")]).unwrap();
        assert_eq!(native.len(), 2);

        let display: List = decode("[alpha, beta gamma]").unwrap();
        assert_eq!(display.elements, vec![json!("alpha"), json!("beta gamma")]);

        assert!(decode::<List>("{'a': 1}").is_err());
        assert!(decode::<List>("[1, 2").is_err());
        assert!(decode::<List>(object(json!({}))).is_err());
        assert!(decode::<List>(Input::Absent).unwrap().is_empty());
    }

    #[test]
    fn test_nested_array() {
        let empty = NestedArray::new("INTEGER", vec![]);
        assert_eq!(empty.encode(), Ok(Literal::from("[]")));
        assert_eq!(empty.dimensions, 0);

        let matrix = NestedArray::new("INTEGER", vec![json!([1, 2]), json!([3, 4])]);
        assert_eq!(matrix.dimensions, 2);
        assert_eq!(matrix.type_name(), "INTEGER[][]");
        assert_eq!(matrix.encode(), Ok(Literal::from("[[1,2],[3,4]]")));

        let mut decoded = NestedArray::new("INTEGER", vec![]);
        decoded.decode(matrix.encode().unwrap().as_text().unwrap().into()).unwrap();
        assert_eq!(decoded, matrix);

        decoded.decode(Input::from("[[[1]], [[2]]]")).unwrap();
        assert_eq!(decoded.dimensions, 3);
        decoded.decode(Input::Absent).unwrap();
        assert_eq!((decoded.elements.len(), decoded.dimensions), (0, 0));
        assert_eq!(decoded.element_type, "INTEGER");

        assert!(decoded.decode(Input::from("not an array")).is_err());
        assert!(decoded.decode(Input::from(1u8)).is_err());
    }
}
