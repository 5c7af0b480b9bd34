use serde_json::{Map as JsonMap, Value};

use crate::{Codec, DecodeError, DecodeResult, EncodeResult, Input, Literal};

/// An arbitrary JSON document. `None` is the absent value; `Some(Value::Null)`
/// is a present JSON `null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Json {
    pub value: Option<Value>,
}

impl Json {
    pub fn new(value: Value) -> Self {
        Json { value: Some(value) }
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

impl Codec for Json {
    const TYPE_NAME: &'static str = "JSON";

    fn encode(&self) -> EncodeResult<Literal> {
        match &self.value {
            None => Ok(Literal::Null),
            Some(value) => Ok(Literal::Text(serde_json::to_string(value)?)),
        }
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            let value = serde_json::from_str(&text?)
                .map_err(|e| DecodeError::malformed(Self::TYPE_NAME, e.to_string()))?;
            self.value = Some(value);
            return Ok(());
        }
        let shape = input.shape();
        self.value = match input {
            Input::Absent => None,
            Input::Mapping(map) => Some(Value::Object(map)),
            Input::Sequence(elements) => Some(Value::Array(elements)),
            Input::Scalar(scalar) => match scalar.to_json() {
                Some(value) => Some(value),
                None => return Err(DecodeError::unsupported(Self::TYPE_NAME, shape)),
            },
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}

const STRUCT_TAG: &str = "STRUCT";

/// Returns the member type tag that describes a value's shape.
fn shape_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "BOOLEAN",
        Value::Number(n) if n.is_i64() => "BIGINT",
        Value::Number(n) if n.is_u64() => "UBIGINT",
        Value::Number(_) => "DOUBLE",
        Value::String(_) => "VARCHAR",
        Value::Array(_) => "LIST",
        Value::Object(_) => STRUCT_TAG,
    }
}

/// A tagged value of one of several declared member types.
///
/// Decoding never fails: inputs that cannot be interpreted reset the union
/// to its empty state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Union {
    pub types: Vec<String>,
    pub active: String,
    pub value: Option<Value>,
}

impl Union {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Union {
            types: types.into_iter().map(Into::into).collect(),
            active: String::new(),
            value: None,
        }
    }

    /// Makes `tag` the active member holding `value`.
    pub fn set(&mut self, tag: impl Into<String>, value: Value) {
        self.active = tag.into();
        self.value = Some(value);
    }

    fn reset(&mut self) {
        self.active.clear();
        self.value = None;
    }

    fn is_member(&self, tag: &str) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t == tag)
    }

    fn assign(&mut self, value: Value) {
        match value {
            Value::Null => self.reset(),
            Value::Object(mut map) if map.len() == 1 => {
                let tag = map.keys().next().cloned().unwrap_or_default();
                if self.is_member(&tag) {
                    let member = map.remove(&tag).unwrap_or(Value::Null);
                    self.set(tag, member);
                } else {
                    self.set(STRUCT_TAG, Value::Object(map));
                }
            }
            other => {
                let tag = shape_tag(&other);
                self.set(tag, other);
            }
        }
    }

    fn fall_back(&mut self, shape: &'static str) {
        tracing::debug!(target_type = Self::TYPE_NAME, shape, "unrecognized union input, resetting");
        self.reset();
    }
}

impl Codec for Union {
    const TYPE_NAME: &'static str = "UNION";

    fn encode(&self) -> EncodeResult<Literal> {
        let Some(value) = &self.value else {
            return Ok(Literal::Null);
        };
        let mut tagged = JsonMap::new();
        tagged.insert(self.active.clone(), value.clone());
        Ok(Literal::Text(serde_json::to_string(&tagged)?))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        let shape = input.shape();
        if let Some(text) = input.text() {
            match text.map(|t| serde_json::from_str::<Value>(&t)) {
                Ok(Ok(value)) => self.assign(value),
                _ => self.fall_back(shape),
            }
            return Ok(());
        }
        match input {
            Input::Absent => self.reset(),
            Input::Mapping(map) => self.assign(Value::Object(map)),
            Input::Sequence(elements) => self.assign(Value::Array(elements)),
            Input::Scalar(scalar) => match scalar.to_json() {
                Some(value) => self.assign(value),
                None => self.fall_back(shape),
            },
            Input::Text(_) | Input::Bytes(_) => self.fall_back(shape),
        }
        Ok(())
    }
}
