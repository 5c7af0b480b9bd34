use crate::{DecodeResult, EncodeResult, Input, Literal};

/// Core trait for value wrappers that translate to and from the engine's
/// literal forms.
pub trait Codec {
    /// The engine type name, used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Produce the external representation of this value.
    ///
    /// Absent values produce the type's absent marker. Only `Enum` (and
    /// descriptor serialization) can fail.
    fn encode(&self) -> EncodeResult<Literal>;

    /// Repopulate this value in place from an external input.
    ///
    /// `Input::Absent` always succeeds and resets the receiver to its zero
    /// state. Which other shapes are accepted, and whether unsupported shapes
    /// fail or are coerced, is specific to each type.
    fn decode(&mut self, input: Input) -> DecodeResult<()>;
}

/// Descriptors that can be rendered directly as a SQL clause.
pub trait Fragment {
    fn to_fragment(&self) -> EncodeResult<String>;
}

/// Encode a value to its external representation.
pub fn encode<T: Codec>(value: &T) -> EncodeResult<Literal> {
    value.encode()
}

/// Decode a fresh value from an external input.
pub fn decode<T: Codec + Default>(input: impl Into<Input>) -> DecodeResult<T> {
    let mut value = T::default();
    value.decode(input.into())?;
    Ok(value)
}
