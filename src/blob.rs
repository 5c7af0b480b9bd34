use bytes::Bytes;

use crate::{Codec, DecodeError, DecodeResult, EncodeResult, Input, Literal};

/// An opaque binary payload.
///
/// Unlike every other codec, an empty payload is a present value: encoding
/// never produces the absent marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob {
    pub data: Bytes,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Blob { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Codec for Blob {
    const TYPE_NAME: &'static str = "BLOB";

    fn encode(&self) -> EncodeResult<Literal> {
        Ok(Literal::Bytes(self.data.clone()))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        self.data = match input {
            Input::Absent => Bytes::new(),
            Input::Bytes(b) => b,
            Input::Text(s) => Bytes::from(s),
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Blob;
    use crate::{Codec, DecodeErrorKind, Input, Literal, decode};
    use bytes::Bytes;

    #[test]
    fn test_empty_blob_is_present() {
        let empty = Blob::default();
        let literal = empty.encode().unwrap();
        assert!(!literal.is_null());
        assert_eq!(literal, Literal::Bytes(Bytes::new()));
    }

    #[test]
    fn test_roundtrip() {
        let blob = Blob::new(vec![0x00, 0xDE, 0xAD, 0xBE, 0xEF]);
        let literal = blob.encode().unwrap();
        assert_eq!(literal.as_bytes().map(|b| b.len()), Some(5));

        let decoded: Blob = decode(literal.as_bytes().unwrap().clone()).unwrap();
        assert_eq!(decoded, blob);
    }

    #[test]
    fn test_decode_shapes() {
        let mut blob = Blob::new(Bytes::from_static(b"old"));
        blob.decode(Input::from("text")).unwrap();
        assert_eq!(blob.data, Bytes::from_static(b"text"));
        blob.decode(Input::Absent).unwrap();
        assert!(blob.is_empty());

        assert_eq!(
            blob.decode(Input::from(5i32)).unwrap_err().kind(),
            &DecodeErrorKind::UnsupportedShape {
                target: "BLOB",
                shape: "integer"
            }
        );
    }
}
