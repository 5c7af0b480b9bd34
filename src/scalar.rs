use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;

use crate::literal::{ZERO_DECIMAL_LITERAL, quoted};
use crate::numeric::{decimal_shape, is_decimal_numeral, parse_bigint};
use crate::{
    Codec, DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorKind,
    EncodeResult, Input, Literal, Scalar,
};

fn coerced(target: &'static str, input: Input) -> Option<String> {
    if !matches!(input, Input::Absent | Input::Text(_) | Input::Bytes(_)) {
        tracing::debug!(target_type = target, shape = input.shape(), "coercing input to text");
    }
    input.into_lossy_text()
}

/// A fixed-point decimal carried as its textual digit payload.
///
/// Precision and scale describe the column declaration; they are not embedded
/// in the literal. Decoding is lenient: any input is accepted through its
/// textual form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decimal {
    pub precision: u8,
    pub scale: u8,
    pub data: String,
}

impl Decimal {
    /// Creates a decimal, rejecting payloads that are not decimal numerals.
    pub fn new(precision: u8, scale: u8, data: impl Into<String>) -> DecodeResult<Self> {
        let data = data.into();
        if !data.is_empty() && !is_decimal_numeral(&data) {
            return Err(DecodeError::new(DecodeErrorKind::InvalidNumber(data)));
        }
        Ok(Decimal {
            precision,
            scale,
            data,
        })
    }

    /// Returns true if the payload is empty or a decimal numeral.
    pub fn is_valid(&self) -> bool {
        self.data.is_empty() || is_decimal_numeral(&self.data)
    }

    /// Returns true if the payload is a numeral whose digits fit the declared
    /// precision and scale.
    pub fn fits(&self) -> bool {
        if self.data.is_empty() {
            return true;
        }
        match decimal_shape(&self.data) {
            Some(shape) => {
                let scale = usize::from(self.scale);
                let integer_room = usize::from(self.precision).saturating_sub(scale);
                shape.fraction_digits <= scale && shape.integer_digits <= integer_room
            }
            None => false,
        }
    }

    /// The engine column type, e.g. `DECIMAL(18,4)`.
    pub fn type_name(&self) -> String {
        format!("DECIMAL({},{})", self.precision, self.scale)
    }
}

impl Codec for Decimal {
    const TYPE_NAME: &'static str = "DECIMAL";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.data.is_empty() {
            return Ok(Literal::from(ZERO_DECIMAL_LITERAL));
        }
        Ok(Literal::Text(self.data.clone()))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        self.data = coerced(Self::TYPE_NAME, input).unwrap_or_default();
        Ok(())
    }
}

/// A UUID in its canonical hyphenated text form. The empty string is the
/// absent value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Uuid(pub String);

impl Uuid {
    pub fn new(value: impl Into<String>) -> Self {
        Uuid(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the text is a 36-character hyphenated UUID.
    #[cfg(feature = "uuid")]
    pub fn is_canonical(&self) -> bool {
        self.0.len() == 36 && uuid::Uuid::try_parse(&self.0).is_ok()
    }

    /// Parses any textual UUID form (braced, simple, URN) into the canonical
    /// hyphenated lowercase form.
    #[cfg(feature = "uuid")]
    pub fn parse(text: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(text.trim()).map(Uuid::from)
    }

    #[cfg(feature = "uuid")]
    pub fn to_uuid(&self) -> Result<uuid::Uuid, uuid::Error> {
        uuid::Uuid::try_parse(&self.0)
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for Uuid {
    fn from(u: uuid::Uuid) -> Self {
        Uuid(u.hyphenated().to_string())
    }
}

impl Codec for Uuid {
    const TYPE_NAME: &'static str = "UUID";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.0.is_empty() {
            return Ok(Literal::Null);
        }
        Ok(Literal::Text(self.0.clone()))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        self.0 = coerced(Self::TYPE_NAME, input).unwrap_or_default();
        Ok(())
    }
}

/// An arbitrary-precision signed integer. Absent is distinct from zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct HugeInt {
    value: Option<BigInt>,
}

impl HugeInt {
    pub fn new(value: BigInt) -> Self {
        HugeInt { value: Some(value) }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        self.value.as_ref()
    }

    pub fn into_bigint(self) -> Option<BigInt> {
        self.value
    }

    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }
}

macro_rules! impl_hugeint_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for HugeInt {
                fn from(v: $ty) -> Self {
                    HugeInt::new(BigInt::from(v))
                }
            }
        )*
    };
}

impl_hugeint_from!(i32, i64, i128, u32, u64, u128);

impl From<BigInt> for HugeInt {
    fn from(v: BigInt) -> Self {
        HugeInt::new(v)
    }
}

impl FromStr for HugeInt {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_bigint(s).map(HugeInt::new)
    }
}

impl TryFrom<Scalar> for HugeInt {
    type Error = DecodeError;

    fn try_from(scalar: Scalar) -> Result<Self, Self::Error> {
        match scalar {
            Scalar::Int(n) => Ok(HugeInt::from(n)),
            Scalar::UInt(n) => Ok(HugeInt::from(n)),
            Scalar::BigInt(n) => Ok(HugeInt::new(n)),
            other => Err(DecodeError::unsupported(
                Self::TYPE_NAME,
                Input::Scalar(other).shape(),
            )),
        }
    }
}

impl Codec for HugeInt {
    const TYPE_NAME: &'static str = "HUGEINT";

    fn encode(&self) -> EncodeResult<Literal> {
        match &self.value {
            None => Ok(Literal::Null),
            Some(v) => Ok(Literal::Text(v.to_string())),
        }
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            self.value = Some(parse_bigint(&text?)?);
            return Ok(());
        }
        *self = match input {
            Input::Absent => HugeInt::default(),
            Input::Scalar(scalar) => HugeInt::try_from(scalar)?,
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}

/// A sequence of bits with a declared length, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitString {
    bits: Vec<bool>,
    length: usize,
}

impl BitString {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        let length = bits.len();
        BitString { bits, length }
    }

    /// Builds a bit string from `0`/`1` characters, which must number exactly
    /// `length`.
    pub fn parse(text: &str, length: usize) -> DecodeResult<Self> {
        let bits = text
            .chars()
            .enumerate()
            .map(|(position, c)| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                found => Err(DecodeError::new(DecodeErrorKind::InvalidBit {
                    found,
                    position,
                })),
            })
            .collect::<DecodeResult<Vec<bool>>>()?;

        if bits.len() != length {
            return Err(DecodeError::new(DecodeErrorKind::BitLengthMismatch {
                declared: length,
                actual: bits.len(),
            }));
        }
        Ok(BitString { bits, length })
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl Codec for BitString {
    const TYPE_NAME: &'static str = "BIT";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.bits.is_empty() {
            return Ok(Literal::Null);
        }
        Ok(Literal::Text(self.to_string()))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            let text = text?;
            *self = BitString::parse(&text, text.chars().count())?;
            return Ok(());
        }
        match input {
            Input::Absent => {
                *self = BitString::default();
                Ok(())
            }
            other => Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        }
    }
}

/// A value of a declared enum type.
///
/// The selection is validated against the legal labels only when encoding;
/// decoding accepts anything through its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
    pub selected: String,
}

impl Enum {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Enum {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            selected: String::new(),
        }
    }

    pub fn select(&mut self, label: impl Into<String>) {
        self.selected = label.into();
    }

    /// Returns true if nothing is selected or the selection is a legal label.
    pub fn is_valid(&self) -> bool {
        self.selected.is_empty() || self.values.contains(&self.selected)
    }
}

impl Codec for Enum {
    const TYPE_NAME: &'static str = "ENUM";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.selected.is_empty() {
            return Ok(Literal::Null);
        }
        if !self.values.contains(&self.selected) {
            return Err(EncodeError::new(EncodeErrorKind::InvalidSelection {
                name: self.name.clone(),
                selected: self.selected.clone(),
            }));
        }
        Ok(Literal::Text(self.selected.clone()))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        self.selected = coerced(Self::TYPE_NAME, input).unwrap_or_default();
        Ok(())
    }
}

/// A spatial value carried as well-known text plus a spatial reference id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Geometry {
    pub wkt: String,
    pub srid: i32,
}

impl Geometry {
    pub fn new(wkt: impl Into<String>, srid: i32) -> Self {
        Geometry {
            wkt: wkt.into(),
            srid,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.wkt.is_empty()
    }
}

/// Splits `ST_GeomFromText('<wkt>'[, <srid>])` into its arguments.
fn unwrap_geom_from_text(text: &str) -> Option<(String, Option<i32>)> {
    const PREFIX: &str = "ST_GeomFromText(";
    let head = text.get(..PREFIX.len())?;
    if !head.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let args = text[PREFIX.len()..].strip_suffix(')')?.trim();
    let mut chars = args.strip_prefix('\'')?.char_indices().peekable();

    let mut wkt = String::new();
    let rest = loop {
        let (i, c) = chars.next()?;
        if c != '\'' {
            wkt.push(c);
        } else if chars.peek().is_some_and(|&(_, next)| next == '\'') {
            chars.next();
            wkt.push('\'');
        } else {
            break args[1 + i + 1..].trim();
        }
    };

    if rest.is_empty() {
        return Some((wkt, None));
    }
    let srid = rest.strip_prefix(',')?.trim().parse().ok()?;
    Some((wkt, Some(srid)))
}

impl Codec for Geometry {
    const TYPE_NAME: &'static str = "GEOMETRY";

    fn encode(&self) -> EncodeResult<Literal> {
        if self.wkt.is_empty() {
            return Ok(Literal::Null);
        }
        Ok(Literal::Text(format!(
            "ST_GeomFromText({}, {})",
            quoted(&self.wkt),
            self.srid
        )))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        let text = match input.text() {
            Some(text) => text?,
            None if input.is_absent() => {
                self.wkt.clear();
                return Ok(());
            }
            None => return Err(DecodeError::unsupported(Self::TYPE_NAME, input.shape())),
        };
        let text = text.trim();

        if let Some((wkt, srid)) = unwrap_geom_from_text(text) {
            self.wkt = wkt;
            if let Some(srid) = srid {
                self.srid = srid;
            }
        } else if let Some((srid, wkt)) = text
            .split_once(';')
            .and_then(|(head, wkt)| Some((head.strip_prefix("SRID=")?.parse::<i32>().ok()?, wkt)))
        {
            self.wkt = wkt.to_string();
            self.srid = srid;
        } else {
            self.wkt = text.to_string();
        }
        Ok(())
    }
}
