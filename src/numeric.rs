//! Digit-level helpers shared by the numeric codecs.

use std::str::FromStr;

use num_bigint::BigInt;

use crate::{DecodeError, DecodeErrorKind, DecodeResult};

/// The digit counts of a decimal numeral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DecimalShape {
    pub(crate) integer_digits: usize,
    pub(crate) fraction_digits: usize,
}

/// Splits a decimal numeral (`[+-]?digits[.digits]`, at least one digit
/// overall) into its digit counts. Leading zeros of the integer part are not
/// counted.
pub(crate) fn decimal_shape(text: &str) -> Option<DecimalShape> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(DecimalShape {
        integer_digits: integer.trim_start_matches('0').len(),
        fraction_digits: fraction.len(),
    })
}

pub(crate) fn is_decimal_numeral(text: &str) -> bool {
    decimal_shape(text).is_some()
}

/// Parses base-10 integer text of any magnitude. Surrounding whitespace is
/// ignored; digit separators are not accepted.
pub(crate) fn parse_bigint(text: &str) -> DecodeResult<BigInt> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::new(DecodeErrorKind::InvalidNumber(
            text.to_string(),
        )));
    }
    BigInt::from_str(trimmed)
        .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidNumber(text.to_string())))
}
