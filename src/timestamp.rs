use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

use crate::{Codec, DecodeError, DecodeResult, EncodeResult, Input, Literal, Scalar};

/// Format used when encoding; microsecond precision with a `+HH:MM` offset.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f%:z";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// An instant together with the offset it is rendered in.
///
/// A missing instant is the absent value. The zone survives decoding an
/// absent input, and is used to interpret text that carries no offset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimestampTz {
    instant: Option<DateTime<Utc>>,
    pub zone: FixedOffset,
}

impl Default for TimestampTz {
    fn default() -> Self {
        TimestampTz {
            instant: None,
            zone: Utc.fix(),
        }
    }
}

impl TimestampTz {
    /// Creates a timestamp rendered in the offset of `instant`.
    pub fn new<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        TimestampTz {
            zone: instant.offset().fix(),
            instant: Some(instant.with_timezone(&Utc)),
        }
    }

    /// Returns a copy rendered in `zone`; the instant is unchanged.
    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        self.instant.map(|t| t.with_timezone(&self.zone))
    }

    pub fn is_absent(&self) -> bool {
        self.instant.is_none()
    }

    fn parse_text(&self, text: &str) -> DecodeResult<DateTime<FixedOffset>> {
        let text = text.trim();
        for format in OFFSET_FORMATS {
            if let Ok(parsed) = DateTime::parse_from_str(text, format) {
                return Ok(parsed);
            }
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Ok(parsed);
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format)
                && let Some(local) = self.zone.from_local_datetime(&naive).single()
            {
                return Ok(local);
            }
        }
        Err(DecodeError::malformed(
            Self::TYPE_NAME,
            format!("unrecognized timestamp {text:?}"),
        ))
    }
}

impl Codec for TimestampTz {
    const TYPE_NAME: &'static str = "TIMESTAMPTZ";

    fn encode(&self) -> EncodeResult<Literal> {
        match self.instant() {
            None => Ok(Literal::Null),
            Some(local) => Ok(Literal::Text(local.format(TIMESTAMP_FORMAT).to_string())),
        }
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            let parsed = self.parse_text(&text?)?;
            *self = TimestampTz::new(parsed);
            return Ok(());
        }
        match input {
            Input::Absent => self.instant = None,
            Input::Scalar(Scalar::Timestamp(ts)) => *self = TimestampTz::new(ts),
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TimestampTz;
    use crate::{Codec, DecodeErrorKind, Input, Literal, decode};
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn offset(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn test_encode() {
        assert_eq!(TimestampTz::default().encode(), Ok(Literal::Null));

        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let ts = TimestampTz::new(instant).with_zone(offset(2));
        assert_eq!(
            ts.encode(),
            Ok(Literal::from("2024-01-15 12:30:00.000000+02:00"))
        );
    }

    #[test]
    fn test_roundtrip() {
        let local = offset(-5)
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 59)
            .unwrap()
            + chrono::Duration::microseconds(123_456);
        let ts = TimestampTz::new(local);
        let literal = ts.encode().unwrap();
        assert_eq!(literal.as_text(), Some("2023-12-31 23:59:59.123456-05:00"));

        let decoded: TimestampTz = decode(literal.as_text().unwrap()).unwrap();
        assert_eq!(decoded, ts);
    }

    #[test]
    fn test_decode_engine_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();

        let short: TimestampTz = decode("2024-01-15 10:30:00+00").unwrap();
        assert_eq!(short.instant().unwrap(), expected);

        let rfc: TimestampTz = decode("2024-01-15T12:30:00+02:00").unwrap();
        assert_eq!(rfc.instant().unwrap(), expected);
        assert_eq!(rfc.zone, offset(2));

        let mut naive = TimestampTz::default().with_zone(offset(1));
        naive.decode(Input::from("2024-01-15 11:30:00")).unwrap();
        assert_eq!(naive.instant().unwrap(), expected);
    }

    #[test]
    fn test_decode_native_and_absent() {
        let native = DateTime::parse_from_rfc3339("2020-02-29T08:00:00+09:00").unwrap();
        let mut ts: TimestampTz = decode(native).unwrap();
        assert_eq!(ts.instant(), Some(native));

        ts.decode(Input::Absent).unwrap();
        assert!(ts.is_absent());
        assert_eq!(ts.zone, offset(9));
        assert_eq!(ts.encode(), Ok(Literal::Null));
    }

    #[test]
    fn test_decode_errors() {
        let err = decode::<TimestampTz>("yesterday").unwrap_err();
        assert!(matches!(
            err.kind(),
            DecodeErrorKind::MalformedText {
                target: "TIMESTAMPTZ",
                ..
            }
        ));
        assert!(decode::<TimestampTz>(12i64).is_err());
    }
}
