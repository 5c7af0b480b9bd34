use crate::literal::EMPTY_INTERVAL_LITERAL;
use crate::{Codec, DecodeError, DecodeResult, EncodeResult, Input, Literal, Scalar};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MINUTE: i64 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i64 = 60 * MICROS_PER_MINUTE;

const OUT_OF_RANGE: &str = "interval component out of range";

/// A calendar interval with independently signed components.
///
/// Components are kept exactly as given; nothing is normalized (90 minutes
/// stays 90 minutes) except when decoding the engine's native interval, which
/// only carries months, days and microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub microseconds: i64,
}

#[derive(Clone, Copy)]
enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
}

impl Unit {
    fn from_keyword(word: &str) -> Option<Unit> {
        let word = word.to_ascii_lowercase();
        let unit = match word.as_str() {
            "y" | "yr" | "yrs" | "year" | "years" => Unit::Years,
            "mon" | "mons" | "month" | "months" => Unit::Months,
            "w" | "week" | "weeks" => Unit::Weeks,
            "d" | "day" | "days" => Unit::Days,
            "h" | "hr" | "hrs" | "hour" | "hours" => Unit::Hours,
            "m" | "min" | "mins" | "minute" | "minutes" => Unit::Minutes,
            "s" | "sec" | "secs" | "second" | "seconds" => Unit::Seconds,
            "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => Unit::Milliseconds,
            "us" | "usec" | "usecs" | "microsecond" | "microseconds" => Unit::Microseconds,
            _ => return None,
        };
        Some(unit)
    }
}

impl Interval {
    pub fn is_zero(&self) -> bool {
        *self == Interval::default()
    }

    /// Collapses the components into the engine's native
    /// `(months, days, microseconds)` triple, or `None` if a total does not
    /// fit in an `i64`.
    pub fn to_native(&self) -> Option<(i64, i64, i64)> {
        let months = self.years.checked_mul(12)?.checked_add(self.months)?;
        let micros = self
            .hours
            .checked_mul(MICROS_PER_HOUR)?
            .checked_add(self.minutes.checked_mul(MICROS_PER_MINUTE)?)?
            .checked_add(self.seconds.checked_mul(MICROS_PER_SECOND)?)?
            .checked_add(self.microseconds)?;
        Some((months, self.days, micros))
    }

    fn from_native(months: i32, days: i32, micros: i64) -> Self {
        let months = i64::from(months);
        Interval {
            years: months / 12,
            months: months % 12,
            days: i64::from(days),
            hours: micros / MICROS_PER_HOUR,
            minutes: micros % MICROS_PER_HOUR / MICROS_PER_MINUTE,
            seconds: micros % MICROS_PER_MINUTE / MICROS_PER_SECOND,
            microseconds: micros % MICROS_PER_SECOND,
        }
    }

    /// Accumulates `amount` of `unit`; `None` on overflow.
    fn add(&mut self, unit: Unit, amount: i64) -> Option<()> {
        let (field, amount) = match unit {
            Unit::Years => (&mut self.years, amount),
            Unit::Months => (&mut self.months, amount),
            Unit::Weeks => (&mut self.days, amount.checked_mul(7)?),
            Unit::Days => (&mut self.days, amount),
            Unit::Hours => (&mut self.hours, amount),
            Unit::Minutes => (&mut self.minutes, amount),
            Unit::Seconds => (&mut self.seconds, amount),
            Unit::Milliseconds => (&mut self.microseconds, amount.checked_mul(1000)?),
            Unit::Microseconds => (&mut self.microseconds, amount),
        };
        *field = field.checked_add(amount)?;
        Some(())
    }

    /// Splits `[-]HH:MM:SS[.ffffff]` into signed clock amounts.
    fn parse_clock(token: &str) -> Option<[(Unit, i64); 4]> {
        let (negative, clock) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token.strip_prefix('+').unwrap_or(token)),
        };
        let mut parts = clock.split(':');
        let hours: i64 = parts.next()?.parse().ok()?;
        let minutes: i64 = parts.next()?.parse().ok()?;
        let (seconds, fraction) = match parts.next() {
            Some(s) => s.split_once('.').unwrap_or((s, "")),
            None => ("0", ""),
        };
        if parts.next().is_some() || fraction.len() > 6 {
            return None;
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let seconds: i64 = seconds.parse().ok()?;
        let micros: i64 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<6}").parse().ok()?
        };

        let sign = if negative { -1 } else { 1 };
        Some([
            (Unit::Hours, hours.checked_mul(sign)?),
            (Unit::Minutes, minutes.checked_mul(sign)?),
            (Unit::Seconds, seconds.checked_mul(sign)?),
            (Unit::Microseconds, micros * sign),
        ])
    }

    /// Parses our own `INTERVAL '...'` literal, a bare unit list such as
    /// `2 hours 30 mins`, or the engine's display form such as
    /// `1 year 2 mons 3 days 04:05:06.000007`.
    fn parse_text(text: &str) -> DecodeResult<Self> {
        let malformed = |reason: &str| DecodeError::malformed(Self::TYPE_NAME, reason);

        let mut body = text.trim();
        if body.get(..8).is_some_and(|head| head.eq_ignore_ascii_case("INTERVAL")) {
            body = body[8..].trim_start();
        }
        if let Some(quoted) = body.strip_prefix('\'') {
            body = quoted
                .strip_suffix('\'')
                .ok_or_else(|| malformed("unterminated quote"))?;
        }
        if body.trim().is_empty() {
            return Err(malformed("empty interval"));
        }

        let mut interval = Interval::default();
        let mut tokens = body.split_whitespace().peekable();
        while let Some(token) = tokens.next() {
            if token.contains(':') {
                let clock = Interval::parse_clock(token)
                    .ok_or_else(|| malformed(&format!("invalid time component {token:?}")))?;
                for (unit, amount) in clock {
                    interval
                        .add(unit, amount)
                        .ok_or_else(|| malformed(OUT_OF_RANGE))?;
                }
                continue;
            }

            // Accept both "3 days" and "3days".
            let split = token
                .char_indices()
                .find(|&(i, c)| i > 0 && c.is_ascii_alphabetic())
                .map(|(i, _)| i);
            let (amount, unit) = match split {
                Some(i) => (&token[..i], &token[i..]),
                None => {
                    let unit = tokens
                        .next()
                        .ok_or_else(|| malformed(&format!("missing unit after {token:?}")))?;
                    (token, unit)
                }
            };
            let amount: i64 = amount
                .parse()
                .map_err(|_| malformed(&format!("invalid amount {amount:?}")))?;
            let unit = Unit::from_keyword(unit.trim_end_matches(','))
                .ok_or_else(|| malformed(&format!("unknown unit {unit:?}")))?;
            interval
                .add(unit, amount)
                .ok_or_else(|| malformed(OUT_OF_RANGE))?;
        }
        Ok(interval)
    }
}

impl Codec for Interval {
    const TYPE_NAME: &'static str = "INTERVAL";

    fn encode(&self) -> EncodeResult<Literal> {
        let components = [
            (self.years, "YEARS"),
            (self.months, "MONS"),
            (self.days, "DAYS"),
            (self.hours, "HOURS"),
            (self.minutes, "MINS"),
            (self.seconds, "SECS"),
            (self.microseconds, "MICROSECONDS"),
        ];

        let mut body = String::new();
        for (amount, unit) in components.iter().filter(|(amount, _)| *amount != 0) {
            if !body.is_empty() {
                body.push(' ');
            }
            body.push_str(&format!("{amount} {unit}"));
        }

        if body.is_empty() {
            return Ok(Literal::from(EMPTY_INTERVAL_LITERAL));
        }
        Ok(Literal::Text(format!("INTERVAL '{body}'")))
    }

    fn decode(&mut self, input: Input) -> DecodeResult<()> {
        if let Some(text) = input.text() {
            *self = Interval::parse_text(&text?)?;
            return Ok(());
        }
        *self = match input {
            Input::Absent => Interval::default(),
            Input::Scalar(Scalar::Interval {
                months,
                days,
                micros,
            }) => Interval::from_native(months, days, micros),
            other => return Err(DecodeError::unsupported(Self::TYPE_NAME, other.shape())),
        };
        Ok(())
    }
}
