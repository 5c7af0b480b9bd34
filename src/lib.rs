//! Duckval translates typed values to and from the literal forms of the DuckDB
//! analytical engine.
//!
//! Every value type implements [`Codec`]: `encode` produces a [`Literal`] that
//! can be spliced into SQL or bound as a parameter, and `decode` repopulates a
//! value in place from whatever [`Input`] shape the engine client returned.
//! Leniency differs per type; each type documents which inputs it accepts.
//!
//! # Examples
//!
//! ```
//! use duckval::{Codec, Interval, Literal, Struct, decode};
//! use serde_json::json;
//!
//! let interval = Interval { hours: 2, minutes: 30, ..Default::default() };
//! assert_eq!(interval.encode().unwrap(), Literal::from("INTERVAL '2 HOURS 30 MINS'"));
//!
//! let row: Struct = decode(json!({"key": "value", "number": 42})).unwrap();
//! assert_eq!(row["key"], "value");
//! ```

mod blob;
mod container;
mod descriptor;
mod error;
mod input;
mod interval;
mod json;
mod literal;
mod numeric;
mod parse;
mod scalar;
#[cfg(feature = "chrono")]
mod timestamp;
mod traits;

pub use crate::blob::Blob;
pub use crate::container::{List, Map, NestedArray, Struct};
pub use crate::descriptor::{AnalyticalFunction, Constraint, PerformanceMetrics, QueryHint};
pub use crate::error::{
    DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorKind, EncodeResult,
};
pub use crate::input::{Input, Scalar};
pub use crate::interval::Interval;
pub use crate::json::{Json, Union};
pub use crate::literal::{
    EMPTY_INTERVAL_LITERAL, EMPTY_LIST_LITERAL, EMPTY_MAP_LITERAL, EMPTY_STRUCT_LITERAL, Literal,
    NULL_LITERAL, ZERO_DECIMAL_LITERAL,
};
pub use crate::scalar::{BitString, Decimal, Enum, Geometry, HugeInt, Uuid};
#[cfg(feature = "chrono")]
pub use crate::timestamp::TimestampTz;
pub use crate::traits::{Codec, Fragment, decode, encode};

/// Re-export of the big-integer type carried by [`HugeInt`] and
/// [`Scalar::BigInt`].
pub use num_bigint::BigInt;
