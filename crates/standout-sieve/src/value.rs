//! Runtime value types for property comparison.
//!
//! The [`Value`] enum represents the runtime value of a property read from an
//! item through a [`PropertyAccessor`](crate::PropertyAccessor). The engine
//! never looks at items directly; everything it orders, compares or matches
//! is a `Value`.

use std::cmp::Ordering;
use std::fmt;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Runtime value for comparison, borrowed from the source item.
///
/// # Example
///
/// ```
/// use standout_sieve::{Value, Number};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// fn name<'a>(task: &'a Task) -> Value<'a> {
///     Value::String(&task.name)
/// }
///
/// fn priority(task: &Task) -> Value<'_> {
///     Value::Number(Number::U64(task.priority as u64))
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed). Compared case-insensitively.
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Enum discriminant value.
    Enum(u32),
    /// Boolean value.
    Bool(bool),
    /// Byte sequence. Ordered by length only.
    Bytes(&'a [u8]),
    /// The property is absent. Distinct from a present default value.
    Missing,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is the missing sentinel.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Returns `true` if this is a `String` value.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Short name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Enum(_) => "enum",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Missing => "missing",
        }
    }

    /// Returns `true` when both values are the same kind with bit-identical
    /// content. Floats compare by bits, so `NaN` is identical to itself.
    pub fn is_identical(&self, other: &Value<'_>) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.is_identical(*b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Missing, Value::Missing) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Timestamp(t) => write!(f, "{}", t.0),
            Value::Enum(d) => write!(f, "{d}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Bytes(bytes) => {
                for b in bytes.iter() {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Missing => Ok(()),
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different numeric types are exact; integers are never rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64, rounding integers beyond 2^53.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers exactly, whatever their representations.
    ///
    /// Integers are never rounded through `f64`, so the order stays
    /// transitive past 2^53. Returns `None` only when a `NaN` is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            (Some(a), None) => cmp_integer_float(a, other.to_f64()),
            (None, Some(b)) => cmp_integer_float(b, self.to_f64()).map(Ordering::reverse),
            (None, None) => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    fn as_integer(self) -> Option<i128> {
        match self {
            Number::I64(n) => Some(i128::from(n)),
            Number::U64(n) => Some(i128::from(n)),
            Number::F64(_) => None,
        }
    }

    /// Same variant with bit-identical payload.
    pub fn is_identical(self, other: Number) -> bool {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a == b,
            (Number::U64(a), Number::U64(b)) => a == b,
            (Number::F64(a), Number::F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }

    /// Returns `true` for a floating point `NaN`.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }
}

/// Orders an integer against a float without rounding the integer.
fn cmp_integer_float(integer: i128, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    // Saturating cast; infinities land outside the 64-bit integer range.
    let whole = float.trunc();
    match integer.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(float - whole)),
        ordering => Some(ordering),
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident <- $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as _)
                }
            }
        )*
    };
}

number_from!(I64 <- i8, i16, i32, i64, isize);
number_from!(U64 <- u8, u16, u32, u64, usize);
number_from!(F64 <- f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch (UTC).
///
/// The comparator treats a timestamp whose time of day is exactly midnight as
/// a plain date: see [`compare_values`](crate::compare_values).
///
/// ```
/// use standout_sieve::Timestamp;
///
/// let noon = Timestamp::from_millis(86_400_000 + 43_200_000);
/// assert_eq!(noon.day(), 1);
/// assert_eq!(noon.time_of_day(), 43_200_000);
/// assert!(Timestamp::from_days(1).is_midnight());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a midnight timestamp for the given day number since epoch.
    pub fn from_days(days: i64) -> Self {
        Timestamp(days * MILLIS_PER_DAY)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Whole days since epoch (floored for pre-epoch values).
    pub fn day(self) -> i64 {
        self.0.div_euclid(MILLIS_PER_DAY)
    }

    /// Milliseconds elapsed since midnight.
    pub fn time_of_day(self) -> i64 {
        self.0.rem_euclid(MILLIS_PER_DAY)
    }

    pub fn is_midnight(self) -> bool {
        self.time_of_day() == 0
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}
