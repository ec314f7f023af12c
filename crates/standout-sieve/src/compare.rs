//! The value comparator.
//!
//! Every ordering and equality decision in the engine goes through
//! [`compare`] / [`values_equal`]. The rules, in priority order:
//!
//! 1. An explicit [`ValueComparer`] takes over completely.
//! 2. Missing equals missing; missing sorts before any present value.
//! 3. Identical values are equal before any type-specific logic runs, which
//!    keeps `NaN` equal to itself.
//! 4. Strings compare case-insensitively.
//! 5. If either timestamp falls exactly on midnight, only the dates are
//!    compared. Two timestamps that both carry a time of day compare in full.
//! 6. Byte sequences compare by length only. This is not content equality.
//! 7. Otherwise the natural ordering of the kind is used; enum discriminants
//!    order as numbers. Where there is none (a `NaN` against a number, or a
//!    string against another kind) the string representations are compared
//!    case-insensitively.
//! 8. With tie-break enabled, values that are equal under rules 2-7 but not
//!    identical are ordered by a stable hash of their exact representation.

use std::cmp::Ordering;

use xxhash_rust::xxh64::Xxh64;

use crate::error::ComparisonError;
use crate::value::{Number, Timestamp, Value};

/// A caller-supplied ordering over values.
///
/// Implement this to override every rule of the default comparator for a
/// query parameter or an index.
pub trait ValueComparer: Send + Sync {
    fn compare(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Ordering, ComparisonError>;
}

impl<F> ValueComparer for F
where
    F: Fn(&Value<'_>, &Value<'_>) -> Result<Ordering, ComparisonError> + Send + Sync,
{
    fn compare(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Ordering, ComparisonError> {
        self(left, right)
    }
}

/// The built-in comparator.
///
/// ```
/// use std::cmp::Ordering;
/// use standout_sieve::{DefaultComparer, Value, ValueComparer};
///
/// let plain = DefaultComparer::new();
/// assert_eq!(plain.compare(&Value::String("ABC"), &Value::String("abc")).unwrap(), Ordering::Equal);
///
/// let total = DefaultComparer::with_tie_break();
/// assert_ne!(total.compare(&Value::String("ABC"), &Value::String("abc")).unwrap(), Ordering::Equal);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultComparer {
    tie_break: bool,
}

impl DefaultComparer {
    pub const fn new() -> Self {
        DefaultComparer { tie_break: false }
    }

    /// A comparator that never reports `Equal` for non-identical values
    /// (barring hash collisions), giving a total order over runs of
    /// structurally equal values.
    pub const fn with_tie_break() -> Self {
        DefaultComparer { tie_break: true }
    }

    pub fn tie_break(&self) -> bool {
        self.tie_break
    }
}

impl ValueComparer for DefaultComparer {
    fn compare(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Ordering, ComparisonError> {
        let ordering = compare_values(left, right)?;
        if ordering == Ordering::Equal && self.tie_break && !left.is_identical(right) {
            return Ok(stable_hash(left).cmp(&stable_hash(right)));
        }
        Ok(ordering)
    }
}

/// Three-way comparison, delegating to `comparer` when one is supplied.
pub fn compare(
    left: &Value<'_>,
    right: &Value<'_>,
    comparer: Option<&dyn ValueComparer>,
) -> Result<Ordering, ComparisonError> {
    match comparer {
        Some(comparer) => comparer.compare(left, right),
        None => compare_values(left, right),
    }
}

/// Three-way comparison under the default rules.
///
/// Fails only for two present values of unrelated kinds, e.g. a number
/// against a boolean.
pub fn compare_values(left: &Value<'_>, right: &Value<'_>) -> Result<Ordering, ComparisonError> {
    match (left, right) {
        (Value::Missing, Value::Missing) => return Ok(Ordering::Equal),
        (Value::Missing, _) => return Ok(Ordering::Less),
        (_, Value::Missing) => return Ok(Ordering::Greater),
        _ => {}
    }
    if left.is_identical(right) {
        return Ok(Ordering::Equal);
    }

    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => cmp_ignore_case(a, b),
        (Value::Timestamp(a), Value::Timestamp(b)) => compare_timestamps(*a, *b),
        (Value::Bytes(a), Value::Bytes(b)) => a.len().cmp(&b.len()),
        (Value::Enum(a), Value::Enum(b)) => a.cmp(b),
        (Value::Number(_) | Value::Enum(_), Value::Number(_) | Value::Enum(_)) => {
            match numeric(left).zip(numeric(right)).and_then(|(a, b)| a.compare(b)) {
                Some(ordering) => ordering,
                None => cmp_ignore_case(&left.to_string(), &right.to_string()),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::String(_), _) | (_, Value::String(_)) => {
            cmp_ignore_case(&left.to_string(), &right.to_string())
        }
        _ => {
            return Err(ComparisonError::IncompatibleKinds {
                left: left.kind(),
                right: right.kind(),
            })
        }
    };
    Ok(ordering)
}

/// Equality under the default rules. Unrelated kinds are simply unequal.
pub fn values_equal(left: &Value<'_>, right: &Value<'_>) -> bool {
    matches!(compare_values(left, right), Ok(Ordering::Equal))
}

/// Equality through an optional custom comparer; errors count as unequal.
pub(crate) fn equal_with(
    left: &Value<'_>,
    right: &Value<'_>,
    comparer: Option<&dyn ValueComparer>,
) -> bool {
    matches!(compare(left, right, comparer), Ok(Ordering::Equal))
}

/// Orders item references by address.
///
/// Items borrowed from one slice are ordered by their position in it. The set
/// algebra in the executor uses this as the item identity ordering.
///
/// `T` must not be zero-sized: every element of a slice of zero-sized items
/// shares one address, so distinct items would compare equal.
pub fn identity_order<T>(left: &&T, right: &&T) -> Ordering {
    debug_assert!(
        std::mem::size_of::<T>() != 0,
        "zero-sized items have no distinct addresses"
    );
    (*left as *const T).cmp(&(*right as *const T))
}

pub(crate) fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn numeric(value: &Value<'_>) -> Option<Number> {
    match value {
        Value::Number(n) => Some(*n),
        Value::Enum(d) => Some(Number::from(*d)),
        _ => None,
    }
}

fn compare_timestamps(a: Timestamp, b: Timestamp) -> Ordering {
    if a.is_midnight() || b.is_midnight() {
        a.day().cmp(&b.day())
    } else {
        a.cmp(&b)
    }
}

fn stable_hash(value: &Value<'_>) -> u64 {
    let mut hasher = Xxh64::new(0);
    match value {
        Value::String(s) => {
            hasher.update(&[0]);
            hasher.update(s.as_bytes());
        }
        Value::Number(Number::I64(n)) => {
            hasher.update(&[1]);
            hasher.update(&n.to_le_bytes());
        }
        Value::Number(Number::U64(n)) => {
            hasher.update(&[2]);
            hasher.update(&n.to_le_bytes());
        }
        Value::Number(Number::F64(n)) => {
            hasher.update(&[3]);
            hasher.update(&n.to_bits().to_le_bytes());
        }
        Value::Timestamp(t) => {
            hasher.update(&[4]);
            hasher.update(&t.0.to_le_bytes());
        }
        Value::Enum(d) => {
            hasher.update(&[5]);
            hasher.update(&d.to_le_bytes());
        }
        Value::Bool(b) => hasher.update(&[6, u8::from(*b)]),
        Value::Bytes(bytes) => {
            hasher.update(&[7]);
            hasher.update(bytes);
        }
        Value::Missing => hasher.update(&[8]),
    }
    hasher.digest()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400_000;

    #[test]
    fn missing_sorts_first() {
        let none = Value::Missing;
        let some = Value::String("test");

        assert_eq!(compare_values(&none, &some), Ok(Ordering::Less));
        assert_eq!(compare_values(&some, &none), Ok(Ordering::Greater));
        assert_eq!(compare_values(&none, &none), Ok(Ordering::Equal));
    }

    #[test]
    fn strings_ignore_case() {
        assert_eq!(
            compare_values(&Value::String("ABC"), &Value::String("abc")),
            Ok(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::String("apple"), &Value::String("Banana")),
            Ok(Ordering::Less)
        );
        assert!(!values_equal(&Value::String("Straße"), &Value::String("STRASSE")));
    }

    #[test]
    fn midnight_compares_by_date() {
        let midnight = Value::Timestamp(Timestamp(2 * DAY));
        let afternoon = Value::Timestamp(Timestamp(2 * DAY + 15 * 3_600_000));
        let morning = Value::Timestamp(Timestamp(2 * DAY + 9 * 3_600_000));

        assert_eq!(compare_values(&midnight, &afternoon), Ok(Ordering::Equal));
        assert_eq!(compare_values(&morning, &afternoon), Ok(Ordering::Less));
        assert_eq!(
            compare_values(&midnight, &Value::Timestamp(Timestamp(3 * DAY + 1))),
            Ok(Ordering::Less)
        );
    }

    #[test]
    fn bytes_compare_by_length_only() {
        assert_eq!(
            compare_values(&Value::Bytes(&[1, 2, 3]), &Value::Bytes(&[9, 9, 9])),
            Ok(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::Bytes(&[9]), &Value::Bytes(&[0, 0])),
            Ok(Ordering::Less)
        );
    }

    #[test]
    fn nan_is_equal_to_itself() {
        let nan = Value::Number(Number::F64(f64::NAN));
        assert_eq!(compare_values(&nan, &nan), Ok(Ordering::Equal));
        // No natural ordering against a number: falls back to "nan" vs "1".
        assert_eq!(
            compare_values(&nan, &Value::Number(Number::F64(1.0))),
            Ok(Ordering::Greater)
        );
    }

    #[test]
    fn string_fallback_for_mixed_kinds() {
        assert_eq!(
            compare_values(&Value::Number(Number::I64(5)), &Value::String("5")),
            Ok(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::Bool(true), &Value::String("TRUE")),
            Ok(Ordering::Equal)
        );
    }

    #[test]
    fn enums_order_as_numbers() {
        assert_eq!(
            compare_values(&Value::Enum(2), &Value::Number(Number::U64(2))),
            Ok(Ordering::Equal)
        );
        assert_eq!(
            compare_values(&Value::Number(Number::F64(1.5)), &Value::Enum(1)),
            Ok(Ordering::Greater)
        );
    }

    #[test]
    fn unrelated_kinds_fail() {
        let err = compare_values(&Value::Number(Number::I64(1)), &Value::Bool(true)).unwrap_err();
        assert_eq!(
            err,
            ComparisonError::IncompatibleKinds {
                left: "number",
                right: "bool"
            }
        );
        assert!(!values_equal(&Value::Number(Number::I64(1)), &Value::Bool(true)));
    }

    fn reversed(a: &Value<'_>, b: &Value<'_>) -> Result<Ordering, ComparisonError> {
        compare_values(b, a)
    }

    #[test]
    fn explicit_comparer_takes_over() {
        let one = Value::Number(Number::I64(1));
        let two = Value::Number(Number::I64(2));
        assert_eq!(compare(&one, &two, Some(&reversed)), Ok(Ordering::Greater));
        assert_eq!(compare(&one, &two, None), Ok(Ordering::Less));
    }

    #[test]
    fn tie_break_is_antisymmetric() {
        let cmp = DefaultComparer::with_tie_break();
        let upper = Value::String("Rust");
        let lower = Value::String("rust");

        let forward = cmp.compare(&upper, &lower).unwrap();
        let backward = cmp.compare(&lower, &upper).unwrap();
        assert_ne!(forward, Ordering::Equal);
        assert_eq!(forward, backward.reverse());
        assert_eq!(cmp.compare(&upper, &upper.clone()).unwrap(), Ordering::Equal);
    }

    #[test]
    fn identity_order_follows_slice_position() {
        let items = [10, 10, 10];
        assert_eq!(identity_order(&&items[0], &&items[2]), Ordering::Less);
        assert_eq!(identity_order(&&items[1], &&items[1]), Ordering::Equal);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "zero-sized items")]
    fn identity_order_rejects_zero_sized_items() {
        let units = [(), ()];
        identity_order(&&units[0], &&units[1]);
    }
}
