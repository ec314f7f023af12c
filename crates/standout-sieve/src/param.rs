//! Query parameters and the predicate evaluator.
//!
//! A [`QueryParameter`] binds a property accessor to an operand, a
//! [`Comparison`] and a [`Logic`]. [`matches`] is the primitive test behind
//! it:
//!
//! | Operator | Matches when |
//! |----------|--------------|
//! | `Equal` | value equals operand (strings ignore case) |
//! | `Is` | value is missing; the operand is ignored |
//! | `Like` | value contains the operand with `%` trimmed from both ends, ignoring case; a [`WildcardPattern`] operand matches the whole value instead |
//! | `In` | value equals a list entry; a string operand is split on `,` first. String entries compare against the value's string form |
//! | `Greater` .. `LessOrEqual` | three-way comparison agrees |
//! | `Between` | `low <= value <= high` for a `[low, high]` list operand |
//! | anything else | never, whatever the `not` flag says |
//!
//! An operand of the wrong shape for `In`, `Like` or `Between` is a non-match,
//! not an error. Ordering operators propagate [`ComparisonError`]s.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::accessor::Accessor;
use crate::compare::{compare, contains_ignore_case, equal_with, ValueComparer};
use crate::error::{ComparisonError, Result};
use crate::op::{CompareType, Comparison, Logic};
use crate::pattern::WildcardPattern;
use crate::value::{Number, Timestamp, Value};

/// Owned operand for storage in a query parameter.
///
/// Unlike [`Value`], which borrows from the source item, `ClauseValue` owns
/// its data so it can live in a query definition.
#[derive(Debug, Clone)]
pub enum ClauseValue {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
    Enum(u32),
    Bool(bool),
    Bytes(Vec<u8>),
    Missing,
    /// Operand list for `In` and `Between`.
    List(Vec<ClauseValue>),
    /// Full wildcard pattern for `Like`.
    Pattern(WildcardPattern),
}

impl ClauseValue {
    /// Builds a list operand.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ClauseValue>,
    {
        ClauseValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Builds the inclusive `[low, high]` operand of `Between`.
    pub fn range(low: impl Into<ClauseValue>, high: impl Into<ClauseValue>) -> Self {
        ClauseValue::List(vec![low.into(), high.into()])
    }

    /// Borrows a scalar operand as a [`Value`]; `None` for lists and patterns.
    pub fn as_value(&self) -> Option<Value<'_>> {
        Some(match self {
            ClauseValue::String(s) => Value::String(s),
            ClauseValue::Number(n) => Value::Number(*n),
            ClauseValue::Timestamp(t) => Value::Timestamp(*t),
            ClauseValue::Enum(d) => Value::Enum(*d),
            ClauseValue::Bool(b) => Value::Bool(*b),
            ClauseValue::Bytes(bytes) => Value::Bytes(bytes),
            ClauseValue::Missing => Value::Missing,
            ClauseValue::List(_) | ClauseValue::Pattern(_) => return None,
        })
    }

    /// The `[low, high]` bounds of a `Between` operand.
    pub fn bounds(&self) -> Option<(Value<'_>, Value<'_>)> {
        match self {
            ClauseValue::List(bounds) => match bounds.as_slice() {
                [low, high] => Some((low.as_value()?, high.as_value()?)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<String> for ClauseValue {
    fn from(s: String) -> Self {
        ClauseValue::String(s)
    }
}

impl From<&str> for ClauseValue {
    fn from(s: &str) -> Self {
        ClauseValue::String(s.to_string())
    }
}

impl From<&[u8]> for ClauseValue {
    fn from(bytes: &[u8]) -> Self {
        ClauseValue::Bytes(bytes.to_vec())
    }
}

impl From<Number> for ClauseValue {
    fn from(n: Number) -> Self {
        ClauseValue::Number(n)
    }
}

impl From<Timestamp> for ClauseValue {
    fn from(t: Timestamp) -> Self {
        ClauseValue::Timestamp(t)
    }
}

impl From<bool> for ClauseValue {
    fn from(b: bool) -> Self {
        ClauseValue::Bool(b)
    }
}

impl From<WildcardPattern> for ClauseValue {
    fn from(p: WildcardPattern) -> Self {
        ClauseValue::Pattern(p)
    }
}

impl<V: Into<ClauseValue>> From<Vec<V>> for ClauseValue {
    fn from(values: Vec<V>) -> Self {
        ClauseValue::list(values)
    }
}

impl<V: Into<ClauseValue>, const N: usize> From<[V; N]> for ClauseValue {
    fn from(values: [V; N]) -> Self {
        ClauseValue::list(values)
    }
}

macro_rules! clause_value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ClauseValue {
                fn from(n: $t) -> Self {
                    ClauseValue::Number(Number::from(n))
                }
            }
        )*
    };
}

clause_value_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Tests one property value against an operand.
pub fn matches(
    value: &Value<'_>,
    operand: &ClauseValue,
    comparison: Comparison,
    comparer: Option<&dyn ValueComparer>,
) -> std::result::Result<bool, ComparisonError> {
    let kind = comparison.kind;
    if !kind.is_supported() {
        return Ok(false);
    }
    let matched = match kind {
        CompareType::Equal => match operand.as_value() {
            Some(operand) => equal_with(value, &operand, comparer),
            None => false,
        },
        CompareType::Is => value.is_missing(),
        CompareType::Like => match_like(value, operand),
        CompareType::In => match_in(value, operand, comparer),
        CompareType::Between => match operand.bounds() {
            Some((low, high)) => {
                compare(value, &low, comparer)? != Ordering::Less
                    && compare(value, &high, comparer)? != Ordering::Greater
            }
            None => false,
        },
        kind if kind.is_ordering() => {
            let operand = operand
                .as_value()
                .ok_or(ComparisonError::ListOperand { op: kind.as_str() })?;
            kind.eval_ordering(compare(value, &operand, comparer)?)
        }
        _ => false,
    };
    Ok(comparison.apply(matched))
}

fn text_of<'v>(value: &'v Value<'_>) -> Cow<'v, str> {
    match value {
        Value::String(s) => Cow::Borrowed(*s),
        other => Cow::Owned(other.to_string()),
    }
}

fn match_like(value: &Value<'_>, operand: &ClauseValue) -> bool {
    if value.is_missing() {
        return false;
    }
    let text = text_of(value);
    match operand {
        ClauseValue::Pattern(pattern) => pattern.is_match(&text),
        other => match other.as_value() {
            Some(needle) => {
                let needle = text_of(&needle).into_owned();
                contains_ignore_case(&text, needle.trim_matches('%'))
            }
            None => false,
        },
    }
}

fn match_in(value: &Value<'_>, operand: &ClauseValue, comparer: Option<&dyn ValueComparer>) -> bool {
    match operand {
        ClauseValue::String(joined) => {
            if value.is_missing() {
                return false;
            }
            let text = text_of(value);
            joined
                .split(',')
                .map(str::trim)
                .any(|entry| equal_with(&Value::String(&text), &Value::String(entry), comparer))
        }
        ClauseValue::List(entries) => entries.iter().any(|entry| match entry.as_value() {
            Some(Value::String(s)) if !value.is_string() && !value.is_missing() => {
                let text = value.to_string();
                equal_with(&Value::String(&text), &Value::String(s), comparer)
            }
            Some(entry) => equal_with(value, &entry, comparer),
            None => false,
        }),
        _ => false,
    }
}

/// One predicate of a query, bound to a resolved property.
///
/// Built by [`QueryBuilder`](crate::QueryBuilder) or directly from an
/// accessor; immutable afterwards.
pub struct QueryParameter<T> {
    path: String,
    accessor: Accessor<T>,
    value: ClauseValue,
    comparison: Comparison,
    logic: Logic,
    comparer: Option<Arc<dyn ValueComparer>>,
}

impl<T> QueryParameter<T> {
    pub fn new(
        path: impl Into<String>,
        accessor: Accessor<T>,
        comparison: impl Into<Comparison>,
        value: impl Into<ClauseValue>,
    ) -> Self {
        QueryParameter {
            path: path.into(),
            accessor,
            value: value.into(),
            comparison: comparison.into(),
            logic: Logic::UNDEFINED,
            comparer: None,
        }
    }

    pub fn with_logic(mut self, logic: Logic) -> Self {
        self.logic = logic;
        self
    }

    /// Replaces the default value comparator for this parameter.
    pub fn with_comparer(mut self, comparer: Arc<dyn ValueComparer>) -> Self {
        self.comparer = Some(comparer);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &ClauseValue {
        &self.value
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn logic(&self) -> Logic {
        self.logic
    }

    pub fn comparer(&self) -> Option<&dyn ValueComparer> {
        self.comparer.as_deref()
    }

    /// Reads this parameter's property from `item`.
    pub fn value_of<'a>(&self, item: &'a T) -> Value<'a> {
        self.accessor.get(item)
    }

    /// Evaluates the predicate against `item`.
    pub fn matches(&self, item: &T) -> Result<bool> {
        Ok(matches(
            &self.value_of(item),
            &self.value,
            self.comparison,
            self.comparer(),
        )?)
    }
}

impl<T> Clone for QueryParameter<T> {
    fn clone(&self) -> Self {
        QueryParameter {
            path: self.path.clone(),
            accessor: Arc::clone(&self.accessor),
            value: self.value.clone(),
            comparison: self.comparison,
            logic: self.logic,
            comparer: self.comparer.clone(),
        }
    }
}

impl<T> fmt::Debug for QueryParameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParameter")
            .field("path", &self.path)
            .field("comparison", &self.comparison)
            .field("value", &self.value)
            .field("logic", &self.logic)
            .field("custom_comparer", &self.comparer.is_some())
            .finish()
    }
}
