//! Comparison operators and fold combinators.
//!
//! A [`Comparison`] is a [`CompareType`] plus a `not` flag that inverts the
//! primitive test *after* it is evaluated. A [`Logic`] is a [`LogicType`] plus
//! a `not` flag that changes how a parameter's result folds into the results
//! of the parameters before it. The two flags never affect each other.

use std::cmp::Ordering;
use std::fmt;

/// Operator kind for a single predicate test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareType {
    /// No operator. Never matches.
    #[default]
    Undefined,
    /// Case-insensitive equality for strings, structural otherwise.
    Equal,
    /// Membership in a list, or in a comma-separated string.
    In,
    /// Case-insensitive substring test after trimming `%` from the operand.
    Like,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    /// Inclusive range test against a two-element list.
    Between,
    /// The property value is missing.
    Is,
    // Kinds below are declared for higher layers and never match here.
    As,
    Using,
    Contains,
    Intersect,
    Distinct,
}

impl CompareType {
    /// Returns `true` for operators answered by the three-way comparator.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            CompareType::Greater
                | CompareType::GreaterOrEqual
                | CompareType::Less
                | CompareType::LessOrEqual
        )
    }

    /// Returns `true` for operators the predicate evaluator implements.
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            CompareType::Equal
                | CompareType::In
                | CompareType::Like
                | CompareType::Between
                | CompareType::Is
        ) || self.is_ordering()
    }

    /// Maps a three-way comparison result onto this operator.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            CompareType::Equal => ordering == Ordering::Equal,
            CompareType::Greater => ordering == Ordering::Greater,
            CompareType::GreaterOrEqual => ordering != Ordering::Less,
            CompareType::Less => ordering == Ordering::Less,
            CompareType::LessOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// This operator with the `not` flag set.
    pub fn negated(self) -> Comparison {
        Comparison { kind: self, not: true }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareType::Undefined => "undefined",
            CompareType::Equal => "equal",
            CompareType::In => "in",
            CompareType::Like => "like",
            CompareType::Greater => "greater",
            CompareType::GreaterOrEqual => "greater_or_equal",
            CompareType::Less => "less",
            CompareType::LessOrEqual => "less_or_equal",
            CompareType::Between => "between",
            CompareType::Is => "is",
            CompareType::As => "as",
            CompareType::Using => "using",
            CompareType::Contains => "contains",
            CompareType::Intersect => "intersect",
            CompareType::Distinct => "distinct",
        }
    }
}

impl fmt::Display for CompareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparison operator with its negation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Comparison {
    pub kind: CompareType,
    pub not: bool,
}

impl Comparison {
    pub fn new(kind: CompareType) -> Self {
        Comparison { kind, not: false }
    }

    /// Applies the `not` flag to a primitive test result.
    pub fn apply(self, matched: bool) -> bool {
        matched != self.not
    }
}

impl From<CompareType> for Comparison {
    fn from(kind: CompareType) -> Self {
        Comparison::new(kind)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.not {
            write!(f, "not {}", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// How a parameter's result combines with the accumulated result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogicType {
    /// Concatenate, keeping duplicates.
    #[default]
    Undefined,
    And,
    Or,
}

impl LogicType {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicType::Undefined => "undefined",
            LogicType::And => "and",
            LogicType::Or => "or",
        }
    }
}

/// A combinator with its negation flag.
///
/// | Logic | Fold step |
/// |-------|-----------|
/// | `Undefined` (either flag) | `acc ++ result` |
/// | `Or` | `acc ∪ result` |
/// | `Or` + not | `acc \ result` |
/// | `And` | `acc ∩ result` |
/// | `And` + not | `(acc \ result) ∪ (result \ acc)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Logic {
    pub kind: LogicType,
    pub not: bool,
}

impl Logic {
    pub const UNDEFINED: Logic = Logic::new(LogicType::Undefined, false);
    pub const AND: Logic = Logic::new(LogicType::And, false);
    pub const OR: Logic = Logic::new(LogicType::Or, false);
    pub const AND_NOT: Logic = Logic::new(LogicType::And, true);
    pub const OR_NOT: Logic = Logic::new(LogicType::Or, true);

    pub const fn new(kind: LogicType, not: bool) -> Self {
        Logic { kind, not }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.not) {
            (LogicType::Undefined, _) => f.write_str("then"),
            (kind, true) => write!(f, "{} not", kind.as_str()),
            (kind, false) => f.write_str(kind.as_str()),
        }
    }
}
