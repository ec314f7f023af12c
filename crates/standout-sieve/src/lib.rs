//! Sieve - In-memory indexed query engine for Rust struct collections.
//!
//! Sieve filters and orders borrowed collections of arbitrary items. It
//! provides:
//!
//! - A value comparator with case-insensitive strings, date-only timestamp
//!   rules and an optional hash tie-break
//! - In-place quicksort with a one-shot parallel fan-out for large inputs
//! - Binary search that copes with runs of equal keys
//! - Set algebra (AND, OR, AND-NOT, OR-NOT) over unsorted collections
//! - Predicates: equality, `Like`, `In`, `Between`, ordering and `Is`
//! - Queries folded strictly left to right, with optional per-property indexes
//!
//! # Quick Start
//!
//! ```rust
//! use standout_sieve::{Number, PropertyMap, Query, Value};
//!
//! // Define your data
//! struct Task {
//!     name: String,
//!     priority: i32,
//!     archived: bool,
//! }
//!
//! // Describe its properties once
//! let mut props = PropertyMap::<Task>::new();
//! props
//!     .register("name", |t| Value::String(&t.name)).unwrap()
//!     .register("priority", |t| Value::Number(Number::from(t.priority))).unwrap()
//!     .register("archived", |t| Value::Bool(t.archived)).unwrap();
//!
//! // Build and execute a query
//! let tasks = vec![
//!     Task { name: "Write docs".into(), priority: 3, archived: false },
//!     Task { name: "Fix bug".into(), priority: 5, archived: false },
//!     Task { name: "Old task".into(), priority: 1, archived: true },
//! ];
//!
//! let query = Query::builder(&props)
//!     .and_gte("priority", 3)
//!     .and_eq("archived", false)
//!     .order_desc("priority")
//!     .build()
//!     .unwrap();
//!
//! let results = query.filter(&tasks).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results[0].name, "Fix bug");
//! ```
//!
//! # Query Semantics
//!
//! Parameters are evaluated one by one and folded left to right. The first
//! parameter seeds the result; each later one combines with everything before
//! it according to its logic:
//!
//! | Logic | Step |
//! |-------|------|
//! | `then` | `acc ++ result` (duplicates kept) |
//! | `or` | `acc ∪ result` |
//! | `or not` | `acc \ result` |
//! | `and` | `acc ∩ result` |
//! | `and not` | items in exactly one of `acc` and `result` |
//!
//! There is no precedence: `a or b and c` means `(a or b) and c`.
//!
//! # Operators
//!
//! | Operator | Matches when |
//! |----------|--------------|
//! | `Equal` | equal; strings ignore case |
//! | `Like` | contains the operand with `%` trimmed, ignoring case |
//! | `In` | equals a list entry or an entry of a comma-separated string |
//! | `Greater` .. `LessOrEqual` | the comparator agrees |
//! | `Between` | inside an inclusive `[low, high]` |
//! | `Is` | the property is missing |
//!
//! Every operator can be negated with [`CompareType::negated`].
//!
//! # Indexes
//!
//! Pass an [`IndexRegistry`] to [`Query::select`] and parameters on indexed
//! properties are answered by the index. [`SortedIndex`] and [`IndexSet`] are
//! ready-made implementations; results are the same with or without them.

mod accessor;
mod compare;
mod error;
mod executor;
mod index;
mod op;
mod ordering;
mod param;
mod pattern;
mod query;
mod search;
pub mod set_ops;
mod sort;
mod value;

// Re-export public API
pub use accessor::{Accessor, PropertyAccessor, PropertyMap};
pub use compare::{compare, compare_values, identity_order, values_equal, DefaultComparer, ValueComparer};
pub use error::{ComparisonError, ConfigurationError, Result, SieveError};
pub use executor::{evaluate, fold, select};
pub use index::{Index, IndexRegistry, IndexScan, IndexSet, SortedIndex};
pub use op::{CompareType, Comparison, Logic, LogicType};
pub use ordering::{compare_by_orders, Dir, ItemComparator, Order};
pub use param::{matches, ClauseValue, QueryParameter};
pub use pattern::WildcardPattern;
pub use query::{Query, QueryBuilder};
pub use search::{binary_search, binary_search_in, equal_range, insertion_point, sorted_insert};
pub use sort::{
    quicksort, quicksort_with, try_quicksort_with, SortConfig, DEFAULT_INSERTION_CUTOFF,
    DEFAULT_PARALLEL_THRESHOLD,
};
pub use value::{Number, Timestamp, Value};
