//! Query builder and entry points.
//!
//! A [`Query`] is an ordered list of [`QueryParameter`]s plus result orders
//! and pagination. It is assembled by a [`QueryBuilder`], which resolves every
//! property path against a [`PropertyMap`] as it goes, so a query that builds
//! never fails on an unknown property later.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::accessor::PropertyMap;
use crate::compare::ValueComparer;
use crate::error::{Result, SieveError};
use crate::executor;
use crate::index::IndexRegistry;
use crate::op::{CompareType, Comparison, Logic};
use crate::ordering::{Dir, Order};
use crate::param::{ClauseValue, QueryParameter};
use crate::pattern::WildcardPattern;
use crate::sort::SortConfig;

/// A query for filtering and ordering collections.
///
/// Parameters are folded left to right, each one combining with everything
/// before it according to its [`Logic`]:
///
/// ```text
/// even  or  divisible-by-3      -> even ∪ div3
/// even  and not  divisible-by-3 -> (even \ div3) ∪ (div3 \ even)
/// ```
///
/// # Example
///
/// ```
/// use standout_sieve::{CompareType, Number, PropertyMap, Query, Value};
///
/// struct Task { name: String, priority: i64 }
///
/// let mut props = PropertyMap::<Task>::new();
/// props
///     .register("name", |t| Value::String(&t.name)).unwrap()
///     .register("priority", |t| Value::Number(Number::I64(t.priority))).unwrap();
///
/// let tasks = vec![
///     Task { name: "Write docs".into(), priority: 3 },
///     Task { name: "Fix bug".into(), priority: 5 },
///     Task { name: "Old task".into(), priority: 1 },
/// ];
///
/// let query = Query::builder(&props)
///     .and_gte("priority", 3)
///     .and("name", CompareType::Like.negated(), "old")
///     .order_desc("priority")
///     .build()
///     .unwrap();
///
/// let results = query.filter(&tasks).unwrap();
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].name, "Fix bug");
/// ```
pub struct Query<T> {
    parameters: Vec<QueryParameter<T>>,
    orders: Vec<Order<T>>,
    limit: Option<usize>,
    offset: Option<usize>,
    sort_config: SortConfig,
}

impl<T> Query<T> {
    /// Starts a query over items described by `props`.
    pub fn builder(props: &PropertyMap<T>) -> QueryBuilder<'_, T> {
        QueryBuilder::new(props)
    }

    /// Assembles a query from parameters and orders built elsewhere.
    pub fn from_parts(parameters: Vec<QueryParameter<T>>, orders: Vec<Order<T>>) -> Self {
        Query {
            parameters,
            orders,
            limit: None,
            offset: None,
            sort_config: SortConfig::default(),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the parameters in evaluation order.
    pub fn parameters(&self) -> &[QueryParameter<T>] {
        &self.parameters
    }

    /// Returns the result orders.
    pub fn orders(&self) -> &[Order<T>] {
        &self.orders
    }

    /// Returns the limit, if set.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the offset, if set.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn sort_config(&self) -> &SortConfig {
        &self.sort_config
    }

    /// Returns `true` if this query has no parameters (keeps everything).
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl<T: Sync> Query<T> {
    // ========================================================================
    // Execution
    // ========================================================================

    /// Runs the query, scanning indexes from `registry` where available.
    ///
    /// Any index in the registry must be built over `items`.
    pub fn select<'a>(
        &self,
        items: &'a [T],
        registry: Option<&dyn IndexRegistry<'a, T>>,
    ) -> Result<Vec<&'a T>> {
        executor::select(items, self, registry)
    }

    /// Runs the query by testing every item.
    pub fn filter<'a>(&self, items: &'a [T]) -> Result<Vec<&'a T>> {
        executor::select(items, self, None)
    }

    /// Runs the query and clones the results.
    pub fn select_cloned<'a>(
        &self,
        items: &'a [T],
        registry: Option<&dyn IndexRegistry<'a, T>>,
    ) -> Result<Vec<T>>
    where
        T: Clone,
    {
        Ok(self.select(items, registry)?.into_iter().cloned().collect())
    }

    /// Counts the results, after pagination.
    pub fn count(&self, items: &[T]) -> Result<usize> {
        Ok(self.filter(items)?.len())
    }

    /// Returns the first result.
    pub fn first<'a>(&self, items: &'a [T]) -> Result<Option<&'a T>> {
        Ok(self.filter(items)?.into_iter().next())
    }
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            parameters: self.parameters.clone(),
            orders: self.orders.clone(),
            limit: self.limit,
            offset: self.offset,
            sort_config: self.sort_config,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("parameters", &self.parameters)
            .field("orders", &self.orders)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Fluent builder for [`Query`].
///
/// Every method takes and returns the builder. A path that does not resolve,
/// or a pattern that does not compile, is remembered and reported by
/// [`build`](Self::build); later calls are then ignored.
pub struct QueryBuilder<'m, T> {
    props: &'m PropertyMap<T>,
    parameters: Vec<QueryParameter<T>>,
    orders: Vec<Order<T>>,
    limit: Option<usize>,
    offset: Option<usize>,
    sort_config: SortConfig,
    error: Option<SieveError>,
}

impl<'m, T> QueryBuilder<'m, T> {
    pub fn new(props: &'m PropertyMap<T>) -> Self {
        QueryBuilder {
            props,
            parameters: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            sort_config: SortConfig::default(),
            error: None,
        }
    }

    fn push(
        mut self,
        logic: Logic,
        path: &str,
        comparison: impl Into<Comparison>,
        value: impl Into<ClauseValue>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.props.resolve(path) {
            Ok(accessor) => self.parameters.push(
                QueryParameter::new(path, accessor, comparison, value).with_logic(logic),
            ),
            Err(err) => self.error = Some(err),
        }
        self
    }

    fn push_pattern(self, logic: Logic, path: &str, pattern: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match WildcardPattern::new(pattern) {
            Ok(pattern) => self.push(logic, path, CompareType::Like, pattern),
            Err(err) => QueryBuilder {
                error: Some(err),
                ..self
            },
        }
    }

    // ========================================================================
    // Generic parameter builders
    // ========================================================================

    /// Adds a parameter that narrows the results so far.
    ///
    /// Same as [`and`](Self::and); reads better as the first call.
    pub fn filter(self, path: &str, comparison: impl Into<Comparison>, value: impl Into<ClauseValue>) -> Self {
        self.push(Logic::AND, path, comparison, value)
    }

    /// Intersects with the results so far.
    pub fn and(self, path: &str, comparison: impl Into<Comparison>, value: impl Into<ClauseValue>) -> Self {
        self.push(Logic::AND, path, comparison, value)
    }

    /// Unites with the results so far.
    pub fn or(self, path: &str, comparison: impl Into<Comparison>, value: impl Into<ClauseValue>) -> Self {
        self.push(Logic::OR, path, comparison, value)
    }

    /// Keeps items in exactly one of the results so far and this parameter's.
    pub fn and_not(self, path: &str, comparison: impl Into<Comparison>, value: impl Into<ClauseValue>) -> Self {
        self.push(Logic::AND_NOT, path, comparison, value)
    }

    /// Removes this parameter's matches from the results so far.
    pub fn or_not(self, path: &str, comparison: impl Into<Comparison>, value: impl Into<ClauseValue>) -> Self {
        self.push(Logic::OR_NOT, path, comparison, value)
    }

    /// Appends this parameter's matches to the results so far, duplicates
    /// included.
    pub fn then(self, path: &str, comparison: impl Into<Comparison>, value: impl Into<ClauseValue>) -> Self {
        self.push(Logic::UNDEFINED, path, comparison, value)
    }

    /// Adds a prebuilt parameter.
    pub fn parameter(mut self, parameter: QueryParameter<T>) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Replaces the value comparator of the last added parameter.
    pub fn with_comparer(mut self, comparer: Arc<dyn ValueComparer>) -> Self {
        if let Some(last) = self.parameters.pop() {
            self.parameters.push(last.with_comparer(comparer));
        }
        self
    }

    // ========================================================================
    // AND shorthand methods
    // ========================================================================

    /// Adds an AND equality parameter.
    pub fn and_eq(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::Equal, value)
    }

    /// Adds an AND substring parameter (`%` trimmed from both ends).
    pub fn and_like(self, path: &str, value: &str) -> Self {
        self.and(path, CompareType::Like, value)
    }

    /// Adds an AND wildcard parameter (`%` any run, `_` one character).
    pub fn and_like_pattern(self, path: &str, pattern: &str) -> Self {
        self.push_pattern(Logic::AND, path, pattern)
    }

    /// Adds an AND membership parameter.
    pub fn and_in(self, path: &str, values: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::In, values)
    }

    /// Adds an AND inclusive range parameter.
    pub fn and_between(self, path: &str, low: impl Into<ClauseValue>, high: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::Between, ClauseValue::range(low, high))
    }

    /// Adds an AND greater-than parameter.
    pub fn and_gt(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::Greater, value)
    }

    /// Adds an AND greater-than-or-equal parameter.
    pub fn and_gte(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::GreaterOrEqual, value)
    }

    /// Adds an AND less-than parameter.
    pub fn and_lt(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::Less, value)
    }

    /// Adds an AND less-than-or-equal parameter.
    pub fn and_lte(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.and(path, CompareType::LessOrEqual, value)
    }

    /// Adds an AND parameter matching a missing property.
    pub fn and_missing(self, path: &str) -> Self {
        self.and(path, CompareType::Is, ClauseValue::Missing)
    }

    // ========================================================================
    // OR shorthand methods
    // ========================================================================

    /// Adds an OR equality parameter.
    pub fn or_eq(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::Equal, value)
    }

    /// Adds an OR substring parameter.
    pub fn or_like(self, path: &str, value: &str) -> Self {
        self.or(path, CompareType::Like, value)
    }

    /// Adds an OR wildcard parameter.
    pub fn or_like_pattern(self, path: &str, pattern: &str) -> Self {
        self.push_pattern(Logic::OR, path, pattern)
    }

    /// Adds an OR membership parameter.
    pub fn or_in(self, path: &str, values: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::In, values)
    }

    /// Adds an OR inclusive range parameter.
    pub fn or_between(self, path: &str, low: impl Into<ClauseValue>, high: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::Between, ClauseValue::range(low, high))
    }

    /// Adds an OR greater-than parameter.
    pub fn or_gt(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::Greater, value)
    }

    /// Adds an OR greater-than-or-equal parameter.
    pub fn or_gte(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::GreaterOrEqual, value)
    }

    /// Adds an OR less-than parameter.
    pub fn or_lt(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::Less, value)
    }

    /// Adds an OR less-than-or-equal parameter.
    pub fn or_lte(self, path: &str, value: impl Into<ClauseValue>) -> Self {
        self.or(path, CompareType::LessOrEqual, value)
    }

    /// Adds an OR parameter matching a missing property.
    pub fn or_missing(self, path: &str) -> Self {
        self.or(path, CompareType::Is, ClauseValue::Missing)
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Adds an order on a property.
    pub fn order_by(mut self, path: &str, dir: Dir) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.props.resolve(path) {
            Ok(accessor) => self.orders.push(Order::by_property(path, accessor, dir)),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Adds an ascending order.
    pub fn order_asc(self, path: &str) -> Self {
        self.order_by(path, Dir::Asc)
    }

    /// Adds a descending order.
    pub fn order_desc(self, path: &str) -> Self {
        self.order_by(path, Dir::Desc)
    }

    /// Adds an order on a whole-item comparator.
    pub fn order_with<F>(mut self, compare: F, dir: Dir) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.orders.push(Order::by_comparator(compare, dir));
        self
    }

    // ========================================================================
    // Limits
    // ========================================================================

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of results to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    /// Sets the sort tuning used for ordering and set algebra.
    pub fn sort_config(mut self, config: SortConfig) -> Self {
        self.sort_config = config;
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Finalizes the query, reporting the first configuration error.
    pub fn build(self) -> Result<Query<T>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Query {
            parameters: self.parameters,
            orders: self.orders,
            limit: self.limit,
            offset: self.offset,
            sort_config: self.sort_config,
        })
    }
}
