//! Property indexes.
//!
//! The executor asks an [`IndexRegistry`] for an [`Index`] on each
//! parameter's property and scans it instead of testing every item. Indexes
//! belong to the caller, who keeps them in step with the collection; the
//! engine only reads them.
//!
//! An index must hold references into the same slice that is passed to
//! [`Query::select`](crate::Query::select). Results are combined by item
//! address, so foreign references would leak into the result.
//!
//! [`SortedIndex`] is the reference implementation. It answers equality,
//! ordering, `Between` and `Is` tests (and their negations) with binary
//! search, and falls back to testing its entries one by one whenever a range
//! could disagree with the predicate evaluator, so registering an index never
//! changes what a query returns.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::ptr;

use tracing::trace;

use crate::accessor::{Accessor, PropertyMap};
use crate::compare::{compare_values, identity_order};
use crate::error::Result;
use crate::op::CompareType;
use crate::param::QueryParameter;
use crate::search::{binary_search, equal_range, sorted_insert};
use crate::sort::quicksort;
use crate::value::Value;

/// Lazily produced scan results.
pub type IndexScan<'s, 'a, T> = Box<dyn Iterator<Item = Result<&'a T>> + 's>;

/// A maintained index over one property.
pub trait Index<'a, T> {
    /// Path of the indexed property.
    fn property(&self) -> &str;

    /// Yields every indexed item matching `parameter`, in any order.
    ///
    /// Must yield exactly the items for which
    /// [`QueryParameter::matches`] holds, and surface the same errors.
    fn scan<'s>(&'s self, parameter: &'s QueryParameter<T>) -> IndexScan<'s, 'a, T>;
}

/// Lookup of indexes by property path.
pub trait IndexRegistry<'a, T> {
    fn get_index(&self, path: &str) -> Option<&dyn Index<'a, T>>;
}

/// Tracks whether the keys seen so far can be answered by range.
///
/// Ranges are exact only when every present key is of one kind, no number is
/// `NaN`, and timestamps are either all at midnight or all not.
#[derive(Debug, Clone, Copy)]
struct KeyDomain {
    kind: Option<&'static str>,
    midnight: Option<bool>,
    exact: bool,
}

impl Default for KeyDomain {
    fn default() -> Self {
        KeyDomain {
            kind: None,
            midnight: None,
            exact: true,
        }
    }
}

impl KeyDomain {
    fn admit(&mut self, key: &Value<'_>) {
        if key.is_missing() || !self.exact {
            return;
        }
        if key.as_number().is_some_and(|n| n.is_nan()) {
            self.exact = false;
            return;
        }
        match self.kind {
            None => self.kind = Some(key.kind()),
            Some(kind) if kind != key.kind() => {
                self.exact = false;
                return;
            }
            Some(_) => {}
        }
        if let Some(ts) = key.as_timestamp() {
            match self.midnight {
                None => self.midnight = Some(ts.is_midnight()),
                Some(midnight) if midnight != ts.is_midnight() => self.exact = false,
                Some(_) => {}
            }
        }
    }

    /// Whether comparing keys against `operand` agrees with the key order.
    fn accepts(&self, operand: &Value<'_>) -> bool {
        if !self.exact {
            return false;
        }
        if operand.is_missing() {
            return true;
        }
        if operand.as_number().is_some_and(|n| n.is_nan()) {
            return false;
        }
        self.kind.map_or(true, |kind| kind == operand.kind())
    }
}

/// Entry order: key first, then address. With an inexact domain, address only.
fn entry_order<T>(accessor: &Accessor<T>, exact: bool, a: &T, b: &T) -> Ordering {
    if exact {
        if let Ok(ordering @ (Ordering::Less | Ordering::Greater)) =
            compare_values(&accessor.get(a), &accessor.get(b))
        {
            return ordering;
        }
    }
    identity_order(&a, &b)
}

/// A sorted vector of item references keyed by one property.
///
/// ```
/// use standout_sieve::{Number, PropertyMap, Query, SortedIndex, Value};
///
/// struct Row { n: i64 }
///
/// let mut props = PropertyMap::<Row>::new();
/// props.register("n", |r| Value::Number(Number::I64(r.n))).unwrap();
///
/// let rows: Vec<Row> = (1..=10).map(|n| Row { n }).collect();
/// let index = SortedIndex::build(&props, "n", &rows).unwrap();
///
/// let query = Query::builder(&props).and_gt("n", 7).build().unwrap();
/// let hits = query.select(&rows, Some(&index)).unwrap();
/// assert_eq!(hits.len(), 3);
/// ```
pub struct SortedIndex<'a, T> {
    path: String,
    accessor: Accessor<T>,
    entries: Vec<&'a T>,
    domain: KeyDomain,
}

impl<'a, T> SortedIndex<'a, T> {
    /// Indexes `items` on the property `path` of `props`.
    pub fn build(props: &PropertyMap<T>, path: &str, items: &'a [T]) -> Result<Self>
    where
        T: Sync,
    {
        Ok(SortedIndex::with_accessor(path, props.resolve(path)?, items))
    }

    /// Indexes `items` through an already resolved accessor.
    pub fn with_accessor(path: impl Into<String>, accessor: Accessor<T>, items: &'a [T]) -> Self
    where
        T: Sync,
    {
        let mut index = SortedIndex {
            path: path.into(),
            accessor,
            entries: Vec::new(),
            domain: KeyDomain::default(),
        };
        index.rebuild(items);
        index
    }

    /// Replaces every entry with `items`.
    pub fn rebuild(&mut self, items: &'a [T])
    where
        T: Sync,
    {
        self.domain = KeyDomain::default();
        for item in items {
            self.domain.admit(&self.accessor.get(item));
        }
        self.entries = items.iter().collect();
        self.resort();
    }

    /// Adds one item.
    pub fn insert(&mut self, item: &'a T)
    where
        T: Sync,
    {
        let was_exact = self.domain.exact;
        self.domain.admit(&self.accessor.get(item));
        if was_exact && !self.domain.exact {
            trace!(path = %self.path, "sieve.index.inexact");
            self.resort();
        }
        let accessor = &self.accessor;
        let exact = self.domain.exact;
        sorted_insert(&mut self.entries, item, |a, b| entry_order(accessor, exact, *a, *b));
    }

    /// Removes one item by address. Returns `false` if it was not indexed.
    ///
    /// Call this before mutating the indexed property of an item, or
    /// [`rebuild`](Self::rebuild) afterwards.
    pub fn remove(&mut self, item: &T) -> bool {
        let accessor = &self.accessor;
        let exact = self.domain.exact;
        let found = binary_search(&self.entries, |probe| entry_order(accessor, exact, *probe, item))
            .ok()
            .filter(|&at| ptr::eq(self.entries[at], item))
            .or_else(|| self.entries.iter().position(|entry| ptr::eq(*entry, item)));
        match found {
            Some(at) => {
                self.entries.remove(at);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order.
    pub fn entries(&self) -> &[&'a T] {
        &self.entries
    }

    /// Whether scans can be answered by binary search.
    pub fn is_exact(&self) -> bool {
        self.domain.exact
    }

    fn resort(&mut self)
    where
        T: Sync,
    {
        let accessor = &self.accessor;
        let exact = self.domain.exact;
        quicksort(&mut self.entries, &|a: &&'a T, b: &&'a T| {
            entry_order(accessor, exact, *a, *b)
        });
    }

    /// The run of entries comparing equal to `operand`, or `None` if a
    /// comparison failed.
    fn run_of(&self, operand: &Value<'_>) -> Option<Range<usize>> {
        let mut failed = false;
        let run = equal_range(&self.entries, |entry| {
            match compare_values(&self.accessor.get(entry), operand) {
                Ok(ordering) => ordering,
                Err(_) => {
                    failed = true;
                    Ordering::Equal
                }
            }
        });
        (!failed).then_some(run)
    }

    /// Entries matching a non-negated parameter as one contiguous range, or
    /// `None` when the parameter has to be tested entry by entry.
    fn matching_range(&self, parameter: &QueryParameter<T>) -> Option<Range<usize>> {
        if parameter.comparer().is_some() || !self.domain.exact {
            return None;
        }
        let len = self.entries.len();
        let kind = parameter.comparison().kind;
        if !kind.is_ordering() && !matches!(kind, CompareType::Equal | CompareType::Between | CompareType::Is) {
            return None;
        }
        if kind == CompareType::Is {
            return self.run_of(&Value::Missing);
        }
        if kind == CompareType::Between {
            let (low, high) = parameter.value().bounds()?;
            if !self.domain.accepts(&low) || !self.domain.accepts(&high) {
                return None;
            }
            let start = self.run_of(&low)?.start;
            let end = self.run_of(&high)?.end;
            return Some(start..end.max(start));
        }

        let operand = parameter.value().as_value()?;
        if !self.domain.accepts(&operand) {
            return None;
        }
        let run = self.run_of(&operand)?;
        match kind {
            CompareType::Equal => Some(run),
            CompareType::Greater => Some(run.end..len),
            CompareType::GreaterOrEqual => Some(run.start..len),
            CompareType::Less => Some(0..run.start),
            CompareType::LessOrEqual => Some(0..run.end),
            _ => None,
        }
    }
}

impl<'a, T> Index<'a, T> for SortedIndex<'a, T> {
    fn property(&self) -> &str {
        &self.path
    }

    fn scan<'s>(&'s self, parameter: &'s QueryParameter<T>) -> IndexScan<'s, 'a, T> {
        if let Some(range) = self.matching_range(parameter) {
            trace!(
                path = %self.path,
                start = range.start,
                end = range.end,
                not = parameter.comparison().not,
                "sieve.index.range"
            );
            if parameter.comparison().not {
                let (head, tail) = (&self.entries[..range.start], &self.entries[range.end..]);
                return Box::new(head.iter().chain(tail).copied().map(Ok));
            }
            return Box::new(self.entries[range].iter().copied().map(Ok));
        }

        trace!(path = %self.path, "sieve.index.filter");
        Box::new(
            self.entries
                .iter()
                .copied()
                .filter_map(move |item| match parameter.matches(item) {
                    Ok(true) => Some(Ok(item)),
                    Ok(false) => None,
                    Err(err) => Some(Err(err)),
                }),
        )
    }
}

impl<'a, T> IndexRegistry<'a, T> for SortedIndex<'a, T> {
    fn get_index(&self, path: &str) -> Option<&dyn Index<'a, T>> {
        (self.path == path).then_some(self as &dyn Index<'a, T>)
    }
}

impl<T> fmt::Debug for SortedIndex<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedIndex")
            .field("path", &self.path)
            .field("len", &self.entries.len())
            .field("exact", &self.domain.exact)
            .finish()
    }
}

/// An owned set of sorted indexes, one per property path.
pub struct IndexSet<'a, T> {
    indexes: HashMap<String, SortedIndex<'a, T>>,
}

impl<'a, T> IndexSet<'a, T> {
    pub fn new() -> Self {
        IndexSet {
            indexes: HashMap::new(),
        }
    }

    /// Adds an index, returning the one it replaces.
    pub fn add(&mut self, index: SortedIndex<'a, T>) -> Option<SortedIndex<'a, T>> {
        self.indexes.insert(index.path.clone(), index)
    }

    pub fn remove(&mut self, path: &str) -> Option<SortedIndex<'a, T>> {
        self.indexes.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&SortedIndex<'a, T>> {
        self.indexes.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut SortedIndex<'a, T>> {
        self.indexes.get_mut(path)
    }

    /// Adds `item` to every index.
    pub fn insert_item(&mut self, item: &'a T)
    where
        T: Sync,
    {
        for index in self.indexes.values_mut() {
            index.insert(item);
        }
    }

    /// Removes `item` from every index.
    pub fn remove_item(&mut self, item: &T) {
        for index in self.indexes.values_mut() {
            index.remove(item);
        }
    }

    /// Rebuilds every index from `items`.
    pub fn rebuild(&mut self, items: &'a [T])
    where
        T: Sync,
    {
        for index in self.indexes.values_mut() {
            index.rebuild(items);
        }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl<'a, T> Default for IndexSet<'a, T> {
    fn default() -> Self {
        IndexSet::new()
    }
}

impl<'a, T> IndexRegistry<'a, T> for IndexSet<'a, T> {
    fn get_index(&self, path: &str) -> Option<&dyn Index<'a, T>> {
        self.indexes
            .get(path)
            .map(|index| index as &dyn Index<'a, T>)
    }
}

impl<T> fmt::Debug for IndexSet<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&str> = self.indexes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        f.debug_struct("IndexSet").field("paths", &paths).finish()
    }
}
