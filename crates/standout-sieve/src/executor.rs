//! Query execution.
//!
//! Each parameter is evaluated on its own, through an index when the registry
//! has one for its property and by testing every item otherwise. The results
//! are then folded left to right:
//!
//! ```text
//! acc = result(p1)
//! acc = step(acc, result(p2), p2.logic)
//! acc = step(acc, result(p3), p3.logic)
//! ...
//! ```
//!
//! There is no precedence and no grouping; the position of a parameter in the
//! query is its meaning. The step for each [`Logic`] is listed on that type.
//!
//! Items are identified by address throughout, so two equal-looking items are
//! still two items.

use tracing::{debug, trace};

use crate::compare::identity_order;
use crate::error::Result;
use crate::index::IndexRegistry;
use crate::op::{Logic, LogicType};
use crate::ordering::compare_by_orders;
use crate::param::QueryParameter;
use crate::query::Query;
use crate::set_ops;
use crate::sort::{quicksort_with, try_quicksort_with, SortConfig};

/// Runs `query` over `items`.
///
/// With no parameters every item is kept, in input order. Orders are applied
/// after the fold, with item position as the final tie-break, then offset and
/// limit.
pub fn select<'a, T: Sync>(
    items: &'a [T],
    query: &Query<T>,
    registry: Option<&dyn IndexRegistry<'a, T>>,
) -> Result<Vec<&'a T>> {
    let config = query.sort_config();
    debug!(
        items = items.len(),
        parameters = query.parameters().len(),
        orders = query.orders().len(),
        indexed = registry.is_some(),
        "sieve.select"
    );

    let mut parameters = query.parameters().iter();
    let mut acc = match parameters.next() {
        Some(first) => evaluate(items, first, registry, config)?,
        None => items.iter().collect(),
    };
    for parameter in parameters {
        let result = evaluate(items, parameter, registry, config)?;
        acc = fold(acc, result, parameter.logic(), config);
        trace!(
            path = parameter.path(),
            logic = %parameter.logic(),
            size = acc.len(),
            "sieve.fold"
        );
    }

    if !query.orders().is_empty() {
        let orders = query.orders();
        try_quicksort_with(
            &mut acc,
            &|a: &&'a T, b: &&'a T| {
                compare_by_orders(*a, *b, orders).map(|ordering| ordering.then_with(|| identity_order(a, b)))
            },
            config,
        )?;
    }

    let offset = query.offset().unwrap_or(0).min(acc.len());
    acc.drain(..offset);
    if let Some(limit) = query.limit() {
        acc.truncate(limit);
    }

    debug!(results = acc.len(), "sieve.select.done");
    Ok(acc)
}

/// Items matching one parameter, in input order.
pub fn evaluate<'a, T: Sync>(
    items: &'a [T],
    parameter: &QueryParameter<T>,
    registry: Option<&dyn IndexRegistry<'a, T>>,
    config: &SortConfig,
) -> Result<Vec<&'a T>> {
    if let Some(index) = registry.and_then(|registry| registry.get_index(parameter.path())) {
        let mut hits = index.scan(parameter).collect::<Result<Vec<&'a T>>>()?;
        // Index order is key order; put hits back into input order.
        quicksort_with(&mut hits, &identity_order, config);
        debug!(
            path = parameter.path(),
            comparison = %parameter.comparison(),
            hits = hits.len(),
            "sieve.evaluate.index"
        );
        return Ok(hits);
    }

    let mut hits = Vec::new();
    for item in items {
        if parameter.matches(item)? {
            hits.push(item);
        }
    }
    trace!(
        path = parameter.path(),
        comparison = %parameter.comparison(),
        hits = hits.len(),
        "sieve.evaluate.scan"
    );
    Ok(hits)
}

/// One fold step.
pub fn fold<'a, T: Sync>(
    mut acc: Vec<&'a T>,
    mut result: Vec<&'a T>,
    logic: Logic,
    config: &SortConfig,
) -> Vec<&'a T> {
    match (logic.kind, logic.not) {
        (LogicType::Undefined, _) => {
            acc.append(&mut result);
            acc
        }
        (LogicType::Or, false) => set_ops::or_with(&mut acc, &mut result, &identity_order, config),
        (LogicType::Or, true) => set_ops::and_not_with(&mut acc, &mut result, &identity_order, config),
        (LogicType::And, false) => set_ops::and_with(&mut acc, &mut result, &identity_order, config),
        (LogicType::And, true) => set_ops::or_not_with(&mut acc, &mut result, &identity_order, config),
    }
}
