//! Set algebra over two unsorted collections.
//!
//! Every combinator sorts at least one of its inputs **in place** before
//! binary-searching into it; the `&mut` parameters are that contract. After a
//! call, both inputs hold the same elements in a possibly different order.
//!
//! | Function | Result |
//! |----------|--------|
//! | [`and`] | elements present in both (intersection) |
//! | [`or`] | the larger input plus the smaller input's missing elements (union) |
//! | [`and_not`] | elements of `a` absent from `b` (relative complement, `a \ b`) |
//! | [`or_not`] | elements in exactly one input (symmetric difference) |
//!
//! `and_not` depends on operand order; `or_not` does not.

use std::cmp::Ordering;

use crate::search::{binary_search, binary_search_in};
use crate::sort::{quicksort_with, SortConfig};

/// Intersection; sorts both inputs.
///
/// The smaller input drives iteration. Its elements are visited in sorted
/// order, so each search only covers the part of the larger input past the
/// previous hit.
///
/// ```
/// use standout_sieve::set_ops;
///
/// let mut a = vec![3, 1, 2];
/// let mut b = vec![4, 2, 3];
/// assert_eq!(set_ops::and(&mut a, &mut b, &|x: &i32, y: &i32| x.cmp(y)), [2, 3]);
/// assert_eq!(a, [1, 2, 3]); // sorted as a side effect
/// ```
pub fn and<E, F>(a: &mut [E], b: &mut [E], compare: &F) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    and_with(a, b, compare, &SortConfig::default())
}

pub fn and_with<E, F>(a: &mut [E], b: &mut [E], compare: &F, config: &SortConfig) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    quicksort_with(a, compare, config);
    quicksort_with(b, compare, config);
    let (a, b): (&[E], &[E]) = (a, b);
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut out = Vec::with_capacity(small.len());
    let mut low = 0;
    for item in small {
        match binary_search_in(large, low, large.len(), |probe| compare(probe, item)) {
            Ok(at) => {
                out.push(item.clone());
                low = at + 1;
            }
            Err(at) => low = at,
        }
    }
    out
}

/// Union; sorts the larger input.
///
/// The larger input is copied as is, then each element of the smaller one
/// that the larger lacks is appended. Duplicates inside the smaller input are
/// not collapsed.
pub fn or<E, F>(a: &mut [E], b: &mut [E], compare: &F) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    or_with(a, b, compare, &SortConfig::default())
}

pub fn or_with<E, F>(a: &mut [E], b: &mut [E], compare: &F, config: &SortConfig) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    let (small, large) = if a.len() < b.len() { (a, b) } else { (b, a) };
    quicksort_with(large, compare, config);

    let mut out = Vec::with_capacity(large.len() + small.len());
    out.extend_from_slice(large);
    let large: &[E] = large;
    for item in small.iter() {
        if binary_search(large, |probe| compare(probe, item)).is_err() {
            out.push(item.clone());
        }
    }
    out
}

/// Relative complement `a \ b`; sorts `b`, keeps `a`'s order.
pub fn and_not<E, F>(a: &mut [E], b: &mut [E], compare: &F) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    and_not_with(a, b, compare, &SortConfig::default())
}

pub fn and_not_with<E, F>(a: &mut [E], b: &mut [E], compare: &F, config: &SortConfig) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    quicksort_with(b, compare, config);
    let b: &[E] = b;
    a.iter()
        .filter(|item| binary_search(b, |probe| compare(probe, *item)).is_err())
        .cloned()
        .collect()
}

/// Symmetric difference; sorts both inputs.
///
/// The result lists `a`'s unmatched elements, then `b`'s.
pub fn or_not<E, F>(a: &mut [E], b: &mut [E], compare: &F) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    or_not_with(a, b, compare, &SortConfig::default())
}

pub fn or_not_with<E, F>(a: &mut [E], b: &mut [E], compare: &F, config: &SortConfig) -> Vec<E>
where
    E: Clone + Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    quicksort_with(a, compare, config);
    quicksort_with(b, compare, config);
    let (a, b): (&[E], &[E]) = (a, b);

    let only_in = |from: &[E], other: &[E]| {
        from.iter()
            .filter(|item| binary_search(other, |probe| compare(probe, *item)).is_err())
            .cloned()
            .collect::<Vec<E>>()
    };
    let mut out = only_in(a, b);
    out.extend(only_in(b, a));
    out
}
