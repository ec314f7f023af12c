//! Binary search over sorted slices that may hold runs of equal keys.
//!
//! A probe returns how an element orders relative to the target, the same
//! contract as [`slice::binary_search_by`]. A miss is reported as
//! `Err(insertion_point)`, Rust's encoding of the `-(insertionPoint) - 1`
//! convention, so the result feeds [`sorted_insert`] directly.
//!
//! When the midpoint matches, the neighbour on the biased side is probed too;
//! if it also matches the search keeps narrowing towards it. Lookups thus land
//! on the first element of a run, insertions after the last, in `O(log n)`
//! probes.

use std::cmp::Ordering;
use std::ops::Range;

#[derive(Clone, Copy)]
enum Bias {
    First,
    Last,
}

/// Searches the whole slice; returns the first matching index on a hit.
///
/// ```
/// use standout_sieve::binary_search;
///
/// let v = [1, 3, 3, 3, 8];
/// assert_eq!(binary_search(&v, |x| x.cmp(&3)), Ok(1));
/// assert_eq!(binary_search(&v, |x| x.cmp(&4)), Err(4));
/// ```
pub fn binary_search<E, F>(v: &[E], probe: F) -> Result<usize, usize>
where
    F: FnMut(&E) -> Ordering,
{
    search_biased(v, 0, v.len(), probe, Bias::First)
}

/// Searches `v[low..high]`. Out-of-range bounds are clamped.
pub fn binary_search_in<E, F>(v: &[E], low: usize, high: usize, probe: F) -> Result<usize, usize>
where
    F: FnMut(&E) -> Ordering,
{
    search_biased(v, low, high, probe, Bias::First)
}

/// Position just after the run of elements matching the probe.
pub fn insertion_point<E, F>(v: &[E], probe: F) -> usize
where
    F: FnMut(&E) -> Ordering,
{
    match search_biased(v, 0, v.len(), probe, Bias::Last) {
        Ok(last) => last + 1,
        Err(at) => at,
    }
}

/// The index range of the run matching the probe; empty (at the insertion
/// point) on a miss.
///
/// ```
/// use standout_sieve::equal_range;
///
/// let v = [1, 3, 3, 3, 8];
/// assert_eq!(equal_range(&v, |x| x.cmp(&3)), 1..4);
/// assert_eq!(equal_range(&v, |x| x.cmp(&5)), 4..4);
/// ```
pub fn equal_range<E, F>(v: &[E], mut probe: F) -> Range<usize>
where
    F: FnMut(&E) -> Ordering,
{
    match search_biased(v, 0, v.len(), &mut probe, Bias::First) {
        Ok(first) => match search_biased(v, first, v.len(), &mut probe, Bias::Last) {
            Ok(last) => first..last + 1,
            Err(_) => first..first + 1,
        },
        Err(at) => at..at,
    }
}

/// Inserts `value` into a sorted vector after any equal elements and returns
/// its index.
pub fn sorted_insert<E, F>(v: &mut Vec<E>, value: E, compare: F) -> usize
where
    F: Fn(&E, &E) -> Ordering,
{
    let at = insertion_point(v, |probe| compare(probe, &value)).min(v.len());
    v.insert(at, value);
    at
}

fn search_biased<E, F>(
    v: &[E],
    low: usize,
    high: usize,
    mut probe: F,
    bias: Bias,
) -> Result<usize, usize>
where
    F: FnMut(&E) -> Ordering,
{
    let mut high = high.min(v.len());
    let mut low = low.min(high);
    let mut found = None;

    while low < high {
        let mid = low + (high - low) / 2;
        match probe(&v[mid]) {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            Ordering::Equal => match bias {
                Bias::First => {
                    if mid > low && probe(&v[mid - 1]) == Ordering::Equal {
                        found = Some(mid - 1);
                        high = mid - 1;
                    } else {
                        return Ok(mid);
                    }
                }
                Bias::Last => {
                    if mid + 1 < high && probe(&v[mid + 1]) == Ordering::Equal {
                        found = Some(mid + 1);
                        low = mid + 2;
                    } else {
                        return Ok(mid);
                    }
                }
            },
        }
    }

    found.ok_or(low)
}
