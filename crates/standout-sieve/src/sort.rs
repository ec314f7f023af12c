//! In-place quicksort with an insertion-sort tail and a one-shot parallel
//! fan-out.
//!
//! The sort partitions around the middle element (Hoare style, both cursors
//! converging), finishes partitions shorter than
//! [`SortConfig::insertion_cutoff`] with insertion sort, and, for collections
//! longer than [`SortConfig::parallel_threshold`], sorts the two halves of the
//! very first partition concurrently. Deeper levels stay sequential. The
//! fan-out is deliberately coarse; it is not a general parallel sort.
//!
//! Sorting is not stable and mutates the slice in place. Callers own the
//! exclusive access that `&mut` already demands.

use std::cmp::Ordering;
use std::sync::{Mutex, PoisonError};

use tracing::trace;

/// Partitions shorter than this are finished by insertion sort.
pub const DEFAULT_INSERTION_CUTOFF: usize = 20;

/// Collections longer than this fork their first partition.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 200_000;

/// Tuning knobs for [`quicksort_with`].
///
/// ```
/// use standout_sieve::SortConfig;
///
/// let config = SortConfig::default().parallel_threshold(50_000);
/// assert_eq!(config.insertion_cutoff, 20);
/// assert!(!SortConfig::sequential().parallel);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub insertion_cutoff: usize,
    pub parallel_threshold: usize,
    /// Allow the top-level fork at all.
    pub parallel: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            insertion_cutoff: DEFAULT_INSERTION_CUTOFF,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            parallel: true,
        }
    }
}

impl SortConfig {
    /// Default constants with the fork disabled.
    pub fn sequential() -> Self {
        SortConfig {
            parallel: false,
            ..SortConfig::default()
        }
    }

    pub fn insertion_cutoff(mut self, cutoff: usize) -> Self {
        self.insertion_cutoff = cutoff;
        self
    }

    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn should_fan_out(&self, len: usize) -> bool {
        self.parallel && len > self.parallel_threshold && rayon::current_num_threads() > 1
    }
}

/// Sorts `v` in place with the default [`SortConfig`].
///
/// ```
/// use standout_sieve::quicksort;
///
/// let mut v = vec![5, 3, 9, 1, 3];
/// quicksort(&mut v, &|a: &i32, b: &i32| a.cmp(b));
/// assert_eq!(v, [1, 3, 3, 5, 9]);
/// ```
pub fn quicksort<E, F>(v: &mut [E], compare: &F)
where
    E: Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    quicksort_with(v, compare, &SortConfig::default());
}

/// Sorts `v` in place.
pub fn quicksort_with<E, F>(v: &mut [E], compare: &F, config: &SortConfig)
where
    E: Send,
    F: Fn(&E, &E) -> Ordering + Sync,
{
    if v.len() <= 1 {
        return;
    }

    if config.should_fan_out(v.len()) {
        let pivot = partition(v, compare);
        let (left, rest) = v.split_at_mut(pivot);
        let right = &mut rest[1..];
        trace!(
            left = left.len(),
            right = right.len(),
            threads = rayon::current_num_threads(),
            "sieve.sort.fanout"
        );
        // rayon runs the second closure inline when no worker is free.
        rayon::join(
            || sort_sequential(left, compare, config.insertion_cutoff),
            || sort_sequential(right, compare, config.insertion_cutoff),
        );
    } else {
        sort_sequential(v, compare, config.insertion_cutoff);
    }
}

/// Sorts with a fallible comparator.
///
/// A failing comparison is treated as `Equal` so the sort still terminates;
/// the first error is returned once the sort is done and the slice order is
/// then unspecified.
pub fn try_quicksort_with<E, F, Err>(
    v: &mut [E],
    compare: &F,
    config: &SortConfig,
) -> Result<(), Err>
where
    E: Send,
    Err: Send,
    F: Fn(&E, &E) -> Result<Ordering, Err> + Sync,
{
    let failure: Mutex<Option<Err>> = Mutex::new(None);
    quicksort_with(
        v,
        &|a: &E, b: &E| match compare(a, b) {
            Ok(ordering) => ordering,
            Err(err) => {
                let mut slot = failure.lock().unwrap_or_else(PoisonError::into_inner);
                slot.get_or_insert(err);
                Ordering::Equal
            }
        },
        config,
    );
    match failure.into_inner().unwrap_or_else(PoisonError::into_inner) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn sort_sequential<E, F>(mut v: &mut [E], compare: &F, cutoff: usize)
where
    F: Fn(&E, &E) -> Ordering,
{
    loop {
        if v.len() <= 1 {
            return;
        }
        if v.len() < cutoff {
            insertion_sort(v, compare);
            return;
        }

        let pivot = partition(v, compare);
        let (left, rest) = std::mem::take(&mut v).split_at_mut(pivot);
        let right = &mut rest[1..];

        // Recurse into the shorter side, loop on the longer one.
        if left.len() < right.len() {
            sort_sequential(left, compare, cutoff);
            v = right;
        } else {
            sort_sequential(right, compare, cutoff);
            v = left;
        }
    }
}

fn insertion_sort<E, F>(v: &mut [E], compare: &F)
where
    F: Fn(&E, &E) -> Ordering,
{
    for i in 1..v.len() {
        let mut j = i;
        while j > 0 && compare(&v[j - 1], &v[j]) == Ordering::Greater {
            v.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Partitions around the middle element and returns its final index.
///
/// Afterwards `v[..p]` holds nothing greater than the pivot and `v[p + 1..]`
/// nothing less. Elements equal to the pivot stop both cursors, which keeps
/// runs of duplicates balanced across the two sides.
fn partition<E, F>(v: &mut [E], compare: &F) -> usize
where
    F: Fn(&E, &E) -> Ordering,
{
    let mid = v.len() / 2;
    v.swap(0, mid);

    let (head, tail) = v.split_at_mut(1);
    let pivot = &head[0];
    let mut l = 0;
    let mut r = tail.len();
    loop {
        while l < r && compare(&tail[l], pivot) == Ordering::Less {
            l += 1;
        }
        while l < r && compare(&tail[r - 1], pivot) == Ordering::Greater {
            r -= 1;
        }
        if l >= r {
            break;
        }
        r -= 1;
        tail.swap(l, r);
        l += 1;
    }

    v.swap(0, r);
    r
}
