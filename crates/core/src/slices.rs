//! Shortcuts for filtering and mapping plain slices
//!
//! These build a sequence over the slice, apply the combinator, and collect
//! the result in one call. For anything longer than a single step, a
//! [`Chain`](crate::Chain) reads better.

use crate::collect::collect;
use crate::combinators::{filter, map};
use crate::sequence::from_slice;

/// Keep the elements of `items` that match `pred`.
///
/// ```
/// use lazyseq_core::slices;
///
/// let even = slices::simple_filter(&[1, 5, 3, 9, 7, 2, 4, 8, 10, 0], |n| n % 2 == 0);
/// assert_eq!(even, vec![2, 4, 8, 10, 0]);
/// ```
pub fn simple_filter<T, F>(items: &[T], pred: F) -> Vec<T>
where
    T: Clone,
    F: FnMut(&T) -> bool,
{
    collect(filter(from_slice(items), pred))
}

/// Apply several filters one after another.
///
/// Each predicate only sees the elements that survived the ones before it,
/// in order, so stateful predicates behave as they would in a chain of
/// separate [`simple_filter`] calls.
pub fn simple_filters<T: Clone>(items: &[T], preds: &mut [&mut dyn FnMut(&T) -> bool]) -> Vec<T> {
    collect(filter(from_slice(items), |item| {
        preds.iter_mut().all(|pred| (*pred)(item))
    }))
}

/// Transform every element of `items`.
pub fn simple_map<T, V, F>(items: &[T], f: F) -> Vec<V>
where
    T: Clone,
    F: FnMut(T) -> V,
{
    collect(map(from_slice(items), f))
}
