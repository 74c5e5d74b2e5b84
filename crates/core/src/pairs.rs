//! Pair-sequence combinators
//!
//! These work on any `Sequence<Item = (K, V)>`, whether the pairs are real
//! key/value data or a value travelling with an auxiliary result.
//!
//! [`sort2`] and [`sort2_with`] collapse duplicate keys before sorting. The
//! plain form keeps the last value seen for a key and silently drops the rest;
//! prefer [`sort2_with`] when duplicates can occur.

use crate::collect::to_map_with;
use crate::sequence::Sequence;
use std::hash::Hash;

/// Sequence adapter produced by [`filter2`].
pub struct Filter2<S, F> {
    inner: S,
    pred: F,
}

/// Yield only the pairs for which `pred(&key, &value)` holds.
pub fn filter2<S, K, V, F>(seq: S, pred: F) -> Filter2<S, F>
where
    S: Sequence<Item = (K, V)>,
    F: FnMut(&K, &V) -> bool,
{
    Filter2 { inner: seq, pred }
}

impl<S, K, V, F> Sequence for Filter2<S, F>
where
    S: Sequence<Item = (K, V)>,
    F: FnMut(&K, &V) -> bool,
{
    type Item = (K, V);

    fn visit(&mut self, visitor: &mut dyn FnMut((K, V)) -> bool) {
        let Self { inner, pred } = self;
        inner.visit(&mut |(key, value)| {
            if pred(&key, &value) {
                visitor((key, value))
            } else {
                true
            }
        });
    }
}

/// Sequence adapter produced by [`map2`].
pub struct Map2<S, F> {
    inner: S,
    f: F,
}

/// Transform each pair with `f(key, value) -> (key2, value2)`.
pub fn map2<S, K, V, K2, V2, F>(seq: S, f: F) -> Map2<S, F>
where
    S: Sequence<Item = (K, V)>,
    F: FnMut(K, V) -> (K2, V2),
{
    Map2 { inner: seq, f }
}

impl<S, K, V, K2, V2, F> Sequence for Map2<S, F>
where
    S: Sequence<Item = (K, V)>,
    F: FnMut(K, V) -> (K2, V2),
{
    type Item = (K2, V2);

    fn visit(&mut self, visitor: &mut dyn FnMut((K2, V2)) -> bool) {
        let Self { inner, f } = self;
        inner.visit(&mut |(key, value)| visitor(f(key, value)));
    }
}

/// Sequence adapter produced by [`keys`].
pub struct Keys<S> {
    inner: S,
}

/// Project each pair to its first component.
pub fn keys<S, K, V>(seq: S) -> Keys<S>
where
    S: Sequence<Item = (K, V)>,
{
    Keys { inner: seq }
}

impl<S, K, V> Sequence for Keys<S>
where
    S: Sequence<Item = (K, V)>,
{
    type Item = K;

    fn visit(&mut self, visitor: &mut dyn FnMut(K) -> bool) {
        self.inner.visit(&mut |(key, _)| visitor(key));
    }
}

/// Sequence adapter produced by [`values`].
pub struct Values<S> {
    inner: S,
}

/// Project each pair to its second component.
pub fn values<S, K, V>(seq: S) -> Values<S>
where
    S: Sequence<Item = (K, V)>,
{
    Values { inner: seq }
}

impl<S, K, V> Sequence for Values<S>
where
    S: Sequence<Item = (K, V)>,
{
    type Item = V;

    fn visit(&mut self, visitor: &mut dyn FnMut(V) -> bool) {
        self.inner.visit(&mut |(_, value)| visitor(value));
    }
}

/// Sequence adapter produced by [`sort2`] and [`sort2_with`].
pub struct Sort2<S, F, R> {
    inner: S,
    sort_keys: F,
    resolve: R,
}

/// Conflict resolution used by [`sort2`] and [`crate::to_map`]: the value
/// seen last wins.
pub fn last_wins<V>(_existing: V, incoming: V) -> V {
    incoming
}

/// Re-yield pairs ordered by key.
///
/// Each visit collapses the upstream into a key-unique map, keeping the last
/// value for a repeated key, sorts the keys with `sort_keys`, then yields the
/// pairs in that key order. The collapse is lossy on purpose: `[("a", 1), ("a", 2)]`
/// becomes `[("a", 2)]`.
///
/// ```
/// use lazyseq_core::{from_vec, sort2, collect};
///
/// let pairs = from_vec(vec![("b", 1), ("a", 1), ("a", 2)]);
/// let sorted = sort2(pairs, |keys: &mut [&str]| keys.sort());
/// assert_eq!(collect(sorted), vec![("a", 2), ("b", 1)]);
/// ```
pub fn sort2<S, K, V, F>(seq: S, sort_keys: F) -> Sort2<S, F, fn(V, V) -> V>
where
    S: Sequence<Item = (K, V)>,
    K: Eq + Hash + Clone,
    F: FnMut(&mut [K]),
{
    sort2_with(seq, sort_keys, last_wins::<V> as fn(V, V) -> V)
}

/// Like [`sort2`], but duplicate keys are merged with `resolve(existing, incoming)`.
pub fn sort2_with<S, K, V, F, R>(seq: S, sort_keys: F, resolve: R) -> Sort2<S, F, R>
where
    S: Sequence<Item = (K, V)>,
    K: Eq + Hash + Clone,
    F: FnMut(&mut [K]),
    R: FnMut(V, V) -> V,
{
    Sort2 {
        inner: seq,
        sort_keys,
        resolve,
    }
}

impl<S, K, V, F, R> Sequence for Sort2<S, F, R>
where
    S: Sequence<Item = (K, V)>,
    K: Eq + Hash + Clone,
    F: FnMut(&mut [K]),
    R: FnMut(V, V) -> V,
{
    type Item = (K, V);

    fn visit(&mut self, visitor: &mut dyn FnMut((K, V)) -> bool) {
        let mut map = to_map_with(&mut self.inner, &mut self.resolve);
        let mut keys: Vec<K> = map.keys().cloned().collect();
        (self.sort_keys)(&mut keys);
        for key in keys {
            // sort_keys may not invent keys, but it can duplicate them
            let Some(value) = map.remove(&key) else {
                continue;
            };
            if !visitor((key, value)) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::collect;
    use crate::sequence::{from_map, from_vec};
    use std::collections::HashMap;

    fn numbers() -> HashMap<&'static str, i32> {
        [("one", 0), ("two", 1), ("three", 2)].into_iter().collect()
    }

    #[test]
    fn test_filter2_then_sort_by_key() {
        let seq = filter2(from_map(numbers()), |_, v| *v >= 1);
        let sorted = sort2(seq, |keys: &mut [&str]| keys.sort());
        assert_eq!(collect(sorted), vec![("three", 2), ("two", 1)]);
    }

    #[test]
    fn test_map2_swaps_components() {
        let seq = map2(from_vec(vec![(1, "a"), (2, "b")]), |k, v| (v, k * 10));
        assert_eq!(collect(seq), vec![("a", 10), ("b", 20)]);
    }

    #[test]
    fn test_keys_and_values_preserve_order() {
        let pairs = vec![("x", 3), ("y", 1), ("z", 2)];
        assert_eq!(collect(keys(from_vec(pairs.clone()))), vec!["x", "y", "z"]);
        assert_eq!(collect(values(from_vec(pairs))), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort2_keeps_last_value_for_duplicate_key() {
        let sorted = sort2(from_vec(vec![("a", 1), ("a", 2)]), |keys: &mut [&str]| keys.sort());
        assert_eq!(collect(sorted), vec![("a", 2)]);
    }

    #[test]
    fn test_sort2_with_resolves_duplicates() {
        let sorted = sort2_with(
            from_vec(vec![("b", 1), ("a", 1), ("b", 5), ("a", 2)]),
            |keys: &mut [&str]| keys.sort_unstable_by(|a, b| b.cmp(a)),
            |existing, incoming| existing + incoming,
        );
        assert_eq!(collect(sorted), vec![("b", 6), ("a", 3)]);
    }

    #[test]
    fn test_sort2_stops_early() {
        let mut sorted = sort2(from_map(numbers()), |keys: &mut [&str]| keys.sort());
        let mut first = None;
        sorted.visit(&mut |pair| {
            first = Some(pair);
            false
        });
        assert_eq!(first, Some(("one", 0)));
    }
}
