//! Fluent builder over pair sequences
//!
//! `Chain2` is what [`Chain::index`](crate::Chain::index) returns, and can
//! wrap any pair sequence directly.
//! Like [`Chain`](crate::Chain), it boxes its sequence without a `Send`
//! bound and cannot be pulled through a cursor.

use crate::chain::Chain;
use crate::collect::{collect, to_map, to_map_with};
use crate::pairs::{filter2, keys, map2, sort2, sort2_with, values};
use crate::sequence::{BoxedSequence, Sequence};
use std::collections::HashMap;
use std::hash::Hash;

/// A fluent builder over `(K, V)` elements.
///
/// ```
/// use std::collections::HashMap;
/// use lazyseq_core::{Chain2, from_map};
///
/// let numbers: HashMap<&str, i32> = [("one", 0), ("two", 1), ("three", 2)].into_iter().collect();
/// let kept = Chain2::new(from_map(numbers))
///     .filter2(|_, v| *v >= 1)
///     .sort2(|keys| keys.sort())
///     .collect();
/// assert_eq!(kept, vec![("three", 2), ("two", 1)]);
/// ```
pub struct Chain2<'a, K, V> {
    seq: BoxedSequence<'a, (K, V)>,
}

impl<'a, K: 'a, V: 'a> Chain2<'a, K, V> {
    pub fn new<S>(seq: S) -> Self
    where
        S: Sequence<Item = (K, V)> + 'a,
    {
        Self { seq: Box::new(seq) }
    }

    pub fn filter2<F>(self, pred: F) -> Self
    where
        F: FnMut(&K, &V) -> bool + 'a,
    {
        Chain2::new(filter2(self.seq, pred))
    }

    pub fn map2<K2: 'a, V2: 'a, F>(self, f: F) -> Chain2<'a, K2, V2>
    where
        F: FnMut(K, V) -> (K2, V2) + 'a,
    {
        Chain2::new(map2(self.seq, f))
    }

    pub fn keys(self) -> Chain<'a, K> {
        Chain::new(keys(self.seq))
    }

    pub fn values(self) -> Chain<'a, V> {
        Chain::new(values(self.seq))
    }

    /// Order pairs by key. Duplicate keys collapse, last value wins.
    pub fn sort2<F>(self, sort_keys: F) -> Self
    where
        K: Eq + Hash + Clone,
        F: FnMut(&mut [K]) + 'a,
    {
        Chain2::new(sort2(self.seq, sort_keys))
    }

    /// Order pairs by key, merging duplicate keys with `resolve(existing, incoming)`.
    pub fn sort2_with<F, R>(self, sort_keys: F, resolve: R) -> Self
    where
        K: Eq + Hash + Clone,
        F: FnMut(&mut [K]) + 'a,
        R: FnMut(V, V) -> V + 'a,
    {
        Chain2::new(sort2_with(self.seq, sort_keys, resolve))
    }

    /// Terminal: key-unique map, last value wins.
    pub fn to_map(self) -> HashMap<K, V>
    where
        K: Eq + Hash,
    {
        to_map(self.seq)
    }

    pub fn to_map_with<R>(self, resolve: R) -> HashMap<K, V>
    where
        K: Eq + Hash,
        R: FnMut(V, V) -> V,
    {
        to_map_with(self.seq, resolve)
    }

    /// Terminal: gather the pairs in order.
    pub fn collect(self) -> Vec<(K, V)> {
        collect(self.seq)
    }

    pub fn into_sequence(self) -> BoxedSequence<'a, (K, V)> {
        self.seq
    }
}

impl<K, V> Sequence for Chain2<'_, K, V> {
    type Item = (K, V);

    fn visit(&mut self, visitor: &mut dyn FnMut((K, V)) -> bool) {
        self.seq.visit(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::from_vec;

    #[test]
    fn test_keys_chain() {
        let out = Chain2::new(from_vec(vec![("b", 2), ("a", 1)]))
            .sort2(|keys| keys.sort())
            .keys()
            .collect();
        assert_eq!(out, vec!["a", "b"]);
    }

    #[test]
    fn test_map2_then_to_map() {
        let map = Chain2::new(from_vec(vec![(1, "one"), (2, "two")]))
            .map2(|k, v| (v, k))
            .to_map();
        assert_eq!(map["one"], 1);
        assert_eq!(map["two"], 2);
    }

    #[test]
    fn test_sort2_with_sums_duplicates() {
        let out = Chain2::new(from_vec(vec![("x", 1), ("y", 2), ("x", 4)]))
            .sort2_with(|keys| keys.sort(), |a, b| a + b)
            .collect();
        assert_eq!(out, vec![("x", 5), ("y", 2)]);
    }

    #[test]
    fn test_to_map_with_keeps_first() {
        let map = Chain2::new(from_vec(vec![("k", 1), ("k", 2)])).to_map_with(|first, _| first);
        assert_eq!(map["k"], 1);
    }

    #[test]
    fn test_fallible_parse_pairs() {
        let out = Chain::new(from_vec(vec!["forty-two", "42"]))
            .map(|s| s.parse::<i32>())
            .map(|r| match r {
                Ok(n) => (n, None),
                Err(e) => (0, Some(e.to_string())),
            })
            .collect();
        assert_eq!(out[0].0, 0);
        assert!(out[0].1.is_some());
        assert_eq!(out[1], (42, None));
    }
}
