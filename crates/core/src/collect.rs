//! Materializers
//!
//! The only functions in this crate that force a sequence. Each one visits
//! the whole input, so none of them return on an infinite sequence.

use crate::pairs::last_wins;
use crate::sequence::Sequence;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::trace;

/// Append every element, in visit order, to a new vector.
///
/// ```
/// use lazyseq_core::{from_vec, collect};
///
/// let xs = vec![3, 1, 2];
/// assert_eq!(collect(from_vec(xs.clone())), xs);
/// ```
pub fn collect<S: Sequence>(mut seq: S) -> Vec<S::Item> {
    let mut items = Vec::new();
    seq.visit(&mut |item| {
        items.push(item);
        true
    });
    trace!(len = items.len(), "collected sequence");
    items
}

/// Collapse a pair sequence into a key-unique map; the last value for a
/// repeated key wins.
pub fn to_map<S, K, V>(seq: S) -> HashMap<K, V>
where
    S: Sequence<Item = (K, V)>,
    K: Eq + Hash,
{
    to_map_with(seq, last_wins)
}

/// Collapse a pair sequence into a key-unique map, merging values of a
/// repeated key with `resolve(existing, incoming)`.
pub fn to_map_with<S, K, V, R>(mut seq: S, mut resolve: R) -> HashMap<K, V>
where
    S: Sequence<Item = (K, V)>,
    K: Eq + Hash,
    R: FnMut(V, V) -> V,
{
    let mut map = HashMap::new();
    let mut collisions = 0usize;
    seq.visit(&mut |(key, value)| {
        let merged = match map.remove(&key) {
            Some(existing) => {
                collisions += 1;
                resolve(existing, value)
            }
            None => value,
        };
        map.insert(key, merged);
        true
    });
    trace!(len = map.len(), collisions, "collected pair sequence into map");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{from_map, from_vec};

    #[test]
    fn test_collect_round_trip() {
        let xs = vec!["aa", "aaa", "aaaaaaa", "a"];
        assert_eq!(collect(from_vec(xs.clone())), xs);
        assert!(collect(from_vec(Vec::<u8>::new())).is_empty());
    }

    #[test]
    fn test_to_map_last_write_wins() {
        let map = to_map(from_vec(vec![("a", 1), ("b", 2), ("a", 3)]));
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 3);
        assert_eq!(map["b"], 2);
    }

    #[test]
    fn test_to_map_with_merges() {
        let map = to_map_with(from_vec(vec![("a", 1), ("a", 3)]), |old, new| old.max(new) * 10);
        assert_eq!(map["a"], 30);
    }

    #[test]
    fn test_from_map_round_trip() {
        let original: HashMap<String, usize> =
            [("one".to_string(), 1), ("two".to_string(), 2)].into_iter().collect();
        assert_eq!(to_map(from_map(original.clone())), original);
    }
}
