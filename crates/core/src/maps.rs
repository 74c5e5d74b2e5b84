//! Shortcuts for filtering and mapping hash maps
//!
//! Each call visits the borrowed map once, cloning each entry a single time,
//! and collects into a new map. Iteration order of the input does not matter
//! to the result, except when [`simple_map`] produces colliding keys: then the value visited
//! last wins, and that order is unspecified.

use crate::collect::to_map;
use crate::pairs::{filter2, map2};
use crate::sequence::{Sequence, from_iter};
use std::collections::HashMap;
use std::hash::Hash;

fn entries<K: Clone, V: Clone>(
    map: &HashMap<K, V>,
) -> impl Sequence<Item = (K, V)> + '_ {
    from_iter(map.iter().map(|(k, v)| (k.clone(), v.clone())))
}

/// Keep the entries for which `pred(&key, &value)` holds.
pub fn simple_filter<K, V, F>(map: &HashMap<K, V>, pred: F) -> HashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: FnMut(&K, &V) -> bool,
{
    to_map(filter2(entries(map), pred))
}

/// Rewrite every entry with `f(key, value) -> (key2, value2)`.
pub fn simple_map<K, V, K2, V2, F>(map: &HashMap<K, V>, f: F) -> HashMap<K2, V2>
where
    K: Eq + Hash + Clone,
    V: Clone,
    K2: Eq + Hash,
    F: FnMut(K, V) -> (K2, V2),
{
    to_map(map2(entries(map), f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn numbers() -> HashMap<&'static str, i32> {
        [("one", 1), ("two", 2), ("three", 3)].into_iter().collect()
    }

    #[test]
    fn test_simple_filter_by_value() {
        let odd = simple_filter(&numbers(), |_, v| v % 2 == 1);
        assert_eq!(odd.len(), 2);
        assert_eq!(odd["one"], 1);
        assert_eq!(odd["three"], 3);
    }

    #[test]
    fn test_simple_map_inverts() {
        let inverted = simple_map(&numbers(), |k, v| (v, k));
        assert_eq!(inverted[&2], "two");
        assert_eq!(inverted.len(), 3);
    }

    #[derive(Debug)]
    struct Tracked(Rc<Cell<usize>>);

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            self.0.set(self.0.get() + 1);
            Tracked(Rc::clone(&self.0))
        }
    }

    #[test]
    fn test_each_entry_cloned_once() {
        let clones = Rc::new(Cell::new(0));
        let map: HashMap<&str, Tracked> = ["a", "b", "c"]
            .into_iter()
            .map(|k| (k, Tracked(Rc::clone(&clones))))
            .collect();

        let kept = simple_filter(&map, |_, _| true);
        assert_eq!(kept.len(), 3);
        assert_eq!(clones.get(), 3);

        clones.set(0);
        let renamed = simple_map(&map, |k, v| (k.to_uppercase(), v));
        assert_eq!(renamed.len(), 3);
        assert_eq!(clones.get(), 3);
    }
}
