//! Fluent chain builders
//!
//! A chain wraps the current sequence behind a [`BoxedSequence`] so callers
//! never spell out combinator types. Every method consumes the chain and
//! returns a new one; a chain is never modified after construction.
//!
//! ```
//! use lazyseq_core::{Chain, from_vec};
//!
//! let short = Chain::new(from_vec(vec!["aa", "aaa", "aaaaaaa", "a"]))
//!     .filter(|s| s.len() >= 2)
//!     .filter(|s| s.len() <= 4)
//!     .collect();
//! assert_eq!(short, vec!["aa", "aaa"]);
//! ```
//!
//! ## Two-Type Chains
//!
//! [`Chain::map`] is generic over its output type, so a chain can move through
//! any number of element types. [`DualChain`] is the restricted builder that
//! alternates between exactly two types: `map` turns a `DualChain<T, V>` into
//! a `DualChain<V, T>`. Longer alternations need a fresh builder.
//!
//! ## Chains and Cursors
//!
//! The boxed sequence inside a chain is not `Send`, so a chain cannot be
//! handed to a cursor or used as the right input of `zip`/`merge_by`. Build
//! the sequence from the combinator functions directly, or collect the chain
//! and pull from the resulting vector.

use crate::chain2::Chain2;
use crate::collect::collect;
use crate::combinators::{filter, index_from, map, reduce, reverse, sort, take};
use crate::sequence::{BoxedSequence, Sequence};
use std::marker::PhantomData;

/// A fluent builder over a single element type.
pub struct Chain<'a, T> {
    seq: BoxedSequence<'a, T>,
}

impl<'a, T: 'a> Chain<'a, T> {
    pub fn new<S>(seq: S) -> Self
    where
        S: Sequence<Item = T> + 'a,
    {
        Self { seq: Box::new(seq) }
    }

    /// Keep only elements matching `pred`.
    pub fn filter<F>(self, pred: F) -> Self
    where
        F: FnMut(&T) -> bool + 'a,
    {
        Chain::new(filter(self.seq, pred))
    }

    /// Transform each element.
    pub fn map<U: 'a, F>(self, f: F) -> Chain<'a, U>
    where
        F: FnMut(T) -> U + 'a,
    {
        Chain::new(map(self.seq, f))
    }

    /// Pair each element with its position, counting from zero.
    pub fn index(self) -> Chain2<'a, usize, T> {
        self.index_from(0)
    }

    /// Pair each element with a running counter starting at `start`.
    pub fn index_from(self, start: usize) -> Chain2<'a, usize, T> {
        Chain2::new(index_from(self.seq, start))
    }

    pub fn take(self, limit: usize) -> Self {
        Chain::new(take(self.seq, limit))
    }

    /// Order the elements with `sort_fn`. Buffers the whole sequence when visited.
    pub fn sort<F>(self, sort_fn: F) -> Self
    where
        F: FnMut(&mut [T]) + 'a,
    {
        Chain::new(sort(self.seq, sort_fn))
    }

    /// Reverse the elements. Buffers the whole sequence when visited.
    pub fn reverse(self) -> Self {
        Chain::new(reverse(self.seq))
    }

    /// Terminal: strict left fold starting from `initial`.
    pub fn reduce<F>(self, combine: F, initial: T) -> T
    where
        F: FnMut(T, T) -> T,
    {
        reduce(self.seq, combine, initial)
    }

    /// Terminal: gather every element into a vector.
    pub fn collect(self) -> Vec<T> {
        collect(self.seq)
    }

    /// Unwrap the underlying sequence. The result is not `Send`.
    pub fn into_sequence(self) -> BoxedSequence<'a, T> {
        self.seq
    }
}

impl<T> Sequence for Chain<'_, T> {
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        self.seq.visit(visitor)
    }
}

/// A fluent builder that alternates between two element types.
///
/// `T` is the current element type; `V` is the type the next [`map`](Self::map)
/// produces. Mapping swaps the pair, so consecutive maps go `T -> V -> T -> ...`
/// with both types checked at compile time.
///
/// ```
/// use lazyseq_core::{DualChain, from_vec};
///
/// let lengths: Vec<usize> = DualChain::<&str, usize>::new(from_vec(vec!["aa", "a", "aaaa"]))
///     .map(|s| s.len())
///     .filter(|n| *n > 1)
///     .collect();
/// assert_eq!(lengths, vec![2, 4]);
/// ```
pub struct DualChain<'a, T, V> {
    seq: BoxedSequence<'a, T>,
    _other: PhantomData<fn() -> V>,
}

impl<'a, T: 'a, V: 'a> DualChain<'a, T, V> {
    pub fn new<S>(seq: S) -> Self
    where
        S: Sequence<Item = T> + 'a,
    {
        Self {
            seq: Box::new(seq),
            _other: PhantomData,
        }
    }

    pub fn filter<F>(self, pred: F) -> Self
    where
        F: FnMut(&T) -> bool + 'a,
    {
        DualChain::new(filter(self.seq, pred))
    }

    pub fn index(self) -> Chain2<'a, usize, T> {
        Chain2::new(index_from(self.seq, 0))
    }

    /// Transform `T -> V`, producing a chain whose next map goes back to `T`.
    pub fn map<F>(self, f: F) -> DualChain<'a, V, T>
    where
        F: FnMut(T) -> V + 'a,
    {
        DualChain::new(map(self.seq, f))
    }

    pub fn reduce<F>(self, combine: F, initial: T) -> T
    where
        F: FnMut(T, T) -> T,
    {
        reduce(self.seq, combine, initial)
    }

    pub fn collect(self) -> Vec<T> {
        collect(self.seq)
    }

    pub fn into_sequence(self) -> BoxedSequence<'a, T> {
        self.seq
    }
}

impl<T, V> Sequence for DualChain<'_, T, V> {
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        self.seq.visit(visitor)
    }
}
