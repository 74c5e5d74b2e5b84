//! The push-style sequence contract
//!
//! A [`Sequence`] is a capability, not stored data: a producer that, when
//! visited, calls the visitor once per value in order until the visitor
//! returns `false` or the source runs dry. `visit` always returns normally.
//!
//! ## Replayability
//!
//! Whether a second `visit` yields the same values depends on the source:
//!
//! | Source | Replays? |
//! |--------|----------|
//! | [`from_vec`], [`from_slice`] | yes, same order every time |
//! | [`from_map`] | yes, order unspecified on every visit |
//! | [`from_iter`], [`from_fn`] | no, values are consumed as they are visited |
//! | [`from_visit`] | whatever the wrapped closure does |
//! | [`empty`] | trivially |
//!
//! Combinators replay exactly when their upstream does.
//!
//! ## Pair Sequences
//!
//! A pair sequence is any `Sequence<Item = (K, V)>`. The pair combinators in
//! [`crate::pairs`] operate on those.

use std::collections::HashMap;
use std::marker::PhantomData;

/// A lazy, order-preserving, push-style producer of values.
///
/// The visitor returns `true` to ask for the next element and `false` to stop.
/// After the visitor returns `false` the sequence must not call it again.
///
/// `visit` takes `&mut self`: a sequence has one consumer at a time.
pub trait Sequence {
    /// The element type produced by this sequence.
    type Item;

    /// Call `visitor` once per element, in order, until it returns `false`
    /// or the sequence is exhausted.
    fn visit(&mut self, visitor: &mut dyn FnMut(Self::Item) -> bool);
}

/// A type-erased sequence, used by the chain builders to hide intermediate
/// combinator types.
pub type BoxedSequence<'a, T> = Box<dyn Sequence<Item = T> + 'a>;

impl<S: Sequence + ?Sized> Sequence for Box<S> {
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(Self::Item) -> bool) {
        (**self).visit(visitor)
    }
}

impl<S: Sequence + ?Sized> Sequence for &mut S {
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(Self::Item) -> bool) {
        (**self).visit(visitor)
    }
}

/// Replayable sequence over an owned vector. See [`from_vec`].
#[derive(Debug, Clone)]
pub struct FromVec<T> {
    items: Vec<T>,
}

/// Build a replayable sequence over an ordered collection.
///
/// Every visit yields clones of the stored values in their original order.
pub fn from_vec<T: Clone>(items: Vec<T>) -> FromVec<T> {
    FromVec { items }
}

impl<T: Clone> Sequence for FromVec<T> {
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        for item in &self.items {
            if !visitor(item.clone()) {
                break;
            }
        }
    }
}

/// Replayable sequence over a borrowed slice. See [`from_slice`].
#[derive(Debug, Clone, Copy)]
pub struct FromSlice<'a, T> {
    items: &'a [T],
}

/// Build a replayable sequence that clones values out of a borrowed slice.
pub fn from_slice<T: Clone>(items: &[T]) -> FromSlice<'_, T> {
    FromSlice { items }
}

impl<T: Clone> Sequence for FromSlice<'_, T> {
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        for item in self.items {
            if !visitor(item.clone()) {
                break;
            }
        }
    }
}

/// One-shot sequence over an iterator. See [`from_iter`].
#[derive(Debug)]
pub struct FromIter<I> {
    iter: I,
}

/// Build a one-shot sequence from any iterator.
///
/// Values are consumed as they are visited: a visit that stops early leaves
/// the remainder for the next visit, and an exhausted source stays empty.
pub fn from_iter<I: IntoIterator>(iter: I) -> FromIter<I::IntoIter> {
    FromIter {
        iter: iter.into_iter(),
    }
}

impl<I: Iterator> Sequence for FromIter<I> {
    type Item = I::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(I::Item) -> bool) {
        for item in self.iter.by_ref() {
            if !visitor(item) {
                break;
            }
        }
    }
}

/// One-shot generator sequence. See [`from_fn`].
pub struct FromFn<F> {
    next: F,
}

/// Build a sequence that calls `next` until it returns `None`.
///
/// The generator may never return `None`, which makes an infinite sequence.
/// Materializing such a sequence does not terminate.
pub fn from_fn<T, F>(next: F) -> FromFn<F>
where
    F: FnMut() -> Option<T>,
{
    FromFn { next }
}

impl<T, F> Sequence for FromFn<F>
where
    F: FnMut() -> Option<T>,
{
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        while let Some(item) = (self.next)() {
            if !visitor(item) {
                break;
            }
        }
    }
}

/// Replayable pair sequence over a hash map. See [`from_map`].
#[derive(Debug, Clone)]
pub struct FromMap<K, V> {
    map: HashMap<K, V>,
}

/// Build a pair sequence over a key-unique mapping.
///
/// Pair order is unspecified and may differ between visits. Apply
/// [`crate::pairs::sort2`] downstream when a deterministic order matters.
pub fn from_map<K: Clone, V: Clone>(map: HashMap<K, V>) -> FromMap<K, V> {
    FromMap { map }
}

impl<K: Clone, V: Clone> Sequence for FromMap<K, V> {
    type Item = (K, V);

    fn visit(&mut self, visitor: &mut dyn FnMut((K, V)) -> bool) {
        for (key, value) in &self.map {
            if !visitor((key.clone(), value.clone())) {
                break;
            }
        }
    }
}

/// A sequence defined directly by its visit function. See [`from_visit`].
pub struct FromVisit<F, T> {
    producer: F,
    _item: PhantomData<fn() -> T>,
}

/// Wrap a raw push producer.
///
/// The producer receives the visitor and must honor the stop signal: once the
/// visitor returns `false` it must not be called again.
///
/// ```
/// use lazyseq_core::{from_visit, collect};
///
/// let naturals = from_visit(|visitor: &mut dyn FnMut(u64) -> bool| {
///     let mut n = 0;
///     while visitor(n) {
///         n += 1;
///     }
/// });
/// let first: Vec<u64> = collect(lazyseq_core::take_while(naturals, |n| *n < 3));
/// assert_eq!(first, vec![0, 1, 2]);
/// ```
pub fn from_visit<T, F>(producer: F) -> FromVisit<F, T>
where
    F: FnMut(&mut dyn FnMut(T) -> bool),
{
    FromVisit {
        producer,
        _item: PhantomData,
    }
}

impl<T, F> Sequence for FromVisit<F, T>
where
    F: FnMut(&mut dyn FnMut(T) -> bool),
{
    type Item = T;

    fn visit(&mut self, visitor: &mut dyn FnMut(T) -> bool) {
        (self.producer)(visitor)
    }
}

/// A sequence with no elements.
pub struct Empty<T> {
    _item: PhantomData<fn() -> T>,
}

pub fn empty<T>() -> Empty<T> {
    Empty { _item: PhantomData }
}

impl<T> Sequence for Empty<T> {
    type Item = T;

    fn visit(&mut self, _visitor: &mut dyn FnMut(T) -> bool) {}
}
