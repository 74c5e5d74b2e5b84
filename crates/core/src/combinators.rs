//! Single-value combinators
//!
//! Every function here wraps a sequence without visiting it. Evaluation only
//! happens when the returned sequence is itself visited, and then only as far
//! as the downstream visitor asks for.
//!
//! Output order equals input order, except for [`sort`] and [`reverse`] which
//! impose a new order. Both buffer the whole upstream on each visit, so they
//! never finish on an infinite sequence.
//!
//! Terminal operations ([`reduce`], [`fold`]) live here too because they take
//! the same function shapes; the collecting materializers are in
//! [`crate::collect`].

use crate::sequence::Sequence;

/// Sequence adapter produced by [`filter`].
pub struct Filter<S, F> {
    inner: S,
    pred: F,
}

/// Yield only the elements for which `pred` holds.
///
/// `pred` runs exactly once per visited upstream element.
pub fn filter<S, F>(seq: S, pred: F) -> Filter<S, F>
where
    S: Sequence,
    F: FnMut(&S::Item) -> bool,
{
    Filter { inner: seq, pred }
}

impl<S, F> Sequence for Filter<S, F>
where
    S: Sequence,
    F: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(S::Item) -> bool) {
        let Self { inner, pred } = self;
        inner.visit(&mut |item| if pred(&item) { visitor(item) } else { true });
    }
}

/// Sequence adapter produced by [`map`], [`map_to_pair`] and [`map_result`].
pub struct Map<S, F> {
    inner: S,
    f: F,
}

/// Transform each element with `f`, one output per input.
pub fn map<S, V, F>(seq: S, f: F) -> Map<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> V,
{
    Map { inner: seq, f }
}

/// Transform each element into a pair, producing a pair sequence.
///
/// The canonical use is a fallible transform that reports `(value, error)`
/// for every element, so the caller sees failures without the chain being
/// interrupted. Nothing downstream inspects the second component.
///
/// ```
/// use lazyseq_core::{from_vec, map_to_pair, collect};
///
/// let parsed = map_to_pair(from_vec(vec!["forty-two", "42"]), |s| match s.parse::<i32>() {
///     Ok(n) => (n, None),
///     Err(e) => (0, Some(e.to_string())),
/// });
/// let pairs = collect(parsed);
/// assert_eq!(pairs[0], (0, Some("invalid digit found in string".to_string())));
/// assert_eq!(pairs[1], (42, None));
/// ```
pub fn map_to_pair<S, K, V, F>(seq: S, f: F) -> Map<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> (K, V),
{
    Map { inner: seq, f }
}

/// Apply a fallible transform, yielding each outcome as a `Result`.
///
/// Errors are ordinary elements: they neither stop the sequence nor get
/// filtered out.
pub fn map_result<S, V, E, F>(seq: S, f: F) -> Map<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> Result<V, E>,
{
    Map { inner: seq, f }
}

impl<S, V, F> Sequence for Map<S, F>
where
    S: Sequence,
    F: FnMut(S::Item) -> V,
{
    type Item = V;

    fn visit(&mut self, visitor: &mut dyn FnMut(V) -> bool) {
        let Self { inner, f } = self;
        inner.visit(&mut |item| visitor(f(item)));
    }
}

/// Sequence adapter produced by [`index`] and [`index_from`].
pub struct Index<S> {
    inner: S,
    start: usize,
}

/// Pair every element with its position, counting from zero.
pub fn index<S: Sequence>(seq: S) -> Index<S> {
    index_from(seq, 0)
}

/// Pair every element with a running counter that begins at `start`.
///
/// The counter advances once per visited element and restarts at `start` on
/// every visit.
pub fn index_from<S: Sequence>(seq: S, start: usize) -> Index<S> {
    Index { inner: seq, start }
}

impl<S: Sequence> Sequence for Index<S> {
    type Item = (usize, S::Item);

    fn visit(&mut self, visitor: &mut dyn FnMut((usize, S::Item)) -> bool) {
        let mut counter = self.start;
        self.inner.visit(&mut |item| {
            let position = counter;
            counter += 1;
            visitor((position, item))
        });
    }
}

/// Sequence adapter produced by [`take`].
pub struct Take<S> {
    inner: S,
    limit: usize,
}

/// Yield at most `limit` elements, then stop the upstream.
///
/// Useful for bounding an infinite generator before a materializer.
pub fn take<S: Sequence>(seq: S, limit: usize) -> Take<S> {
    Take { inner: seq, limit }
}

impl<S: Sequence> Sequence for Take<S> {
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(S::Item) -> bool) {
        let mut remaining = self.limit;
        if remaining == 0 {
            return;
        }
        self.inner.visit(&mut |item| {
            remaining -= 1;
            visitor(item) && remaining > 0
        });
    }
}

/// Sequence adapter produced by [`take_while`].
pub struct TakeWhile<S, F> {
    inner: S,
    pred: F,
}

/// Yield elements until `pred` first fails, then stop the upstream.
pub fn take_while<S, F>(seq: S, pred: F) -> TakeWhile<S, F>
where
    S: Sequence,
    F: FnMut(&S::Item) -> bool,
{
    TakeWhile { inner: seq, pred }
}

impl<S, F> Sequence for TakeWhile<S, F>
where
    S: Sequence,
    F: FnMut(&S::Item) -> bool,
{
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(S::Item) -> bool) {
        let Self { inner, pred } = self;
        inner.visit(&mut |item| pred(&item) && visitor(item));
    }
}

/// Sequence adapter produced by [`reverse`].
pub struct Reverse<S> {
    inner: S,
}

/// Yield the upstream back-to-front.
///
/// Each visit buffers the entire upstream first (O(n) time and space). On an
/// infinite sequence the buffering never ends; that is a limitation, not an
/// error.
pub fn reverse<S: Sequence>(seq: S) -> Reverse<S> {
    Reverse { inner: seq }
}

impl<S: Sequence> Sequence for Reverse<S> {
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(S::Item) -> bool) {
        let buffer = buffer(&mut self.inner);
        for item in buffer.into_iter().rev() {
            if !visitor(item) {
                break;
            }
        }
    }
}

/// Sequence adapter produced by [`sort`].
pub struct Sort<S, F> {
    inner: S,
    sort_fn: F,
}

/// Buffer the upstream, order the buffer with `sort_fn`, then yield it.
///
/// Stability is whatever `sort_fn` provides: `|b| b.sort()` is stable,
/// `|b| b.sort_unstable()` is not. Like [`reverse`], never finishes on an
/// infinite sequence.
///
/// ```
/// use lazyseq_core::{from_vec, sort, collect};
///
/// let sorted = sort(from_vec(vec!["aa", "aaa", "aaaaaaa", "a"]), |b: &mut [&str]| b.sort());
/// assert_eq!(collect(sorted), vec!["a", "aa", "aaa", "aaaaaaa"]);
/// ```
pub fn sort<S, F>(seq: S, sort_fn: F) -> Sort<S, F>
where
    S: Sequence,
    F: FnMut(&mut [S::Item]),
{
    Sort { inner: seq, sort_fn }
}

impl<S, F> Sequence for Sort<S, F>
where
    S: Sequence,
    F: FnMut(&mut [S::Item]),
{
    type Item = S::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(S::Item) -> bool) {
        let mut buffer = buffer(&mut self.inner);
        (self.sort_fn)(&mut buffer);
        for item in buffer {
            if !visitor(item) {
                break;
            }
        }
    }
}

fn buffer<S: Sequence>(seq: &mut S) -> Vec<S::Item> {
    let mut items = Vec::new();
    seq.visit(&mut |item| {
        items.push(item);
        true
    });
    items
}

/// Left fold with an accumulator of any type.
///
/// Terminal: visits the whole sequence. Never returns on an infinite one.
pub fn fold<S, A, F>(mut seq: S, initial: A, mut f: F) -> A
where
    S: Sequence,
    F: FnMut(A, S::Item) -> A,
{
    // The accumulator is moved out and back in on every element.
    let mut acc = Some(initial);
    seq.visit(&mut |item| {
        acc = acc.take().map(|a| f(a, item));
        true
    });
    match acc {
        Some(acc) => acc,
        None => unreachable!("fold accumulator is restored after every element"),
    }
}

/// Strict left fold: `combine(combine(initial, x0), x1)...` in visit order.
///
/// ```
/// use lazyseq_core::{from_vec, reduce};
///
/// let count = reduce(from_vec(vec![1, 2, 3, 4, 5, 6, 7]), |acc, _| acc + 1, 0);
/// assert_eq!(count, 7);
/// ```
pub fn reduce<S, F>(seq: S, combine: F, initial: S::Item) -> S::Item
where
    S: Sequence,
    F: FnMut(S::Item, S::Item) -> S::Item,
{
    fold(seq, initial, combine)
}
