//! Combinators that consume two sequences at once
//!
//! A push sequence cannot be interleaved with another push sequence on one
//! thread: each wants to own the loop. These combinators visit the left input
//! directly and pull the right input through a [`Cursor`], so they are the only
//! combinators that start a producer strand.
//!
//! The right input is moved into the cursor on the first visit, which makes
//! both combinators one-shot: a second visit yields nothing. The cursor is
//! released on every way out of `visit`, including a downstream stop and
//! unwinding through a `Drop`.

use crate::cursor::Cursor;
use lazyseq_core::Sequence;
use std::cmp::Ordering;
use tracing::warn;

fn pull_next<T: Send + 'static>(cursor: &mut Cursor<T>, op: &'static str) -> Option<T> {
    match cursor.advance() {
        Ok(item) => item,
        Err(e) => {
            warn!(op, error = %e, "right-hand cursor failed, ending early");
            None
        }
    }
}

/// Sequence adapter produced by [`zip`].
pub struct Zip<L, R> {
    left: L,
    right: Option<R>,
}

/// Pair up elements at equal positions, stopping at the shorter input.
///
/// ```
/// use lazyseq_core::{collect, from_vec};
/// use lazyseq_runtime::zip;
///
/// let pairs = zip(from_vec(vec!["a", "b", "c"]), from_vec(vec![1, 2]));
/// assert_eq!(collect(pairs), vec![("a", 1), ("b", 2)]);
/// ```
pub fn zip<L, R>(left: L, right: R) -> Zip<L, R>
where
    L: Sequence,
    R: Sequence + Send + 'static,
    R::Item: Send + 'static,
{
    Zip {
        left,
        right: Some(right),
    }
}

impl<L, R> Sequence for Zip<L, R>
where
    L: Sequence,
    R: Sequence + Send + 'static,
    R::Item: Send + 'static,
{
    type Item = (L::Item, R::Item);

    fn visit(&mut self, visitor: &mut dyn FnMut((L::Item, R::Item)) -> bool) {
        let Some(right) = self.right.take() else {
            return;
        };
        let mut cursor = Cursor::new(right);

        self.left.visit(&mut |l| match pull_next(&mut cursor, "zip") {
            Some(r) => visitor((l, r)),
            None => false,
        });

        cursor.release();
    }
}

/// Sequence adapter produced by [`merge_by`].
pub struct MergeBy<L, R, F> {
    left: L,
    right: Option<R>,
    cmp: F,
}

/// Merge two sequences already ordered by `cmp` into one ordered sequence.
///
/// On ties the left element comes first, so merging is stable.
pub fn merge_by<L, R, F>(left: L, right: R, cmp: F) -> MergeBy<L, R, F>
where
    L: Sequence,
    R: Sequence<Item = L::Item> + Send + 'static,
    L::Item: Send + 'static,
    F: FnMut(&L::Item, &L::Item) -> Ordering,
{
    MergeBy {
        left,
        right: Some(right),
        cmp,
    }
}

impl<L, R, F> Sequence for MergeBy<L, R, F>
where
    L: Sequence,
    R: Sequence<Item = L::Item> + Send + 'static,
    L::Item: Send + 'static,
    F: FnMut(&L::Item, &L::Item) -> Ordering,
{
    type Item = L::Item;

    fn visit(&mut self, visitor: &mut dyn FnMut(L::Item) -> bool) {
        let Self { left, right, cmp } = self;
        let Some(right) = right.take() else {
            return;
        };
        let mut cursor = Cursor::new(right);
        let mut head = None;
        let mut right_done = false;
        let mut stopped = false;

        left.visit(&mut |l| {
            loop {
                if head.is_none() && !right_done {
                    head = pull_next(&mut cursor, "merge_by");
                    right_done = head.is_none();
                }
                match head.take() {
                    Some(r) if cmp(&r, &l) == Ordering::Less => {
                        if !visitor(r) {
                            stopped = true;
                            return false;
                        }
                    }
                    other => {
                        head = other;
                        break;
                    }
                }
            }
            if !visitor(l) {
                stopped = true;
                return false;
            }
            true
        });

        if !stopped {
            // Left is exhausted: drain the right
            let mut next = head.take();
            if next.is_none() && !right_done {
                next = pull_next(&mut cursor, "merge_by");
            }
            while let Some(r) = next {
                if !visitor(r) {
                    break;
                }
                next = pull_next(&mut cursor, "merge_by");
            }
        }

        cursor.release();
    }
}
