//! lazyseq core: lazy push-style sequences and their combinators
//!
//! A [`Sequence`] produces values by calling a visitor, one value at a time,
//! until the visitor asks it to stop. Combinators wrap sequences without
//! evaluating them; only materializers and the terminal calls of the chain
//! builders force evaluation.
//!
//! Everything in this crate runs on the caller's thread. Demand-driven
//! (pull) access lives in `lazyseq-runtime`, which adds a coroutine-backed
//! cursor on top of these types.
//!
//! # Modules
//!
//! - `sequence`: the `Sequence` trait and source constructors
//! - `combinators`: filter, map, index, take, sort, reverse, reduce
//! - `pairs`: combinators over `(K, V)` sequences
//! - `collect`: materializers into `Vec` and `HashMap`
//! - `chain`, `chain2`: fluent builders
//! - `slices`, `maps`: one-call helpers for concrete containers

pub mod chain;
pub mod chain2;
pub mod collect;
pub mod combinators;
pub mod maps;
pub mod pairs;
pub mod sequence;
pub mod slices;

pub use sequence::{
    BoxedSequence, Empty, FromFn, FromIter, FromMap, FromSlice, FromVec, FromVisit, Sequence,
    empty, from_fn, from_iter, from_map, from_slice, from_vec, from_visit,
};

pub use combinators::{
    Filter, Index, Map, Reverse, Sort, Take, TakeWhile, filter, fold, index, index_from, map,
    map_result, map_to_pair, reduce, reverse, sort, take, take_while,
};

pub use pairs::{
    Filter2, Keys, Map2, Sort2, Values, filter2, keys, last_wins, map2, sort2, sort2_with, values,
};

pub use collect::{collect, to_map, to_map_with};

pub use chain::{Chain, DualChain};
pub use chain2::Chain2;
