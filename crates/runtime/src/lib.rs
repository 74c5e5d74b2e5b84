//! lazyseq runtime: pull cursors over push sequences
//!
//! `lazyseq-core` sequences push their elements into a callback on the
//! caller's thread. This crate adds the one place where that is not enough:
//! a [`Cursor`] runs a sequence on its own may coroutine (a "strand") and
//! hands elements over one at a time, on demand.
//!
//! - [`cursor`]: the pull adapter, and `PullExt::pull`
//! - [`pull`]: `zip` and `merge_by`, built on a cursor
//! - [`source`]: sequences over may channels
//! - [`scheduler`]: strand spawning, lifecycle counters, `wait_for_idle`
//! - [`config`]: coroutine settings from the environment
//! - [`diagnostics`] / [`watchdog`]: SIGQUIT dumps and long-open cursor
//!   reports (feature `diagnostics`)

pub mod config;
pub mod cursor;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod error;
pub mod pull;
pub mod scheduler;
pub mod source;
#[cfg(feature = "diagnostics")]
pub mod watchdog;

pub use config::RuntimeConfig;
pub use cursor::{Cursor, PullExt};
pub use error::CursorError;
pub use pull::{MergeBy, Zip, merge_by, zip};
pub use scheduler::{
    StrandStats, active_strands, scheduler_init, scheduler_init_with, strand_stats, wait_for_idle,
};
pub use source::{FromReceiver, from_receiver};

#[cfg(feature = "diagnostics")]
pub use diagnostics::dump_diagnostics;
