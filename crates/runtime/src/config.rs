//! Runtime configuration
//!
//! Coroutine settings are applied once, by [`crate::scheduler::scheduler_init`],
//! before the first cursor spawns its strand.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LAZYSEQ_STACK_SIZE` | `0x20000` | Coroutine stack size handed to may |
//! | `LAZYSEQ_POOL_CAPACITY` | `10000` | Completed coroutine stacks kept for reuse |
//! | `LAZYSEQ_WORKERS` | may's default | Number of may worker threads |
//! | `LAZYSEQ_STRAND_REGISTRY_SIZE` | `1024` | Diagnostics registry slots |
//!
//! Zero, negative or non-numeric values are reported with `tracing::warn!`
//! and replaced by the default.

use tracing::warn;

/// Default coroutine stack size (0x20000).
///
/// Producers run arbitrary user callbacks, so this stays well above may's
/// own default.
pub const DEFAULT_STACK_SIZE: usize = 0x20000;

/// Default coroutine pool capacity (10x may's default of 1000).
pub const DEFAULT_POOL_CAPACITY: usize = 10000;

/// Default number of trackable concurrent strands in the diagnostics registry.
pub const DEFAULT_REGISTRY_SIZE: usize = 1024;

/// Coroutine scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub stack_size: usize,
    pub pool_capacity: usize,
    /// `None` keeps may's default worker count.
    pub workers: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            workers: None,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            stack_size: parse_positive(
                "LAZYSEQ_STACK_SIZE",
                std::env::var("LAZYSEQ_STACK_SIZE").ok(),
                DEFAULT_STACK_SIZE,
            ),
            pool_capacity: parse_positive(
                "LAZYSEQ_POOL_CAPACITY",
                std::env::var("LAZYSEQ_POOL_CAPACITY").ok(),
                DEFAULT_POOL_CAPACITY,
            ),
            workers: std::env::var("LAZYSEQ_WORKERS")
                .ok()
                .map(|v| parse_positive("LAZYSEQ_WORKERS", Some(v), 0))
                .filter(|&n| n > 0),
        }
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn with_pool_capacity(mut self, pool_capacity: usize) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
}

/// Registry size for the diagnostics strand registry.
pub fn registry_size_from_env() -> usize {
    parse_positive(
        "LAZYSEQ_STRAND_REGISTRY_SIZE",
        std::env::var("LAZYSEQ_STRAND_REGISTRY_SIZE").ok(),
        DEFAULT_REGISTRY_SIZE,
    )
}

/// Parse a positive integer setting.
///
/// Returns `default` if the value is missing, zero, or invalid, warning
/// about the latter two.
pub(crate) fn parse_positive(name: &str, value: Option<String>, default: usize) -> usize {
    match value {
        Some(val) => match val.trim().parse::<usize>() {
            Ok(0) => {
                warn!(setting = name, default, "zero is not a valid value, using default");
                default
            }
            Ok(n) => n,
            Err(_) => {
                warn!(
                    setting = name,
                    value = %val,
                    default,
                    "not a valid number, using default"
                );
                default
            }
        },
        None => default,
    }
}
