//! Scheduler - strand management with May
//!
//! Every started cursor runs its producer on one strand: a may coroutine that
//! lives from the first `advance` until the cursor is released. The scheduler
//! owns coroutine configuration and the strand lifecycle counters.
//!
//! ## Accounting
//!
//! `ACTIVE_STRANDS` is the number of producer strands that have not yet
//! exited. It only goes up in [`spawn_strand`] and only goes down when the
//! strand body returns or unwinds, so a count that settles at zero after every
//! cursor is released means no producer was leaked.
//!
//! [`wait_for_idle`] blocks on a condvar that the last exiting strand signals.

use crate::config::RuntimeConfig;
use may::coroutine::{self, JoinHandle};
use serde::Serialize;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, Once, OnceLock};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

static SCHEDULER_INIT: Once = Once::new();
static SCHEDULER_START_TIME: OnceLock<Instant> = OnceLock::new();

pub static ACTIVE_STRANDS: AtomicUsize = AtomicUsize::new(0);
static IDLE_CONDVAR: Condvar = Condvar::new();
static IDLE_MUTEX: Mutex<()> = Mutex::new(());

// Lifecycle statistics. SPAWNED == COMPLETED + ACTIVE whenever no strand is
// between the two updates in StrandGuard::drop.
pub static TOTAL_SPAWNED: AtomicU64 = AtomicU64::new(0);
pub static TOTAL_COMPLETED: AtomicU64 = AtomicU64::new(0);
pub static PEAK_STRANDS: AtomicUsize = AtomicUsize::new(0);

static NEXT_STRAND_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Lock-Free Strand Registry (diagnostics feature only)
// =============================================================================
//
// Fixed-size slots of (strand id, spawn time). A slot is free when its id is
// zero. Registration claims a slot with CAS; a full registry only bumps the
// overflow counter and the strand runs untracked.

#[cfg(feature = "diagnostics")]
pub struct StrandSlot {
    pub strand_id: AtomicU64,
    /// Seconds since UNIX epoch
    pub spawn_time: AtomicU64,
}

#[cfg(feature = "diagnostics")]
impl StrandSlot {
    const fn new() -> Self {
        Self {
            strand_id: AtomicU64::new(0),
            spawn_time: AtomicU64::new(0),
        }
    }
}

#[cfg(feature = "diagnostics")]
pub struct StrandRegistry {
    slots: Box<[StrandSlot]>,
    /// Strands that found no free slot
    pub overflow_count: AtomicU64,
}

#[cfg(feature = "diagnostics")]
impl StrandRegistry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| StrandSlot::new()).collect(),
            overflow_count: AtomicU64::new(0),
        }
    }

    /// Register a strand, returning the slot index if one was free
    pub fn register(&self, strand_id: u64) -> Option<usize> {
        let spawn_time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        for (idx, slot) in self.slots.iter().enumerate() {
            if slot.strand_id.load(Ordering::Relaxed) != 0 {
                continue;
            }
            // Claim first: an occupied slot's time belongs to its owner.
            // Readers skip a claimed slot until its time is nonzero.
            if slot
                .strand_id
                .compare_exchange(0, strand_id, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                slot.spawn_time.store(spawn_time, Ordering::Release);
                return Some(idx);
            }
        }

        self.overflow_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Clear the slot holding `strand_id`. Ids are never reused.
    pub fn unregister(&self, strand_id: u64) -> bool {
        if strand_id == 0 {
            return false;
        }
        for slot in self.slots.iter() {
            if slot.strand_id.load(Ordering::Acquire) != strand_id {
                continue;
            }
            // Time cleared before the slot is freed, so it never lands on
            // the next owner's entry
            slot.spawn_time.store(0, Ordering::Release);
            return slot
                .strand_id
                .compare_exchange(strand_id, 0, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok();
        }
        false
    }

    /// Snapshot of `(strand_id, spawn_time)` for occupied slots
    pub fn active_strands(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.slots.iter().filter_map(|slot| {
            let id = slot.strand_id.load(Ordering::Acquire);
            let spawn_time = slot.spawn_time.load(Ordering::Acquire);
            if id > 0 && spawn_time > 0 {
                Some((id, spawn_time))
            } else {
                None
            }
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(feature = "diagnostics")]
static STRAND_REGISTRY: OnceLock<StrandRegistry> = OnceLock::new();

/// Get or initialize the global strand registry
#[cfg(feature = "diagnostics")]
pub fn strand_registry() -> &'static StrandRegistry {
    STRAND_REGISTRY.get_or_init(|| StrandRegistry::new(crate::config::registry_size_from_env()))
}

/// Time since the scheduler was initialized
pub fn scheduler_elapsed() -> Option<Duration> {
    SCHEDULER_START_TIME.get().map(|start| start.elapsed())
}

/// Initialize the scheduler from the environment. Idempotent.
pub fn scheduler_init() {
    if !SCHEDULER_INIT.is_completed() {
        scheduler_init_with(RuntimeConfig::from_env());
    }
}

/// Initialize the scheduler with an explicit configuration.
///
/// Only the first initialization takes effect; returns `false` when the
/// scheduler was already configured. Called implicitly by the first cursor
/// that starts, so explicit configuration must happen before that.
pub fn scheduler_init_with(config: RuntimeConfig) -> bool {
    let mut applied = false;
    SCHEDULER_INIT.call_once(|| {
        let may_config = may::config();
        may_config
            .set_stack_size(config.stack_size)
            .set_pool_capacity(config.pool_capacity);
        if let Some(workers) = config.workers {
            may_config.set_workers(workers);
        }

        SCHEDULER_START_TIME.get_or_init(Instant::now);
        debug!(
            stack_size = config.stack_size,
            pool_capacity = config.pool_capacity,
            workers = ?config.workers,
            "scheduler initialized"
        );

        // SIGQUIT dumps diagnostics (kill -3)
        #[cfg(feature = "diagnostics")]
        crate::diagnostics::install_signal_handler();

        // No-op unless LAZYSEQ_WATCHDOG_SECS is set
        #[cfg(feature = "diagnostics")]
        crate::watchdog::install_watchdog();

        applied = true;
    });
    applied
}

/// Decrements the lifecycle counters when a strand body exits, including by
/// unwinding.
struct StrandGuard {
    strand_id: u64,
}

impl Drop for StrandGuard {
    fn drop(&mut self) {
        #[cfg(feature = "diagnostics")]
        strand_registry().unregister(self.strand_id);

        let prev_count = ACTIVE_STRANDS.fetch_sub(1, Ordering::AcqRel);
        TOTAL_COMPLETED.fetch_add(1, Ordering::Release);
        trace!(strand_id = self.strand_id, "strand exited");

        if prev_count == 1 {
            // Held while notifying so a waiter cannot miss the wakeup
            let _guard = IDLE_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            IDLE_CONDVAR.notify_all();
        }
    }
}

/// Spawn `body` on a new strand.
///
/// Returns the strand id and the coroutine's join handle. The strand is
/// counted as active until `body` returns or panics.
pub(crate) fn spawn_strand<F>(body: F) -> io::Result<(u64, JoinHandle<()>)>
where
    F: FnOnce() + Send + 'static,
{
    scheduler_init();

    let strand_id = NEXT_STRAND_ID.fetch_add(1, Ordering::Relaxed);
    let new_count = ACTIVE_STRANDS.fetch_add(1, Ordering::Release) + 1;
    TOTAL_SPAWNED.fetch_add(1, Ordering::Relaxed);

    let mut peak = PEAK_STRANDS.load(Ordering::Acquire);
    while new_count > peak {
        match PEAK_STRANDS.compare_exchange_weak(
            peak,
            new_count,
            Ordering::Release,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(current) => peak = current,
        }
    }

    #[cfg(feature = "diagnostics")]
    let _ = strand_registry().register(strand_id);

    // Moved into the strand; if the spawn fails the closure is dropped and the
    // guard undoes the accounting above
    let guard = StrandGuard { strand_id };

    // Safety: producers never touch thread-local state the coroutine could
    // observe across a context switch; they only run the sequence's visit.
    let handle = unsafe {
        coroutine::Builder::new()
            .name(format!("lazyseq-producer-{}", strand_id))
            .spawn(move || {
                let _guard = guard;
                body();
            })?
    };

    trace!(strand_id, active = new_count, "strand spawned");
    Ok((strand_id, handle))
}

/// Number of producer strands that have not exited.
pub fn active_strands() -> usize {
    ACTIVE_STRANDS.load(Ordering::Acquire)
}

/// Block until no producer strand is running, or `timeout` elapses.
///
/// Returns `true` if the scheduler is idle.
pub fn wait_for_idle(timeout: Duration) -> bool {
    let guard = IDLE_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let (_guard, _) = IDLE_CONDVAR
        .wait_timeout_while(guard, timeout, |_| {
            ACTIVE_STRANDS.load(Ordering::Acquire) > 0
        })
        .unwrap_or_else(|e| e.into_inner());
    ACTIVE_STRANDS.load(Ordering::Acquire) == 0
}

/// Point-in-time snapshot of the lifecycle counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StrandStats {
    pub active: usize,
    pub spawned: u64,
    pub completed: u64,
    pub peak: usize,
}

pub fn strand_stats() -> StrandStats {
    StrandStats {
        active: ACTIVE_STRANDS.load(Ordering::Relaxed),
        spawned: TOTAL_SPAWNED.load(Ordering::Relaxed),
        completed: TOTAL_COMPLETED.load(Ordering::Relaxed),
        peak: PEAK_STRANDS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_scheduler_init_idempotent() {
        scheduler_init();
        scheduler_init();
        assert!(!scheduler_init_with(RuntimeConfig::default()));
        assert!(scheduler_elapsed().is_some());
    }

    #[test]
    #[serial]
    fn test_spawn_strand_runs_and_settles() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let before = strand_stats();

        let (id, handle) = spawn_strand(move || flag.store(true, Ordering::SeqCst)).unwrap();
        assert!(id > 0);
        handle.join().unwrap();

        assert!(ran.load(Ordering::SeqCst));
        assert!(wait_for_idle(Duration::from_secs(5)));
        let after = strand_stats();
        assert_eq!(after.spawned - before.spawned, 1);
        assert_eq!(after.completed - before.completed, 1);
        assert!(after.peak >= 1);
    }

    #[test]
    #[serial]
    fn test_panicking_strand_is_still_counted_complete() {
        let (_, handle) = spawn_strand(|| panic!("producer blew up")).unwrap();
        assert!(handle.join().is_err());
        assert!(wait_for_idle(Duration::from_secs(5)));
        assert_eq!(active_strands(), 0);
    }

    #[test]
    #[serial]
    fn test_strand_ids_are_unique() {
        let mut ids = Vec::new();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let (id, handle) = spawn_strand(|| {}).unwrap();
            ids.push(id);
            handles.push(handle);
        }
        for handle in handles {
            handle.join().unwrap();
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert!(wait_for_idle(Duration::from_secs(5)));
    }

    #[test]
    #[serial]
    fn test_wait_for_idle_times_out_while_busy() {
        let (tx, rx) = may::sync::mpsc::channel::<()>();
        let (_, handle) = spawn_strand(move || {
            let _ = rx.recv();
        })
        .unwrap();

        assert!(!wait_for_idle(Duration::from_millis(50)));
        tx.send(()).unwrap();
        handle.join().unwrap();
        assert!(wait_for_idle(Duration::from_secs(5)));
    }

    #[test]
    fn test_strand_stats_serializes() {
        let json = serde_json::to_value(strand_stats()).unwrap();
        assert!(json.get("active").is_some());
        assert!(json.get("peak").is_some());
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn test_strand_registry_basic() {
        let registry = StrandRegistry::new(4);
        assert_eq!(registry.register(10), Some(0));
        assert_eq!(registry.register(11), Some(1));
        assert_eq!(registry.active_strands().count(), 2);

        assert!(registry.unregister(10));
        assert!(!registry.unregister(10));
        let ids: Vec<u64> = registry.active_strands().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![11]);
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn test_strand_registry_overflow() {
        let registry = StrandRegistry::new(2);
        assert!(registry.register(1).is_some());
        assert!(registry.register(2).is_some());
        assert!(registry.register(3).is_none());
        assert_eq!(registry.overflow_count.load(Ordering::Relaxed), 1);
        assert_eq!(registry.capacity(), 2);
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn test_strand_registry_slot_reuse() {
        let registry = StrandRegistry::new(1);
        assert_eq!(registry.register(1), Some(0));
        registry.unregister(1);
        assert_eq!(registry.register(2), Some(0));
        assert!(registry.active_strands().all(|(_, time)| time > 0));
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn test_strand_registry_keeps_spawn_time_of_live_strands() {
        let registry = StrandRegistry::new(4);
        assert_eq!(registry.register(1), Some(0));
        registry.slots[0].spawn_time.store(1000, Ordering::Release);

        assert_eq!(registry.register(2), Some(1));
        assert_eq!(registry.register(3), Some(2));

        let times: Vec<(u64, u64)> = registry.active_strands().collect();
        assert_eq!(times.len(), 3);
        assert_eq!(times[0], (1, 1000));
        assert!(times[1..].iter().all(|(_, time)| *time > 1000));
    }
}
