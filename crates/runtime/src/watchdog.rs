//! Watchdog for long-open cursors
//!
//! A cursor's producer strand lives until the cursor is released. A strand
//! that has been open for longer than the threshold usually means a cursor was
//! started and then forgotten. The watchdog scans the strand registry on a
//! dedicated thread and reports the longest-open one.
//!
//! ## Configuration (Environment Variables)
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LAZYSEQ_WATCHDOG_SECS` | `0` (disabled) | Seconds a producer may stay open |
//! | `LAZYSEQ_WATCHDOG_INTERVAL` | `5` | Check frequency in seconds |
//! | `LAZYSEQ_WATCHDOG_ACTION` | `warn` | `warn` (log and dump diagnostics) or `exit` |

use crate::diagnostics::dump_diagnostics;
use crate::scheduler::{StrandRegistry, strand_registry};
use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

static WATCHDOG_INIT: Once = Once::new();
// Strand that last triggered the watchdog (0 = none yet)
static WATCHDOG_TRIGGERED_STRAND: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    pub threshold_secs: u64,
    pub interval_secs: u64,
    pub action: WatchdogAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogAction {
    /// Log a warning and dump diagnostics
    Warn,
    /// Dump diagnostics and exit the process
    Exit,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 0,
            interval_secs: 5,
            action: WatchdogAction::Warn,
        }
    }
}

impl WatchdogConfig {
    pub fn from_env() -> Self {
        let threshold_secs = std::env::var("LAZYSEQ_WATCHDOG_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        let interval_secs = std::env::var("LAZYSEQ_WATCHDOG_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&v| v > 0)
            .unwrap_or(5);

        let action = match std::env::var("LAZYSEQ_WATCHDOG_ACTION") {
            Ok(s) if s.eq_ignore_ascii_case("exit") => WatchdogAction::Exit,
            _ => WatchdogAction::Warn,
        };

        Self {
            threshold_secs,
            interval_secs,
            action,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold_secs > 0
    }
}

/// Start the watchdog thread if `LAZYSEQ_WATCHDOG_SECS` is positive. Idempotent.
pub fn install_watchdog() {
    WATCHDOG_INIT.call_once(|| {
        let config = WatchdogConfig::from_env();
        if !config.is_enabled() {
            return;
        }

        info!(
            threshold_secs = config.threshold_secs,
            interval_secs = config.interval_secs,
            action = ?config.action,
            "watchdog enabled"
        );

        if let Err(e) = std::thread::Builder::new()
            .name("lazyseq-watchdog".to_string())
            .spawn(move || watchdog_loop(config))
        {
            warn!(error = %e, "failed to start watchdog thread");
        }
    });
}

fn watchdog_loop(config: WatchdogConfig) {
    let interval = Duration::from_secs(config.interval_secs);
    loop {
        std::thread::sleep(interval);

        let Some(now) = unix_now() else {
            continue;
        };
        if let Some((strand_id, open_secs)) =
            longest_open_strand(strand_registry(), now, config.threshold_secs)
        {
            handle_long_open_strand(strand_id, open_secs, &config);
        }
    }
}

fn unix_now() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// The strand open the longest beyond `threshold_secs`, as `(id, open_secs)`.
fn longest_open_strand(
    registry: &StrandRegistry,
    now: u64,
    threshold_secs: u64,
) -> Option<(u64, u64)> {
    registry
        .active_strands()
        .filter(|&(_, spawn_time)| spawn_time > 0)
        .map(|(id, spawn_time)| (id, now.saturating_sub(spawn_time)))
        .filter(|&(_, open_secs)| open_secs > threshold_secs)
        .max_by_key(|&(_, open_secs)| open_secs)
}

fn handle_long_open_strand(strand_id: u64, open_secs: u64, config: &WatchdogConfig) {
    let prev_strand = WATCHDOG_TRIGGERED_STRAND.swap(strand_id, Ordering::Relaxed);
    let is_new_strand = prev_strand != strand_id;

    warn!(
        strand_id,
        open_secs,
        threshold_secs = config.threshold_secs,
        "cursor producer open past watchdog threshold; was the cursor released?"
    );

    // Only dump once per offending strand
    if is_new_strand {
        dump_diagnostics();
    }

    if config.action == WatchdogAction::Exit {
        error!("exiting due to LAZYSEQ_WATCHDOG_ACTION=exit");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env var tests
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    unsafe fn set_env(key: &str, value: &str) {
        // SAFETY: caller holds ENV_TEST_MUTEX
        unsafe { std::env::set_var(key, value) };
    }

    unsafe fn restore_env(key: &str, orig: Option<String>) {
        // SAFETY: caller holds ENV_TEST_MUTEX
        unsafe {
            match orig {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = WatchdogConfig::default();
        assert_eq!(config.threshold_secs, 0);
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.action, WatchdogAction::Warn);
        assert!(!config.is_enabled());
    }

    #[test]
    fn test_longest_open_strand_picks_oldest_past_threshold() {
        let registry = StrandRegistry::new(8);
        registry.register(1);
        registry.register(2);
        registry.register(3);
        let now = unix_now().unwrap();

        // All were registered just now
        assert_eq!(longest_open_strand(&registry, now, 30), None);

        let later = now + 100;
        let (_, open_secs) = longest_open_strand(&registry, later, 30).unwrap();
        assert!(open_secs >= 100);

        registry.unregister(1);
        registry.unregister(2);
        registry.unregister(3);
        assert_eq!(longest_open_strand(&registry, later, 30), None);
    }

    #[test]
    fn test_from_env_all_values() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let orig_secs = std::env::var("LAZYSEQ_WATCHDOG_SECS").ok();
        let orig_interval = std::env::var("LAZYSEQ_WATCHDOG_INTERVAL").ok();
        let orig_action = std::env::var("LAZYSEQ_WATCHDOG_ACTION").ok();

        unsafe {
            set_env("LAZYSEQ_WATCHDOG_SECS", "30");
            set_env("LAZYSEQ_WATCHDOG_INTERVAL", "10");
            set_env("LAZYSEQ_WATCHDOG_ACTION", "EXIT");
        }

        let config = WatchdogConfig::from_env();
        assert_eq!(config.threshold_secs, 30);
        assert_eq!(config.interval_secs, 10);
        assert_eq!(config.action, WatchdogAction::Exit);
        assert!(config.is_enabled());

        unsafe {
            restore_env("LAZYSEQ_WATCHDOG_SECS", orig_secs);
            restore_env("LAZYSEQ_WATCHDOG_INTERVAL", orig_interval);
            restore_env("LAZYSEQ_WATCHDOG_ACTION", orig_action);
        }
    }

    #[test]
    fn test_from_env_invalid_values() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        let orig_secs = std::env::var("LAZYSEQ_WATCHDOG_SECS").ok();
        let orig_interval = std::env::var("LAZYSEQ_WATCHDOG_INTERVAL").ok();
        let orig_action = std::env::var("LAZYSEQ_WATCHDOG_ACTION").ok();

        unsafe {
            set_env("LAZYSEQ_WATCHDOG_SECS", "soon");
            set_env("LAZYSEQ_WATCHDOG_INTERVAL", "0");
            set_env("LAZYSEQ_WATCHDOG_ACTION", "shrug");
        }

        let config = WatchdogConfig::from_env();
        assert_eq!(config.threshold_secs, 0);
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.action, WatchdogAction::Warn);

        unsafe {
            restore_env("LAZYSEQ_WATCHDOG_SECS", orig_secs);
            restore_env("LAZYSEQ_WATCHDOG_INTERVAL", orig_interval);
            restore_env("LAZYSEQ_WATCHDOG_ACTION", orig_action);
        }
    }
}
