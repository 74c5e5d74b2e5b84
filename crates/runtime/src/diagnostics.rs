//! Runtime diagnostics
//!
//! A SIGQUIT (kill -3) handler dumps producer strand statistics to stderr and
//! the process keeps running. Useful for spotting cursors that were started
//! and never released.
//!
//! ```bash
//! kill -3 <pid>
//! ```
//!
//! The dump does I/O, which is not async-signal-safe, so signals are received
//! on a dedicated thread through signal-hook's iterator API.

use crate::scheduler::{strand_registry, strand_stats};
use std::io::Write;
use std::sync::Once;
use std::sync::atomic::Ordering;

static SIGNAL_HANDLER_INIT: Once = Once::new();

/// Maximum number of individual strands listed in one dump
const STRAND_DISPLAY_LIMIT: usize = 20;

/// Install the SIGQUIT handler. Called by scheduler init; idempotent.
pub fn install_signal_handler() {
    SIGNAL_HANDLER_INIT.call_once(|| {
        #[cfg(unix)]
        {
            use signal_hook::consts::SIGQUIT;
            use signal_hook::iterator::Signals;

            let mut signals = match Signals::new([SIGQUIT]) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "could not register SIGQUIT handler");
                    return;
                }
            };

            let spawned = std::thread::Builder::new()
                .name("lazyseq-diagnostics".to_string())
                .spawn(move || {
                    for sig in signals.forever() {
                        if sig == SIGQUIT {
                            dump_diagnostics();
                        }
                    }
                });
            if let Err(e) = spawned {
                tracing::warn!(error = %e, "could not start diagnostics thread");
            }
        }
    });
}

/// Dump runtime diagnostics to stderr
pub fn dump_diagnostics() {
    let mut out = std::io::stderr().lock();
    let _ = write_diagnostics(&mut out);
}

/// Write the diagnostics report to `out`
pub fn write_diagnostics<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "\n=== lazyseq Runtime Diagnostics ===")?;
    writeln!(out, "Timestamp: {:?}", std::time::SystemTime::now())?;

    let stats = strand_stats();
    writeln!(out, "\n[Producer Strands]")?;
    writeln!(out, "  Active:    {}", stats.active)?;
    writeln!(out, "  Spawned:   {} (total)", stats.spawned)?;
    writeln!(out, "  Completed: {} (total)", stats.completed)?;
    writeln!(out, "  Peak:      {} (high-water mark)", stats.peak)?;

    let expected_completed = stats.spawned.saturating_sub(stats.active as u64);
    if stats.completed < expected_completed {
        writeln!(
            out,
            "  WARNING: {} strands unaccounted for",
            expected_completed - stats.completed
        )?;
    }

    let registry = strand_registry();
    let overflow = registry.overflow_count.load(Ordering::Relaxed);

    writeln!(out, "\n[Open Cursors]")?;
    writeln!(out, "  Registry capacity: {} slots", registry.capacity())?;
    if overflow > 0 {
        writeln!(
            out,
            "  WARNING: {} strands exceeded registry capacity (not tracked)",
            overflow
        )?;
    }

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    // Oldest first: long-lived producers are the likely leaks
    let mut strands: Vec<_> = registry.active_strands().collect();
    strands.sort_by_key(|(_, spawn_time)| *spawn_time);

    if strands.is_empty() {
        writeln!(out, "  (no producer strands running)")?;
    } else {
        writeln!(out, "  {} strand(s) tracked:", strands.len())?;
        for (idx, (strand_id, spawn_time)) in strands.iter().take(STRAND_DISPLAY_LIMIT).enumerate()
        {
            writeln!(
                out,
                "    [{:2}] Strand #{:<8} open for {}s",
                idx + 1,
                strand_id,
                now.saturating_sub(*spawn_time)
            )?;
        }
        if strands.len() > STRAND_DISPLAY_LIMIT {
            writeln!(
                out,
                "    ... and {} more strands",
                strands.len() - STRAND_DISPLAY_LIMIT
            )?;
        }
    }

    writeln!(out, "\n=== End Diagnostics ===\n")
}
