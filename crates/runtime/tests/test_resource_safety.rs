//! Producer strands never outlive their cursors
//!
//! Every test here ends by waiting for the scheduler to go idle, so they all
//! run serially: a strand left over from one test would fail the next.

use lazyseq_core::{Chain, Sequence, collect, filter, from_fn, from_vec, map, take};
use lazyseq_runtime::{Cursor, active_strands, merge_by, strand_stats, wait_for_idle, zip};
use serial_test::serial;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const IDLE_TIMEOUT: Duration = Duration::from_secs(10);

fn naturals() -> impl Sequence<Item = u64> + Send + 'static {
    let mut n = 0;
    from_fn(move || {
        n += 1;
        Some(n)
    })
}

#[test]
#[serial]
fn test_many_cursors_one_element_each() {
    let before = strand_stats();
    let mut cursors: Vec<Cursor<&str>> = (0..1000)
        .map(|_| Cursor::new(from_vec(vec!["aa", "aaa", "aaaaaaa", "a"])))
        .collect();

    for cursor in &mut cursors {
        assert_eq!(cursor.advance().unwrap(), Some("aa"));
    }
    assert!(active_strands() >= 1000);

    for cursor in &mut cursors {
        cursor.release();
    }

    assert!(wait_for_idle(IDLE_TIMEOUT));
    assert_eq!(active_strands(), 0);
    let after = strand_stats();
    assert_eq!(after.spawned - before.spawned, 1000);
    assert_eq!(after.completed - before.completed, 1000);
    assert!(after.peak >= 1000);
}

#[test]
#[serial]
fn test_many_cursors_over_infinite_producers() {
    let mut cursors: Vec<_> = (0..200)
        .map(|_| Cursor::new(filter(naturals(), |n| n % 7 == 0)))
        .collect();
    for cursor in &mut cursors {
        assert_eq!(cursor.advance().unwrap(), Some(7));
    }
    drop(cursors);

    assert!(wait_for_idle(IDLE_TIMEOUT));
    assert_eq!(active_strands(), 0);
}

#[test]
#[serial]
fn test_abandoned_during_unwind() {
    let result = catch_unwind(|| {
        let mut cursor = Cursor::new(naturals());
        cursor.advance().unwrap();
        panic!("consumer gave up");
    });
    assert!(result.is_err());
    assert!(wait_for_idle(IDLE_TIMEOUT));
}

#[test]
#[serial]
fn test_pull_combinators_release_during_unwind() {
    let mut seen = 0;
    let result = catch_unwind(AssertUnwindSafe(|| {
        zip(naturals(), naturals()).visit(&mut |(l, r)| {
            assert_eq!(l, r);
            seen += 1;
            if seen == 10 {
                panic!("visitor gave up inside zip");
            }
            true
        });
    }));
    assert!(result.is_err());
    assert_eq!(seen, 10);
    assert!(wait_for_idle(IDLE_TIMEOUT));
    assert_eq!(active_strands(), 0);

    let mut merged = Vec::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        merge_by(map(naturals(), |n| n * 2), naturals(), u64::cmp).visit(&mut |n| {
            merged.push(n);
            if merged.len() == 6 {
                panic!("visitor gave up inside merge_by");
            }
            true
        });
    }));
    assert!(result.is_err());
    assert_eq!(merged, vec![1, 2, 2, 3, 4, 4]);
    assert!(wait_for_idle(IDLE_TIMEOUT));
    assert_eq!(active_strands(), 0);
}

#[test]
#[serial]
fn test_exhausted_cursor_frees_strand_without_release() {
    let mut cursor = Cursor::new(from_vec(vec![1, 2]));
    while cursor.advance().unwrap().is_some() {}
    assert!(cursor.is_finished());

    // Exhaustion joins the producer; the cursor itself is still alive
    assert!(wait_for_idle(IDLE_TIMEOUT));
    cursor.release();
}

#[test]
#[serial]
fn test_pull_combinators_release_on_early_stop() {
    let zipped = collect(take(zip(naturals(), naturals()), 3));
    assert_eq!(zipped, vec![(1, 1), (2, 2), (3, 3)]);

    let merged = Chain::new(merge_by(
        map(naturals(), |n| n * 2),
        map(naturals(), |n| n * 3),
        u64::cmp,
    ))
    .take(5)
    .collect();
    assert_eq!(merged, vec![2, 3, 4, 6, 6]);

    assert!(wait_for_idle(IDLE_TIMEOUT));
    assert_eq!(active_strands(), 0);
}

#[test]
#[serial]
fn test_nested_cursors() {
    // A cursor whose sequence pulls through another cursor
    let inner = zip(from_vec(vec!['a', 'b', 'c']), naturals());
    let mut outer = Cursor::new(inner);
    assert_eq!(outer.advance().unwrap(), Some(('a', 1)));
    assert_eq!(outer.advance().unwrap(), Some(('b', 2)));
    outer.release();

    assert!(wait_for_idle(IDLE_TIMEOUT));
    assert_eq!(active_strands(), 0);
}

#[test]
#[serial]
fn test_no_callbacks_after_release() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut cursor = Cursor::new(map(naturals(), move |n| {
        counter.fetch_add(1, Ordering::SeqCst);
        n
    }));

    for expected in 1..=5 {
        assert_eq!(cursor.advance().unwrap(), Some(expected));
    }
    cursor.release();
    assert!(wait_for_idle(IDLE_TIMEOUT));

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}
