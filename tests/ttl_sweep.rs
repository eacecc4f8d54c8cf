use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chronicle_blobstore::{Clock, Error, Options, Store};
use tempfile::tempdir;

/// A clock the test can advance by hand, so TTL expiry doesn't depend on
/// wall-clock sleeps.
struct ManualClock {
    now_ns: AtomicU64,
}

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            now_ns: AtomicU64::new(0),
        })
    }

    fn advance(&self, delta_ns: u64) {
        self.now_ns.fetch_add(delta_ns, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }
}

struct ManualClockHandle(Arc<ManualClock>);

impl Clock for ManualClockHandle {
    fn now_ns(&self) -> u64 {
        self.0.now_ns()
    }
}

#[test]
fn sweep_expires_segments_older_than_ttl_but_not_the_active_one() {
    let dir = tempdir().expect("tempdir");
    let clock = ManualClock::new();

    let store = Store::open_with_clock(
        Options {
            path: dir.path().to_path_buf(),
            max_buffer_size: 1,
            max_files_count: 8,
            ttl_ns: 100,
        },
        Box::new(ManualClockHandle(Arc::clone(&clock))),
    )
    .expect("open");

    let first = store.put(b"x").expect("put 0 at t=0");
    clock.advance(50);
    store.put(b"y").expect("put 1 at t=50");
    clock.advance(60); // segment 0 is now 110ns old, segment 1 is 60ns old

    let evicted = store.sweep_expired().expect("sweep");
    assert_eq!(evicted, 1);
    assert!(matches!(store.get_many(&[first]), Err(Error::PathNotFound)));
    assert_eq!(store.resident_segment_count(), 1);
}

#[test]
fn sweep_is_a_no_op_when_nothing_has_expired() {
    let dir = tempdir().expect("tempdir");
    let clock = ManualClock::new();

    let store = Store::open_with_clock(
        Options {
            path: dir.path().to_path_buf(),
            max_buffer_size: 1,
            max_files_count: 8,
            ttl_ns: 1_000_000,
        },
        Box::new(ManualClockHandle(Arc::clone(&clock))),
    )
    .expect("open");

    store.put(b"x").expect("put 0");
    store.put(b"y").expect("put 1");
    clock.advance(10);

    let evicted = store.sweep_expired().expect("sweep");
    assert_eq!(evicted, 0);
    assert_eq!(store.resident_segment_count(), 2);
}
