use chronicle_blobstore::{Options, Store};
use tempfile::tempdir;

#[test]
fn rollover_creates_new_segment_file_on_disk() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(Options {
        path: dir.path().to_path_buf(),
        max_buffer_size: 16,
        max_files_count: 4,
        ttl_ns: u64::MAX,
    })
    .expect("open");

    store.put(b"0123456789abcdef").expect("fill segment 1");
    store.put(b"x").expect("roll to segment 2");

    assert!(dir.path().join("1.seq").exists());
    assert!(dir.path().join("2.seq").exists());
}

#[test]
fn payload_exactly_at_capacity_does_not_roll_over() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(Options {
        path: dir.path().to_path_buf(),
        max_buffer_size: 16,
        max_files_count: 4,
        ttl_ns: u64::MAX,
    })
    .expect("open");

    let id = store.put(b"0123456789abcdef").expect("exact fit");
    assert_eq!(id.segment_index, 1);
    assert!(!dir.path().join("2.seq").exists());
}

#[test]
fn oversized_payload_is_rejected_even_after_rollover_would_help() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(Options {
        path: dir.path().to_path_buf(),
        max_buffer_size: 16,
        max_files_count: 4,
        ttl_ns: u64::MAX,
    })
    .expect("open");

    let result = store.put(&vec![0u8; 17]);
    assert!(result.is_err());
    assert!(!dir.path().join("2.seq").exists());
}
