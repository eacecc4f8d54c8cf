use chronicle_blobstore::{Options, Store};
use tempfile::tempdir;

#[test]
fn put_then_get_many_preserves_bytes() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(Options {
        path: dir.path().to_path_buf(),
        max_buffer_size: 1024,
        max_files_count: 4,
        ttl_ns: u64::MAX,
    })
    .expect("open");

    let payloads: Vec<Vec<u8>> = (0..20).map(|i| vec![i as u8; 17]).collect();
    let ids: Vec<_> = payloads.iter().map(|p| store.put(p).expect("put")).collect();

    let values = store.get_many(&ids).expect("get_many");
    assert_eq!(values, payloads);
}

#[test]
fn identifiers_stay_monotone_within_a_segment() {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(Options {
        path: dir.path().to_path_buf(),
        max_buffer_size: 1024,
        max_files_count: 4,
        ttl_ns: u64::MAX,
    })
    .expect("open");

    let first = store.put(b"one").expect("put");
    let second = store.put(b"two").expect("put");
    assert_eq!(first.segment_index, second.segment_index);
    assert!(second.offset > first.offset);
}
