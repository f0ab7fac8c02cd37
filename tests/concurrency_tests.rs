//! Concurrent requests must not observe each other's workspaces.

mod common;

use std::sync::Arc;
use std::thread;

use common::{build_zip, config_under, leftover_entries};
use locstat::{count_archive_with_config, scan_archive_with_config};

#[test]
fn concurrent_counts_are_isolated() {
    let parent = tempfile::tempdir().unwrap();
    let cfg = Arc::new(config_under(parent.path()));

    let handles: Vec<_> = (0..12u64)
        .map(|i| {
            let cfg = Arc::clone(&cfg);
            thread::spawn(move || {
                // Same file names in every archive, different contents.
                let body = "line\n".repeat(i as usize);
                let bytes = build_zip(&[("shared/name.rs", body.as_bytes())]);
                let result = count_archive_with_config(&bytes, [".rs"], &cfg)
                    .expect("count should succeed");
                (i, result)
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.join().expect("worker panicked");
        let expected = if i == 0 { 0 } else { i + 1 };
        assert_eq!(result.total_files, 1);
        assert_eq!(result.total_lines, expected, "worker {i}");
    }
    assert_eq!(leftover_entries(parent.path()), 0);
}

#[test]
fn concurrent_scans_and_failures_clean_up() {
    let parent = tempfile::tempdir().unwrap();
    let cfg = Arc::new(config_under(parent.path()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cfg = Arc::clone(&cfg);
            thread::spawn(move || {
                let bytes = if i % 2 == 0 {
                    build_zip(&[("ok.md", b"# ok")])
                } else {
                    build_zip(&[("ok.md", b"# ok"), ("../../bad.md", b"x")])
                };
                scan_archive_with_config(&bytes, &cfg).is_ok()
            })
        })
        .collect();

    let outcomes: Vec<bool> = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .collect();
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 4);
    assert_eq!(leftover_entries(parent.path()), 0);
}
