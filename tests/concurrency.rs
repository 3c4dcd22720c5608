//! Sharing one handle between threads.

use mmap_file::{MmapFile, MmapFileError, OpenFlags};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

#[test]
fn disjoint_concurrent_writes_land_intact() {
    let dir = tempdir().expect("tempdir");
    let f = MmapFile::open_file(
        dir.path().join("concurrent.bin"),
        OpenFlags::READ_WRITE | OpenFlags::CREATE,
        0o644,
        100,
    )
    .expect("create");

    thread::scope(|s| {
        for i in 0..10 {
            let f = &f;
            s.spawn(move || {
                let payload = format!("data{i}");
                let n = f.write_at(payload.as_bytes(), (i * 5) as i64).expect("write_at");
                assert_eq!(n, 5);
            });
        }
    });

    for i in 0..10 {
        let mut buf = [0u8; 5];
        f.read_at(&mut buf, (i * 5) as i64).expect("read_at");
        assert_eq!(buf, *format!("data{i}").as_bytes());
    }
    f.close().expect("close");
}

#[test]
fn concurrent_positional_reads() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("readers.bin");
    let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    std::fs::write(&path, &content).expect("seed");

    let f = Arc::new(MmapFile::open(&path).expect("open"));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let f = Arc::clone(&f);
            let content = content.clone();
            thread::spawn(move || {
                for round in 0..64 {
                    let off = (t * 97 + round * 61) % 4000;
                    let mut buf = [0u8; 64];
                    f.read_at(&mut buf, off as i64).expect("read_at");
                    assert_eq!(&buf[..], &content[off..off + 64]);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("reader thread");
    }
    f.close().expect("close");
}

#[test]
fn concurrent_cursor_reads_partition_the_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cursor_readers.bin");
    std::fs::write(&path, vec![b'z'; 1000]).expect("seed");

    let f = MmapFile::open(&path).expect("open");
    let total = AtomicU64::new(0);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let mut buf = [0u8; 7];
                loop {
                    match f.read(&mut buf) {
                        Ok(n) => {
                            total.fetch_add(n as u64, Ordering::Relaxed);
                        }
                        Err(MmapFileError::Eof { read }) => {
                            total.fetch_add(read as u64, Ordering::Relaxed);
                            break;
                        }
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            });
        }
    });

    // Each byte is delivered to exactly one reader
    assert_eq!(total.load(Ordering::Relaxed), f.len());
    f.close().expect("close");
}

#[test]
fn close_racing_with_readers_is_clean() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("close_race.bin");
    std::fs::write(&path, vec![1u8; 8192]).expect("seed");

    let f = MmapFile::open(&path).expect("open");

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let mut buf = [0u8; 128];
                loop {
                    match f.read_at(&mut buf, 512) {
                        Ok(_) => assert!(buf.iter().all(|&b| b == 1)),
                        Err(MmapFileError::Closed) => break,
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
            });
        }
        s.spawn(|| {
            thread::sleep(std::time::Duration::from_millis(20));
            f.close().expect("close");
        });
    });

    assert!(f.is_closed());
}
