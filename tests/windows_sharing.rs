#![cfg(all(windows, not(feature = "buffered")))]
//! Windows sharing semantics surface as plain I/O errors.

use mmap_file::{MmapFile, MmapFileError};
use std::fs::{self, OpenOptions};
use std::os::windows::fs::OpenOptionsExt;
use tempfile::tempdir;

#[test]
fn exclusive_holder_blocks_open() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("locked.bin");
    fs::write(&path, b"locked").expect("seed");

    // share_mode(0) denies every other open while held
    let _holder = OpenOptions::new()
        .read(true)
        .share_mode(0)
        .open(&path)
        .expect("exclusive open");

    match MmapFile::open(&path) {
        Err(MmapFileError::Io(_)) => {}
        other => panic!("expected sharing violation, got {other:?}"),
    }
}

#[test]
fn retained_handle_backs_stat() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("stat.bin");
    fs::write(&path, b"windows").expect("seed");

    let f = MmapFile::open(&path).expect("open");
    assert_eq!(f.stat().expect("stat").len(), 7);
    f.close().expect("close");
}
