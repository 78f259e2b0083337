//! Resilience tests - simulate tampering, damage and crashes on the medium.

use proptest::prelude::*;
use sealed_vfs::config::{KdfParams, StoreConfig, BLOCKS_DIRNAME, HEADER_FILENAME, HEADER_TMP_FILENAME};
use sealed_vfs::vfs::Store;
use sealed_vfs::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PASSWORD: &str = "resilience_test";

fn test_config() -> StoreConfig {
    StoreConfig::new(1024, KdfParams::new(64, 1, 1))
}

/// A committed store holding one small file and one three-block file.
///
/// Content blocks are sealed before the index, so the block with the
/// highest id is the (single) index chunk.
fn setup_store() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let location = temp_dir.path().join("vault");

    let mut store = Store::create(&location, PASSWORD, test_config()).expect("Failed to create");
    store.mkdir("/docs").unwrap();
    store
        .write_file("/docs/small.txt", 0, b"This is important data")
        .unwrap();
    let big: Vec<u8> = (0..3000u32).map(|i| (i % 256) as u8).collect();
    store.write_file("/docs/big.bin", 0, &big).unwrap();
    store.close().expect("Failed to close");

    (temp_dir, location)
}

/// Block files on disk, in id order.
fn block_files(location: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(location.join(BLOCKS_DIRNAME))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

fn index_block(location: &Path) -> PathBuf {
    block_files(location).pop().expect("no blocks")
}

fn content_blocks(location: &Path) -> Vec<PathBuf> {
    let mut files = block_files(location);
    files.pop();
    files
}

fn block_id(path: &Path) -> u64 {
    let name = path.file_name().unwrap().to_str().unwrap();
    u64::from_str_radix(name, 16).expect("block file name")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

fn flip_bit(path: &Path, byte: usize, bit: u8) {
    let mut data = fs::read(path).expect("Failed to read");
    data[byte] ^= 1 << bit;
    fs::write(path, data).expect("Failed to write corruption");
}

#[test]
fn test_header_bit_flips_fail_closed() {
    let (_temp_dir, location) = setup_store();
    let header_path = location.join(HEADER_FILENAME);
    let original = fs::read(&header_path).unwrap();

    // Bytes 40..52 hold the KDF costs; flipping those can request
    // gigabytes of memory, and range checks are covered by unit tests.
    for byte in (0..original.len()).filter(|b| !(40..52).contains(b)) {
        flip_bit(&header_path, byte, (byte % 8) as u8);
        let result = Store::open(&location, PASSWORD);
        assert!(
            matches!(
                result,
                Err(Error::WrongPassphraseOrCorrupt)
                    | Err(Error::CorruptStore(_))
                    | Err(Error::UnsupportedFormatVersion { .. })
            ),
            "flip at byte {} was not detected",
            byte
        );
        drop(result);
        fs::write(&header_path, &original).unwrap();
    }

    let store = Store::open(&location, PASSWORD).expect("Pristine header must open");
    assert_eq!(
        store.read_all("/docs/small.txt").unwrap(),
        b"This is important data"
    );
}

#[test]
fn test_index_block_bit_flip_fails_open() {
    let (_temp_dir, location) = setup_store();
    let index_path = index_block(&location);
    let original = fs::read(&index_path).unwrap();

    for byte in (0..original.len()).step_by(13) {
        flip_bit(&index_path, byte, 3);
        assert!(matches!(
            Store::open(&location, PASSWORD),
            Err(Error::WrongPassphraseOrCorrupt)
        ));
        fs::write(&index_path, &original).unwrap();
    }

    assert!(Store::open(&location, PASSWORD).is_ok());
}

#[test]
fn test_missing_index_block_is_corrupt() {
    let (_temp_dir, location) = setup_store();
    fs::remove_file(index_block(&location)).unwrap();

    assert!(matches!(
        Store::open(&location, PASSWORD),
        Err(Error::CorruptStore(_))
    ));
}

#[test]
fn test_content_block_bit_flip_fails_read() {
    let (_temp_dir, location) = setup_store();
    let blocks = content_blocks(&location);
    assert_eq!(blocks.len(), 4);

    // Second block of big.bin.
    flip_bit(&blocks[2], 100, 0);

    let store = Store::open(&location, PASSWORD).expect("Index is intact");
    assert_eq!(
        store.read_all("/docs/small.txt").unwrap(),
        b"This is important data"
    );
    assert_eq!(store.read_file("/docs/big.bin", 0, 1024).unwrap().len(), 1024);
    assert!(matches!(
        store.read_file("/docs/big.bin", 1000, 100),
        Err(Error::WrongPassphraseOrCorrupt)
    ));
    assert!(store.read_all("/docs/big.bin").is_err());

    let report = store.verify().unwrap();
    assert!(!report.is_healthy());
    assert_eq!(report.total_files, 2);
    assert_eq!(report.intact_files, 1);
    assert_eq!(report.damaged_files[0].0, "/docs/big.bin");
}

#[test]
fn test_swapped_content_blocks_are_rejected() {
    let (_temp_dir, location) = setup_store();
    let blocks = content_blocks(&location);

    // Same length ciphertexts: first and second full blocks of big.bin.
    let first = fs::read(&blocks[1]).unwrap();
    let second = fs::read(&blocks[2]).unwrap();
    fs::write(&blocks[1], &second).unwrap();
    fs::write(&blocks[2], &first).unwrap();

    let store = Store::open(&location, PASSWORD).unwrap();
    assert!(matches!(
        store.read_file("/docs/big.bin", 0, 10),
        Err(Error::WrongPassphraseOrCorrupt)
    ));
    assert!(matches!(
        store.read_file("/docs/big.bin", 1024, 10),
        Err(Error::WrongPassphraseOrCorrupt)
    ));
}

#[test]
fn test_missing_content_block_reported() {
    let (_temp_dir, location) = setup_store();
    fs::remove_file(&content_blocks(&location)[0]).unwrap();

    let store = Store::open(&location, PASSWORD).unwrap();
    assert!(matches!(
        store.read_all("/docs/small.txt"),
        Err(Error::BlockNotFound(_))
    ));
    assert_eq!(store.verify().unwrap().damaged_files.len(), 1);
}

#[test]
fn test_stale_block_write_is_discarded_and_id_skipped() {
    let (_temp_dir, location) = setup_store();
    let stale = location.join(BLOCKS_DIRNAME).join("00000000000001f4.tmp");
    fs::write(&stale, b"half written").unwrap();

    let mut store = Store::open(&location, PASSWORD).unwrap();
    assert!(!stale.exists());

    store.write_file("/new.txt", 0, b"fresh").unwrap();
    store.commit().unwrap();
    let newest = index_block(&location);
    let name = newest.file_name().unwrap().to_str().unwrap().to_string();
    assert!(u64::from_str_radix(&name, 16).unwrap() > 0x1f4);
}

#[test]
fn test_orphan_blocks_reclaimed_on_open() {
    let (_temp_dir, location) = setup_store();
    let orphan = location.join(BLOCKS_DIRNAME).join("00000000000003e8");
    fs::write(&orphan, vec![0u8; 64]).unwrap();

    let store = Store::open(&location, PASSWORD).unwrap();
    assert!(!orphan.exists());
    assert!(!store.is_dirty());
    assert!(block_id(&index_block(&location)) > 0x3e8);
    assert_eq!(block_files(&location).len(), 5);
    assert!(store.verify().unwrap().is_healthy());
}

#[test]
fn test_ids_from_interrupted_session_never_reused() {
    let (temp_dir, location) = setup_store();
    let snapshot = temp_dir.path().join("snapshot");

    // Seal a block, then lose the session before it commits.
    {
        let mut store = Store::open(&location, PASSWORD).unwrap();
        store.write_file("/f", 0, b"first plaintext").unwrap();
        copy_dir(&location, &snapshot);
    }
    fs::remove_dir_all(&location).unwrap();
    copy_dir(&snapshot, &location);
    let highest_before = block_files(&location).iter().map(|p| block_id(p)).max().unwrap();

    // A session that changes nothing.
    {
        let store = Store::open(&location, PASSWORD).unwrap();
        assert!(!store.exists("/f").unwrap());
    }

    let seen: Vec<PathBuf> = block_files(&location);
    let mut store = Store::open(&location, PASSWORD).unwrap();
    store.write_file("/f", 0, b"other plaintext").unwrap();
    store.commit().unwrap();

    let fresh: Vec<u64> = block_files(&location)
        .iter()
        .filter(|p| !seen.contains(p))
        .map(|p| block_id(p))
        .collect();
    assert!(!fresh.is_empty());
    assert!(fresh.iter().all(|&id| id > highest_before));
}

#[test]
fn test_last_block_id_on_disk_fails_open() {
    let (_temp_dir, location) = setup_store();
    fs::write(
        location.join(BLOCKS_DIRNAME).join("ffffffffffffffff"),
        b"stray",
    )
    .unwrap();

    assert!(matches!(
        Store::open(&location, PASSWORD),
        Err(Error::CorruptStore(_))
    ));
}

#[test]
fn test_abandoned_writes_reclaimed_on_commit() {
    let (_temp_dir, location) = setup_store();
    let before = block_files(&location).len();

    let mut store = Store::open(&location, PASSWORD).unwrap();
    store.write_file("/scratch", 0, &[1u8; 4096]).unwrap();
    store.remove("/scratch").unwrap();
    assert_eq!(block_files(&location).len(), before + 4);

    store.mkdir("/after").unwrap();
    store.commit().unwrap();
    assert_eq!(block_files(&location).len(), before);
}

#[test]
fn test_interrupted_header_swap_keeps_previous_commit() {
    let (_temp_dir, location) = setup_store();

    // Simulate a crash after staging a header but before the rename.
    let staged = fs::read(location.join(HEADER_FILENAME)).unwrap();
    fs::write(location.join(HEADER_TMP_FILENAME), &staged).unwrap();

    {
        let mut store = Store::open(&location, PASSWORD).unwrap();
        assert!(!location.join(HEADER_TMP_FILENAME).exists());
        assert_eq!(store.list("/docs").unwrap().len(), 2);
        store.write_file("/docs/small.txt", 0, b"THIS").unwrap();
        store.close().unwrap();
    }

    fs::write(location.join(HEADER_TMP_FILENAME), b"torn write").unwrap();
    let store = Store::open(&location, PASSWORD).unwrap();
    assert!(!location.join(HEADER_TMP_FILENAME).exists());
    assert_eq!(
        store.read_all("/docs/small.txt").unwrap(),
        b"THIS is important data"
    );
}

#[test]
fn test_unsupported_version_and_truncated_header() {
    let (_temp_dir, location) = setup_store();
    let header_path = location.join(HEADER_FILENAME);
    let original = fs::read(&header_path).unwrap();

    let mut future = original.clone();
    future[4..8].copy_from_slice(&2u32.to_le_bytes());
    fs::write(&header_path, &future).unwrap();
    assert!(matches!(
        Store::open(&location, PASSWORD),
        Err(Error::UnsupportedFormatVersion {
            expected: 1,
            found: 2
        })
    ));

    fs::write(&header_path, &original[..original.len() / 2]).unwrap();
    assert!(Store::open(&location, PASSWORD).is_err());

    fs::write(&header_path, &original[..5]).unwrap();
    assert!(matches!(
        Store::open(&location, PASSWORD),
        Err(Error::CorruptStore(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_any_content_bit_flip_is_detected(block in 0usize..4, byte in 0usize..2048, bit in 0u8..8) {
        let (_temp_dir, location) = setup_store();
        let target = &content_blocks(&location)[block];
        let len = fs::read(target).unwrap().len();
        flip_bit(target, byte % len, bit);

        let store = Store::open(&location, PASSWORD).unwrap();
        let small = store.read_all("/docs/small.txt");
        let big = store.read_all("/docs/big.bin");
        prop_assert!(small.is_err() || big.is_err());
        prop_assert!(!store.verify().unwrap().is_healthy());
    }
}
