//! Sealed Virtual File System
//!
//! An encrypted store that exposes a directory hierarchy while keeping every
//! byte of content and metadata sealed on disk.
//!
//! # Features
//!
//! - **Virtual File System**: Directories, files, metadata and tags behind absolute paths
//! - **AES-256-GCM Encryption**: Every block authenticated, with Argon2id key derivation
//! - **Crash Consistency**: Immutable blocks and a single atomic header swap per commit
//! - **CLI Interface**: Easy-to-use command-line tool
//!
//! # Architecture
//!
//! ```text
//! Passphrase → Argon2id → Master Key
//! Index / Content → Seal (AES-256-GCM, counter nonce) → blocks/<id>
//! Header (salt, KDF params, index block ids) → header.tmp → rename → header
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use sealed_vfs::vfs::Store;
//! use std::path::Path;
//!
//! // Create a new store
//! let mut store = Store::create(
//!     Path::new("./vault"),
//!     "secret",
//!     Default::default()
//! ).unwrap();
//!
//! // Write a file
//! store.mkdir("/docs").unwrap();
//! store.write_file("/docs/readme.txt", 0, b"hello").unwrap();
//! store.commit().unwrap();
//!
//! // Read it back
//! let data = store.read_file("/docs/readme.txt", 0, 5).unwrap();
//! assert_eq!(data, b"hello");
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod vfs;

pub use config::{KdfParams, StoreConfig};
pub use error::{Error, Result};
pub use vfs::{SharedStore, Store};
