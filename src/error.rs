//! Error types for the sealed store.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error on the underlying medium.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tag verification failed. Covers both a wrong passphrase and a
    /// tampered or corrupted block; the two are not distinguished.
    #[error("Wrong passphrase or corrupted store")]
    WrongPassphraseOrCorrupt,

    /// Structural damage detected outside of tag verification.
    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    /// Header written by an unknown format version.
    #[error("Unsupported format version: expected {expected}, found {found}")]
    UnsupportedFormatVersion { expected: u32, found: u32 },

    /// Path not found in the index.
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// The parent directory of a path does not exist.
    #[error("Parent directory not found: {0}")]
    ParentNotFound(String),

    /// Path already exists.
    #[error("Path already exists: {0}")]
    PathExists(String),

    /// Directory still has children.
    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),

    /// Moving a directory into its own subtree.
    #[error("Cannot move {from} into its own subtree {to}")]
    WouldCreateCycle { from: String, to: String },

    /// Not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Not a file.
    #[error("Not a file: {0}")]
    NotAFile(String),

    /// Invalid path format.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Read range runs past the end of the file.
    #[error("Read truncated: requested {requested} bytes, {available} available")]
    Truncated { requested: u64, available: u64 },

    /// Another session holds the store lock.
    #[error("Store is locked by another session: {0}")]
    LockHeld(PathBuf),

    /// A store already exists at the location.
    #[error("Store already exists in {0}")]
    StoreExists(PathBuf),

    /// No store at the location.
    #[error("No store found in {0}")]
    NotInitialized(PathBuf),

    /// A block referenced by the index is missing from the medium.
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    /// Operation attempted after `close`.
    #[error("Store is closed")]
    StoreClosed,

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption error.
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metadata key not present on a node.
    #[error("Metadata key not found: {0}")]
    MetadataKeyNotFound(String),

    /// Empty tag, or one starting with the `!` exclusion marker.
    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
