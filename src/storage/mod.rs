//! Storage layer for the sealed store.
//!
//! This module handles:
//! - Reading/writing sealed blocks on the store directory
//! - Swapping in the header atomically
//! - Holding the exclusive session lock

mod block_store;
mod header;
mod lock;

pub use block_store::{block_name, BlockId, BlockStore};
pub use header::{HeaderFile, HeaderParams, HeaderState};
pub use lock::StoreLock;
