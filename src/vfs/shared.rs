//! Thread-safe handle to an open store.
//!
//! Reads share the lock; mutations and commit take it exclusively, so a
//! read never observes a half-applied mutation.

use crate::error::Result;
use crate::vfs::store::Store;
use crate::vfs::types::DirEntry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable shared reference to a [`Store`].
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Shared access for read-only operations.
    pub fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access for mutations and commit.
    pub fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        self.read().list(path)
    }

    pub fn read_file(&self, path: &str, offset: u64, len: u64) -> Result<Vec<u8>> {
        self.read().read_file(path, offset, len)
    }

    pub fn write_file(&self, path: &str, offset: u64, data: &[u8]) -> Result<()> {
        self.write().write_file(path, offset, data)
    }

    pub fn mkdir(&self, path: &str) -> Result<()> {
        self.write().mkdir(path).map(|_| ())
    }

    pub fn remove(&self, path: &str) -> Result<()> {
        self.write().remove(path)
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.write().rename(from, to)
    }

    pub fn commit(&self) -> Result<()> {
        self.write().commit()
    }

    pub fn close(&self) -> Result<()> {
        self.write().close()
    }
}

impl From<Store> for SharedStore {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}
