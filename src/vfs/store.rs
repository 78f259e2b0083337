//! Store manager - the main interface.
//!
//! A [`Store`] owns one open session on a store directory: the exclusive
//! lock, the block cipher keyed from the passphrase and the in-memory index.
//! Mutations only touch the index and write freshly sealed content blocks;
//! nothing becomes visible on disk until [`Store::commit`] swaps the header.

use crate::config::{
    KdfParams, StoreConfig, HEADER_FILENAME, INDEX_CHUNK_SIZE, LOCK_FILENAME, NONCE_PREFIX_SIZE,
    STORE_VERSION,
};
use crate::crypto::{BlockCipher, BlockRole, KeyDerivation};
use crate::error::{Error, Result};
use crate::storage::{
    block_name, BlockId, BlockStore, HeaderFile, HeaderParams, HeaderState, StoreLock,
};
use crate::vfs::index::Index;
use crate::vfs::path::VfsPath;
use crate::vfs::types::{DirEntry, Node, NodeId, NodeInfo};
use rand::RngCore;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Closed,
    Opening,
    Open,
    Closing,
    /// Opening failed on a passphrase or integrity error.
    Failed,
}

/// Result of [`Store::verify`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    /// Total number of files.
    pub total_files: usize,
    /// Files whose every block authenticated.
    pub intact_files: usize,
    /// Damaged files and the first error found in each.
    pub damaged_files: Vec<(String, String)>,
    /// Content blocks checked.
    pub blocks_checked: usize,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.damaged_files.is_empty()
    }
}

/// Store information summary.
#[derive(Debug, Clone, Serialize)]
pub struct StoreInfo {
    pub location: PathBuf,
    pub format_version: u32,
    pub block_size: u32,
    pub kdf: KdfParams,
    pub file_count: usize,
    pub dir_count: usize,
    pub total_file_size: u64,
    pub block_count: usize,
    pub dirty: bool,
}

/// An open encrypted store.
pub struct Store {
    state: StoreState,
    location: PathBuf,
    blocks: BlockStore,
    /// Plaintext header fields of the last commit.
    params: HeaderParams,
    /// Sealed header fields of the last commit.
    committed: HeaderState,
    index: Index,
    /// Dropped on close, which zeroizes the key schedule.
    cipher: Option<BlockCipher>,
    lock: Option<StoreLock>,
}

impl Store {
    /// Create a new store in `location`.
    ///
    /// The directory is created if missing. It must not already hold a
    /// store or any unrelated files.
    pub fn create(location: &Path, passphrase: &str, config: StoreConfig) -> Result<Self> {
        config.validate()?;

        std::fs::create_dir_all(location)?;
        if !location.join(HEADER_FILENAME).exists() && has_foreign_entries(location)? {
            return Err(Error::PathExists(location.display().to_string()));
        }

        let lock = StoreLock::acquire(location)?;
        if location.join(HEADER_FILENAME).exists() {
            return Err(Error::StoreExists(location.to_path_buf()));
        }

        let kdf = KeyDerivation::new(config.kdf);
        let key = kdf.derive_key(passphrase)?;

        let mut nonce_prefix = [0u8; NONCE_PREFIX_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_prefix);

        let params = HeaderParams {
            salt: *kdf.salt(),
            kdf: config.kdf,
            block_size: config.block_size,
            nonce_prefix,
            seal_counter: 0,
        };

        let mut store = Self {
            state: StoreState::Closed,
            location: location.to_path_buf(),
            blocks: BlockStore::create(location)?,
            params,
            committed: HeaderState::default(),
            index: Index::new(),
            cipher: Some(BlockCipher::new(&key, nonce_prefix)),
            lock: Some(lock),
        };
        drop(key);

        store.transition(StoreState::Opening);
        if let Err(e) = store.persist() {
            store.fail();
            return Err(e);
        }
        store.transition(StoreState::Open);

        tracing::info!(
            location = %location.display(),
            block_size = config.block_size,
            "created store"
        );
        Ok(store)
    }

    /// Open an existing store.
    ///
    /// A wrong passphrase and a damaged header both fail with
    /// [`Error::WrongPassphraseOrCorrupt`].
    pub fn open(location: &Path, passphrase: &str) -> Result<Self> {
        if !location.join(HEADER_FILENAME).exists() {
            return Err(Error::NotInitialized(location.to_path_buf()));
        }

        let lock = StoreLock::acquire(location)?;
        let mut blocks = BlockStore::open(location)?;

        // A header staged by an interrupted commit already consumed ids.
        if let Some(stale) = blocks.take_stale_header()? {
            match HeaderFile::from_bytes(&stale) {
                Ok(header) => blocks.raise_floor(header.params.seal_counter.saturating_add(1)),
                Err(e) => tracing::warn!(error = %e, "discarding unreadable staged header"),
            }
        }

        let header = HeaderFile::from_bytes(&blocks.read_header()?)?;

        let mut store = Self {
            state: StoreState::Closed,
            location: location.to_path_buf(),
            blocks,
            params: header.params.clone(),
            committed: HeaderState::default(),
            index: Index::new(),
            cipher: None,
            lock: Some(lock),
        };

        store.transition(StoreState::Opening);
        if let Err(e) = store.load(&header, passphrase) {
            tracing::warn!(location = %location.display(), error = %e, "failed to open store");
            store.fail();
            return Err(e);
        }
        store.transition(StoreState::Open);

        // Ids consumed by an interrupted session are recorded before the
        // blocks holding them are reclaimed.
        if store.blocks.next_id() > store.committed.next_block_id {
            tracing::info!(
                floor = store.blocks.next_id(),
                committed = store.committed.next_block_id,
                "recording block ids left by an interrupted session"
            );
            store.index.mark_dirty();
            if let Err(e) = store.persist() {
                tracing::warn!(location = %location.display(), error = %e, "failed to record block id floor");
                store.fail();
                return Err(e);
            }
        } else {
            store.reclaim();
        }
        tracing::info!(
            location = %location.display(),
            files = store.index.file_count(),
            "opened store"
        );
        Ok(store)
    }

    fn load(&mut self, header: &HeaderFile, passphrase: &str) -> Result<()> {
        let key = KeyDerivation::from_salt(header.params.salt, header.params.kdf)
            .derive_key(passphrase)?;
        let mut cipher = BlockCipher::new(&key, header.params.nonce_prefix);
        drop(key);

        let state = header.open(&cipher)?;
        self.blocks
            .raise_floor(header.params.seal_counter.saturating_add(1));
        self.blocks.raise_floor(state.next_block_id);
        cipher.advance_to(self.blocks.next_id().saturating_sub(1));

        let count = u32::try_from(state.index_blocks.len())
            .map_err(|_| Error::CorruptStore("too many index chunks".to_string()))?;
        let mut bytes = Vec::with_capacity(state.index_len as usize);
        for (chunk, &id) in state.index_blocks.iter().enumerate() {
            let sealed = self.blocks.read(id).map_err(|e| match e {
                Error::BlockNotFound(name) => {
                    Error::CorruptStore(format!("index block {} missing", name))
                }
                other => other,
            })?;
            let role = BlockRole::Index {
                chunk: chunk as u32,
                count,
            };
            bytes.extend_from_slice(&cipher.open(id, role, &sealed)?);
        }
        if bytes.len() as u64 != state.index_len {
            return Err(Error::CorruptStore(format!(
                "index length {} does not match header {}",
                bytes.len(),
                state.index_len
            )));
        }

        self.index = Index::from_bytes(&bytes)?;
        self.committed = state;
        self.cipher = Some(cipher);
        Ok(())
    }

    fn transition(&mut self, to: StoreState) {
        tracing::debug!(from = ?self.state, to = ?to, "store state");
        self.state = to;
    }

    fn fail(&mut self) {
        self.transition(StoreState::Failed);
        self.cipher = None;
        self.lock = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Store directory.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Plaintext size of each content block.
    pub fn block_size(&self) -> u32 {
        self.params.block_size
    }

    /// Whether there are uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        self.index.is_dirty()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == StoreState::Open {
            Ok(())
        } else {
            Err(Error::StoreClosed)
        }
    }

    /// Seal the index and swap in a new header.
    ///
    /// Does nothing when there are no changes since the last commit. On
    /// failure the previous commit stays intact and the changes stay
    /// pending, so the call can be retried.
    pub fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        if !self.index.is_dirty() {
            return Ok(());
        }
        let cipher = self.cipher.as_mut().ok_or(Error::StoreClosed)?;

        let bytes = self.index.to_bytes()?;
        let chunks: Vec<&[u8]> = bytes.chunks(INDEX_CHUNK_SIZE).collect();
        let count = u32::try_from(chunks.len())
            .map_err(|_| Error::Serialization("index too large".to_string()))?;

        let mut index_blocks = Vec::with_capacity(chunks.len());
        for (chunk, data) in chunks.into_iter().enumerate() {
            let id = self.blocks.allocate()?;
            let role = BlockRole::Index {
                chunk: chunk as u32,
                count,
            };
            let sealed = cipher.seal(id, role, data)?;
            self.blocks.write(id, &sealed)?;
            index_blocks.push(id);
        }
        self.blocks.sync()?;

        let mut params = self.params.clone();
        params.seal_counter = self.blocks.allocate()?;
        let state = HeaderState {
            next_block_id: self.blocks.next_id(),
            index_blocks,
            index_len: bytes.len() as u64,
        };
        let header = HeaderFile::seal(params.clone(), &state, cipher)?;
        self.blocks.write_header(&header.to_bytes()?)?;

        self.params = params;
        self.committed = state;
        self.index.mark_clean();

        tracing::info!(
            index_chunks = self.committed.index_blocks.len(),
            index_len = self.committed.index_len,
            "committed"
        );
        self.reclaim();
        Ok(())
    }

    /// Delete every block the committed header cannot reach.
    fn reclaim(&mut self) {
        let mut live: BTreeSet<BlockId> = self.index.live_blocks();
        live.extend(self.committed.index_blocks.iter().copied());

        let ids = match self.blocks.ids() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list blocks for reclaim");
                return;
            }
        };

        let mut freed = 0usize;
        for id in ids.into_iter().filter(|id| !live.contains(id)) {
            match self.blocks.free(id) {
                Ok(()) => freed += 1,
                Err(e) => tracing::warn!(block = %block_name(id), error = %e, "failed to reclaim block"),
            }
        }
        if freed > 0 {
            tracing::debug!(freed, "reclaimed unreferenced blocks");
        }
    }

    /// Commit pending changes, then drop the key and release the lock.
    ///
    /// If the commit fails the store stays open.
    pub fn close(&mut self) -> Result<()> {
        if self.state != StoreState::Open {
            return Ok(());
        }

        self.transition(StoreState::Closing);
        if let Err(e) = self.persist() {
            self.transition(StoreState::Open);
            return Err(e);
        }

        self.cipher = None;
        self.lock = None;
        self.transition(StoreState::Closed);
        tracing::info!(location = %self.location.display(), "closed store");
        Ok(())
    }

    fn cipher(&self) -> Result<&BlockCipher> {
        self.cipher.as_ref().ok_or(Error::StoreClosed)
    }

    fn load_block(&self, file: NodeId, index: u64, id: BlockId) -> Result<Vec<u8>> {
        let sealed = self.blocks.read(id)?;
        self.cipher()?
            .open(id, BlockRole::Content { file, index }, &sealed)
    }

    fn seal_block(&mut self, file: NodeId, index: u64, data: &[u8]) -> Result<BlockId> {
        let cipher = self.cipher.as_mut().ok_or(Error::StoreClosed)?;
        let id = self.blocks.allocate()?;
        let sealed = cipher.seal(id, BlockRole::Content { file, index }, data)?;
        self.blocks.write(id, &sealed)?;
        Ok(id)
    }

    /// List a directory, ordered by name.
    pub fn list(&self, path: &str) -> Result<Vec<DirEntry>> {
        self.ensure_open()?;
        self.index.list(&VfsPath::parse(path)?)
    }

    /// Look up the node at `path`.
    pub fn lookup(&self, path: &str) -> Result<Node> {
        self.ensure_open()?;
        self.index.lookup(&VfsPath::parse(path)?).cloned()
    }

    /// Get file or directory info.
    pub fn stat(&self, path: &str) -> Result<NodeInfo> {
        self.ensure_open()?;
        self.index.stat(&VfsPath::parse(path)?)
    }

    /// Whether `path` exists.
    pub fn exists(&self, path: &str) -> Result<bool> {
        match self.lookup(path) {
            Ok(_) => Ok(true),
            Err(Error::PathNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create an empty file.
    pub fn create_file(&mut self, path: &str) -> Result<NodeId> {
        self.ensure_open()?;
        self.index.create_file(&VfsPath::parse(path)?)
    }

    /// Create a directory.
    pub fn mkdir(&mut self, path: &str) -> Result<NodeId> {
        self.ensure_open()?;
        self.index.create_dir(&VfsPath::parse(path)?)
    }

    /// Create a directory along with any missing parents.
    pub fn create_dir_all(&mut self, path: &str) -> Result<NodeId> {
        self.ensure_open()?;
        self.index.create_dir_all(&VfsPath::parse(path)?)
    }

    /// Write `data` at `offset`, creating the file if it does not exist.
    ///
    /// Every block the write touches is re-sealed under a fresh id; a gap
    /// between the old end of file and `offset` reads back as zeros.
    pub fn write_file(&mut self, path: &str, offset: u64, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let vfs_path = VfsPath::parse(path)?;

        let existing = match self.index.file(&vfs_path) {
            Ok((id, blocks, size)) => Some((id, blocks.to_vec(), size)),
            Err(Error::PathNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let (file_id, old_blocks, old_size) = match existing {
            Some(file) => file,
            None => (self.index.create_file(&vfs_path)?, Vec::new(), 0),
        };
        if data.is_empty() {
            return Ok(());
        }

        let end = offset
            .checked_add(data.len() as u64)
            .ok_or_else(|| Error::InvalidPath(format!("write past addressable range: {}", path)))?;
        let new_size = old_size.max(end);
        let bs = u64::from(self.params.block_size);

        let first = offset.min(old_size) / bs;
        let last = (end - 1) / bs;

        let mut new_blocks = old_blocks.clone();
        for bi in first..=last {
            let block_start = bi * bs;
            let block_end = (block_start + bs).min(new_size);
            let mut buf = vec![0u8; (block_end - block_start) as usize];

            let fully_covered = offset <= block_start && end >= block_end;
            if let Some(&old_id) = old_blocks.get(bi as usize) {
                if !fully_covered {
                    let old = self.load_block(file_id, bi, old_id)?;
                    let keep = old.len().min(buf.len());
                    buf[..keep].copy_from_slice(&old[..keep]);
                }
            }

            let from = offset.max(block_start);
            let to = end.min(block_end);
            if from < to {
                buf[(from - block_start) as usize..(to - block_start) as usize]
                    .copy_from_slice(&data[(from - offset) as usize..(to - offset) as usize]);
            }

            let id = self.seal_block(file_id, bi, &buf)?;
            match new_blocks.get_mut(bi as usize) {
                Some(slot) => *slot = id,
                None => new_blocks.push(id),
            }
        }

        self.index.set_file_content(file_id, new_blocks, new_size)?;
        tracing::debug!(path, offset, len = data.len(), size = new_size, "wrote file");
        Ok(())
    }

    /// Read `len` bytes starting at `offset`.
    ///
    /// Fails with [`Error::Truncated`] if the range runs past the end of the
    /// file; no partial data is returned.
    pub fn read_file(&self, path: &str, offset: u64, len: u64) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let (file_id, blocks, size) = self.index.file(&VfsPath::parse(path)?)?;

        let end = match offset.checked_add(len) {
            Some(end) if end <= size => end,
            _ => {
                return Err(Error::Truncated {
                    requested: len,
                    available: size.saturating_sub(offset),
                })
            }
        };
        if len == 0 {
            return Ok(Vec::new());
        }

        let bs = u64::from(self.params.block_size);
        let mut out = Vec::with_capacity(len as usize);
        for bi in offset / bs..=(end - 1) / bs {
            let id = *blocks.get(bi as usize).ok_or_else(|| {
                Error::CorruptStore(format!("{}: block {} missing from index", path, bi))
            })?;
            let plaintext = self.load_block(file_id, bi, id)?;

            let block_start = bi * bs;
            let expected = ((block_start + bs).min(size) - block_start) as usize;
            if plaintext.len() != expected {
                return Err(Error::CorruptStore(format!(
                    "{}: block {} holds {} bytes, expected {}",
                    path,
                    bi,
                    plaintext.len(),
                    expected
                )));
            }

            let from = (offset.max(block_start) - block_start) as usize;
            let to = (end.min(block_start + bs) - block_start) as usize;
            out.extend_from_slice(&plaintext[from..to]);
        }
        Ok(out)
    }

    /// Read a whole file.
    pub fn read_all(&self, path: &str) -> Result<Vec<u8>> {
        let size = self.stat(path)?.size;
        self.read_file(path, 0, size)
    }

    /// Shrink or zero-extend a file to `len` bytes.
    pub fn truncate(&mut self, path: &str, len: u64) -> Result<()> {
        self.ensure_open()?;
        let vfs_path = VfsPath::parse(path)?;
        let (file_id, blocks, size) = self.index.file(&vfs_path)?;
        let blocks = blocks.to_vec();

        if len == size {
            return Ok(());
        }
        if len > size {
            let zeros = vec![0u8; (len - size) as usize];
            return self.write_file(path, size, &zeros);
        }

        let bs = u64::from(self.params.block_size);
        let keep = len.div_ceil(bs) as usize;
        let mut new_blocks = blocks[..keep].to_vec();

        let tail = len % bs;
        if tail != 0 {
            let bi = (keep - 1) as u64;
            let old = self.load_block(file_id, bi, blocks[keep - 1])?;
            let tail = (tail as usize).min(old.len());
            new_blocks[keep - 1] = self.seal_block(file_id, bi, &old[..tail])?;
        }

        self.index.set_file_content(file_id, new_blocks, len)?;
        tracing::debug!(path, from = size, to = len, "truncated file");
        Ok(())
    }

    /// Remove a file or an empty directory.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        self.ensure_open()?;
        let released = self.index.remove(&VfsPath::parse(path)?)?;
        tracing::debug!(path, released = released.len(), "removed");
        Ok(())
    }

    /// Move a file or directory.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        self.ensure_open()?;
        self.index
            .rename(&VfsPath::parse(from)?, &VfsPath::parse(to)?)
    }

    pub fn metadata_set(&mut self, path: &str, key: &str, value: &str) -> Result<()> {
        self.ensure_open()?;
        self.index.metadata_set(&VfsPath::parse(path)?, key, value)
    }

    pub fn metadata_get(&self, path: &str, key: &str) -> Result<String> {
        self.ensure_open()?;
        self.index.metadata_get(&VfsPath::parse(path)?, key)
    }

    pub fn metadata_list(&self, path: &str) -> Result<BTreeMap<String, String>> {
        self.ensure_open()?;
        self.index.metadata_list(&VfsPath::parse(path)?)
    }

    pub fn metadata_remove(&mut self, path: &str, key: &str) -> Result<()> {
        self.ensure_open()?;
        self.index.metadata_remove(&VfsPath::parse(path)?, key)
    }

    pub fn tag_add(&mut self, path: &str, tag: &str) -> Result<()> {
        self.ensure_open()?;
        self.index.tag_add(&VfsPath::parse(path)?, tag)
    }

    pub fn tag_remove(&mut self, path: &str, tag: &str) -> Result<()> {
        self.ensure_open()?;
        self.index.tag_remove(&VfsPath::parse(path)?, tag)
    }

    pub fn tag_get(&self, path: &str) -> Result<Vec<String>> {
        self.ensure_open()?;
        self.index.tag_get(&VfsPath::parse(path)?)
    }

    pub fn tag_clear(&mut self, path: &str) -> Result<()> {
        self.ensure_open()?;
        self.index.tag_clear(&VfsPath::parse(path)?)
    }

    /// All tags in use, sorted.
    pub fn tag_list(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(self.index.tag_list())
    }

    /// Paths carrying every plain term and none of the `!`-prefixed ones.
    pub fn tag_search(&self, terms: &[String]) -> Result<Vec<String>> {
        self.ensure_open()?;
        self.index.tag_search(terms)
    }

    /// Authenticate every content block of every file.
    pub fn verify(&self) -> Result<HealthReport> {
        self.ensure_open()?;
        let mut report = HealthReport::default();

        for file_id in self.index.file_ids() {
            report.total_files += 1;
            let path = self.index.path_of(file_id)?.to_string();
            let blocks = self
                .index
                .get(file_id)
                .map(|n| n.blocks().to_vec())
                .unwrap_or_default();

            let mut damage = None;
            for (bi, &id) in blocks.iter().enumerate() {
                report.blocks_checked += 1;
                if let Err(e) = self.load_block(file_id, bi as u64, id) {
                    damage = Some(e.to_string());
                    break;
                }
            }

            match damage {
                None => report.intact_files += 1,
                Some(reason) => {
                    tracing::warn!(path = %path, reason = %reason, "damaged file");
                    report.damaged_files.push((path, reason));
                }
            }
        }

        Ok(report)
    }

    /// Re-seal everything under a key derived from `new_passphrase`.
    ///
    /// Salt and KDF parameters are kept. Takes effect at the commit this
    /// call performs; if that commit fails the old passphrase still opens
    /// the store on disk.
    pub fn change_passphrase(&mut self, new_passphrase: &str) -> Result<()> {
        self.ensure_open()?;

        let key = KeyDerivation::from_salt(self.params.salt, self.params.kdf)
            .derive_key(new_passphrase)?;
        let mut new_cipher = BlockCipher::new(&key, self.params.nonce_prefix);
        drop(key);
        new_cipher.advance_to(self.blocks.next_id().saturating_sub(1));

        let mut relocated = Vec::new();
        for file_id in self.index.file_ids() {
            let blocks = self
                .index
                .get(file_id)
                .map(|n| n.blocks().to_vec())
                .unwrap_or_default();

            let mut new_blocks = Vec::with_capacity(blocks.len());
            for (bi, &id) in blocks.iter().enumerate() {
                let role = BlockRole::Content {
                    file: file_id,
                    index: bi as u64,
                };
                let plaintext = self.load_block(file_id, bi as u64, id)?;
                let new_id = self.blocks.allocate()?;
                let sealed = new_cipher.seal(new_id, role, &plaintext)?;
                self.blocks.write(new_id, &sealed)?;
                new_blocks.push(new_id);
            }
            relocated.push((file_id, new_blocks));
        }

        for (file_id, new_blocks) in relocated {
            self.index.relocate_blocks(file_id, new_blocks)?;
        }
        self.cipher = Some(new_cipher);
        self.index.mark_dirty();
        self.persist()?;

        tracing::info!(location = %self.location.display(), "changed passphrase");
        Ok(())
    }

    /// Summary of the open store.
    pub fn info(&self) -> Result<StoreInfo> {
        self.ensure_open()?;
        Ok(StoreInfo {
            location: self.location.clone(),
            format_version: STORE_VERSION,
            block_size: self.params.block_size,
            kdf: self.params.kdf,
            file_count: self.index.file_count(),
            dir_count: self.index.dir_count(),
            total_file_size: self.index.total_size(),
            block_count: self.blocks.ids()?.len(),
            dirty: self.index.is_dirty(),
        })
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("location", &self.location)
            .field("block_size", &self.params.block_size)
            .field("dirty", &self.index.is_dirty())
            .finish_non_exhaustive()
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(location = %self.location.display(), error = %e, "commit on drop failed");
        }
    }
}

/// True if `dir` holds anything besides a lock file.
fn has_foreign_entries(dir: &Path) -> Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        if entry?.file_name() != LOCK_FILENAME {
            return Ok(true);
        }
    }
    Ok(false)
}
