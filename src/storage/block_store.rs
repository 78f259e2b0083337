//! Sealed block persistence in a store directory.
//!
//! Every block lives in its own file under `blocks/`, named by its id in
//! hex. Blocks are written once and never modified: a new version of a
//! logical block always goes to a freshly allocated id. Both block files and
//! the header are written to a temporary name, flushed, then renamed into
//! place, so a crash never exposes a partially written unit.

use crate::config::{BLOCKS_DIRNAME, HEADER_FILENAME, HEADER_TMP_FILENAME};
use crate::error::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Identifier of a sealed block. Doubles as the nonce counter.
pub type BlockId = u64;

const TMP_SUFFIX: &str = ".tmp";

/// Raw block persistence. Knows nothing about plaintext structure.
#[derive(Debug)]
pub struct BlockStore {
    /// Store directory.
    root: PathBuf,
    /// `root/blocks`.
    blocks_dir: PathBuf,
    /// Next id handed out by `allocate`.
    next_id: BlockId,
}

impl BlockStore {
    /// Lay out a fresh store directory. `root` must already exist.
    pub fn create(root: &Path) -> Result<Self> {
        let blocks_dir = root.join(BLOCKS_DIRNAME);
        fs::create_dir_all(&blocks_dir)?;
        sync_dir(root)?;

        Ok(Self {
            root: root.to_path_buf(),
            blocks_dir,
            next_id: 1,
        })
    }

    /// Open an existing store directory.
    ///
    /// Leftover `*.tmp` block files from an interrupted write are removed,
    /// and the id counter is raised past every id seen on disk (including
    /// the leftovers) so no id is ever handed out twice.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.join(HEADER_FILENAME).exists() {
            return Err(Error::NotInitialized(root.to_path_buf()));
        }

        let blocks_dir = root.join(BLOCKS_DIRNAME);
        let mut store = Self {
            root: root.to_path_buf(),
            blocks_dir,
            next_id: 1,
        };

        let mut stale = Vec::new();
        for entry in fs::read_dir(&store.blocks_dir)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            let (id_part, is_tmp) = match name.strip_suffix(TMP_SUFFIX) {
                Some(id_part) => (id_part, true),
                None => (&*name, false),
            };
            if let Some(id) = parse_block_name(id_part) {
                store.raise_floor(next_after(id)?);
                if is_tmp {
                    stale.push(store.blocks_dir.join(&*name));
                }
            }
        }
        for path in stale {
            tracing::debug!(path = %path.display(), "removing stale block write");
            fs::remove_file(&path)?;
        }

        Ok(store)
    }

    /// Hand out a fresh, never used block id.
    pub fn allocate(&mut self) -> Result<BlockId> {
        let id = self.next_id;
        self.next_id = next_after(id)?;
        Ok(id)
    }

    /// The id the next `allocate` will return.
    pub fn next_id(&self) -> BlockId {
        self.next_id
    }

    /// Ensure future allocations are at least `floor`.
    pub fn raise_floor(&mut self, floor: BlockId) {
        if floor > self.next_id {
            self.next_id = floor;
        }
    }

    fn block_path(&self, id: BlockId) -> PathBuf {
        self.blocks_dir.join(block_name(id))
    }

    /// Durably write a sealed block under a fresh id.
    ///
    /// Refuses to replace an existing block.
    pub fn write(&self, id: BlockId, sealed: &[u8]) -> Result<()> {
        let path = self.block_path(id);
        if path.exists() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::AlreadyExists,
                format!("block {} already written", block_name(id)),
            )));
        }

        let tmp = self.blocks_dir.join(format!("{}{}", block_name(id), TMP_SUFFIX));
        write_durable(&tmp, sealed)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!(block = %block_name(id), len = sealed.len(), "wrote block");
        Ok(())
    }

    /// Read a sealed block.
    pub fn read(&self, id: BlockId) -> Result<Vec<u8>> {
        match fs::read(self.block_path(id)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::BlockNotFound(block_name(id))),
            Err(e) => Err(e.into()),
        }
    }

    /// Release a block. Freeing an absent block is not an error.
    pub fn free(&self, id: BlockId) -> Result<()> {
        match fs::remove_file(self.block_path(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// All block ids currently present on the medium.
    pub fn ids(&self) -> Result<Vec<BlockId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.blocks_dir)? {
            let name = entry?.file_name();
            if let Some(id) = parse_block_name(&name.to_string_lossy()) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Flush the blocks directory so renamed block files are durable.
    pub fn sync(&self) -> Result<()> {
        sync_dir(&self.blocks_dir)
    }

    /// Read the committed header.
    pub fn read_header(&self) -> Result<Vec<u8>> {
        Ok(fs::read(self.root.join(HEADER_FILENAME))?)
    }

    /// Swap in a new header. This rename is the commit point of the store.
    pub fn write_header(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.root.join(HEADER_TMP_FILENAME);
        write_durable(&tmp, bytes)?;
        fs::rename(&tmp, self.root.join(HEADER_FILENAME))?;
        sync_dir(&self.root)?;

        tracing::debug!(len = bytes.len(), "swapped header");
        Ok(())
    }

    /// Remove a header left staged by an interrupted commit, returning it.
    pub fn take_stale_header(&self) -> Result<Option<Vec<u8>>> {
        let tmp = self.root.join(HEADER_TMP_FILENAME);
        match fs::read(&tmp) {
            Ok(bytes) => {
                fs::remove_file(&tmp)?;
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// The id following `id`, failing once the id space is used up.
fn next_after(id: BlockId) -> Result<BlockId> {
    id.checked_add(1)
        .ok_or_else(|| Error::CorruptStore("block id space exhausted".to_string()))
}

/// File name of a block: 16 lowercase hex digits.
pub fn block_name(id: BlockId) -> String {
    hex::encode(id.to_be_bytes())
}

fn parse_block_name(name: &str) -> Option<BlockId> {
    if name.len() != 16 {
        return None;
    }
    let bytes = hex::decode(name).ok()?;
    let bytes: [u8; 8] = bytes.try_into().ok()?;
    Some(BlockId::from_be_bytes(bytes))
}

fn write_durable(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
