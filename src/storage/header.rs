//! Store header: the plaintext preamble plus the sealed header state.
//!
//! Layout on disk:
//! ```text
//! [4 bytes: magic "SVLT"][4 bytes: version, LE][bincode(HeaderFile)]
//! ```
//!
//! The preamble (`HeaderParams`) holds only what is needed before a key
//! exists: salt, KDF costs, block size, nonce prefix and the counter the
//! header itself was sealed under. It is bound into the seal's associated
//! data, so editing any of it fails tag verification.

use crate::config::{
    argon2_params, KdfParams, StoreConfig, NONCE_PREFIX_SIZE, STORE_MAGIC, STORE_VERSION,
};
use crate::crypto::{BlockCipher, BlockRole};
use crate::error::{Error, Result};
use crate::storage::block_store::BlockId;
use serde::{Deserialize, Serialize};

/// Unencrypted header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderParams {
    /// KDF salt, fixed at creation.
    pub salt: [u8; argon2_params::SALT_LENGTH],
    /// KDF costs, fixed at creation.
    pub kdf: KdfParams,
    /// Content block size, fixed at creation.
    pub block_size: u32,
    /// Random per-store part of every nonce.
    pub nonce_prefix: [u8; NONCE_PREFIX_SIZE],
    /// Counter the sealed state below was sealed under.
    pub seal_counter: u64,
}

impl HeaderParams {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Store configuration recorded in the header.
    pub fn config(&self) -> StoreConfig {
        StoreConfig::new(self.block_size, self.kdf)
    }
}

/// Sealed header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderState {
    /// Block id counter at commit time.
    pub next_block_id: BlockId,
    /// Sealed index chunks, in order.
    pub index_blocks: Vec<BlockId>,
    /// Length of the serialized index.
    pub index_len: u64,
}

/// A header as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderFile {
    pub params: HeaderParams,
    sealed: Vec<u8>,
}

impl HeaderFile {
    /// Seal `state` under `cipher`.
    pub fn seal(params: HeaderParams, state: &HeaderState, cipher: &mut BlockCipher) -> Result<Self> {
        let preamble = params.to_bytes()?;
        let plaintext = bincode::serialize(state)?;
        let sealed = cipher.seal(
            params.seal_counter,
            BlockRole::Header { params: &preamble },
            &plaintext,
        )?;
        Ok(Self { params, sealed })
    }

    /// Verify and decrypt the header state.
    ///
    /// A wrong key and a tampered header are reported identically.
    pub fn open(&self, cipher: &BlockCipher) -> Result<HeaderState> {
        let preamble = self.params.to_bytes()?;
        let plaintext = cipher.open(
            self.params.seal_counter,
            BlockRole::Header { params: &preamble },
            &self.sealed,
        )?;
        bincode::deserialize(&plaintext)
            .map_err(|e| Error::CorruptStore(format!("header state: {}", e)))
    }

    /// Serialize with magic and version prefix.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(8 + self.sealed.len() + 96);
        out.extend_from_slice(&STORE_MAGIC);
        out.extend_from_slice(&STORE_VERSION.to_le_bytes());
        out.extend_from_slice(&bincode::serialize(self)?);
        Ok(out)
    }

    /// Parse and structurally validate a persisted header.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 8 {
            return Err(Error::CorruptStore("header too short".to_string()));
        }
        if data[..4] != STORE_MAGIC {
            return Err(Error::CorruptStore("invalid magic".to_string()));
        }
        let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if version != STORE_VERSION {
            return Err(Error::UnsupportedFormatVersion {
                expected: STORE_VERSION,
                found: version,
            });
        }

        let header: HeaderFile = bincode::deserialize(&data[8..])
            .map_err(|e| Error::CorruptStore(format!("header: {}", e)))?;
        header
            .params
            .config()
            .validate()
            .map_err(|e| Error::CorruptStore(e.to_string()))?;
        Ok(header)
    }
}
