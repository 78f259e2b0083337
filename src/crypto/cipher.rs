//! AES-256-GCM authenticated encryption of store blocks.
//!
//! Sealed block format:
//! ```text
//! [N bytes: ciphertext][16 bytes: GCM tag]
//! nonce = nonce_prefix (4 bytes) || counter (8 bytes, big-endian)
//! ```
//!
//! The nonce is never stored: the counter is the block id, so a block
//! copied into another slot decrypts under the wrong nonce. The associated
//! data additionally binds each seal to its role in the store.

use crate::config::{NONCE_PREFIX_SIZE, NONCE_SIZE, STORE_MAGIC, STORE_VERSION, TAG_SIZE};
use crate::crypto::kdf::MasterKey;
use crate::error::{Error, Result};
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};

/// What a sealed block is used for.
#[derive(Debug, Clone, Copy)]
pub enum BlockRole<'a> {
    /// The header state. `params` is the serialized plaintext preamble.
    Header { params: &'a [u8] },
    /// One chunk of the serialized index.
    Index { chunk: u32, count: u32 },
    /// Block `index` of file node `file`.
    Content { file: u64, index: u64 },
}

impl BlockRole<'_> {
    fn associated_data(&self, counter: u64) -> Vec<u8> {
        let mut aad = Vec::with_capacity(48);
        match self {
            BlockRole::Header { params } => {
                aad.extend_from_slice(b"hdr");
                aad.extend_from_slice(&STORE_MAGIC);
                aad.extend_from_slice(&STORE_VERSION.to_be_bytes());
                aad.extend_from_slice(params);
            }
            BlockRole::Index { chunk, count } => {
                aad.extend_from_slice(b"idx");
                aad.extend_from_slice(&chunk.to_be_bytes());
                aad.extend_from_slice(&count.to_be_bytes());
            }
            BlockRole::Content { file, index } => {
                aad.extend_from_slice(b"dat");
                aad.extend_from_slice(&file.to_be_bytes());
                aad.extend_from_slice(&index.to_be_bytes());
            }
        }
        aad.extend_from_slice(&counter.to_be_bytes());
        aad
    }
}

/// Block cipher bound to one store's master key and nonce prefix.
pub struct BlockCipher {
    cipher: Aes256Gcm,
    nonce_prefix: [u8; NONCE_PREFIX_SIZE],
    last_sealed: Option<u64>,
}

impl BlockCipher {
    /// Create a new cipher from a derived key.
    pub fn new(key: &MasterKey, nonce_prefix: [u8; NONCE_PREFIX_SIZE]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.as_bytes().into()),
            nonce_prefix,
            last_sealed: None,
        }
    }

    fn nonce(&self, counter: u64) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        nonce[..NONCE_PREFIX_SIZE].copy_from_slice(&self.nonce_prefix);
        nonce[NONCE_PREFIX_SIZE..].copy_from_slice(&counter.to_be_bytes());
        nonce
    }

    /// Seal `plaintext` under the nonce derived from `counter`.
    ///
    /// Counters must strictly increase for the lifetime of this cipher;
    /// a repeated or smaller counter is refused.
    pub fn seal(&mut self, counter: u64, role: BlockRole<'_>, plaintext: &[u8]) -> Result<Vec<u8>> {
        if self.last_sealed.is_some_and(|last| counter <= last) {
            return Err(Error::Encryption(format!(
                "nonce counter {} reused or out of order",
                counter
            )));
        }

        let nonce_bytes = self.nonce(counter);
        let aad = role.associated_data(counter);
        let sealed = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| Error::Encryption(e.to_string()))?;

        self.last_sealed = Some(counter);
        Ok(sealed)
    }

    /// Open a block sealed with `seal`.
    ///
    /// Any tag mismatch or truncated input fails with
    /// `WrongPassphraseOrCorrupt`; no plaintext is ever returned in that case.
    pub fn open(&self, counter: u64, role: BlockRole<'_>, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < TAG_SIZE {
            return Err(Error::WrongPassphraseOrCorrupt);
        }

        let nonce_bytes = self.nonce(counter);
        let aad = role.associated_data(counter);
        self.cipher
            .decrypt(
                Nonce::from_slice(&nonce_bytes),
                Payload {
                    msg: sealed,
                    aad: &aad,
                },
            )
            .map_err(|_| Error::WrongPassphraseOrCorrupt)
    }

    /// Allow the next seal to use any counter above `floor`.
    pub(crate) fn advance_to(&mut self, floor: u64) {
        if self.last_sealed.map_or(true, |last| last < floor) {
            self.last_sealed = Some(floor);
        }
    }
}

impl std::fmt::Debug for BlockCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCipher")
            .field("nonce_prefix", &hex::encode(self.nonce_prefix))
            .field("last_sealed", &self.last_sealed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KdfParams;
    use crate::crypto::KeyDerivation;

    fn cipher_for(password: &str) -> BlockCipher {
        let key = KeyDerivation::from_salt([7u8; 32], KdfParams::new(64, 1, 1))
            .derive_key(password)
            .unwrap();
        BlockCipher::new(&key, [1, 2, 3, 4])
    }

    const ROLE: BlockRole<'static> = BlockRole::Content { file: 3, index: 0 };

    #[test]
    fn test_seal_open_roundtrip() {
        let mut cipher = cipher_for("password");
        let plaintext = b"Hello, World! This is a secret message.";

        let sealed = cipher.seal(1, ROLE, plaintext).unwrap();
        assert_eq!(sealed.len(), plaintext.len() + TAG_SIZE);

        let opened = cipher.open(1, ROLE, &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let mut cipher = cipher_for("password");
        let sealed = cipher.seal(1, ROLE, b"").unwrap();
        assert_eq!(cipher.open(1, ROLE, &sealed).unwrap(), b"");
    }

    #[test]
    fn test_wrong_key_fails() {
        let mut cipher = cipher_for("correct_password");
        let sealed = cipher.seal(1, ROLE, b"Secret data").unwrap();

        let other = cipher_for("wrong_password");
        assert!(matches!(
            other.open(1, ROLE, &sealed),
            Err(Error::WrongPassphraseOrCorrupt)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let mut cipher = cipher_for("password");
        let mut sealed = cipher.seal(1, ROLE, b"Secret data").unwrap();
        sealed[0] ^= 0x01;

        assert!(cipher.open(1, ROLE, &sealed).is_err());
    }

    #[test]
    fn test_truncated_input_fails() {
        let mut cipher = cipher_for("password");
        let sealed = cipher.seal(1, ROLE, b"Secret data").unwrap();

        assert!(cipher.open(1, ROLE, &sealed[..sealed.len() - 1]).is_err());
        assert!(cipher.open(1, ROLE, &sealed[..TAG_SIZE - 1]).is_err());
    }

    #[test]
    fn test_swapped_slot_fails() {
        let mut cipher = cipher_for("password");
        let sealed = cipher.seal(5, ROLE, b"block five").unwrap();

        // Same bytes presented as a different block id.
        assert!(cipher.open(6, ROLE, &sealed).is_err());
        // Same id but claimed for another file position.
        let other_role = BlockRole::Content { file: 3, index: 1 };
        assert!(cipher.open(5, other_role, &sealed).is_err());
        let index_role = BlockRole::Index { chunk: 0, count: 1 };
        assert!(cipher.open(5, index_role, &sealed).is_err());
    }

    #[test]
    fn test_counter_reuse_refused() {
        let mut cipher = cipher_for("password");
        cipher.seal(10, ROLE, b"a").unwrap();

        assert!(matches!(
            cipher.seal(10, ROLE, b"b"),
            Err(Error::Encryption(_))
        ));
        assert!(cipher.seal(9, ROLE, b"c").is_err());
        assert!(cipher.seal(11, ROLE, b"d").is_ok());
    }

    #[test]
    fn test_advance_to_raises_floor() {
        let mut cipher = cipher_for("password");
        cipher.advance_to(100);
        assert!(cipher.seal(100, ROLE, b"x").is_err());
        assert!(cipher.seal(101, ROLE, b"x").is_ok());
    }
}
