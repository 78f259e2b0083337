//! Argon2id key derivation for passphrase-based encryption.

use crate::config::{argon2_params, KdfParams};
use crate::error::{Error, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 256-bit master key derived from the passphrase.
///
/// Zeroized on drop; never persisted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; argon2_params::OUTPUT_LENGTH],
}

impl MasterKey {
    pub fn as_bytes(&self) -> &[u8; argon2_params::OUTPUT_LENGTH] {
        &self.bytes
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Key derivation using Argon2id.
#[derive(Debug, Clone)]
pub struct KeyDerivation {
    salt: [u8; argon2_params::SALT_LENGTH],
    params: KdfParams,
}

impl KeyDerivation {
    /// Create a KDF with a fresh random salt.
    pub fn new(params: KdfParams) -> Self {
        let mut salt = [0u8; argon2_params::SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        Self { salt, params }
    }

    /// Create a KDF from a stored salt and cost parameters.
    pub fn from_salt(salt: [u8; argon2_params::SALT_LENGTH], params: KdfParams) -> Self {
        Self { salt, params }
    }

    /// Get the salt for storage.
    pub fn salt(&self) -> &[u8; argon2_params::SALT_LENGTH] {
        &self.salt
    }

    /// Derive the 256-bit master key from a passphrase.
    ///
    /// Deterministic for a given passphrase, salt and parameter set.
    pub fn derive_key(&self, passphrase: &str) -> Result<MasterKey> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            Some(argon2_params::OUTPUT_LENGTH),
        )
        .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = MasterKey {
            bytes: [0u8; argon2_params::OUTPUT_LENGTH],
        };
        argon2
            .hash_password_into(passphrase.as_bytes(), &self.salt, &mut key.bytes)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        Ok(key)
    }
}
