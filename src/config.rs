//! Configuration constants and types for the sealed store.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Store magic number: "SVLT" in bytes.
pub const STORE_MAGIC: [u8; 4] = [0x53, 0x56, 0x4c, 0x54];

/// Current on-disk format version.
pub const STORE_VERSION: u32 = 1;

/// Header file name inside the store directory.
pub const HEADER_FILENAME: &str = "header";

/// Staging name used while swapping in a new header.
pub const HEADER_TMP_FILENAME: &str = "header.tmp";

/// Advisory lock file name.
pub const LOCK_FILENAME: &str = ".lock";

/// Directory holding one file per sealed block.
pub const BLOCKS_DIRNAME: &str = "blocks";

/// Default content block size (64 KiB).
pub const DEFAULT_BLOCK_SIZE: u32 = 64 * 1024;

/// Smallest accepted content block size.
pub const MIN_BLOCK_SIZE: u32 = 512;

/// Largest accepted content block size.
pub const MAX_BLOCK_SIZE: u32 = 1024 * 1024;

/// Serialized index is split into chunks of this size before sealing.
pub const INDEX_CHUNK_SIZE: usize = 64 * 1024;

/// AES-GCM nonce size (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Per-store random part of every nonce.
pub const NONCE_PREFIX_SIZE: usize = 4;

/// Authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Argon2id parameters for key derivation.
pub mod argon2_params {
    /// Default memory cost in KiB (64 MB).
    pub const MEMORY_COST: u32 = 65536;

    /// Default time cost (iterations).
    pub const TIME_COST: u32 = 3;

    /// Default parallelism factor.
    pub const PARALLELISM: u32 = 4;

    /// Output length in bytes (256 bits).
    pub const OUTPUT_LENGTH: usize = 32;

    /// Salt length in bytes.
    pub const SALT_LENGTH: usize = 32;

    /// Upper bound on memory cost (4 GiB).
    pub const MAX_MEMORY_COST: u32 = 4 * 1024 * 1024;

    /// Upper bound on iterations.
    pub const MAX_TIME_COST: u32 = 64;

    /// Upper bound on lanes.
    pub const MAX_PARALLELISM: u32 = 16;

    /// Argon2 requires at least 8 KiB of memory per lane.
    pub const MIN_MEMORY_PER_LANE: u32 = 8;
}

/// Argon2id cost parameters, stored in clear in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Iterations.
    pub iterations: u32,
    /// Lanes.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: argon2_params::MEMORY_COST,
            iterations: argon2_params::TIME_COST,
            parallelism: argon2_params::PARALLELISM,
        }
    }
}

impl KdfParams {
    /// Create parameters, clamped into the supported bounds.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        let parallelism = parallelism.clamp(1, argon2_params::MAX_PARALLELISM);
        Self {
            memory_kib: memory_kib.clamp(
                argon2_params::MIN_MEMORY_PER_LANE * parallelism,
                argon2_params::MAX_MEMORY_COST,
            ),
            iterations: iterations.clamp(1, argon2_params::MAX_TIME_COST),
            parallelism,
        }
    }

    /// Reject parameters outside the supported bounds.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 || self.parallelism > argon2_params::MAX_PARALLELISM {
            return Err(Error::InvalidConfig(format!(
                "KDF parallelism must be between 1 and {}",
                argon2_params::MAX_PARALLELISM
            )));
        }
        if self.iterations == 0 || self.iterations > argon2_params::MAX_TIME_COST {
            return Err(Error::InvalidConfig(format!(
                "KDF iterations must be between 1 and {}",
                argon2_params::MAX_TIME_COST
            )));
        }
        let min_memory = argon2_params::MIN_MEMORY_PER_LANE * self.parallelism;
        if self.memory_kib < min_memory || self.memory_kib > argon2_params::MAX_MEMORY_COST {
            return Err(Error::InvalidConfig(format!(
                "KDF memory must be between {} and {} KiB",
                min_memory,
                argon2_params::MAX_MEMORY_COST
            )));
        }
        Ok(())
    }
}

/// Configuration for store creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Plaintext size of each content block.
    pub block_size: u32,

    /// Key derivation cost.
    pub kdf: KdfParams,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            kdf: KdfParams::default(),
        }
    }
}

impl StoreConfig {
    /// Create a store configuration with custom settings.
    pub fn new(block_size: u32, kdf: KdfParams) -> Self {
        Self { block_size, kdf }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.block_size.is_power_of_two()
            || self.block_size < MIN_BLOCK_SIZE
            || self.block_size > MAX_BLOCK_SIZE
        {
            return Err(Error::InvalidConfig(format!(
                "Block size must be a power of 2 between {} and {}",
                MIN_BLOCK_SIZE, MAX_BLOCK_SIZE
            )));
        }
        self.kdf.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_kdf_new_clamps() {
        let params = KdfParams::new(0, 0, 100);
        assert_eq!(params.parallelism, argon2_params::MAX_PARALLELISM);
        assert_eq!(params.iterations, 1);
        assert_eq!(
            params.memory_kib,
            argon2_params::MIN_MEMORY_PER_LANE * argon2_params::MAX_PARALLELISM
        );
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_kdf_validate_rejects_out_of_range() {
        let params = KdfParams {
            memory_kib: 4,
            iterations: 1,
            parallelism: 1,
        };
        assert!(matches!(params.validate(), Err(Error::InvalidConfig(_))));

        let params = KdfParams {
            memory_kib: 1024,
            iterations: 0,
            parallelism: 1,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_block_size_must_be_power_of_two() {
        let mut config = StoreConfig::default();
        config.block_size = 1000;
        assert!(config.validate().is_err());

        config.block_size = 256;
        assert!(config.validate().is_err());

        config.block_size = 1024;
        assert!(config.validate().is_ok());
    }
}
