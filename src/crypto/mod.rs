//! Cryptographic operations for the sealed store.
//!
//! This module provides:
//! - Argon2id passphrase-based key derivation
//! - AES-256-GCM block sealing with counter nonces and role-bound associated data

mod cipher;
mod kdf;

pub use cipher::{BlockCipher, BlockRole};
pub use kdf::{KeyDerivation, MasterKey};
