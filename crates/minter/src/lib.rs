//! Opaque identifiers and obfuscated download names.
//!
//! Both values come straight from the OS random source and are never derived
//! from the file itself. Collisions are not retried here; the record store
//! rejects a duplicate identifier.

use common::file_utils;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes behind an identifier (12 hex characters)
pub const IDENTIFIER_BYTES: usize = 6;

/// Random bytes behind an obfuscated name stem (10 hex characters)
pub const NAME_STEM_BYTES: usize = 5;

/// Freshly minted identifier and download name for one upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minted {
    pub identifier: String,
    pub obfuscated_name: String,
}

/// Mint an identifier and an obfuscated name that keeps the extension of `original_name`
pub fn mint(original_name: &str) -> Minted {
    let identifier = random_hex(IDENTIFIER_BYTES);
    let mut obfuscated_name = random_hex(NAME_STEM_BYTES);
    if let Some(ext) = file_utils::extension(original_name) {
        obfuscated_name.push_str(&ext);
    }

    Minted {
        identifier,
        obfuscated_name,
    }
}

/// Hex-encode `len` bytes from the OS random source
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
