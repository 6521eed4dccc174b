//! Stable digests over canonical JSON.

use ::serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::OnShellError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal SHA-256 digest for the provided payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, OnShellError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
