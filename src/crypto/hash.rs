//! Hash primitives: SHA-256, RIPEMD-160, the deterministic bincode encoding
//! shared by every hashed record, and the big-endian integer rendering used
//! in hashed block/proof-of-work data.

use ring::digest::{Context, SHA256};
use ripemd::{Digest as RipemdDigest, Ripemd160};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BtcError, Result};

/// Deterministic binary encoding shared by every record whose bytes get hashed
/// (`Block`, `Transaction`, `TxOutput`). Bijective and stable across runs.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| BtcError::EncodingError(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map(|(value, _)| value)
        .map_err(|e| BtcError::DecodingError(e.to_string()))
}

/// SHA-256 of `data`, 32 bytes.
pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    context.finish().as_ref().to_vec()
}

/// RIPEMD-160 of `data`, 20 bytes.
pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// `RIPEMD-160(SHA-256(pubkey))`, the 20-byte address payload.
pub fn hash_pubkey(pub_key: &[u8]) -> Vec<u8> {
    ripemd160_digest(sha256_digest(pub_key).as_slice())
}

/// `ToHex(n)`: 8-byte big-endian rendering of an integer for hashed proof-data.
pub fn to_hex_be(n: i64) -> [u8; 8] {
    n.to_be_bytes()
}
