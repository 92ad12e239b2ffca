//! Base58 encode/decode and the address construction built on top of it
//! (version byte || pubkey hash || checksum), per spec §4.2.

use crate::config::{ADDRESS_VERSION, CHECKSUM_LEN};
use crate::crypto::hash::sha256_digest;
use crate::error::{BtcError, Result};

pub fn base58_encode(data: &[u8]) -> Result<String> {
    Ok(bs58::encode(data).into_string())
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| BtcError::AddressDecodingError(e.to_string()))
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first = sha256_digest(payload);
    let second = sha256_digest(first.as_slice());
    second[0..CHECKSUM_LEN].to_vec()
}

/// Builds a base58check address string from a 20-byte pubkey hash.
pub fn address_from_pubkey_hash(pubkey_hash: &[u8]) -> Result<String> {
    let mut payload = vec![ADDRESS_VERSION];
    payload.extend_from_slice(pubkey_hash);
    let sum = checksum(payload.as_slice());
    payload.extend_from_slice(sum.as_slice());
    base58_encode(payload.as_slice())
}

/// Decodes and checksum-validates an address, returning its 20-byte pubkey hash.
/// Any decode error or checksum mismatch is reported as `InvalidAddress`.
pub fn validate_address(address: &str) -> Result<Vec<u8>> {
    let payload = base58_decode(address).map_err(|_| BtcError::InvalidAddress(address.to_string()))?;
    if payload.len() <= CHECKSUM_LEN + 1 {
        return Err(BtcError::InvalidAddress(address.to_string()));
    }
    let actual_checksum = &payload[payload.len() - CHECKSUM_LEN..];
    let pubkey_hash = &payload[1..payload.len() - CHECKSUM_LEN];

    let mut target = vec![payload[0]];
    target.extend_from_slice(pubkey_hash);
    let expected_checksum = checksum(target.as_slice());

    if actual_checksum != expected_checksum.as_slice() {
        return Err(BtcError::InvalidAddress(address.to_string()));
    }
    Ok(pubkey_hash.to_vec())
}

/// Plain boolean gate over `validate_address`, collapsing decode/checksum
/// failures into `false` for callers that only need a yes/no answer.
pub fn is_valid_address(address: &str) -> bool {
    validate_address(address).is_ok()
}
