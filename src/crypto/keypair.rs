//! ECDSA P-256 key generation.

use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};

use crate::error::{BtcError, Result};

/// SEC1 uncompressed public keys start with this tag byte, followed by the
/// 32-byte X and 32-byte Y coordinates. The spec's wallet public key is the
/// raw 64-byte `X || Y` with the tag stripped.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Generates a fresh ECDSA P-256 key pair.
///
/// Returns `(pkcs8_bytes, raw_public_key)`, where `raw_public_key` is the
/// 64-byte `X || Y` encoding with the SEC1 uncompressed tag byte removed.
pub fn generate_key_pair() -> Result<(Vec<u8>, Vec<u8>)> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| BtcError::WalletKeyPairError(e.to_string()))?;
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
        .map_err(|e| BtcError::WalletKeyPairError(e.to_string()))?;

    let encoded_point = key_pair.public_key().as_ref();
    if encoded_point.first() != Some(&UNCOMPRESSED_TAG) || encoded_point.len() != 65 {
        return Err(BtcError::WalletKeyPairError(
            "expected a 65-byte uncompressed SEC1 public key".to_string(),
        ));
    }

    Ok((pkcs8.as_ref().to_vec(), encoded_point[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_64_byte_raw_public_key() {
        let (pkcs8, pubkey) = generate_key_pair().expect("key pair");
        assert_eq!(pubkey.len(), 64);
        assert!(!pkcs8.is_empty());
    }

    #[test]
    fn each_generated_key_pair_is_distinct() {
        let (_, pk1) = generate_key_pair().expect("key pair 1");
        let (_, pk2) = generate_key_pair().expect("key pair 2");
        assert_ne!(pk1, pk2);
    }
}
