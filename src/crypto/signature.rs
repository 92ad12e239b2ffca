//! ECDSA P-256/SHA-256 sign and verify, wrapping `ring`.

use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING};

use crate::error::{BtcError, Result};

const UNCOMPRESSED_TAG: u8 = 0x04;

/// Signs `message` with the PKCS#8-encoded private key `pkcs8`.
pub fn sign_digest(pkcs8: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| BtcError::TransactionSignatureError(e.to_string()))?;
    key_pair
        .sign(&rng, message)
        .map(|signature| signature.as_ref().to_vec())
        .map_err(|e| BtcError::TransactionSignatureError(e.to_string()))
}

/// Verifies `signature` over `message` against a raw 64-byte `X || Y` public key.
///
/// `ring` expects the SEC1 uncompressed encoding, so the `0x04` tag byte
/// stripped during key generation is re-prepended here before verifying.
pub fn verify_digest(raw_public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    if raw_public_key.len() != 64 {
        return false;
    }
    let mut encoded_point = Vec::with_capacity(65);
    encoded_point.push(UNCOMPRESSED_TAG);
    encoded_point.extend_from_slice(raw_public_key);

    let peer_public_key =
        ring::signature::UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, encoded_point);
    peer_public_key.verify(message, signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keypair::generate_key_pair;

    #[test]
    fn sign_then_verify_round_trips() {
        let (pkcs8, pubkey) = generate_key_pair().expect("key pair");
        let message = b"transfer 100 coins";
        let signature = sign_digest(&pkcs8, message).expect("sign");
        assert!(verify_digest(&pubkey, &signature, message));
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let (pkcs8, pubkey) = generate_key_pair().expect("key pair");
        let signature = sign_digest(&pkcs8, b"original message").expect("sign");
        assert!(!verify_digest(&pubkey, &signature, b"tampered message"));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let (pkcs8, _) = generate_key_pair().expect("key pair 1");
        let (_, other_pubkey) = generate_key_pair().expect("key pair 2");
        let message = b"some message";
        let signature = sign_digest(&pkcs8, message).expect("sign");
        assert!(!verify_digest(&other_pubkey, &signature, message));
    }

    #[test]
    fn verify_rejects_malformed_public_key() {
        let (pkcs8, _) = generate_key_pair().expect("key pair");
        let message = b"some message";
        let signature = sign_digest(&pkcs8, message).expect("sign");
        assert!(!verify_digest(&[0u8; 10], &signature, message));
    }
}
