//! Proof-of-work sealing loop and validation.

use num_bigint::{BigInt, Sign};
use tracing::debug;

use crate::crypto::hash::{sha256_digest, to_hex_be};
use crate::error::{BtcError, Result};

const MAX_NONCE: i64 = i64::MAX;

pub struct ProofOfWork<'a> {
    prev_hash: &'a [u8],
    merkle_root: &'a [u8],
    difficulty: u32,
}

impl<'a> ProofOfWork<'a> {
    pub fn new(prev_hash: &'a [u8], merkle_root: &'a [u8], difficulty: u32) -> ProofOfWork<'a> {
        ProofOfWork {
            prev_hash,
            merkle_root,
            difficulty,
        }
    }

    fn target(&self) -> BigInt {
        BigInt::from(1) << (256 - self.difficulty)
    }

    fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(self.prev_hash);
        data.extend_from_slice(self.merkle_root);
        data.extend_from_slice(&to_hex_be(nonce));
        data.extend_from_slice(&to_hex_be(self.difficulty as i64));
        data
    }

    /// Finds the smallest non-negative `nonce` whose proof-data hash is below
    /// target, returning `(nonce, hash)`.
    pub fn run(&self) -> Result<(i64, Vec<u8>)> {
        let target = self.target();
        let mut nonce: i64 = 0;
        while nonce < MAX_NONCE {
            let hash = sha256_digest(self.prepare_data(nonce).as_slice());
            let hash_int = BigInt::from_bytes_be(Sign::Plus, hash.as_slice());
            if hash_int < target {
                debug!(nonce, "sealed block");
                return Ok((nonce, hash));
            }
            nonce += 1;
        }
        Err(BtcError::ProofFailure)
    }

    /// Recomputes the proof-data hash for the given `nonce` and checks it is
    /// below target and matches the block's recorded `hash`.
    pub fn validate(&self, nonce: i64, hash: &[u8]) -> bool {
        let recomputed = sha256_digest(self.prepare_data(nonce).as_slice());
        if recomputed != hash {
            return false;
        }
        BigInt::from_bytes_be(Sign::Plus, recomputed.as_slice()) < self.target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_produces_a_hash_below_target() {
        let pow = ProofOfWork::new(b"prev", b"root", 8);
        let (nonce, hash) = pow.run().expect("run");
        assert!(pow.validate(nonce, hash.as_slice()));
    }

    #[test]
    fn validate_rejects_wrong_hash() {
        let pow = ProofOfWork::new(b"prev", b"root", 8);
        let (nonce, _) = pow.run().expect("run");
        assert!(!pow.validate(nonce, b"not the right hash at all"));
    }

    #[test]
    fn validate_rejects_wrong_nonce() {
        let pow = ProofOfWork::new(b"prev", b"root", 8);
        let (nonce, hash) = pow.run().expect("run");
        assert!(!pow.validate(nonce + 1, hash.as_slice()));
    }

    #[test]
    fn higher_difficulty_yields_a_smaller_target() {
        let low = ProofOfWork::new(b"prev", b"root", 8);
        let high = ProofOfWork::new(b"prev", b"root", 20);
        assert!(high.target() < low.target());
    }
}
