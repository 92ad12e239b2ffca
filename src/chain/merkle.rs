//! Binary Merkle root over encoded transactions.

use crate::chain::transaction::Transaction;
use crate::crypto::hash::{encode, sha256_digest};
use crate::error::Result;

/// Root hash over `txs`: leaves are `SHA-256(encode(tx))`, duplicating the
/// last leaf if the count is odd, then reduced pairwise with
/// `SHA-256(left || right)` until one node remains.
pub fn merkle_root(txs: &[Transaction]) -> Result<Vec<u8>> {
    let mut level: Vec<Vec<u8>> = txs
        .iter()
        .map(|tx| encode(tx).map(|bytes| sha256_digest(bytes.as_slice())))
        .collect::<Result<Vec<_>>>()?;

    if level.len() % 2 == 1 {
        let last = level.last().expect("non-empty leaf level").clone();
        level.push(last);
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len() / 2);
        for pair in level.chunks(2) {
            let mut combined = pair[0].clone();
            combined.extend_from_slice(pair[1].as_slice());
            next.push(sha256_digest(combined.as_slice()));
        }
        level = next;
    }

    Ok(level.into_iter().next().unwrap_or_default())
}
