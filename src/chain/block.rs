//! Block record and its sealing/validation against proof-of-work.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chain::merkle::merkle_root;
use crate::chain::proof_of_work::ProofOfWork;
use crate::chain::transaction::Transaction;
use crate::config::DIFFICULTY;
use crate::error::Result;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Block {
    pub index: u64,
    pub nonce: i64,
    pub difficulty: u32,
    pub hash: Vec<u8>,
    pub prev_hash: Vec<u8>,
    pub timestamp: String,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Builds and seals a new block on top of `prev_hash` at `index`.
    pub fn new_block(prev_hash: Vec<u8>, index: u64, transactions: Vec<Transaction>) -> Result<Block> {
        let root = merkle_root(transactions.as_slice())?;
        let pow = ProofOfWork::new(prev_hash.as_slice(), root.as_slice(), DIFFICULTY);
        let (nonce, hash) = pow.run()?;
        info!(index, nonce, "sealed block");
        Ok(Block {
            index,
            nonce,
            difficulty: DIFFICULTY,
            hash,
            prev_hash,
            timestamp: Utc::now().to_rfc3339(),
            transactions,
        })
    }

    /// The genesis block: index 0, empty `prev_hash`, one coinbase to `address`.
    pub fn generate_genesis_block(address: &str) -> Result<Block> {
        let coinbase = Transaction::new_coinbase_tx(address)?;
        Block::new_block(vec![], 0, vec![coinbase])
    }

    /// Recomputes the Merkle root and checks the stored hash/nonce against it.
    pub fn validate_proof(&self) -> Result<bool> {
        let root = merkle_root(self.transactions.as_slice())?;
        let pow = ProofOfWork::new(self.prev_hash.as_slice(), root.as_slice(), self.difficulty);
        Ok(pow.validate(self.nonce, self.hash.as_slice()))
    }
}
