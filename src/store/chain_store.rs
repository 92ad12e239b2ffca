//! A thin, synchronous `sled`-backed key-value adapter for the chain engine
//! and UTXO index: one tree for blocks/tip, one tree for UTXO entries.

use sled::transaction::TransactionResult;
use sled::{Db, IVec, Tree};
use tracing::error;

use crate::chain::block::Block;
use crate::config::{chain_dir, TIP_KEY};
use crate::crypto::hash::{decode, encode};
use crate::error::{BtcError, Result};

pub struct ChainStore {
    blocks: Tree,
    utxo: Tree,
}

impl ChainStore {
    /// Opens (or creates) the sled database at the configured chain directory.
    pub fn open() -> Result<ChainStore> {
        let db: Db = sled::open(chain_dir())?;
        let blocks = db.open_tree("blocks")?;
        let utxo = db.open_tree("utxo")?;
        Ok(ChainStore { blocks, utxo })
    }

    pub fn has_chain(&self) -> Result<bool> {
        Ok(self.blocks.contains_key(TIP_KEY)?)
    }

    pub fn read_last_hash(&self) -> Result<Vec<u8>> {
        self.blocks
            .get(TIP_KEY)?
            .map(|ivec| ivec.to_vec())
            .ok_or(BtcError::NoChainExists)
    }

    pub fn read_block(&self, hash: &[u8]) -> Result<Block> {
        let bytes = self
            .blocks
            .get(hash)?
            .ok_or_else(|| BtcError::DecodingError("block not found for hash".to_string()))?;
        decode(bytes.as_ref())
    }

    /// Within one write transaction: stores the block under its own hash and
    /// advances the tip pointer to it.
    pub fn write_new_last_block(&self, block: &Block) -> Result<()> {
        let encoded = encode(block)?;
        let hash = block.hash.clone();
        let result: TransactionResult<(), ()> = self.blocks.transaction(|tx| {
            tx.insert(hash.as_slice(), encoded.as_slice())?;
            tx.insert(TIP_KEY, hash.as_slice())?;
            Ok(())
        });
        result.map_err(|e| {
            let msg = format!("{e:?}");
            error!(error = %msg, "failed to write new last block");
            BtcError::StoreTransactionError(msg)
        })
    }

    pub fn scan_utxo_prefix(&self, prefix: &[u8]) -> Result<Vec<(IVec, IVec)>> {
        self.utxo
            .scan_prefix(prefix)
            .map(|entry| entry.map_err(BtcError::from))
            .collect()
    }

    pub fn put_utxo(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.utxo.insert(key, value)?;
        Ok(())
    }

    pub fn delete_utxo(&self, key: &[u8]) -> Result<()> {
        self.utxo.remove(key)?;
        Ok(())
    }

    /// Batch-deletes every key with the given prefix, in chunks to bound
    /// transaction size on large UTXO sets.
    pub fn delete_utxo_prefix(&self, prefix: &[u8]) -> Result<()> {
        const BATCH_SIZE: usize = 100_000;
        loop {
            let keys: Vec<IVec> = self
                .utxo
                .scan_prefix(prefix)
                .take(BATCH_SIZE)
                .map(|entry| entry.map(|(key, _)| key))
                .collect::<std::result::Result<_, _>>()?;
            if keys.is_empty() {
                return Ok(());
            }
            let mut batch = sled::Batch::default();
            for key in &keys {
                batch.remove(key.as_ref());
            }
            self.utxo.apply_batch(batch)?;
        }
    }

    pub fn close(&self) -> Result<()> {
        self.blocks.flush()?;
        self.utxo.flush()?;
        Ok(())
    }
}
