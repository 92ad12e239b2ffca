//! Chain engine: genesis, append-block, tip→genesis iteration, transaction
//! lookup by id, and the sign/verify entry points that resolve referenced
//! previous transactions for §4.3's trimmed-copy protocol.

use tracing::info;

use crate::chain::block::Block;
use crate::chain::transaction::Transaction;
use crate::chain::utxo_set::UtxoSet;
use crate::error::{BtcError, Result};
use crate::store::ChainStore;

/// A single open chain: the store handle plus the cached tip hash/height.
pub struct Chain {
    store: ChainStore,
    tip: Vec<u8>,
    height: u64,
}

impl Chain {
    /// Creates the one chain a store directory may ever hold: a genesis
    /// block with a single coinbase to `address`, sealed and persisted,
    /// with the UTXO index reindexed over it.
    pub fn init_chain(address: &str) -> Result<Chain> {
        let store = ChainStore::open()?;
        if store.has_chain()? {
            return Err(BtcError::ChainAlreadyExists);
        }

        let genesis = Block::generate_genesis_block(address)?;
        store.write_new_last_block(&genesis)?;
        info!(hash = %hex(&genesis.hash), "chain initialized with genesis block");

        let mut chain = Chain {
            store,
            tip: genesis.hash,
            height: 1,
        };
        UtxoSet::new(&chain).reindex()?;
        Ok(chain)
    }

    /// Opens the one chain already present at the configured store directory.
    pub fn get_chain() -> Result<Chain> {
        let store = ChainStore::open()?;
        let tip = store.read_last_hash()?;
        let tip_block = store.read_block(tip.as_slice())?;
        Ok(Chain {
            store,
            tip,
            height: tip_block.index + 1,
        })
    }

    pub fn tip(&self) -> &[u8] {
        self.tip.as_slice()
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn store(&self) -> &ChainStore {
        &self.store
    }

    /// Seals and persists a new block on top of the tip, then updates the
    /// UTXO index incrementally. `txs` must be non-empty and begin with a
    /// coinbase; every other transaction must verify against its referenced
    /// previous outputs before the block is sealed.
    pub fn add_block(&mut self, txs: Vec<Transaction>) -> Result<Block> {
        match txs.first() {
            Some(first) if first.is_coinbase() => {}
            _ => {
                return Err(BtcError::InvalidBlock(
                    "block transactions must be non-empty and begin with a coinbase".to_string(),
                ));
            }
        }

        for tx in txs.iter().skip(1) {
            if !self.verify_transaction(tx)? {
                return Err(BtcError::TransactionVerificationError(hex(&tx.id)));
            }
        }

        let block = Block::new_block(self.tip.clone(), self.height, txs)?;
        self.store.write_new_last_block(&block)?;
        self.tip = block.hash.clone();
        self.height += 1;
        info!(index = block.index, hash = %hex(&block.hash), "appended block");

        UtxoSet::new(self).update(&block)?;
        Ok(block)
    }

    /// A reverse walk starting at the tip, yielding each referenced block
    /// and stopping once `prev_hash` is empty (genesis).
    pub fn iterator(&self) -> ChainIterator<'_> {
        ChainIterator {
            store: &self.store,
            current: self.tip.clone(),
        }
    }

    /// Linear walk tip→genesis for the first transaction whose id matches.
    pub fn get_transaction_with_id(&self, id: &[u8]) -> Result<Transaction> {
        for block in self.iterator() {
            let block = block?;
            if let Some(tx) = block.transactions.into_iter().find(|tx| tx.id == id) {
                return Ok(tx);
            }
        }
        Err(BtcError::TransactionNotFoundError(hex(id)))
    }

    fn resolve_prev_txs(&self, tx: &Transaction) -> Result<Vec<Transaction>> {
        tx.vin
            .iter()
            .map(|input| self.get_transaction_with_id(input.tx_id.as_slice()))
            .collect()
    }

    /// Resolves `tx`'s referenced previous transactions and signs every
    /// input against them. A coinbase has nothing to resolve and signs trivially.
    pub fn sign_transaction(&self, tx: &mut Transaction, pkcs8: &[u8]) -> Result<()> {
        if tx.is_coinbase() {
            return Ok(());
        }
        let prev_txs = self.resolve_prev_txs(tx)?;
        tx.sign(pkcs8, prev_txs.as_slice())
    }

    /// Resolves `tx`'s referenced previous transactions and verifies every
    /// input's signature against them. A coinbase always verifies.
    pub fn verify_transaction(&self, tx: &Transaction) -> Result<bool> {
        if tx.is_coinbase() {
            return Ok(true);
        }
        let prev_txs = self.resolve_prev_txs(tx)?;
        tx.verify(prev_txs.as_slice())
    }
}

pub struct ChainIterator<'a> {
    store: &'a ChainStore,
    current: Vec<u8>,
}

impl<'a> Iterator for ChainIterator<'a> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_empty() {
            return None;
        }
        match self.store.read_block(self.current.as_slice()) {
            Ok(block) => {
                self.current = block.prev_hash.clone();
                Some(Ok(block))
            }
            Err(e) => {
                self.current = vec![];
                Some(Err(e))
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
