//! Transaction model: `TxInput`, `TxOutput`, `Transaction`, coinbase
//! construction, trimmed-copy signing and verification.

use serde::{Deserialize, Serialize};

use crate::config::COINBASE_REWARD;
use crate::crypto::hash::{encode, sha256_digest};
use crate::crypto::{sign_digest, validate_address, verify_digest};
use crate::error::{BtcError, Result};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TxInput {
    pub tx_id: Vec<u8>,
    pub output_index: i64,
    pub signature: Vec<u8>,
    pub pub_key: Vec<u8>,
}

impl TxInput {
    /// True if this input's `pub_key` matches the given pubkey hash, once
    /// hashed the same way addresses are derived.
    pub fn uses_key(&self, pub_key_hash: &[u8]) -> bool {
        crate::crypto::hash_pubkey(self.pub_key.as_slice()) == pub_key_hash
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TxOutput {
    pub amount: i64,
    pub pub_key_hash: Vec<u8>,
}

impl TxOutput {
    pub fn new(amount: i64, address: &str) -> Result<TxOutput> {
        let pub_key_hash = validate_address(address)?;
        Ok(TxOutput {
            amount,
            pub_key_hash,
        })
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash == pub_key_hash
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Vec<u8>,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
}

impl Transaction {
    /// One coinbase input tagged with an ASCII description, one output
    /// minting `coinbase_reward` units to `to`.
    pub fn new_coinbase_tx(to: &str) -> Result<Transaction> {
        let tag = format!("CoinbaseTx: {COINBASE_REWARD} coins to {to}");
        let tx_in = TxInput {
            tx_id: vec![],
            output_index: -1,
            signature: vec![],
            pub_key: tag.into_bytes(),
        };
        let tx_out = TxOutput::new(COINBASE_REWARD, to)?;
        let mut tx = Transaction {
            id: vec![],
            vin: vec![tx_in],
            vout: vec![tx_out],
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    /// Builds an unsigned spend transaction from a set of selected inputs.
    /// `selected` maps a referenced `tx_id` to the output indices of that
    /// transaction being spent; `utxo_sum` is the total value they carry.
    pub fn new_utxo_transaction(
        from_pub_key: &[u8],
        to: &str,
        amount: i64,
        utxo_sum: i64,
        selected: &[(Vec<u8>, Vec<i64>)],
        change_address: &str,
    ) -> Result<Transaction> {
        if utxo_sum < amount {
            return Err(BtcError::InsufficientFunds {
                needed: amount,
                available: utxo_sum,
            });
        }

        let mut vin = Vec::new();
        for (tx_id, output_indices) in selected {
            for output_index in output_indices {
                vin.push(TxInput {
                    tx_id: tx_id.clone(),
                    output_index: *output_index,
                    signature: vec![],
                    pub_key: from_pub_key.to_vec(),
                });
            }
        }

        let mut vout = vec![TxOutput::new(amount, to)?];
        if utxo_sum > amount {
            vout.push(TxOutput::new(utxo_sum - amount, change_address)?);
        }

        let mut tx = Transaction {
            id: vec![],
            vin,
            vout,
        };
        tx.id = tx.hash()?;
        Ok(tx)
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].tx_id.is_empty() && self.vin[0].output_index == -1
    }

    /// SHA-256 over the deterministic encoding of this transaction with `id` cleared.
    pub fn hash(&self) -> Result<Vec<u8>> {
        let mut copy = self.clone();
        copy.id = vec![];
        Ok(sha256_digest(encode(&copy)?.as_slice()))
    }

    /// Clone with every input's `signature`/`pub_key` cleared — the canonical
    /// pre-image used by both `sign` and `verify`.
    fn trimmed_copy(&self) -> Transaction {
        let vin = self
            .vin
            .iter()
            .map(|input| TxInput {
                tx_id: input.tx_id.clone(),
                output_index: input.output_index,
                signature: vec![],
                pub_key: vec![],
            })
            .collect();
        Transaction {
            id: self.id.clone(),
            vin,
            vout: self.vout.clone(),
        }
    }

    /// Signs every input against its referenced previous transaction.
    /// `prev_txs[i]` must be the transaction referenced by `self.vin[i]`.
    pub fn sign(&mut self, pkcs8: &[u8], prev_txs: &[Transaction]) -> Result<()> {
        if self.is_coinbase() {
            return Ok(());
        }
        if prev_txs.len() != self.vin.len() {
            return Err(BtcError::SignatureMissingPrevious);
        }

        let mut trimmed = self.trimmed_copy();
        for (i, input) in self.vin.iter().enumerate() {
            let prev_tx = &prev_txs[i];
            let prev_output = prev_tx
                .vout
                .get(input.output_index as usize)
                .ok_or(BtcError::SignatureMissingPrevious)?;

            trimmed.vin[i].pub_key = prev_output.pub_key_hash.clone();
            trimmed.id = trimmed.hash()?;

            let signature = sign_digest(pkcs8, trimmed.id.as_slice())?;
            self.vin[i].signature = signature;

            trimmed.vin[i].pub_key = vec![];
        }
        Ok(())
    }

    /// Verifies every input's signature against its referenced previous
    /// transaction. Always true for a coinbase.
    pub fn verify(&self, prev_txs: &[Transaction]) -> Result<bool> {
        if self.is_coinbase() {
            return Ok(true);
        }
        if prev_txs.len() != self.vin.len() {
            return Err(BtcError::SignatureMissingPrevious);
        }

        let mut trimmed = self.trimmed_copy();
        for (i, input) in self.vin.iter().enumerate() {
            let prev_tx = &prev_txs[i];
            let prev_output = prev_tx
                .vout
                .get(input.output_index as usize)
                .ok_or(BtcError::SignatureMissingPrevious)?;

            trimmed.vin[i].pub_key = prev_output.pub_key_hash.clone();
            trimmed.id = trimmed.hash()?;

            if !verify_digest(input.pub_key.as_slice(), input.signature.as_slice(), trimmed.id.as_slice()) {
                return Ok(false);
            }

            trimmed.vin[i].pub_key = vec![];
        }
        Ok(true)
    }
}
