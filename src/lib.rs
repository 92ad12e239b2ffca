pub mod chain;
pub use chain::{Block, Chain, Transaction, TxInput, TxOutput, UtxoSet};

pub mod crypto;
pub use crypto::*;

pub mod error;
pub use error::*;

pub mod config;

pub mod store;
pub use store::ChainStore;

pub mod wallet;
pub use wallet::{Wallet, Wallets};
