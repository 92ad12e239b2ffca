//! Ledger-wide constants (spec §6.1), with the path constants overridable by
//! environment variable the same way this codebase's store layer has always
//! let its test harness redirect `TREE_DIR`/`BLOCKS_TREE`/`WALLET_FILE`.

use std::env;

/// Number of leading zero bits the sealed block hash must have.
pub const DIFFICULTY: u32 = 12;

/// Units minted by every coinbase transaction.
pub const COINBASE_REWARD: i64 = 100;

/// Length, in bytes, of the address checksum suffix.
pub const CHECKSUM_LEN: usize = 4;

/// Leading version byte of every address payload.
pub const ADDRESS_VERSION: u8 = 0x00;

/// Key under which the chain store's tip block hash is recorded.
pub const TIP_KEY: &[u8] = b"lastHashKey";

/// Key prefix under which individual UTXO entries are recorded.
pub const UTXO_PREFIX: &[u8] = b"utxo-";

const DEFAULT_CHAIN_DIR: &str = "./tmp/blocks";
const DEFAULT_WALLET_FILE: &str = "./tmp/wallets.dat";

/// Directory sled opens the chain store in, overridable via `LEDGERCHAIN_CHAIN_DIR`
/// so tests can point each run at its own temporary directory.
pub fn chain_dir() -> String {
    env::var("LEDGERCHAIN_CHAIN_DIR").unwrap_or_else(|_| DEFAULT_CHAIN_DIR.to_string())
}

/// Path to the wallet address book, overridable via `LEDGERCHAIN_WALLET_FILE`.
pub fn wallet_file_path() -> String {
    env::var("LEDGERCHAIN_WALLET_FILE").unwrap_or_else(|_| DEFAULT_WALLET_FILE.to_string())
}
