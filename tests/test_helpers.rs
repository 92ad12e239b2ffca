use std::path::Path;

use blockchain::{Chain, Transaction, UtxoSet, Wallet, Wallets};
use tempfile::TempDir;

/// Points both chain store and wallet file at fresh temp locations, runs `f`,
/// then restores the environment. Tests that touch the chain or wallet file
/// must go through this to avoid clobbering each other's state.
pub fn with_temp_env<T>(f: impl FnOnce() -> T) -> T {
    let dir = TempDir::new().expect("temp dir");
    let wallet_path = dir.path().join("wallets.dat");
    unsafe {
        std::env::set_var("LEDGERCHAIN_CHAIN_DIR", dir.path().to_str().unwrap());
        std::env::set_var("LEDGERCHAIN_WALLET_FILE", wallet_path.to_str().unwrap());
    }
    let result = f();
    unsafe {
        std::env::remove_var("LEDGERCHAIN_CHAIN_DIR");
        std::env::remove_var("LEDGERCHAIN_WALLET_FILE");
    }
    result
}

/// Same as [`with_temp_env`] but also hands the closure the chain directory
/// path, for tests that drive the CLI binary and need the env vars to
/// outlive the closure call (e.g. across several `Command::cargo_bin` runs).
pub fn with_temp_env_dir<T>(f: impl FnOnce(&Path) -> T) -> T {
    let dir = TempDir::new().expect("temp dir");
    let wallet_path = dir.path().join("wallets.dat");
    unsafe {
        std::env::set_var("LEDGERCHAIN_CHAIN_DIR", dir.path().to_str().unwrap());
        std::env::set_var("LEDGERCHAIN_WALLET_FILE", wallet_path.to_str().unwrap());
    }
    let result = f(dir.path());
    unsafe {
        std::env::remove_var("LEDGERCHAIN_CHAIN_DIR");
        std::env::remove_var("LEDGERCHAIN_WALLET_FILE");
    }
    result
}

pub fn new_wallet_address() -> String {
    Wallet::new().and_then(|w| w.get_address()).expect("wallet address")
}

pub fn init_chain_for(address: &str) -> Chain {
    Chain::init_chain(address).expect("init chain")
}

/// Builds, signs, and appends a block spending `amount` from `from` to
/// `to_address`, with its coinbase minted back to `from_address`.
pub fn spend(chain: &mut Chain, from: &Wallet, from_address: &str, to_address: &str, amount: i64) {
    let from_hash = blockchain::hash_pubkey(from.get_public_key());
    let (utxo_sum, selected) = {
        let utxo = UtxoSet::new(chain);
        utxo.find_spendable_outputs(&from_hash, amount).expect("spendable outputs")
    };
    let mut tx = Transaction::new_utxo_transaction(
        from.get_public_key(),
        to_address,
        amount,
        utxo_sum,
        selected.as_slice(),
        from_address,
    )
    .expect("build spend tx");
    chain.sign_transaction(&mut tx, from.get_pkcs8()).expect("sign");

    let coinbase = Transaction::new_coinbase_tx(from_address).expect("coinbase");
    chain.add_block(vec![coinbase, tx]).expect("add block");
}

pub fn create_test_wallets() -> Wallets {
    Wallets::new().expect("wallets")
}
