//! File-backed address book of wallets, keyed by address.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use super::wallet::Wallet;
use crate::config::wallet_file_path;
use crate::error::{BtcError, Result};

pub struct Wallets {
    wallets: HashMap<String, Wallet>,
}

impl Wallets {
    pub fn new() -> Result<Wallets> {
        let mut wallets = Wallets {
            wallets: HashMap::new(),
        };
        wallets.load_from_file()?;
        Ok(wallets)
    }

    pub fn create_wallet(&mut self) -> Result<String> {
        let wallet = Wallet::new()?;
        let address = wallet.get_address()?;
        self.wallets.insert(address.clone(), wallet);
        self.save_to_file()?;
        Ok(address)
    }

    pub fn get_addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.wallets.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    pub fn get_wallet(&self, address: &str) -> Option<&Wallet> {
        self.wallets.get(address)
    }

    fn load_from_file(&mut self) -> Result<()> {
        let path = PathBuf::from(wallet_file_path());
        if !path.exists() {
            return Ok(());
        }
        let mut file =
            File::open(&path).map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        let metadata = file
            .metadata()
            .map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        let mut buf = vec![0; metadata.len() as usize];
        file.read_exact(&mut buf)
            .map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        let wallets = bincode::serde::decode_from_slice(&buf[..], bincode::config::standard())
            .map_err(|e| BtcError::WalletsDeserializationError(e.to_string()))?
            .0;
        self.wallets = wallets;
        Ok(())
    }

    fn save_to_file(&self) -> Result<()> {
        let path = PathBuf::from(wallet_file_path());
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&path)
            .map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        let wallets_bytes =
            bincode::serde::encode_to_vec(&self.wallets, bincode::config::standard())
                .map_err(|e| BtcError::WalletsSerializationError(e.to_string()))?;
        writer
            .write_all(wallets_bytes.as_slice())
            .map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| BtcError::WalletsFileIoError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn with_temp_wallet_file<T>(f: impl FnOnce() -> T) -> T {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("wallets.dat");
        unsafe {
            std::env::set_var("LEDGERCHAIN_WALLET_FILE", path.to_str().unwrap());
        }
        let result = f();
        unsafe {
            std::env::remove_var("LEDGERCHAIN_WALLET_FILE");
        }
        result
    }

    #[test]
    fn create_wallet_persists_and_reloads() {
        with_temp_wallet_file(|| {
            let mut wallets = Wallets::new().expect("wallets");
            let address = wallets.create_wallet().expect("create wallet");

            let reloaded = Wallets::new().expect("reload wallets");
            assert!(reloaded.get_wallet(&address).is_some());
            assert_eq!(reloaded.get_addresses(), vec![address]);
        });
    }

    #[test]
    fn missing_wallet_file_starts_empty() {
        with_temp_wallet_file(|| {
            let wallets = Wallets::new().expect("wallets");
            assert!(wallets.get_addresses().is_empty());
        });
    }
}
