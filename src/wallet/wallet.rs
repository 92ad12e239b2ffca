//! A single wallet: an ECDSA P-256 key pair and the address derived from it.

use serde::{Deserialize, Serialize};

use crate::crypto::{address_from_pubkey_hash, generate_key_pair, hash_pubkey};
use crate::error::Result;

#[derive(Clone, Serialize, Deserialize)]
pub struct Wallet {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        let (pkcs8, public_key) = generate_key_pair()?;
        Ok(Wallet { pkcs8, public_key })
    }

    pub fn get_address(&self) -> Result<String> {
        let pubkey_hash = hash_pubkey(self.public_key.as_slice());
        address_from_pubkey_hash(pubkey_hash.as_slice())
    }

    pub fn get_public_key(&self) -> &[u8] {
        self.public_key.as_slice()
    }

    pub fn get_pkcs8(&self) -> &[u8] {
        self.pkcs8.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::validate_address;

    #[test]
    fn new_wallet_has_a_valid_address() {
        let wallet = Wallet::new().expect("wallet");
        let address = wallet.get_address().expect("address");
        assert!(validate_address(&address).is_ok());
    }

    #[test]
    fn distinct_wallets_get_distinct_addresses() {
        let a = Wallet::new().expect("wallet a");
        let b = Wallet::new().expect("wallet b");
        assert_ne!(a.get_address().unwrap(), b.get_address().unwrap());
    }
}
