pub mod address;
pub mod hash;
pub mod keypair;
pub mod signature;

pub use address::{
    address_from_pubkey_hash, base58_decode, base58_encode, is_valid_address, validate_address,
};
pub use hash::{hash_pubkey, sha256_digest, to_hex_be};
pub use keypair::generate_key_pair;
pub use signature::{sign_digest, verify_digest};
