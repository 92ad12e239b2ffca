mod wallet;
mod wallets;

pub use wallet::Wallet;
pub use wallets::Wallets;
