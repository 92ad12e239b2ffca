use thiserror::Error;

#[derive(Error, Debug)]
pub enum BtcError {
    #[error("a chain already exists at this store location")]
    ChainAlreadyExists,
    #[error("no chain exists at this store location")]
    NoChainExists,

    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("address decoding error: {0}")]
    AddressDecodingError(String),

    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("transaction not found: {0}")]
    TransactionNotFoundError(String),
    #[error("transaction signature is missing the referenced previous output")]
    SignatureMissingPrevious,
    #[error("transaction signature error: {0}")]
    TransactionSignatureError(String),
    #[error("transaction verification failed: {0}")]
    TransactionVerificationError(String),

    #[error("invalid block: {0}")]
    InvalidBlock(String),

    #[error("no wallet found for address: {0}")]
    WalletNotFound(String),

    #[error("encoding error: {0}")]
    EncodingError(String),
    #[error("decoding error: {0}")]
    DecodingError(String),

    #[error("proof of work failed to seal the block")]
    ProofFailure,

    #[error("wallet key pair error: {0}")]
    WalletKeyPairError(String),
    #[error("wallets file path error: {0}")]
    WalletsFilePathError(String),
    #[error("wallets file IO error: {0}")]
    WalletsFileIoError(String),
    #[error("wallets serialization error: {0}")]
    WalletsSerializationError(String),
    #[error("wallets deserialization error: {0}")]
    WalletsDeserializationError(String),

    #[error("chain store error: {0}")]
    StoreError(#[from] sled::Error),
    #[error("chain store transaction error: {0}")]
    StoreTransactionError(String),
}

pub type Result<T> = std::result::Result<T, BtcError>;
