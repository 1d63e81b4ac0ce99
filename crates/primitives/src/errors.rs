//! Errors during parsing/handling/conversion of primitives.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BufError {
    #[error("invalid length (expected {expected}, got {got})")]
    InvalidLength { expected: usize, got: usize },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid position encoding length (expected {expected}, got {got})")]
    InvalidLength { expected: usize, got: usize },

    #[error("deposit position {0} has non-zero block fields")]
    DepositWithBlockFields(String),

    #[error("position {0} has output index out of range")]
    OutputIndexOutOfRange(String),

    #[error("fee position {0} must use output index 0")]
    FeeOutputIndex(String),

    #[error("position {0} references block 0")]
    ZeroBlock(String),

    #[error("malformed position string '{0}'")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    #[error("malformed signature")]
    MalformedSignature,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("signing failed: {0}")]
    Signing(String),
}
