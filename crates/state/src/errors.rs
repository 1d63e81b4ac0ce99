use plasma_primitives::errors::PositionError;
use thiserror::Error;

/// Reasons a transaction fails the stateless well-formedness check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxFormatError {
    #[error("failed to decode: {0}")]
    Decode(String),

    #[error("first input must not be nil")]
    MissingFirstInput,

    #[error("nil input {0} carries signatures")]
    NilInputSigned(usize),

    #[error("input {0} is missing its signature")]
    MissingSignature(usize),

    #[error("input {0} spends a deposit or fee and must not carry confirmation signatures")]
    UnexpectedConfirmSigs(usize),

    #[error("input {index} carries {count} confirmation signatures")]
    TooManyConfirmSigs { index: usize, count: usize },

    #[error("both inputs spend the same position")]
    DuplicateInputs,

    #[error("first output must have a non-zero owner and amount")]
    InvalidFirstOutput,

    #[error("second output has an amount but no owner")]
    InvalidSecondOutput,

    #[error("invalid position: {0}")]
    InvalidPosition(#[from] PositionError),
}

impl From<alloy_rlp::Error> for TxFormatError {
    fn from(value: alloy_rlp::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
