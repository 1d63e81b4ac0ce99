use plasma_primitives::position::Position;
use plasma_state::utxo::UtxoKey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("entry with idx does not exist")]
    NonExistentEntry,

    #[error("entry with idx already exists")]
    EntryAlreadyExists,

    #[error("tried to insert into {0} out-of-order index {1}")]
    OooInsert(&'static str, u64),

    #[error("utxo {0} already exists")]
    UtxoExists(UtxoKey),

    #[error("utxo {0} not found")]
    UtxoNotFound(UtxoKey),

    #[error("utxo {0} already spent")]
    UtxoAlreadySpent(UtxoKey),

    #[error("position {position} already has {limit} confirmation signatures")]
    ConfirmSigLimit { position: Position, limit: usize },

    #[error("IO Error: {0}")]
    IoError(String),

    #[error("codec error {0}")]
    CodecError(String),

    #[error("transaction error {0}")]
    TransactionError(String),

    #[error("{0}")]
    Other(String),
}

pub type DbResult<T> = Result<T, DbError>;
