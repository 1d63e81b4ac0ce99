use plasma_db_types::DbError;
use plasma_primitives::{
    buf::{Address, Buf32},
    position::Position,
};
use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no outputs were ever owned by {0}")]
    UnknownAddress(Address),

    #[error("no output exists at {0}")]
    OutputNotFound(Position),

    #[error("no transaction with hash {0}")]
    TxNotFound(Buf32),

    #[error("no plasma block {0}")]
    BlockNotFound(u64),

    /// Plasma blocks are numbered from 1.
    #[error("invalid block number {0}")]
    InvalidBlockNumber(u64),

    #[error("db: {0}")]
    Db(#[from] DbError),
}
