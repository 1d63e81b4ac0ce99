use plasma_db_types::DbError;
use plasma_primitives::buf::Address;
use thiserror::Error;

use crate::client::ClientError;

/// Errors raised by the synchronizer tasks.
///
/// Client and storage failures are retried on the next poll.  The remaining
/// variants need an operator to step in.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("root chain client: {0}")]
    Client(#[from] ClientError),

    #[error("storage: {0}")]
    Db(#[from] DbError),

    /// The node no longer has a block we scanned.
    #[error("root chain block {0} is missing")]
    MissingBlock(u64),

    /// None of the remembered block hashes match the chain anymore.
    #[error("reorg deeper than the tracked window, oldest tracked block {oldest}")]
    NoCommonAncestor { oldest: u64 },

    #[error("operator key belongs to {configured} but the contract operator is {contract}")]
    OperatorMismatch {
        configured: Address,
        contract: Address,
    },
}

impl SyncError {
    /// Whether the task should stop instead of retrying.
    pub fn is_fatal(&self) -> bool {
        match self {
            SyncError::NoCommonAncestor { .. } | SyncError::OperatorMismatch { .. } => true,
            SyncError::Client(_) | SyncError::Db(_) | SyncError::MissingBlock(_) => false,
        }
    }
}

pub(crate) type Result<T> = std::result::Result<T, SyncError>;
