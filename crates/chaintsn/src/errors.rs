use std::fmt;

use plasma_db_types::DbError;
use plasma_primitives::{buf::Address, position::Position};
use plasma_state::{errors::TxFormatError, exit::ExitState};
use thiserror::Error;
use tracing::*;

/// Reasons a chain message is rejected.
///
/// Every variant other than [`TxError::Storage`] is a pure function of the
/// store contents, the root-chain snapshot and the message, so all nodes
/// reach the same verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    // structural
    #[error("malformed transaction: {0}")]
    MalformedTx(TxFormatError),

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    // authorization
    #[error("input {index} is not signed by the owner of {position}")]
    Unauthorized { index: usize, position: Position },

    #[error("input {index} is missing confirmation signatures for {position}")]
    MissingConfirmSig { index: usize, position: Position },

    #[error("input {index} carries an invalid confirmation signature for {position}")]
    InvalidConfirmSig { index: usize, position: Position },

    #[error("{position} already holds {limit} confirmation signatures")]
    ConfirmSigLimit { position: Position, limit: usize },

    #[error("output at {0} does not take confirmation signatures")]
    ConfirmSigsNotRequired(Position),

    // state conflicts
    #[error("no utxo at {0}")]
    UtxoNotFound(Position),

    #[error("utxo at {0} already spent")]
    AlreadySpent(Position),

    #[error("utxo at {position} has a {state:?} exit on the root chain")]
    InputExiting { position: Position, state: ExitState },

    #[error("inputs sum to {inputs} but outputs and fee sum to {outputs}")]
    ValueMismatch { inputs: u64, outputs: u64 },

    #[error("first input holds {available} and cannot cover fee {fee}")]
    InsufficientFee { available: u64, fee: u64 },

    #[error("block already holds the maximum number of transactions")]
    BlockFull,

    // deposits
    #[error("deposit {0} is unknown to the root contract")]
    DepositUnknown(u64),

    #[error("deposit {0} is not final yet")]
    DepositNotFinal(u64),

    #[error("deposit {nonce} belongs to {expected}, not {got}")]
    DepositOwnerMismatch {
        nonce: u64,
        expected: Address,
        got: Address,
    },

    // root chain
    #[error("root chain state unavailable")]
    RootChainUnreachable,

    #[error("root chain state too old to decide exit status of {0}")]
    StaleExitStatus(Position),

    // host
    #[error("no block is being executed")]
    NoActiveBlock,

    #[error("storage: {0}")]
    Storage(DbError),
}

impl TxError {
    /// Stable numeric code reported to submitters.
    pub fn code(&self) -> u32 {
        match self {
            TxError::MalformedTx(_) => 1,
            TxError::InvalidPosition(_) => 2,
            TxError::Unauthorized { .. } => 10,
            TxError::MissingConfirmSig { .. } => 11,
            TxError::InvalidConfirmSig { .. } => 12,
            TxError::ConfirmSigLimit { .. } => 13,
            TxError::ConfirmSigsNotRequired(_) => 14,
            TxError::UtxoNotFound(_) => 20,
            TxError::AlreadySpent(_) => 21,
            TxError::InputExiting { .. } => 22,
            TxError::ValueMismatch { .. } => 23,
            TxError::InsufficientFee { .. } => 24,
            TxError::BlockFull => 25,
            TxError::DepositUnknown(_) => 30,
            TxError::DepositNotFinal(_) => 31,
            TxError::DepositOwnerMismatch { .. } => 32,
            TxError::RootChainUnreachable => 40,
            TxError::StaleExitStatus(_) => 41,
            TxError::NoActiveBlock => 50,
            TxError::Storage(_) => 51,
        }
    }

    /// Whether the rejection comes from the root-chain snapshot rather than
    /// the message itself, so resubmitting later may succeed.
    pub fn is_root_chain(&self) -> bool {
        matches!(
            self,
            TxError::RootChainUnreachable | TxError::StaleExitStatus(_)
        )
    }
}

impl From<TxFormatError> for TxError {
    fn from(value: TxFormatError) -> Self {
        match value {
            TxFormatError::InvalidPosition(e) => TxError::InvalidPosition(e.to_string()),
            other => TxError::MalformedTx(other),
        }
    }
}

/// Errors reported by a root-chain view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("root chain has not been synced yet")]
    Unreachable,

    #[error("root chain view last synced at {synced_at}, older than the bound at {now}")]
    Stale { synced_at: u64, now: u64 },
}

/// Aborts on a broken store invariant (position collision, corrupt record).
#[track_caller]
pub(crate) fn invariant_violation(what: &str, detail: impl fmt::Display) -> ! {
    error!(%what, %detail, "store invariant violated");
    panic!("{what}: {detail}");
}

/// Maps a storage error met while reading.  Corrupt records abort, IO
/// failures reject the message.
#[track_caller]
pub(crate) fn read_err(err: DbError) -> TxError {
    match err {
        DbError::CodecError(_) | DbError::Other(_) => invariant_violation("CorruptStoreEntry", err),
        other => TxError::Storage(other),
    }
}
