use async_trait::async_trait;
use plasma_primitives::{
    buf::{Address, Buf32},
    position::Position,
};
use plasma_state::{block::PlasmaBlock, deposit::Deposit, exit::ExitState};
use thiserror::Error;

/// Access to the root contract and the chain it lives on.
///
/// Implementations perform a single attempt per call.  Timeouts and retries
/// are layered on top by [`crate::retry`].
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
#[async_trait]
pub trait RootChainClient: Send + Sync + 'static {
    /// Number of the latest root-chain block.
    async fn block_number(&self) -> Result<u64, ClientError>;

    /// Hash of block `number`, `None` if the node does not have it.
    async fn block_hash(&self, number: u64) -> Result<Option<Buf32>, ClientError>;

    /// Contract events emitted in blocks `from..=to`, in chain order.
    async fn events(&self, from: u64, to: u64) -> Result<Vec<ChainEvent>, ClientError>;

    /// Address allowed to submit blocks.
    async fn operator(&self) -> Result<Address, ClientError>;

    /// Current exit state the contract stores for `position`.
    async fn exit_state(&self, position: Position) -> Result<ExitState, ClientError>;

    /// Number of the last plasma block the contract accepted, 0 if none.
    async fn last_committed_block(&self) -> Result<u64, ClientError>;

    /// Sends `submitBlock` and waits for it to be mined.  Returns the
    /// transaction hash.
    async fn submit_block(&self, batch: HeaderBatch) -> Result<Buf32, ClientError>;
}

/// Errors that can occur when talking to the root chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Transport or node failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("call timed out after {0} ms")]
    Timeout(u64),

    /// The node returned data that does not fit the expected shape.
    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("transaction {0} reverted")]
    Reverted(Buf32),

    #[error("signer error: {0}")]
    Signer(String),
}

impl ClientError {
    /// Whether repeating the call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Rpc(_) | ClientError::Timeout(_))
    }

    pub(crate) fn malformed(what: &'static str, detail: impl ToString) -> Self {
        ClientError::Malformed {
            what,
            detail: detail.to_string(),
        }
    }
}

/// A contract event, tagged with the block it was emitted in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainEvent {
    pub block_num: u64,
    pub kind: EventKind,
}

impl ChainEvent {
    pub fn new(block_num: u64, kind: EventKind) -> Self {
        Self { block_num, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Deposit(Deposit),

    /// A transaction or deposit exit entered the challenge period.
    ExitStarted {
        position: Position,
        owner: Address,
        amount: u64,
    },

    ExitChallenged {
        position: Position,
    },

    ExitFinalized {
        position: Position,
    },
}

/// Consecutive plasma block headers submitted in one `submitBlock` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderBatch {
    /// Number of the first block in the batch.
    pub first_block: u64,
    pub headers: Vec<Buf32>,
    pub txn_counts: Vec<u16>,
    pub fees: Vec<u64>,
}

impl HeaderBatch {
    /// Builds a batch from stored blocks, keeping the leading run that
    /// directly follows `last_committed`.  Returns `None` if that run is
    /// empty.
    pub fn from_blocks(last_committed: u64, blocks: &[(u64, PlasmaBlock)]) -> Option<Self> {
        let mut batch = HeaderBatch {
            first_block: last_committed + 1,
            headers: Vec::new(),
            txn_counts: Vec::new(),
            fees: Vec::new(),
        };

        for (expected, (num, block)) in (last_committed + 1..).zip(blocks) {
            if *num != expected {
                break;
            }
            batch.headers.push(block.header);
            batch.txn_counts.push(block.txn_count);
            batch.fees.push(block.fee_amount);
        }

        (!batch.headers.is_empty()).then_some(batch)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Number of the last block in the batch.
    pub fn last_block(&self) -> u64 {
        self.first_block + self.headers.len().saturating_sub(1) as u64
    }
}
