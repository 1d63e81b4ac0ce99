//! Child chain state transition: validation of chain messages, their
//! application to the UTXO store, and block commitment.
//!
//! Everything here runs on the sequential consensus path.  Root-chain state
//! is only read through a [`RootChainView`] snapshot.

pub mod ante;
pub mod block;
pub mod commit;
pub mod confirm;
pub mod context;
pub mod deposit;
pub mod errors;
pub mod executor;
pub mod spend;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use block::{BlockAccumulator, BlockContext};
pub use context::{HeaderSink, NoopHeaderSink, RootChainView};
pub use errors::{TxError, ViewError};
pub use executor::{ChainExecutor, CheckOutcome, DeliverOutcome};
