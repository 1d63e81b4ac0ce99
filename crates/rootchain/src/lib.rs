//! Synchronization with the root contract on Ethereum.
//!
//! The reader task follows contract events behind a finality window and
//! publishes immutable [`RootChainSnapshot`]s for execution to read.  The
//! writer task submits stored plasma block headers when asked to flush.

pub mod alloy_client;
pub mod client;
pub mod contract;
pub mod error;
mod handle;
mod reader;
pub mod retry;
pub mod snapshot;
pub mod status;
mod writer;

pub use client::{ChainEvent, ClientError, EventKind, HeaderBatch, RootChainClient};
#[cfg(any(test, feature = "test-utils"))]
pub use client::MockRootChainClient;
pub use error::SyncError;
pub use handle::{verify_operator, RootChainHandle, RootChainSyncBuilder};
pub use snapshot::RootChainSnapshot;
pub use status::RootChainStatus;
pub use writer::FlushHandle;
