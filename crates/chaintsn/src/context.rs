//! Interfaces to the root-chain synchronizer.
//!
//! Execution only ever reads an already-synced snapshot and hands off header
//! flush requests.  Nothing here may block on network I/O.

use std::sync::Arc;

use plasma_primitives::{buf::Address, position::Position};
use plasma_state::{deposit::Deposit, exit::ExitState};

use crate::errors::ViewError;

/// Read-only view of root-chain deposit and exit state.
pub trait RootChainView {
    /// Deposit with `nonce`, if the contract reported one.
    fn deposit(&self, nonce: u64) -> Result<Option<Deposit>, ViewError>;

    /// Whether deposit `nonce` is known and buried under enough root-chain
    /// blocks.
    fn is_deposit_final(&self, nonce: u64) -> Result<bool, ViewError>;

    /// Exit state of the output at `position` as seen at time `now` (UNIX
    /// seconds).  Fails if the view is older than its staleness bound.
    fn exit_status(&self, position: &Position, now: u64) -> Result<ExitState, ViewError>;

    /// Address the fee outputs are minted to.
    fn operator_address(&self) -> Address;
}

impl<T: RootChainView + ?Sized> RootChainView for Arc<T> {
    fn deposit(&self, nonce: u64) -> Result<Option<Deposit>, ViewError> {
        (**self).deposit(nonce)
    }

    fn is_deposit_final(&self, nonce: u64) -> Result<bool, ViewError> {
        (**self).is_deposit_final(nonce)
    }

    fn exit_status(&self, position: &Position, now: u64) -> Result<ExitState, ViewError> {
        (**self).exit_status(position, now)
    }

    fn operator_address(&self) -> Address {
        (**self).operator_address()
    }
}

/// Receives the end-of-height notification that stored headers may need
/// submitting.
///
/// Implementations must return immediately.
pub trait HeaderSink {
    /// `latest` is the most recent committed plasma block, if any.
    fn flush_headers(&self, latest: Option<u64>);
}

impl<T: HeaderSink + ?Sized> HeaderSink for Arc<T> {
    fn flush_headers(&self, latest: Option<u64>) {
        (**self).flush_headers(latest)
    }
}

/// A sink that drops every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHeaderSink;

impl HeaderSink for NoopHeaderSink {
    fn flush_headers(&self, _latest: Option<u64>) {}
}
