//! In-memory collaborators for exercising the executor.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use plasma_primitives::{buf::Address, position::Position};
use plasma_state::{deposit::Deposit, exit::ExitState};

use crate::{
    context::{HeaderSink, RootChainView},
    errors::ViewError,
};

/// Root-chain view backed by plain maps.
#[derive(Clone, Debug)]
pub struct MemRootChainView {
    pub operator: Address,
    pub deposits: BTreeMap<u64, Deposit>,
    pub exits: BTreeMap<Position, ExitState>,
    pub tip: u64,
    pub finality: u64,

    /// Time of the last sync, `None` if never synced.
    pub synced_at: Option<u64>,
    pub staleness_bound: u64,
}

impl MemRootChainView {
    /// A synced view at time 0 with the given finality depth.
    pub fn new(operator: Address, finality: u64) -> Self {
        Self {
            operator,
            deposits: BTreeMap::new(),
            exits: BTreeMap::new(),
            tip: 0,
            finality,
            synced_at: Some(0),
            staleness_bound: u64::MAX,
        }
    }

    /// Adds a deposit made at root-chain block `eth_block_num`.
    pub fn add_deposit(&mut self, nonce: u64, owner: Address, amount: u64, eth_block_num: u64) {
        self.deposits
            .insert(nonce, Deposit::new(nonce, owner, amount, eth_block_num));
        self.tip = self.tip.max(eth_block_num);
    }

    pub fn set_exit(&mut self, position: Position, state: ExitState) {
        self.exits.insert(position, state);
    }

    fn check_synced(&self) -> Result<u64, ViewError> {
        self.synced_at.ok_or(ViewError::Unreachable)
    }
}

impl RootChainView for MemRootChainView {
    fn deposit(&self, nonce: u64) -> Result<Option<Deposit>, ViewError> {
        self.check_synced()?;
        Ok(self.deposits.get(&nonce).cloned())
    }

    fn is_deposit_final(&self, nonce: u64) -> Result<bool, ViewError> {
        self.check_synced()?;
        Ok(self
            .deposits
            .get(&nonce)
            .is_some_and(|d| d.is_final_at(self.tip, self.finality)))
    }

    fn exit_status(&self, position: &Position, now: u64) -> Result<ExitState, ViewError> {
        let synced_at = self.check_synced()?;
        if now.saturating_sub(synced_at) > self.staleness_bound {
            return Err(ViewError::Stale { synced_at, now });
        }
        Ok(self.exits.get(position).copied().unwrap_or_default())
    }

    fn operator_address(&self) -> Address {
        self.operator
    }
}

/// Sink remembering every flush request.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<Option<u64>>>,
}

impl RecordingSink {
    pub fn calls(&self) -> Vec<Option<u64>> {
        self.calls.lock().clone()
    }
}

impl HeaderSink for RecordingSink {
    fn flush_headers(&self, latest: Option<u64>) {
        self.calls.lock().push(latest);
    }
}
