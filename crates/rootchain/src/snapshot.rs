//! Immutable root-chain state handed to execution.

use std::collections::{BTreeMap, BTreeSet};

use plasma_chaintsn::{RootChainView, ViewError};
use plasma_primitives::{buf::Address, position::Position};
use plasma_state::{
    deposit::Deposit,
    exit::{ExitRecord, ExitState},
};

/// Root-chain state as of one reader poll.
///
/// Deposits and exits are taken from blocks at least `finality` deep.
/// Deposits in the younger blocks are kept apart so their inclusion can be
/// refused as not final rather than unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootChainSnapshot {
    pub(crate) operator: Address,
    pub(crate) finality: u64,
    pub(crate) staleness_bound: u64,

    pub(crate) tip: u64,
    pub(crate) scanned: u64,

    /// UNIX seconds of the poll that produced this snapshot, `None` before
    /// the first successful one.
    pub(crate) synced_at: Option<u64>,

    pub(crate) deposits: BTreeMap<u64, Deposit>,
    pub(crate) pending_deposits: BTreeMap<u64, Deposit>,
    pub(crate) exits: BTreeMap<Position, ExitRecord>,
    pub(crate) challengeable: BTreeSet<Position>,
}

impl RootChainSnapshot {
    /// A snapshot that has not been synced yet.
    pub fn unsynced(operator: Address, finality: u64, staleness_bound: u64) -> Self {
        Self {
            operator,
            finality,
            staleness_bound,
            tip: 0,
            scanned: 0,
            synced_at: None,
            deposits: BTreeMap::new(),
            pending_deposits: BTreeMap::new(),
            exits: BTreeMap::new(),
            challengeable: BTreeSet::new(),
        }
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    /// Latest root-chain block seen.
    pub fn tip(&self) -> u64 {
        self.tip
    }

    /// Highest root-chain block whose events are applied.
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    pub fn synced_at(&self) -> Option<u64> {
        self.synced_at
    }

    pub fn exits(&self) -> &BTreeMap<Position, ExitRecord> {
        &self.exits
    }

    /// Pending exits of outputs that are already spent here.
    pub fn challengeable(&self) -> &BTreeSet<Position> {
        &self.challengeable
    }

    fn check_synced(&self) -> Result<u64, ViewError> {
        self.synced_at.ok_or(ViewError::Unreachable)
    }
}

impl RootChainView for RootChainSnapshot {
    fn deposit(&self, nonce: u64) -> Result<Option<Deposit>, ViewError> {
        self.check_synced()?;
        Ok(self
            .deposits
            .get(&nonce)
            .or_else(|| self.pending_deposits.get(&nonce))
            .cloned())
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
        Ok(self
            .exits
            .get(position)
            .map(|exit| exit.state)
            .unwrap_or_default())
    }

    fn operator_address(&self) -> Address {
        self.operator
    }
}
