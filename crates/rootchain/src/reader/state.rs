//! Event state folded from scanned root-chain ranges.

use std::collections::{BTreeMap, VecDeque};

use plasma_primitives::{buf::Buf32, position::Position};
use plasma_state::{
    deposit::Deposit,
    exit::{ExitRecord, ExitState},
};
use tracing::*;

use crate::client::{ChainEvent, EventKind};

/// Deposits and exits accumulated from contract events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct EventState {
    pub(crate) deposits: BTreeMap<u64, Deposit>,
    pub(crate) exits: BTreeMap<Position, ExitRecord>,
}

impl EventState {
    pub(crate) fn apply(&mut self, event: &ChainEvent) {
        match &event.kind {
            EventKind::Deposit(deposit) => {
                self.deposits.insert(deposit.nonce, deposit.clone());
            }
            EventKind::ExitStarted {
                position,
                owner,
                amount,
            } => {
                self.exits.insert(
                    *position,
                    ExitRecord {
                        position: *position,
                        owner: *owner,
                        amount: *amount,
                        state: ExitState::Pending,
                        created_at: event.block_num,
                    },
                );
            }
            EventKind::ExitChallenged { position } => {
                self.set_exit_state(position, ExitState::Challenged, event.block_num)
            }
            EventKind::ExitFinalized { position } => {
                self.set_exit_state(position, ExitState::Finalized, event.block_num)
            }
        }
    }

    fn set_exit_state(&mut self, position: &Position, state: ExitState, block_num: u64) {
        match self.exits.get_mut(position) {
            Some(exit) => exit.state = state,
            None => warn!(%position, ?state, %block_num, "exit event for unknown exit"),
        }
    }
}

/// Events of one scanned block range, together with the hash of its last
/// block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ScannedRange {
    pub(crate) to: u64,
    pub(crate) hash: Buf32,
    pub(crate) events: Vec<ChainEvent>,
}

/// Reader progress.
///
/// Recent ranges stay in a journal so a reorg can be undone by dropping the
/// ranges past the fork and refolding the rest.  Ranges older than the reorg
/// window are folded into `base` for good.
#[derive(Clone, Debug)]
pub(crate) struct ReaderState {
    start_block: u64,
    reorg_depth: u64,

    base: EventState,
    base_scanned: Option<u64>,
    journal: VecDeque<ScannedRange>,

    current: EventState,
}

impl ReaderState {
    pub(crate) fn new(start_block: u64, reorg_depth: u64) -> Self {
        Self {
            start_block,
            reorg_depth,
            base: EventState::default(),
            base_scanned: None,
            journal: VecDeque::new(),
            current: EventState::default(),
        }
    }

    /// Events from every range applied so far.
    pub(crate) fn current(&self) -> &EventState {
        &self.current
    }

    /// Highest block whose events are applied.
    pub(crate) fn scanned(&self) -> Option<u64> {
        self.journal.back().map(|r| r.to).or(self.base_scanned)
    }

    /// First block not scanned yet.
    pub(crate) fn next_height(&self) -> u64 {
        self.scanned().map_or(self.start_block, |h| h + 1)
    }

    /// Latest remembered `(block, hash)` pair.
    pub(crate) fn last_checkpoint(&self) -> Option<(u64, Buf32)> {
        self.journal.back().map(|r| (r.to, r.hash))
    }

    /// Remembered checkpoints from newest to oldest.
    pub(crate) fn checkpoints(&self) -> impl Iterator<Item = (u64, Buf32)> + '_ {
        self.journal.iter().rev().map(|r| (r.to, r.hash))
    }

    /// Whether ranges were already folded beyond recovery.
    pub(crate) fn has_pruned(&self) -> bool {
        self.base_scanned.is_some()
    }

    pub(crate) fn push(&mut self, range: ScannedRange) {
        for event in &range.events {
            self.current.apply(event);
        }
        self.journal.push_back(range);
        self.prune();
    }

    /// Drops every range ending above `height` and refolds the remaining
    /// ones.  `None` drops the whole journal.
    pub(crate) fn rollback_to(&mut self, height: Option<u64>) {
        while let Some(last) = self.journal.back() {
            if height.is_some_and(|h| last.to <= h) {
                break;
            }
            self.journal.pop_back();
        }

        let mut current = self.base.clone();
        for range in &self.journal {
            for event in &range.events {
                current.apply(event);
            }
        }
        self.current = current;
    }

    /// Folds leading ranges into the base while a later checkpoint still lies
    /// `reorg_depth` blocks below the newest one.
    fn prune(&mut self) {
        let Some(newest) = self.journal.back().map(|r| r.to) else {
            return;
        };

        while self
            .journal
            .get(1)
            .is_some_and(|next| next.to + self.reorg_depth <= newest)
        {
            let Some(range) = self.journal.pop_front() else {
                break;
            };
            for event in &range.events {
                self.base.apply(event);
            }
            self.base_scanned = Some(range.to);
        }
    }
}
