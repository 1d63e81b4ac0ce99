//! Mirrors of root-chain exit state.

use borsh::{BorshDeserialize, BorshSerialize};
use plasma_primitives::{buf::Address, position::Position};
use serde::{Deserialize, Serialize};

/// State of an exit as reported by the root contract.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub enum ExitState {
    #[default]
    None,
    Pending,
    Challenged,
    Finalized,
}

impl ExitState {
    /// Maps the contract's numeric exit state.
    pub fn from_contract(state: u8) -> Option<Self> {
        match state {
            0 => Some(Self::None),
            1 => Some(Self::Pending),
            2 => Some(Self::Challenged),
            3 => Some(Self::Finalized),
            _ => None,
        }
    }

    /// Whether value at the position is leaving or has left through the root
    /// chain, so it must not be spent here.
    pub fn conflicts_with_spend(&self) -> bool {
        matches!(self, Self::Pending | Self::Finalized)
    }
}

/// An exit observed on the root chain.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct ExitRecord {
    pub position: Position,
    pub owner: Address,
    pub amount: u64,
    pub state: ExitState,
    /// Root-chain block the exit was started in.
    pub created_at: u64,
}
