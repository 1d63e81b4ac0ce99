//! Coordinates identifying a UTXO on the child chain.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        BLOCK_INDEX_FACTOR, FEE_OUTPUT_INDEX, FEE_TX_INDEX, MAX_OUTPUTS, TX_INDEX_FACTOR,
    },
    errors::PositionError,
};

/// Width of the binary position encoding.
pub const POSITION_ENCODED_LEN: usize = 8 + 2 + 1 + 8;

/// Location of a UTXO: `(blockNumber, txIndex, outputIndex, depositNonce)`.
///
/// Exactly one of `block_num` and `deposit_nonce` is non-zero, except for the
/// nil position used to mark an absent input.  Field order matters, the
/// derived `Ord` matches the byte order of [`Position::encode`]: deposits sort
/// before transaction outputs, by nonce, and transaction outputs sort by
/// `(block, tx, output)`.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Position {
    block_num: u64,
    tx_index: u16,
    output_index: u8,
    deposit_nonce: u64,
}

/// Which root-chain exit queue a position competes in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExitQueue {
    Transaction,
    Deposit,
}

/// Exit priority of a position, as computed by the root contract.
///
/// Lower values exit first within a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Priority {
    queue: ExitQueue,
    value: u64,
}

impl Priority {
    pub fn queue(&self) -> ExitQueue {
        self.queue
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl Position {
    pub const fn new(block_num: u64, tx_index: u16, output_index: u8, deposit_nonce: u64) -> Self {
        Self {
            block_num,
            tx_index,
            output_index,
            deposit_nonce,
        }
    }

    /// The all-zero position, used for an absent input.
    pub const fn nil() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub const fn deposit(nonce: u64) -> Self {
        Self::new(0, 0, 0, nonce)
    }

    pub const fn tx_output(block_num: u64, tx_index: u16, output_index: u8) -> Self {
        Self::new(block_num, tx_index, output_index, 0)
    }

    /// Position of the fee UTXO minted for a plasma block.
    pub const fn fee(block_num: u64) -> Self {
        Self::new(block_num, FEE_TX_INDEX, FEE_OUTPUT_INDEX, 0)
    }

    pub fn block_num(&self) -> u64 {
        self.block_num
    }

    pub fn tx_index(&self) -> u16 {
        self.tx_index
    }

    pub fn output_index(&self) -> u8 {
        self.output_index
    }

    pub fn deposit_nonce(&self) -> u64 {
        self.deposit_nonce
    }

    pub fn is_nil(&self) -> bool {
        *self == Self::nil()
    }

    pub fn is_deposit(&self) -> bool {
        self.deposit_nonce != 0
    }

    pub fn is_fee(&self) -> bool {
        !self.is_deposit() && self.block_num != 0 && self.tx_index == FEE_TX_INDEX
    }

    /// True for outputs created by a regular transaction.  Only these need
    /// confirmation signatures before they can be spent.
    pub fn is_tx_output(&self) -> bool {
        !self.is_nil() && !self.is_deposit() && !self.is_fee()
    }

    /// Checks the structural rules a non-nil position must satisfy.
    pub fn validate(&self) -> Result<(), PositionError> {
        if self.is_nil() {
            return Ok(());
        }

        if self.is_deposit() {
            if self.block_num != 0 || self.tx_index != 0 || self.output_index != 0 {
                return Err(PositionError::DepositWithBlockFields(self.to_string()));
            }
            return Ok(());
        }

        if self.block_num == 0 {
            return Err(PositionError::ZeroBlock(self.to_string()));
        }

        if self.tx_index == FEE_TX_INDEX {
            if self.output_index != FEE_OUTPUT_INDEX {
                return Err(PositionError::FeeOutputIndex(self.to_string()));
            }
        } else if self.output_index as usize >= MAX_OUTPUTS {
            return Err(PositionError::OutputIndexOutOfRange(self.to_string()));
        }

        Ok(())
    }

    /// Exit priority used by the root contract to order exits.
    pub fn priority(&self) -> Priority {
        if self.is_deposit() {
            return Priority {
                queue: ExitQueue::Deposit,
                value: self.deposit_nonce,
            };
        }

        let value = self
            .block_num
            .saturating_mul(BLOCK_INDEX_FACTOR)
            .saturating_add(self.tx_index as u64 * TX_INDEX_FACTOR)
            .saturating_add(self.output_index as u64);

        Priority {
            queue: ExitQueue::Transaction,
            value,
        }
    }

    /// Encodes into the fixed-width big-endian key.
    pub fn encode(&self) -> [u8; POSITION_ENCODED_LEN] {
        let mut buf = [0u8; POSITION_ENCODED_LEN];
        buf[0..8].copy_from_slice(&self.block_num.to_be_bytes());
        buf[8..10].copy_from_slice(&self.tx_index.to_be_bytes());
        buf[10] = self.output_index;
        buf[11..19].copy_from_slice(&self.deposit_nonce.to_be_bytes());
        buf
    }

    /// Decodes a fixed-width key, rejecting wrong widths and invalid tuples.
    pub fn decode(buf: &[u8]) -> Result<Self, PositionError> {
        if buf.len() != POSITION_ENCODED_LEN {
            return Err(PositionError::InvalidLength {
                expected: POSITION_ENCODED_LEN,
                got: buf.len(),
            });
        }

        let mut blk = [0u8; 8];
        blk.copy_from_slice(&buf[0..8]);
        let mut tx = [0u8; 2];
        tx.copy_from_slice(&buf[8..10]);
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&buf[11..19]);

        let pos = Self::new(
            u64::from_be_bytes(blk),
            u16::from_be_bytes(tx),
            buf[10],
            u64::from_be_bytes(nonce),
        );
        pos.validate()?;
        Ok(pos)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}.{}.{}.{})",
            self.block_num, self.tx_index, self.output_index, self.deposit_nonce
        )
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PositionError::Parse(s.to_owned());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(err)?;

        let parts: Vec<&str> = inner.split('.').collect();
        let [blk, tx, out, nonce] = parts.as_slice() else {
            return Err(err());
        };

        let pos = Self::new(
            blk.parse().map_err(|_| err())?,
            tx.parse().map_err(|_| err())?,
            out.parse().map_err(|_| err())?,
            nonce.parse().map_err(|_| err())?,
        );
        pos.validate()?;
        Ok(pos)
    }
}
