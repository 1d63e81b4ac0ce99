//! Per-height execution state.

use plasma_primitives::{buf::Buf32, constants::FEE_TX_INDEX, position::Position};

/// Consensus-provided data about the height being executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockContext {
    /// Consensus height.
    pub height: u64,

    /// Block time in UNIX seconds.
    pub timestamp: u64,

    /// Consensus data hash, used as the plasma block header.
    pub header: Buf32,
}

impl BlockContext {
    pub fn new(height: u64, timestamp: u64, header: Buf32) -> Self {
        Self {
            height,
            timestamp,
            header,
        }
    }
}

/// Running counters of the plasma block being built.
///
/// Threaded through the pipeline explicitly and consumed by block
/// commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockAccumulator {
    block_num: u64,
    tx_index: u16,
    fee_total: u64,
}

impl BlockAccumulator {
    /// Starts an empty accumulator for plasma block `block_num`.
    pub fn new(block_num: u64) -> Self {
        Self {
            block_num,
            tx_index: 0,
            fee_total: 0,
        }
    }

    pub fn block_num(&self) -> u64 {
        self.block_num
    }

    /// Number of messages applied so far, also the index the next one gets.
    pub fn tx_index(&self) -> u16 {
        self.tx_index
    }

    pub fn fee_total(&self) -> u64 {
        self.fee_total
    }

    pub fn is_empty(&self) -> bool {
        self.tx_index == 0
    }

    /// Whether another message fits.  The last index is reserved for the fee
    /// output.
    pub fn has_room(&self) -> bool {
        self.tx_index < FEE_TX_INDEX
    }

    /// Whether `fee` can be added to the running total.
    pub fn can_take_fee(&self, fee: u64) -> bool {
        self.fee_total.checked_add(fee).is_some()
    }

    /// Position output `output_index` of the next message receives.
    pub fn next_output_position(&self, output_index: u8) -> Position {
        Position::tx_output(self.block_num, self.tx_index, output_index)
    }

    /// Records an applied spend paying `fee`.
    pub(crate) fn record_tx(&mut self, fee: u64) {
        self.tx_index += 1;
        self.fee_total += fee;
    }

    /// Records an included deposit.
    pub(crate) fn record_deposit(&mut self) {
        self.tx_index += 1;
    }

    /// Accumulator for the block after this one.
    pub(crate) fn next(&self) -> Self {
        Self::new(self.block_num + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut acc = BlockAccumulator::new(3);
        assert!(acc.is_empty());
        assert_eq!(acc.next_output_position(1), Position::tx_output(3, 0, 1));

        acc.record_tx(7);
        acc.record_deposit();
        acc.record_tx(5);
        assert_eq!(acc.tx_index(), 3);
        assert_eq!(acc.fee_total(), 12);
        assert_eq!(acc.next_output_position(0), Position::tx_output(3, 3, 0));

        let next = acc.next();
        assert_eq!(next.block_num(), 4);
        assert!(next.is_empty());
        assert_eq!(next.fee_total(), 0);
    }

    #[test]
    fn test_room_and_fee_overflow() {
        let mut acc = BlockAccumulator::new(1);
        acc.tx_index = FEE_TX_INDEX - 1;
        assert!(acc.has_room());
        acc.record_deposit();
        assert!(!acc.has_room());

        acc.fee_total = u64::MAX - 1;
        assert!(acc.can_take_fee(1));
        assert!(!acc.can_take_fee(2));
    }
}
