use plasma_primitives::{
    buf::{Buf32, Signature},
    position::Position,
};
use plasma_state::{block::PlasmaBlock, tx_record::TxRecord};

use crate::define_table;

define_table!(
    /// A table to store committed plasma blocks by number
    (PlasmaBlockSchema) u64 => PlasmaBlock
);

define_table!(
    /// A table to store confirmation signatures submitted for an input position
    (ConfirmSigSchema) Position => Vec<Signature>
);

define_table!(
    /// A table to mark deposit nonces already credited on the child chain
    (IncludedDepositSchema) u64 => ()
);

define_table!(
    /// A table to store applied transactions by merkle hash
    (TxRecordSchema) Buf32 => TxRecord
);
