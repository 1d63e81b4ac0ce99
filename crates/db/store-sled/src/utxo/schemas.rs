use plasma_primitives::{buf::Address, position::Position};
use plasma_state::utxo::{Utxo, UtxoKey};

use crate::define_table;

define_table!(
    /// A table to store UTXO records. Maps `owner ‖ position` to the record
    (UtxoSchema) UtxoKey => Utxo
);

define_table!(
    /// A table to find the owner of the output at a position
    (UtxoOwnerByPositionSchema) Position => Address
);
