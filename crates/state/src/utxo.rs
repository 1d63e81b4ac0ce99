//! UTXO records and their storage keys.

use borsh::{BorshDeserialize, BorshSerialize};
use plasma_primitives::{
    buf::{Address, Buf32},
    constants::NATIVE_DENOM,
    define_buf,
    errors::PositionError,
    position::{Position, POSITION_ENCODED_LEN},
};
use serde::{Deserialize, Serialize};

define_buf!(
    /// Composite store key `owner ‖ encode(position)`.
    UtxoKey,
    20 + POSITION_ENCODED_LEN
);

impl UtxoKey {
    pub fn new(owner: &Address, position: &Position) -> Self {
        let mut buf = [0u8; Self::LEN];
        buf[..Address::LEN].copy_from_slice(owner.as_slice());
        buf[Address::LEN..].copy_from_slice(&position.encode());
        Self(buf)
    }

    pub fn owner(&self) -> Address {
        let mut buf = [0u8; Address::LEN];
        buf.copy_from_slice(&self.0[..Address::LEN]);
        Address(buf)
    }

    /// Decodes the position half of the key.
    pub fn position(&self) -> Result<Position, PositionError> {
        Position::decode(&self.0[Address::LEN..])
    }
}

/// An output tracked by the UTXO store.
///
/// Records are never deleted.  Spending flips `valid` and fills in
/// `spender_keys` with the keys of the outputs the spending transaction
/// created.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Utxo {
    pub owner: Address,
    pub amount: u64,
    pub denom: String,
    pub position: Position,
    pub valid: bool,
    pub spender_keys: Vec<UtxoKey>,

    /// Owners of the inputs of the transaction that created this output.
    /// Their confirmation signatures gate spending it.  Empty for deposit and
    /// fee outputs.
    pub input_addresses: Vec<Address>,

    /// Merkle hash of the creating transaction, if any.
    pub merkle_hash: Option<Buf32>,

    /// Confirmation hash of the creating transaction, if any.
    pub confirmation_hash: Option<Buf32>,
}

impl Utxo {
    /// Output of a transaction included in a block.
    pub fn from_tx_output(
        owner: Address,
        amount: u64,
        position: Position,
        input_addresses: Vec<Address>,
        merkle_hash: Buf32,
        confirmation_hash: Buf32,
    ) -> Self {
        Self {
            owner,
            amount,
            denom: NATIVE_DENOM.to_owned(),
            position,
            valid: true,
            spender_keys: Vec::new(),
            input_addresses,
            merkle_hash: Some(merkle_hash),
            confirmation_hash: Some(confirmation_hash),
        }
    }

    /// Output with no creating transaction on this chain (deposits, fees).
    pub fn standalone(owner: Address, amount: u64, position: Position) -> Self {
        Self {
            owner,
            amount,
            denom: NATIVE_DENOM.to_owned(),
            position,
            valid: true,
            spender_keys: Vec::new(),
            input_addresses: Vec::new(),
            merkle_hash: None,
            confirmation_hash: None,
        }
    }

    pub fn key(&self) -> UtxoKey {
        UtxoKey::new(&self.owner, &self.position)
    }

    /// Whether spending this output requires confirmation signatures.
    pub fn requires_confirm_sigs(&self) -> bool {
        self.position.is_tx_output()
    }
}
