//! Helpers for building signed transactions in tests.

use plasma_primitives::{
    buf::{Address, Signature},
    position::Position,
    test_utils::TestKey,
};

use crate::tx::{Input, Output, Transaction};

/// Signs every present input, `keys[i]` signing input `i`.
pub fn sign_tx(tx: &mut Transaction, keys: &[&TestKey]) {
    let hash = tx.tx_hash();
    for (input, key) in tx.inputs_mut().zip(keys) {
        input.signature = Some(key.sign(&hash));
    }
}

/// Builds and signs a single-input transaction paying `amount` to `to`,
/// returning any change to the signer.
pub fn make_spend(
    from: &TestKey,
    input: Position,
    confirm_sigs: Vec<Signature>,
    to: Address,
    amount: u64,
    change: u64,
    fee: u64,
) -> Transaction {
    let mut input = Input::unsigned(input);
    input.confirm_sigs = confirm_sigs;
    let output1 = (change > 0).then(|| Output::new(from.address, change));
    let mut tx = Transaction::new(input, None, Output::new(to, amount), output1, fee);
    sign_tx(&mut tx, &[from]);
    tx
}
