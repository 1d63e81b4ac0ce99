use plasma_db_types::{
    traits::{DatabaseBackend, PlasmaDatabase, UtxoDatabase},
    DbError, StateBatch,
};
use plasma_primitives::{
    buf::{Address, Buf32, Signature},
    constants::MAX_CONFIRM_SIGS,
    position::Position,
};
use plasma_state::{
    block::PlasmaBlock,
    tx::{Input, Output, Transaction},
    tx_record::TxRecord,
    utxo::{Utxo, UtxoKey},
};

fn record(input: Position, owner: Address) -> TxRecord {
    let tx = Transaction::new(
        Input::unsigned(input),
        None,
        Output::new(owner, 10),
        None,
        0,
    );
    TxRecord {
        merkle_hash: tx.merkle_hash(),
        confirmation_hash: Buf32([4; 32]),
        tx,
        block_num: 1,
        tx_index: 0,
    }
}

fn block(height: u64) -> PlasmaBlock {
    PlasmaBlock::new(Buf32([height as u8; 32]), 1, 0, 1_600_000_000 + height, height)
}

pub fn test_batch_commits_all(backend: &impl DatabaseBackend) {
    let utxo_db = backend.utxo_db();
    let plasma_db = backend.plasma_db();
    let a = Address([1; 20]);
    let b = Address([2; 20]);

    let deposit = Utxo::standalone(a, 10, Position::deposit(4));
    let batch = StateBatch::new()
        .insert_utxo(deposit.clone())
        .mark_deposit_included(4);
    backend.apply_batch(&batch).unwrap();
    assert_eq!(utxo_db.get_utxo_by_position(&deposit.position).unwrap(), Some(deposit.clone()));
    assert!(plasma_db.is_deposit_included(4).unwrap());

    let out = Position::tx_output(1, 0, 0);
    let out_key = UtxoKey::new(&b, &out);
    let rec = record(deposit.position, b);
    let sig = Signature([7; 65]);
    let batch = StateBatch::new()
        .spend(deposit.key(), vec![out_key.clone()])
        .insert_utxo(Utxo::from_tx_output(
            b,
            10,
            out,
            vec![a],
            rec.merkle_hash,
            rec.confirmation_hash,
        ))
        .append_confirm_sigs(deposit.position, vec![sig])
        .put_tx_record(rec.clone())
        .put_block(1, block(3));
    backend.apply_batch(&batch).unwrap();

    let spent = utxo_db.get_utxo(&a, &deposit.position).unwrap().unwrap();
    assert!(!spent.valid);
    assert_eq!(spent.spender_keys, vec![out_key]);
    assert!(utxo_db.get_utxo(&b, &out).unwrap().unwrap().valid);
    assert_eq!(plasma_db.get_confirm_sigs(&deposit.position).unwrap(), vec![sig]);
    assert_eq!(plasma_db.get_tx_record(&rec.merkle_hash).unwrap(), Some(rec));
    assert_eq!(plasma_db.get_latest_block_num().unwrap(), Some(1));

    // an empty batch is a no-op
    backend.apply_batch(&StateBatch::new()).unwrap();
}

pub fn test_failed_batch_writes_nothing(backend: &impl DatabaseBackend) {
    let utxo_db = backend.utxo_db();
    let plasma_db = backend.plasma_db();
    let a = Address([1; 20]);
    let taken = Position::deposit(1);
    backend
        .apply_batch(&StateBatch::new().insert_utxo(Utxo::standalone(a, 5, taken)))
        .unwrap();

    // credit of deposit 2 alongside a colliding insert
    let batch = StateBatch::new()
        .insert_utxo(Utxo::standalone(a, 7, Position::deposit(2)))
        .insert_utxo(Utxo::standalone(Address([9; 20]), 7, taken))
        .mark_deposit_included(2);
    assert!(matches!(backend.apply_batch(&batch), Err(DbError::UtxoExists(_))));
    assert_eq!(utxo_db.get_utxo_by_position(&Position::deposit(2)).unwrap(), None);
    assert!(!plasma_db.is_deposit_included(2).unwrap());

    // a spend whose output collides leaves the input unspent
    let key = UtxoKey::new(&a, &taken);
    let batch = StateBatch::new()
        .spend(key.clone(), vec![UtxoKey::new(&a, &taken)])
        .insert_utxo(Utxo::standalone(a, 5, taken))
        .put_tx_record(record(taken, a));
    assert!(matches!(backend.apply_batch(&batch), Err(DbError::UtxoExists(_))));
    assert!(utxo_db.get_utxo(&a, &taken).unwrap().unwrap().valid);
    assert_eq!(plasma_db.get_tx_record(&record(taken, a).merkle_hash).unwrap(), None);

    // spending twice within one batch fails as a whole
    let batch = StateBatch::new()
        .spend(key.clone(), vec![])
        .spend(key.clone(), vec![]);
    assert_eq!(backend.apply_batch(&batch), Err(DbError::UtxoAlreadySpent(key.clone())));
    assert!(utxo_db.get_utxo(&a, &taken).unwrap().unwrap().valid);

    let missing = UtxoKey::new(&a, &Position::deposit(8));
    assert_eq!(
        backend.apply_batch(&StateBatch::new().spend(missing.clone(), vec![])),
        Err(DbError::UtxoNotFound(missing))
    );
}

pub fn test_batch_confirm_sig_cap(backend: &impl DatabaseBackend) {
    let plasma_db = backend.plasma_db();
    let pos = Position::tx_output(2, 0, 0);
    let sigs = [Signature([1; 65]), Signature([2; 65]), Signature([3; 65])];

    let batch = StateBatch::new().append_confirm_sigs(pos, sigs[..2].to_vec());
    backend.apply_batch(&batch).unwrap();

    let batch = StateBatch::new()
        .append_confirm_sigs(pos, vec![sigs[2]])
        .mark_deposit_included(3);
    assert_eq!(
        backend.apply_batch(&batch),
        Err(DbError::ConfirmSigLimit {
            position: pos,
            limit: MAX_CONFIRM_SIGS
        })
    );
    assert_eq!(plasma_db.get_confirm_sigs(&pos).unwrap(), sigs[..2].to_vec());
    assert!(!plasma_db.is_deposit_included(3).unwrap());
}

pub fn test_batch_block_order(backend: &impl DatabaseBackend) {
    let utxo_db = backend.utxo_db();
    let plasma_db = backend.plasma_db();
    let operator = Address([0xee; 20]);

    // a block out of order takes its fee output down with it
    let batch = StateBatch::new()
        .put_block(2, block(2))
        .insert_utxo(Utxo::standalone(operator, 3, Position::fee(2)));
    assert_eq!(
        backend.apply_batch(&batch),
        Err(DbError::OooInsert("PlasmaBlockSchema", 2))
    );
    assert_eq!(utxo_db.get_utxo_by_position(&Position::fee(2)).unwrap(), None);

    backend.apply_batch(&StateBatch::new().put_block(1, block(1))).unwrap();
    assert!(matches!(
        backend.apply_batch(&StateBatch::new().put_block(1, block(5))),
        Err(DbError::OooInsert(..))
    ));
    backend.apply_batch(&StateBatch::new().put_block(2, block(2))).unwrap();
    assert_eq!(plasma_db.next_block_num().unwrap(), 3);
}

#[macro_export]
macro_rules! backend_tests {
    ($setup_expr:expr) => {
        #[test]
        fn test_batch_commits_all() {
            let backend = $setup_expr;
            $crate::backend_tests::test_batch_commits_all(&backend);
        }

        #[test]
        fn test_failed_batch_writes_nothing() {
            let backend = $setup_expr;
            $crate::backend_tests::test_failed_batch_writes_nothing(&backend);
        }

        #[test]
        fn test_batch_confirm_sig_cap() {
            let backend = $setup_expr;
            $crate::backend_tests::test_batch_confirm_sig_cap(&backend);
        }

        #[test]
        fn test_batch_block_order() {
            let backend = $setup_expr;
            $crate::backend_tests::test_batch_block_order(&backend);
        }
    };
}
